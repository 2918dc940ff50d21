//! Reusable experience catalog: past roles and the projects completed in them.
//! These are the source material the bullet generator draws from.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A past work role referenced by template role configs.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceRoleRow {
    /// Stable identifier used by templates (e.g. 'navit', 'amazon_sde').
    pub id: Uuid,
    pub key: String,
    pub company: String,
    pub title: String,
    pub display_name: Option<String>,
}

impl ExperienceRoleRow {
    /// Human-facing name; falls back to "title – company".
    pub fn display(&self) -> String {
        match self.display_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name.to_string(),
            _ => format!("{} – {}", self.title, self.company),
        }
    }
}

/// A project or task completed during a specific role. The comma-separated
/// `tools` field feeds the skills generator's vocabulary.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExperienceProjectRow {
    pub id: Uuid,
    pub experience_role_id: Uuid,
    pub short_name: String,
    pub problem_context: String,
    pub actions: String,
    pub tools: String,
    pub outcomes: String,
    pub impact_area: String,
}

impl ExperienceProjectRow {
    /// Splits the comma-separated tools field into trimmed, non-empty entries.
    pub fn tools_list(&self) -> Vec<String> {
        self.tools
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect()
    }
}
