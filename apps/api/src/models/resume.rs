//! Generated document rows: the resume itself plus its frozen per-document
//! content (roles, bullets, skill categories).
//!
//! Override/exclusion semantics are uniform: a non-blank `override_text` wins
//! over the generated text, and excluded rows are filtered from every
//! downstream consumer (rendering and match evaluation).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A generated resume, one-to-one with a job. `style_tier` starts at the
/// template's configured tier and escalates during the layout fitting loop.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRow {
    pub id: Uuid,
    pub job_id: Uuid,
    pub template_id: Uuid,
    pub style_tier: String,
    pub pdf_path: Option<String>,
    /// CSV string of requirement keywords not covered (e.g. "Go,Ruby on Rails").
    pub unmet_requirements: String,
    pub match_ratio: f64,
    pub created_at: DateTime<Utc>,
}

/// A frozen copy of an experience role within one resume. The title is copied
/// at generation time and never re-derived from the source role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeRoleRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub source_role_id: Uuid,
    pub title: String,
    pub display_order: i32,
    pub created_at: DateTime<Utc>,
}

/// A generated or edited experience bullet tied to one resume role.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ResumeBulletRow {
    pub id: Uuid,
    pub resume_role_id: Uuid,
    pub text: String,
    pub override_text: String,
    pub display_order: i32,
    pub exclude: bool,
    pub created_at: DateTime<Utc>,
}

impl ResumeBulletRow {
    pub fn display_text(&self) -> &str {
        let edited = self.override_text.trim();
        if edited.is_empty() {
            self.text.trim()
        } else {
            edited
        }
    }
}

/// A category of skills within one resume (e.g. "Programming Languages").
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillCategoryRow {
    pub id: Uuid,
    pub resume_id: Uuid,
    pub display_order: i32,
    pub category: String,
    pub skills_text: String,
    pub override_text: String,
    pub exclude: bool,
    pub created_at: DateTime<Utc>,
}

impl SkillCategoryRow {
    pub fn display_text(&self) -> &str {
        let edited = self.override_text.trim();
        if edited.is_empty() {
            self.skills_text.trim()
        } else {
            edited
        }
    }

    /// Splits the displayed skills CSV into trimmed, non-empty entries.
    pub fn skills_list(&self) -> Vec<String> {
        self.display_text()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}
