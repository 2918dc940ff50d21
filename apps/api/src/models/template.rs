//! Resume template configuration rows and the recognized specialization set.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Specializations that have dedicated templates. Membership is checked
/// against a normalized key (alphabetic characters only, lowercased) so
/// cosmetic variants like "Full -Stack" resolve to the same template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetSpecialization {
    #[serde(rename = "Backend")]
    Backend,
    #[serde(rename = "Frontend")]
    Frontend,
    #[serde(rename = "Full Stack")]
    FullStack,
    #[serde(rename = "Data Platform")]
    DataPlatform,
    #[serde(rename = "Machine Learning")]
    MachineLearning,
    #[serde(rename = "Infrastructure")]
    Infrastructure,
}

impl TargetSpecialization {
    pub fn normalized_key(&self) -> &'static str {
        match self {
            TargetSpecialization::Backend => "backend",
            TargetSpecialization::Frontend => "frontend",
            TargetSpecialization::FullStack => "fullstack",
            TargetSpecialization::DataPlatform => "dataplatform",
            TargetSpecialization::MachineLearning => "machinelearning",
            TargetSpecialization::Infrastructure => "infrastructure",
        }
    }

    /// Looks up a specialization by its normalized key.
    pub fn from_normalized(key: &str) -> Option<Self> {
        [
            TargetSpecialization::Backend,
            TargetSpecialization::Frontend,
            TargetSpecialization::FullStack,
            TargetSpecialization::DataPlatform,
            TargetSpecialization::MachineLearning,
            TargetSpecialization::Infrastructure,
        ]
        .into_iter()
        .find(|s| s.normalized_key() == key)
    }
}

/// A content template targeting one (role, level, specialization) triple.
/// The triple is unique; a NULL specialization is its own key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TemplateRow {
    pub id: Uuid,
    pub target_role: String,
    pub target_level: String,
    pub target_specialization: Option<String>,
    pub markup_path: String,
    pub style_tier: String,
    pub max_skill_categories: i32,
    pub created_at: DateTime<Utc>,
}

/// Configuration for one experience role within a template.
/// (template, experience_role) and (template, display_order) are unique.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RoleConfigRow {
    pub id: Uuid,
    pub template_id: Uuid,
    pub experience_role_id: Uuid,
    pub display_order: i32,
    pub title_override: Option<String>,
    pub max_bullet_count: i32,
}
