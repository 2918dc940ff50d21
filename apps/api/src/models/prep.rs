//! Interview preparation rows, one-to-one with applications.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Base interview preparation generated for one application. The markdown
/// fields are persisted verbatim from the validated model output.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewPrepRow {
    pub id: Uuid,
    pub application_id: Uuid,
    pub formatted_jd: String,
    pub company_context: String,
    pub primary_drivers: String,
    pub background_narrative: String,
    pub created_at: DateTime<Utc>,
}
