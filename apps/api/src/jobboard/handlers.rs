use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::jobboard::{BoardConfig, Posting, WorkdayClient};

#[derive(Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub board: BoardConfig,
    pub keywords: Option<String>,
    pub max_results: Option<usize>,
}

/// POST /api/v1/jobboard/search
/// Fetches normalized postings from one company's Workday site.
pub async fn handle_search(
    Json(req): Json<SearchRequest>,
) -> Result<Json<Vec<Posting>>, AppError> {
    let client = WorkdayClient::new(req.board);
    let postings = client
        .fetch(req.keywords.as_deref(), req.max_results)
        .await
        .map_err(anyhow::Error::new)?;
    Ok(Json(postings))
}
