use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::pipeline::error::PipelineError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Pipeline(e) if e.is_declared() => (declared_status(e), e.code(), e.to_string()),
            AppError::Pipeline(e) => {
                tracing::error!("Pipeline error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    e.code(),
                    "Resume generation failed".to_string(),
                )
            }
            AppError::Database(e) => {
                tracing::error!("Database error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

fn declared_status(err: &PipelineError) -> StatusCode {
    match err {
        PipelineError::JobNotFound(_)
        | PipelineError::ResumeNotFound(_)
        | PipelineError::ApplicationNotFound(_)
        | PipelineError::NoTemplateFound { .. } => StatusCode::NOT_FOUND,
        PipelineError::MissingInput | PipelineError::InvalidSourcePath { .. } => {
            StatusCode::BAD_REQUEST
        }
        PipelineError::OutputTruncated
        | PipelineError::MalformedOutput { .. }
        | PipelineError::SchemaValidationFailed { .. }
        | PipelineError::TooManyItems { .. }
        | PipelineError::NoSourceMaterial(_) => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
