//! Failure taxonomy for the structured-generation pipeline.
//!
//! Every declared kind is a distinct, matchable variant — callers branch on
//! them and they are never collapsed into one generic error. Carrier variants
//! (`Llm`, `Database`, `Render`, `Io`) represent collaborator failures; when
//! one surfaces inside a per-job generation run the orchestrator wraps it into
//! `OrchestrationFailed` so batch callers can log-and-continue.

use thiserror::Error;
use uuid::Uuid;

use crate::llm::LlmError;
use crate::render::RenderError;

/// One field-level validation violation: a path into the record plus a
/// human-readable reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub path: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.path, e.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Model output did not end with a closing brace or bracket — the caller
    /// may retry with a larger output-token budget.
    #[error("LLM output truncated — increase max_tokens or retry")]
    OutputTruncated,

    /// Output ended plausibly but could not be parsed, even after repair.
    #[error("failed to parse LLM JSON output:\n{text}")]
    MalformedOutput { text: String },

    #[error("schema validation failed: {}", join_field_errors(.errors))]
    SchemaValidationFailed { errors: Vec<FieldError> },

    /// A mapping key had no matching placeholder in the template. This is a
    /// development-time contract violation, not a runtime data error.
    #[error("placeholder '{{{{{name}}}}}' not found in template")]
    UnresolvedPlaceholder { name: String },

    #[error("provide either a job description file path or raw text")]
    MissingInput,

    /// The source path escapes the configured job-description directory.
    #[error("source path '{path}' must be a relative path inside the job-description directory")]
    InvalidSourcePath { path: String },

    #[error("no template found for role={role}, level={level}{}", .specialization.as_ref().map(|s| format!(", specialization={s}")).unwrap_or_default())]
    NoTemplateFound {
        role: String,
        level: String,
        specialization: Option<String>,
    },

    /// Schema-valid response exceeded the configured item budget. Checked only
    /// after schema validation succeeds.
    #[error("response contains {returned} {kind}, but maximum allowed is {max}")]
    TooManyItems {
        kind: &'static str,
        returned: usize,
        max: i32,
    },

    /// Generator precondition: the model has nothing concrete to draw from.
    #[error("no source material: {0}")]
    NoSourceMaterial(String),

    #[error("job {0} not found")]
    JobNotFound(Uuid),

    #[error("no resume found for job {0}")]
    ResumeNotFound(Uuid),

    #[error("no application found for job {0}")]
    ApplicationNotFound(Uuid),

    #[error("LLM call failed: {0}")]
    Llm(#[from] LlmError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("render failed: {0}")]
    Render(#[from] RenderError),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An unanticipated failure inside one job's generation run, wrapped with
    /// job context so batch callers can log it and move on.
    #[error("generation run for '{job}' failed: {source}")]
    OrchestrationFailed {
        job: String,
        #[source]
        source: anyhow::Error,
    },
}

impl PipelineError {
    /// Whether this is a declared pipeline kind that callers branch on.
    /// Carrier variants are "unanticipated" from the orchestrator's point of
    /// view and get wrapped with job context instead of propagating bare.
    pub fn is_declared(&self) -> bool {
        !matches!(
            self,
            PipelineError::Llm(_)
                | PipelineError::Database(_)
                | PipelineError::Render(_)
                | PipelineError::Io(_)
                | PipelineError::OrchestrationFailed { .. }
        )
    }

    /// Stable machine-readable code for the HTTP error body.
    pub fn code(&self) -> &'static str {
        match self {
            PipelineError::OutputTruncated => "OUTPUT_TRUNCATED",
            PipelineError::MalformedOutput { .. } => "MALFORMED_OUTPUT",
            PipelineError::SchemaValidationFailed { .. } => "SCHEMA_VALIDATION_FAILED",
            PipelineError::UnresolvedPlaceholder { .. } => "UNRESOLVED_PLACEHOLDER",
            PipelineError::MissingInput => "MISSING_INPUT",
            PipelineError::InvalidSourcePath { .. } => "INVALID_SOURCE_PATH",
            PipelineError::NoTemplateFound { .. } => "NO_TEMPLATE_FOUND",
            PipelineError::TooManyItems { .. } => "TOO_MANY_ITEMS",
            PipelineError::NoSourceMaterial(_) => "NO_SOURCE_MATERIAL",
            PipelineError::JobNotFound(_) => "JOB_NOT_FOUND",
            PipelineError::ResumeNotFound(_) => "RESUME_NOT_FOUND",
            PipelineError::ApplicationNotFound(_) => "APPLICATION_NOT_FOUND",
            PipelineError::Llm(_) => "LLM_ERROR",
            PipelineError::Database(_) => "DATABASE_ERROR",
            PipelineError::Render(_) => "RENDER_ERROR",
            PipelineError::Io(_) => "IO_ERROR",
            PipelineError::OrchestrationFailed { .. } => "ORCHESTRATION_FAILED",
        }
    }
}
