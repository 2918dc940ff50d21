use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::llm::LanguageModel;
use crate::render::DocumentRenderer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    /// Model capability. Production: `ClaudeClient`; tests: scripted fakes.
    pub llm: Arc<dyn LanguageModel>,
    /// Render capability. Production: `HttpRenderer`; tests: scripted fakes.
    pub renderer: Arc<dyn DocumentRenderer>,
    pub config: Config,
}
