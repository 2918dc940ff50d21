pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::jobboard;
use crate::pipeline::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/resumes/parse-jd", post(handlers::handle_parse_jd))
        .route("/api/v1/resumes/generate", post(handlers::handle_generate))
        .route("/api/v1/jobs/:job_id/resume", get(handlers::handle_get_resume))
        .route("/api/v1/jobs/:job_id/match", post(handlers::handle_match))
        .route(
            "/api/v1/jobs/:job_id/interview-prep",
            post(handlers::handle_interview_prep),
        )
        .route(
            "/api/v1/jobboard/search",
            post(jobboard::handlers::handle_search),
        )
        .with_state(state)
}
