use std::path::{Component, Path, PathBuf};

use axum::{
    extract::{Path as UrlPath, State},
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::prep::InterviewPrepRow;
use crate::models::resume::{ResumeBulletRow, ResumeRoleRow, ResumeRow, SkillCategoryRow};
use crate::pipeline::error::PipelineError;
use crate::pipeline::jd_parser::parse_jd;
use crate::pipeline::matcher::evaluate_and_update_match;
use crate::pipeline::orchestrator::Orchestrator;
use crate::pipeline::prep::generate_interview_prep;
use crate::pipeline::schemas::{MatchResult, ParsedJd};
use crate::state::AppState;

/// Job-description input: raw text or a file path relative to the configured
/// job-description directory.
#[derive(Deserialize)]
pub struct JdRequest {
    pub text: Option<String>,
    pub source_path: Option<String>,
}

/// Confines a caller-supplied source path to the job-description directory.
/// Absolute paths and any `..`/prefix components are rejected.
fn resolve_source_path(jd_dir: &str, source_path: &str) -> Result<PathBuf, PipelineError> {
    let relative = Path::new(source_path);
    let plain = relative
        .components()
        .all(|c| matches!(c, Component::Normal(_)));
    if relative.is_absolute() || !plain {
        return Err(PipelineError::InvalidSourcePath {
            path: source_path.to_string(),
        });
    }
    Ok(Path::new(jd_dir).join(relative))
}

impl JdRequest {
    fn source(&self, jd_dir: &str) -> Result<Option<PathBuf>, PipelineError> {
        self.source_path
            .as_deref()
            .map(|p| resolve_source_path(jd_dir, p))
            .transpose()
    }
}

#[derive(Serialize)]
pub struct RoleWithBullets {
    #[serde(flatten)]
    pub role: ResumeRoleRow,
    pub bullets: Vec<ResumeBulletRow>,
}

#[derive(Serialize)]
pub struct ResumeDetailResponse {
    #[serde(flatten)]
    pub resume: ResumeRow,
    pub roles: Vec<RoleWithBullets>,
    pub skill_categories: Vec<SkillCategoryRow>,
}

/// POST /api/v1/resumes/parse-jd
/// Extraction preview: parses without persisting anything.
pub async fn handle_parse_jd(
    State(state): State<AppState>,
    Json(req): Json<JdRequest>,
) -> Result<Json<ParsedJd>, AppError> {
    let source = req.source(&state.config.jd_dir)?;
    let parsed = parse_jd(state.llm.as_ref(), source.as_deref(), req.text.as_deref()).await?;
    Ok(Json(parsed))
}

/// POST /api/v1/resumes/generate
/// Full generation run: job, requirements, content, rendered PDF.
pub async fn handle_generate(
    State(state): State<AppState>,
    Json(req): Json<JdRequest>,
) -> Result<Json<ResumeRow>, AppError> {
    let orchestrator = Orchestrator::new(
        &state.db,
        state.llm.as_ref(),
        state.renderer.as_ref(),
        Path::new(&state.config.output_dir),
    );
    let source = req.source(&state.config.jd_dir)?;
    let resume = orchestrator
        .run(source.as_deref(), req.text.as_deref())
        .await?;
    Ok(Json(resume))
}

/// GET /api/v1/jobs/:job_id/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    UrlPath(job_id): UrlPath<Uuid>,
) -> Result<Json<ResumeDetailResponse>, AppError> {
    let resume = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(&state.db)
        .await?
        .ok_or(PipelineError::ResumeNotFound(job_id))?;

    let role_rows = sqlx::query_as::<_, ResumeRoleRow>(
        "SELECT * FROM resume_roles WHERE resume_id = $1 ORDER BY display_order",
    )
    .bind(resume.id)
    .fetch_all(&state.db)
    .await?;

    let mut roles = Vec::with_capacity(role_rows.len());
    for role in role_rows {
        let bullets = sqlx::query_as::<_, ResumeBulletRow>(
            "SELECT * FROM resume_bullets WHERE resume_role_id = $1 ORDER BY display_order",
        )
        .bind(role.id)
        .fetch_all(&state.db)
        .await?;
        roles.push(RoleWithBullets { role, bullets });
    }

    let skill_categories = sqlx::query_as::<_, SkillCategoryRow>(
        "SELECT * FROM skill_categories WHERE resume_id = $1 ORDER BY display_order",
    )
    .bind(resume.id)
    .fetch_all(&state.db)
    .await?;

    Ok(Json(ResumeDetailResponse {
        resume,
        roles,
        skill_categories,
    }))
}

/// POST /api/v1/jobs/:job_id/match
/// Runs the match evaluation and copies the result onto the resume row.
pub async fn handle_match(
    State(state): State<AppState>,
    UrlPath(job_id): UrlPath<Uuid>,
) -> Result<Json<MatchResult>, AppError> {
    let result = evaluate_and_update_match(&state.db, state.llm.as_ref(), job_id).await?;
    Ok(Json(result))
}

/// POST /api/v1/jobs/:job_id/interview-prep
/// Generates base interview preparation; returns the existing prep when one
/// was already generated for the job's application.
pub async fn handle_interview_prep(
    State(state): State<AppState>,
    UrlPath(job_id): UrlPath<Uuid>,
) -> Result<Json<InterviewPrepRow>, AppError> {
    let prep = generate_interview_prep(&state.db, state.llm.as_ref(), job_id).await?;
    Ok(Json(prep))
}
