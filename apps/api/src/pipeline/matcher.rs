//! Match Evaluator — scores a resume's skill coverage against its job's
//! requirements.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::llm::LanguageModel;
use crate::models::job::RequirementRow;
use crate::models::resume::{ResumeRow, SkillCategoryRow};
use crate::pipeline::error::PipelineError;
use crate::pipeline::normalize::{normalize_output, NormalizeMode};
use crate::pipeline::prompt::fill_placeholders;
use crate::pipeline::prompts;
use crate::pipeline::schemas::MatchResult;
use crate::pipeline::validate::validate_schema;
use crate::pipeline::writer::dedupe_case_insensitive;

const MATCH_MAX_TOKENS: u32 = 1000;

/// Evaluates how well the job's resume covers its requirements. The result is
/// transient; `evaluate_and_update_match` copies it into the resume row.
pub async fn evaluate_match(
    pool: &PgPool,
    llm: &dyn LanguageModel,
    job_id: Uuid,
) -> Result<MatchResult, PipelineError> {
    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_one(pool)
        .await?;
    if exists == 0 {
        return Err(PipelineError::JobNotFound(job_id));
    }

    let resume = sqlx::query_as::<_, ResumeRow>(
        "SELECT * FROM resumes WHERE job_id = $1",
    )
    .bind(job_id)
    .fetch_optional(pool)
    .await?
    .ok_or(PipelineError::ResumeNotFound(job_id))?;

    let requirements = sqlx::query_as::<_, RequirementRow>(
        "SELECT * FROM requirements WHERE job_id = $1 ORDER BY display_order",
    )
    .bind(job_id)
    .fetch_all(pool)
    .await?;

    let categories = sqlx::query_as::<_, SkillCategoryRow>(
        "SELECT * FROM skill_categories WHERE resume_id = $1 AND exclude = FALSE ORDER BY display_order",
    )
    .bind(resume.id)
    .fetch_all(pool)
    .await?;

    let prompt = fill_placeholders(
        prompts::EVALUATE_MATCH,
        &[
            ("REQUIREMENTS", &build_requirements_section(&requirements)),
            ("RESUME_SKILLS", &build_skills_section(&categories)),
        ],
    )?;

    let response = llm.generate(&prompt, MATCH_MAX_TOKENS).await?;
    let value = normalize_output(&response, NormalizeMode::Strict)?;
    let result: MatchResult = validate_schema(value)?;

    info!(%job_id, ratio = result.match_ratio, "evaluated requirement match");
    Ok(result)
}

/// Runs the evaluation and persists the result onto the job's resume row.
pub async fn evaluate_and_update_match(
    pool: &PgPool,
    llm: &dyn LanguageModel,
    job_id: Uuid,
) -> Result<MatchResult, PipelineError> {
    let result = evaluate_match(pool, llm, job_id).await?;

    sqlx::query(
        "UPDATE resumes SET unmet_requirements = $1, match_ratio = $2 WHERE job_id = $3",
    )
    .bind(&result.unmet_requirements)
    .bind(result.match_ratio)
    .bind(job_id)
    .execute(pool)
    .await?;

    Ok(result)
}

/// Numbered keyword lines, one per requirement with a non-empty keyword list.
/// Numbers track requirement positions, so they may skip where a requirement
/// contributed no line.
pub fn build_requirements_section(requirements: &[RequirementRow]) -> String {
    let lines: Vec<String> = requirements
        .iter()
        .enumerate()
        .filter(|(_, req)| !req.keywords.0.is_empty())
        .map(|(idx, req)| format!("{}. {}", idx + 1, req.keywords.0.join(", ")))
        .collect();

    if lines.is_empty() {
        "No requirements specified".to_string()
    } else {
        lines.join("\n")
    }
}

/// One comma-joined line of unique skill keywords across the non-excluded
/// categories, first-occurrence casing preserved.
pub fn build_skills_section(categories: &[SkillCategoryRow]) -> String {
    let all: Vec<String> = categories.iter().flat_map(|c| c.skills_list()).collect();
    let unique = dedupe_case_insensitive(all);
    if unique.is_empty() {
        "No skills available".to_string()
    } else {
        unique.join(", ")
    }
}
