//! Interview preparation — builds study material for an application from its
//! job description and the generated resume.
//!
//! The resume context deliberately carries only role titles, non-excluded
//! bullets and non-excluded skill categories; companies, dates and locations
//! are left out so the material focuses on accomplishments.

use chrono::Utc;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::llm::LanguageModel;
use crate::models::job::{ApplicationRow, JobRow};
use crate::models::prep::InterviewPrepRow;
use crate::models::resume::{ResumeBulletRow, ResumeRoleRow, ResumeRow, SkillCategoryRow};
use crate::pipeline::error::PipelineError;
use crate::pipeline::normalize::{normalize_output, NormalizeMode};
use crate::pipeline::prompt::fill_placeholders;
use crate::pipeline::prompts;
use crate::pipeline::schemas::InterviewPrep;
use crate::pipeline::validate::validate_schema;

const PREP_MAX_TOKENS: u32 = 4000;

/// Text representation of a resume for the prep prompt: an EXPERIENCE section
/// with each role's non-excluded bullets, then a SKILLS section with the
/// non-excluded categories. Either section is omitted when empty.
pub fn format_resume_context(
    roles: &[(ResumeRoleRow, Vec<ResumeBulletRow>)],
    skills: &[SkillCategoryRow],
) -> String {
    let mut sections: Vec<String> = Vec::new();

    if !roles.is_empty() {
        sections.push("EXPERIENCE\n".to_string());
        for (role, bullets) in roles {
            sections.push(format!("\n{}", role.title));
            for bullet in bullets.iter().filter(|b| !b.exclude) {
                sections.push(format!("- {}", bullet.display_text()));
            }
        }
    }

    let included: Vec<&SkillCategoryRow> = skills.iter().filter(|c| !c.exclude).collect();
    if !included.is_empty() {
        sections.push("\n\nSKILLS\n".to_string());
        for category in included {
            sections.push(format!("{}: {}", category.category, category.display_text()));
        }
    }

    sections.join("\n")
}

async fn build_resume_context(pool: &PgPool, resume_id: Uuid) -> Result<String, PipelineError> {
    let roles = sqlx::query_as::<_, ResumeRoleRow>(
        "SELECT * FROM resume_roles WHERE resume_id = $1 ORDER BY display_order",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    let mut roles_with_bullets: Vec<(ResumeRoleRow, Vec<ResumeBulletRow>)> = Vec::new();
    for role in roles {
        let bullets = sqlx::query_as::<_, ResumeBulletRow>(
            "SELECT * FROM resume_bullets WHERE resume_role_id = $1 ORDER BY display_order",
        )
        .bind(role.id)
        .fetch_all(pool)
        .await?;
        roles_with_bullets.push((role, bullets));
    }

    let skills = sqlx::query_as::<_, SkillCategoryRow>(
        "SELECT * FROM skill_categories WHERE resume_id = $1 ORDER BY display_order",
    )
    .bind(resume_id)
    .fetch_all(pool)
    .await?;

    Ok(format_resume_context(&roles_with_bullets, &skills))
}

/// Generates and persists base interview preparation for a job's application.
///
/// Requires the application and its resume to exist. Idempotent: when prep
/// already exists for the application it is returned unchanged and no model
/// call is made.
pub async fn generate_interview_prep(
    pool: &PgPool,
    llm: &dyn LanguageModel,
    job_id: Uuid,
) -> Result<InterviewPrepRow, PipelineError> {
    let job = sqlx::query_as::<_, JobRow>("SELECT * FROM jobs WHERE id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or(PipelineError::JobNotFound(job_id))?;

    let application =
        sqlx::query_as::<_, ApplicationRow>("SELECT * FROM applications WHERE job_id = $1")
            .bind(job_id)
            .fetch_optional(pool)
            .await?
            .ok_or(PipelineError::ApplicationNotFound(job_id))?;

    if let Some(existing) = sqlx::query_as::<_, InterviewPrepRow>(
        "SELECT * FROM interview_preps WHERE application_id = $1",
    )
    .bind(application.id)
    .fetch_optional(pool)
    .await?
    {
        return Ok(existing);
    }

    let resume = sqlx::query_as::<_, ResumeRow>("SELECT * FROM resumes WHERE job_id = $1")
        .bind(job_id)
        .fetch_optional(pool)
        .await?
        .ok_or(PipelineError::ResumeNotFound(job_id))?;

    let context = build_resume_context(pool, resume.id).await?;

    let prompt = fill_placeholders(
        prompts::GENERATE_INTERVIEW_PREP,
        &[
            ("JOB_DESCRIPTION", job.raw_text.as_str()),
            ("RESUME", context.as_str()),
        ],
    )?;
    let response = llm.generate(&prompt, PREP_MAX_TOKENS).await?;
    let value = normalize_output(&response, NormalizeMode::Lenient)?;
    let prep: InterviewPrep = validate_schema(value)?;

    let row = InterviewPrepRow {
        id: Uuid::new_v4(),
        application_id: application.id,
        formatted_jd: prep.formatted_jd,
        company_context: prep.company_context,
        primary_drivers: prep.primary_drivers,
        background_narrative: prep.background_narrative,
        created_at: Utc::now(),
    };

    sqlx::query(
        r#"
        INSERT INTO interview_preps (id, application_id, formatted_jd, company_context,
                                     primary_drivers, background_narrative, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        "#,
    )
    .bind(row.id)
    .bind(row.application_id)
    .bind(&row.formatted_jd)
    .bind(&row.company_context)
    .bind(&row.primary_drivers)
    .bind(&row.background_narrative)
    .bind(row.created_at)
    .execute(pool)
    .await?;

    info!(job_id = %job_id, application_id = %application.id, "generated interview preparation");
    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::ScriptedLlm;

    fn role(title: &str, order: i32) -> ResumeRoleRow {
        ResumeRoleRow {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            source_role_id: Uuid::new_v4(),
            title: title.to_string(),
            display_order: order,
            created_at: Utc::now(),
        }
    }

    fn bullet(text: &str, override_text: &str, exclude: bool) -> ResumeBulletRow {
        ResumeBulletRow {
            id: Uuid::new_v4(),
            resume_role_id: Uuid::new_v4(),
            text: text.to_string(),
            override_text: override_text.to_string(),
            display_order: 1,
            exclude,
            created_at: Utc::now(),
        }
    }

    fn category(name: &str, skills: &str, exclude: bool) -> SkillCategoryRow {
        SkillCategoryRow {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            display_order: 1,
            category: name.to_string(),
            skills_text: skills.to_string(),
            override_text: String::new(),
            exclude,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_context_omits_excluded_rows() {
        let context = format_resume_context(
            &[(
                role("Software Engineer", 1),
                vec![
                    bullet("Shipped the search overhaul", "", false),
                    bullet("Hidden achievement", "", true),
                ],
            )],
            &[
                category("Languages", "Rust, SQL", false),
                category("Legacy", "COBOL", true),
            ],
        );
        assert!(context.contains("- Shipped the search overhaul"));
        assert!(!context.contains("Hidden achievement"));
        assert!(context.contains("Languages: Rust, SQL"));
        assert!(!context.contains("COBOL"));
    }

    #[test]
    fn test_context_prefers_override_text() {
        let context = format_resume_context(
            &[(
                role("Data Engineer", 1),
                vec![bullet("generated wording", "edited wording", false)],
            )],
            &[],
        );
        assert!(context.contains("- edited wording"));
        assert!(!context.contains("generated wording"));
    }

    #[test]
    fn test_context_sections_and_titles() {
        let context = format_resume_context(
            &[
                (role("Senior Engineer", 1), vec![]),
                (role("Engineer", 2), vec![]),
            ],
            &[category("Languages", "Rust", false)],
        );
        assert!(context.starts_with("EXPERIENCE\n"));
        assert!(context.contains("\nSenior Engineer"));
        assert!(context.contains("\nEngineer"));
        assert!(context.contains("SKILLS\n"));
    }

    #[test]
    fn test_context_for_empty_resume_is_empty() {
        assert_eq!(format_resume_context(&[], &[]), "");
    }

    fn prep_response() -> String {
        serde_json::json!({
            "formatted_jd": "## Requirements\n- Rust",
            "company_context": "Acme builds logistics software.",
            "primary_drivers": "- Rust systems experience",
            "background_narrative": "I spent five years building backend systems."
        })
        .to_string()
    }

    async fn seed_job_with_application(pool: &PgPool, raw_text: &str) -> Uuid {
        let job_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO jobs (id, company, listing_job_title, raw_text, role, level, work_setting)
            VALUES ($1, 'Acme', 'Backend Engineer II', $2, 'Software Engineer', 'II', 'Remote')
            "#,
        )
        .bind(job_id)
        .bind(raw_text)
        .execute(pool)
        .await
        .unwrap();
        sqlx::query("INSERT INTO applications (id, job_id) VALUES ($1, $2)")
            .bind(Uuid::new_v4())
            .bind(job_id)
            .execute(pool)
            .await
            .unwrap();
        job_id
    }

    async fn seed_resume_with_content(pool: &PgPool, job_id: Uuid) -> Uuid {
        let template_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO resume_templates (id, target_role, target_level, markup_path)
            VALUES ($1, 'Software Engineer', 'II', 'templates/swe.html')
            "#,
        )
        .bind(template_id)
        .execute(pool)
        .await
        .unwrap();

        let resume_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO resumes (id, job_id, template_id, style_tier) VALUES ($1, $2, $3, 'standard')",
        )
        .bind(resume_id)
        .bind(job_id)
        .bind(template_id)
        .execute(pool)
        .await
        .unwrap();

        let source_role_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO experience_roles (id, key, company, title) VALUES ($1, 'navit', 'Nav.it', 'Software Engineer')",
        )
        .bind(source_role_id)
        .execute(pool)
        .await
        .unwrap();

        let role_id = Uuid::new_v4();
        sqlx::query(
            "INSERT INTO resume_roles (id, resume_id, source_role_id, title, display_order) VALUES ($1, $2, $3, 'Software Engineer', 1)",
        )
        .bind(role_id)
        .bind(resume_id)
        .bind(source_role_id)
        .execute(pool)
        .await
        .unwrap();

        for (order, text, exclude) in [
            (1, "Shipped the search relevance overhaul", false),
            (2, "Confidential side project work", true),
        ] {
            sqlx::query(
                "INSERT INTO resume_bullets (id, resume_role_id, text, display_order, exclude) VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(Uuid::new_v4())
            .bind(role_id)
            .bind(text)
            .bind(order)
            .bind(exclude)
            .execute(pool)
            .await
            .unwrap();
        }

        sqlx::query(
            "INSERT INTO skill_categories (id, resume_id, display_order, category, skills_text) VALUES ($1, $2, 1, 'Languages', 'Rust, SQL')",
        )
        .bind(Uuid::new_v4())
        .bind(resume_id)
        .execute(pool)
        .await
        .unwrap();

        resume_id
    }

    #[sqlx::test]
    async fn test_prep_requires_an_application(pool: PgPool) {
        let job_id = Uuid::new_v4();
        sqlx::query(
            r#"
            INSERT INTO jobs (id, company, listing_job_title, raw_text, role, level, work_setting)
            VALUES ($1, 'Acme', 'Backend Engineer II', 'jd text', 'Software Engineer', 'II', 'Remote')
            "#,
        )
        .bind(job_id)
        .execute(&pool)
        .await
        .unwrap();

        let llm = ScriptedLlm::new(vec![]);
        let err = generate_interview_prep(&pool, &llm, job_id).await.unwrap_err();
        assert!(matches!(err, PipelineError::ApplicationNotFound(id) if id == job_id));
        assert_eq!(llm.calls(), 0);
    }

    #[sqlx::test]
    async fn test_generates_prep_from_non_excluded_content(pool: PgPool) {
        let job_id = seed_job_with_application(&pool, "We need a backend engineer.").await;
        seed_resume_with_content(&pool, job_id).await;

        let llm = ScriptedLlm::new(vec![prep_response()]);
        let prep = generate_interview_prep(&pool, &llm, job_id).await.unwrap();
        assert_eq!(prep.company_context, "Acme builds logistics software.");

        let prompt = llm.last_prompt();
        assert!(prompt.contains("We need a backend engineer."));
        assert!(prompt.contains("- Shipped the search relevance overhaul"));
        assert!(!prompt.contains("Confidential side project work"));
        assert!(prompt.contains("Languages: Rust, SQL"));

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM interview_preps")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }

    #[sqlx::test]
    async fn test_existing_prep_is_returned_without_a_model_call(pool: PgPool) {
        let job_id = seed_job_with_application(&pool, "We need a backend engineer.").await;
        seed_resume_with_content(&pool, job_id).await;

        let llm = ScriptedLlm::new(vec![prep_response()]);
        let first = generate_interview_prep(&pool, &llm, job_id).await.unwrap();
        let second = generate_interview_prep(&pool, &llm, job_id).await.unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(llm.calls(), 1);
    }
}
