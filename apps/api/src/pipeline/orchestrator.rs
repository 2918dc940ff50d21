//! Generation Orchestrator — drives the end-to-end run:
//! parse → persist job+requirements → resolve template → create resume →
//! per-role bullets → skills → render → fit → finalize.
//!
//! Declared pipeline failures propagate unwrapped so callers can branch on
//! them; anything else that surfaces after the job row exists is wrapped into
//! `OrchestrationFailed` with the job's label, so batch callers can log one
//! bad job and continue.

use std::path::{Path, PathBuf};

use chrono::Utc;
use sqlx::{PgPool, QueryBuilder};
use tracing::info;
use uuid::Uuid;

use crate::layout::{fit_to_page, StyleTier};
use crate::llm::LanguageModel;
use crate::models::experience::{ExperienceProjectRow, ExperienceRoleRow};
use crate::models::job::{JobRow, RequirementRow};
use crate::models::resume::{ResumeBulletRow, ResumeRoleRow, ResumeRow, SkillCategoryRow};
use crate::models::template::{RoleConfigRow, TemplateRow};
use crate::pipeline::error::PipelineError;
use crate::pipeline::jd_parser::{parse_jd, read_jd_content};
use crate::pipeline::schemas::ParsedJd;
use crate::pipeline::template_resolver::resolve_template;
use crate::pipeline::writer::{
    collect_tool_vocabulary, generate_experience_bullets, generate_skills,
};
use crate::render::markup::{assemble_markup, pdf_filename};
use crate::render::DocumentRenderer;

const REQUIREMENT_INSERT_BATCH: usize = 100;

pub struct Orchestrator<'a> {
    pool: &'a PgPool,
    llm: &'a dyn LanguageModel,
    renderer: &'a dyn DocumentRenderer,
    output_dir: &'a Path,
}

impl<'a> Orchestrator<'a> {
    pub fn new(
        pool: &'a PgPool,
        llm: &'a dyn LanguageModel,
        renderer: &'a dyn DocumentRenderer,
        output_dir: &'a Path,
    ) -> Self {
        Self {
            pool,
            llm,
            renderer,
            output_dir,
        }
    }

    /// Runs the full generation sequence for one job description and returns
    /// the finalized resume row.
    pub async fn run(
        &self,
        source: Option<&Path>,
        text: Option<&str>,
    ) -> Result<ResumeRow, PipelineError> {
        let jd_content = read_jd_content(source, text).await?;
        let parsed = parse_jd(self.llm, None, Some(&jd_content)).await?;

        let (job, requirements) = self
            .persist_job_and_requirements(&parsed, &jd_content)
            .await?;
        let job_label = format!("{} — {}", job.company, job.listing_job_title);

        // A missing template aborts the run but the job and requirements stay
        // persisted as a record of the parse attempt.
        let template = resolve_template(
            self.pool,
            &job.role,
            &job.level,
            job.specialization.as_deref(),
        )
        .await
        .map_err(|e| wrap_unexpected(&job_label, e))?;

        self.generate_document(&job, &job_label, &template, &requirements)
            .await
            .map_err(|e| wrap_unexpected(&job_label, e))
    }

    async fn generate_document(
        &self,
        job: &JobRow,
        job_label: &str,
        template: &TemplateRow,
        requirements: &[RequirementRow],
    ) -> Result<ResumeRow, PipelineError> {
        let start_tier: StyleTier = template
            .style_tier
            .parse()
            .map_err(|e: String| PipelineError::OrchestrationFailed {
                job: job_label.to_string(),
                source: anyhow::anyhow!(e),
            })?;

        let resume = self.create_resume(job, template, start_tier).await?;

        let configs = self.load_role_configs(template.id).await?;
        let mut all_projects: Vec<ExperienceProjectRow> = Vec::new();
        for config in &configs {
            let role = self.load_experience_role(config.experience_role_id).await?;
            let projects = self.load_projects(role.id).await?;

            let bullets = generate_experience_bullets(
                self.llm,
                &role,
                &projects,
                requirements,
                &template.target_role,
                config.max_bullet_count,
            )
            .await?;

            let title = config
                .title_override
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| role.title.clone());
            self.persist_role_content(&resume, config, &role, &title, &bullets.bullets)
                .await?;
            all_projects.extend(projects);
        }

        let vocabulary = collect_tool_vocabulary(&all_projects);
        let skills = generate_skills(
            self.llm,
            &vocabulary,
            requirements,
            &template.target_role,
            template.max_skill_categories,
        )
        .await?;
        self.persist_skills(&resume, &skills.skill_categories).await?;

        let final_resume = self.render_and_fit(job, template, resume, start_tier).await?;
        self.record_application(job.id).await?;

        info!(
            resume_id = %final_resume.id,
            tier = %final_resume.style_tier,
            "generation run finalized"
        );
        Ok(final_resume)
    }

    /// One atomic unit: the job row and all requirement rows commit together
    /// or not at all. Requirements are bulk-inserted in chunks.
    async fn persist_job_and_requirements(
        &self,
        parsed: &ParsedJd,
        raw_text: &str,
    ) -> Result<(JobRow, Vec<RequirementRow>), PipelineError> {
        let now = Utc::now();
        let job = JobRow {
            id: Uuid::new_v4(),
            company: parsed.metadata.company.clone(),
            listing_job_title: parsed.metadata.listing_job_title.clone(),
            raw_text: raw_text.to_string(),
            role: parsed.metadata.role.as_str().to_string(),
            specialization: parsed.metadata.specialization.clone(),
            level: parsed.metadata.level.as_str().to_string(),
            location: parsed.metadata.location.clone(),
            work_setting: parsed.metadata.work_setting.as_str().to_string(),
            min_experience_years: parsed.metadata.min_experience_years.map(|y| y as i32),
            min_salary: parsed.metadata.min_salary,
            max_salary: parsed.metadata.max_salary,
            created_at: now,
        };

        let requirements: Vec<RequirementRow> = parsed
            .requirements
            .iter()
            .enumerate()
            .map(|(idx, req)| RequirementRow {
                id: Uuid::new_v4(),
                job_id: job.id,
                text: req.text.clone(),
                keywords: sqlx::types::Json(req.keywords.clone()),
                relevance: req.relevance,
                display_order: idx as i32,
                created_at: now,
            })
            .collect();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO jobs (id, company, listing_job_title, raw_text, role, specialization,
                              level, location, work_setting, min_experience_years, min_salary,
                              max_salary, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(job.id)
        .bind(&job.company)
        .bind(&job.listing_job_title)
        .bind(&job.raw_text)
        .bind(&job.role)
        .bind(&job.specialization)
        .bind(&job.level)
        .bind(&job.location)
        .bind(&job.work_setting)
        .bind(job.min_experience_years)
        .bind(job.min_salary)
        .bind(job.max_salary)
        .bind(job.created_at)
        .execute(&mut *tx)
        .await?;

        for chunk in requirements.chunks(REQUIREMENT_INSERT_BATCH) {
            let mut builder = QueryBuilder::new(
                "INSERT INTO requirements (id, job_id, text, keywords, relevance, display_order, created_at) ",
            );
            builder.push_values(chunk, |mut b, req| {
                b.push_bind(req.id)
                    .push_bind(req.job_id)
                    .push_bind(&req.text)
                    .push_bind(&req.keywords)
                    .push_bind(req.relevance)
                    .push_bind(req.display_order)
                    .push_bind(req.created_at);
            });
            builder.build().execute(&mut *tx).await?;
        }

        tx.commit().await?;
        info!(job_id = %job.id, requirements = requirements.len(), "persisted job and requirements");
        Ok((job, requirements))
    }

    async fn create_resume(
        &self,
        job: &JobRow,
        template: &TemplateRow,
        tier: StyleTier,
    ) -> Result<ResumeRow, PipelineError> {
        let resume = ResumeRow {
            id: Uuid::new_v4(),
            job_id: job.id,
            template_id: template.id,
            style_tier: tier.as_str().to_string(),
            pdf_path: None,
            unmet_requirements: String::new(),
            match_ratio: 0.0,
            created_at: Utc::now(),
        };

        sqlx::query(
            r#"
            INSERT INTO resumes (id, job_id, template_id, style_tier, pdf_path,
                                 unmet_requirements, match_ratio, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(resume.id)
        .bind(resume.job_id)
        .bind(resume.template_id)
        .bind(&resume.style_tier)
        .bind(&resume.pdf_path)
        .bind(&resume.unmet_requirements)
        .bind(resume.match_ratio)
        .bind(resume.created_at)
        .execute(self.pool)
        .await?;

        Ok(resume)
    }

    async fn load_role_configs(&self, template_id: Uuid) -> Result<Vec<RoleConfigRow>, PipelineError> {
        Ok(sqlx::query_as::<_, RoleConfigRow>(
            "SELECT * FROM template_role_configs WHERE template_id = $1 ORDER BY display_order",
        )
        .bind(template_id)
        .fetch_all(self.pool)
        .await?)
    }

    async fn load_experience_role(&self, id: Uuid) -> Result<ExperienceRoleRow, PipelineError> {
        Ok(sqlx::query_as::<_, ExperienceRoleRow>(
            "SELECT * FROM experience_roles WHERE id = $1",
        )
        .bind(id)
        .fetch_one(self.pool)
        .await?)
    }

    async fn load_projects(&self, role_id: Uuid) -> Result<Vec<ExperienceProjectRow>, PipelineError> {
        Ok(sqlx::query_as::<_, ExperienceProjectRow>(
            "SELECT * FROM experience_projects WHERE experience_role_id = $1 ORDER BY id",
        )
        .bind(role_id)
        .fetch_all(self.pool)
        .await?)
    }

    /// One generator call's output is persisted in full or not at all.
    async fn persist_role_content(
        &self,
        resume: &ResumeRow,
        config: &RoleConfigRow,
        role: &ExperienceRoleRow,
        title: &str,
        bullets: &[crate::pipeline::schemas::BulletItem],
    ) -> Result<(), PipelineError> {
        let now = Utc::now();
        let resume_role_id = Uuid::new_v4();

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO resume_roles (id, resume_id, source_role_id, title, display_order, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(resume_role_id)
        .bind(resume.id)
        .bind(role.id)
        .bind(title)
        .bind(config.display_order)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for bullet in bullets {
            sqlx::query(
                r#"
                INSERT INTO resume_bullets (id, resume_role_id, text, override_text, display_order, exclude, created_at)
                VALUES ($1, $2, $3, '', $4, FALSE, $5)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(resume_role_id)
            .bind(&bullet.text)
            .bind(bullet.order)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn persist_skills(
        &self,
        resume: &ResumeRow,
        categories: &[crate::pipeline::schemas::SkillCategoryItem],
    ) -> Result<(), PipelineError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for item in categories {
            sqlx::query(
                r#"
                INSERT INTO skill_categories (id, resume_id, display_order, category, skills_text, override_text, exclude, created_at)
                VALUES ($1, $2, $3, $4, $5, '', FALSE, $6)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(resume.id)
            .bind(item.order)
            .bind(&item.category)
            .bind(&item.skills)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn render_and_fit(
        &self,
        job: &JobRow,
        template: &TemplateRow,
        mut resume: ResumeRow,
        start_tier: StyleTier,
    ) -> Result<ResumeRow, PipelineError> {
        let template_markup = std::fs::read_to_string(&template.markup_path)?;

        let roles = sqlx::query_as::<_, ResumeRoleRow>(
            "SELECT * FROM resume_roles WHERE resume_id = $1 ORDER BY display_order",
        )
        .bind(resume.id)
        .fetch_all(self.pool)
        .await?;

        let mut roles_with_bullets: Vec<(ResumeRoleRow, Vec<ResumeBulletRow>)> = Vec::new();
        for role in roles {
            let bullets = sqlx::query_as::<_, ResumeBulletRow>(
                "SELECT * FROM resume_bullets WHERE resume_role_id = $1 AND exclude = FALSE ORDER BY display_order",
            )
            .bind(role.id)
            .fetch_all(self.pool)
            .await?;
            roles_with_bullets.push((role, bullets));
        }

        let skills = sqlx::query_as::<_, SkillCategoryRow>(
            "SELECT * FROM skill_categories WHERE resume_id = $1 AND exclude = FALSE ORDER BY display_order",
        )
        .bind(resume.id)
        .fetch_all(self.pool)
        .await?;

        let markup = assemble_markup(&template_markup, &roles_with_bullets, &skills)?;
        let outcome = fit_to_page(self.renderer, &markup, start_tier).await?;

        let pdf_path = self.write_pdf(job, &outcome.document.bytes)?;

        resume.style_tier = outcome.tier.as_str().to_string();
        resume.pdf_path = Some(pdf_path.to_string_lossy().into_owned());

        sqlx::query("UPDATE resumes SET style_tier = $1, pdf_path = $2 WHERE id = $3")
            .bind(&resume.style_tier)
            .bind(&resume.pdf_path)
            .bind(resume.id)
            .execute(self.pool)
            .await?;

        Ok(resume)
    }

    fn write_pdf(&self, job: &JobRow, bytes: &[u8]) -> Result<PathBuf, PipelineError> {
        std::fs::create_dir_all(self.output_dir)?;
        let path = self
            .output_dir
            .join(pdf_filename(&job.company, &job.listing_job_title));
        std::fs::write(&path, bytes)?;
        Ok(path)
    }

    async fn record_application(&self, job_id: Uuid) -> Result<(), PipelineError> {
        sqlx::query("INSERT INTO applications (id, job_id, applied_at) VALUES ($1, $2, $3)")
            .bind(Uuid::new_v4())
            .bind(job_id)
            .bind(Utc::now())
            .execute(self.pool)
            .await?;
        Ok(())
    }
}

/// Declared failures propagate unwrapped so callers can branch on them;
/// everything else gets the job label attached.
fn wrap_unexpected(job_label: &str, err: PipelineError) -> PipelineError {
    if err.is_declared() || matches!(err, PipelineError::OrchestrationFailed { .. }) {
        err
    } else {
        PipelineError::OrchestrationFailed {
            job: job_label.to_string(),
            source: anyhow::Error::new(err),
        }
    }
}
