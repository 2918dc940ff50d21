//! Content Generators — experience bullets per role, skill categories per
//! resume.
//!
//! Both generators share the same contract: assemble a prompt from the
//! requirement list plus generator-specific context, call the model, normalize
//! leniently (bare list responses are re-wrapped under the expected key),
//! validate the item-list shape, then enforce the item-count budget.

use serde_json::Value;
use tracing::info;

use crate::llm::LanguageModel;
use crate::models::experience::{ExperienceProjectRow, ExperienceRoleRow};
use crate::models::job::RequirementRow;
use crate::pipeline::error::PipelineError;
use crate::pipeline::normalize::{normalize_output, NormalizeMode};
use crate::pipeline::prompt::fill_placeholders;
use crate::pipeline::prompts;
use crate::pipeline::schemas::{BulletList, SkillCategoryList};
use crate::pipeline::validate::validate_schema;

const BULLETS_MAX_TOKENS: u32 = 4000;
const SKILLS_MAX_TOKENS: u32 = 2000;

/// Generates experience bullets for one past role, tailored to the job's
/// requirements. At least one project must exist for the role.
pub async fn generate_experience_bullets(
    llm: &dyn LanguageModel,
    role: &ExperienceRoleRow,
    projects: &[ExperienceProjectRow],
    requirements: &[RequirementRow],
    target_role: &str,
    max_bullet_count: i32,
) -> Result<BulletList, PipelineError> {
    if projects.is_empty() {
        return Err(PipelineError::NoSourceMaterial(format!(
            "no experience projects recorded for role '{}'",
            role.key
        )));
    }

    let prompt = fill_placeholders(
        prompts::GENERATE_EXPERIENCE_BULLETS,
        &[
            ("MAX_BULLET_COUNT", &max_bullet_count.to_string()),
            ("TARGET_ROLE", target_role),
            ("REQUIREMENTS", &format_requirements(requirements)),
            ("EXPERIENCE_PROJECTS", &format_projects(projects)),
        ],
    )?;

    let response = llm.generate(&prompt, BULLETS_MAX_TOKENS).await?;
    let value = rewrap_list(normalize_output(&response, NormalizeMode::Lenient)?, "bullets");
    let bullets: BulletList = validate_schema(value)?;
    bullets.validate_max_count(max_bullet_count)?;

    info!(
        role = %role.key,
        bullets = bullets.bullets.len(),
        "generated experience bullets"
    );
    Ok(bullets)
}

/// Generates skill categories from the deduplicated tool vocabulary across all
/// of the template's configured roles. The vocabulary must be non-empty.
pub async fn generate_skills(
    llm: &dyn LanguageModel,
    vocabulary: &[String],
    requirements: &[RequirementRow],
    target_role: &str,
    max_category_count: i32,
) -> Result<SkillCategoryList, PipelineError> {
    if vocabulary.is_empty() {
        return Err(PipelineError::NoSourceMaterial(
            "no tools recorded across the template's configured roles".to_string(),
        ));
    }

    let prompt = fill_placeholders(
        prompts::GENERATE_SKILLS,
        &[
            ("MAX_CATEGORY_COUNT", &max_category_count.to_string()),
            ("TARGET_ROLE", target_role),
            ("REQUIREMENTS", &format_keywords(requirements)),
            ("TOOL_VOCABULARY", &vocabulary.join(", ")),
        ],
    )?;

    let response = llm.generate(&prompt, SKILLS_MAX_TOKENS).await?;
    let value = rewrap_list(
        normalize_output(&response, NormalizeMode::Lenient)?,
        "skill_categories",
    );
    let skills: SkillCategoryList = validate_schema(value)?;
    skills.validate_max_count(max_category_count)?;

    info!(
        categories = skills.skill_categories.len(),
        "generated skill categories"
    );
    Ok(skills)
}

/// A bare list response is accepted by wrapping it under the expected key.
fn rewrap_list(value: Value, key: &str) -> Value {
    if value.is_array() {
        serde_json::json!({ key: value })
    } else {
        value
    }
}

/// Numbered requirement lines with relevance percentages and keyword sets:
/// `1. [85%] text (Keywords: a, b)`. Requirements without keywords omit the
/// parenthetical.
pub fn format_requirements(requirements: &[RequirementRow]) -> String {
    requirements
        .iter()
        .enumerate()
        .map(|(idx, req)| {
            let relevance_pct = (req.relevance * 100.0) as i32;
            let mut line = format!("{}. [{}%] {}", idx + 1, relevance_pct, req.text);
            if !req.keywords.0.is_empty() {
                line.push_str(&format!(" (Keywords: {})", req.keywords.0.join(", ")));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Comma-joined unique keywords across all requirements.
fn format_keywords(requirements: &[RequirementRow]) -> String {
    let all: Vec<String> = requirements
        .iter()
        .flat_map(|r| r.keywords.0.iter().cloned())
        .collect();
    let unique = dedupe_case_insensitive(all);
    if unique.is_empty() {
        "No specific keywords provided".to_string()
    } else {
        unique.join(", ")
    }
}

/// Removes case-insensitive duplicates, keeping first-occurrence casing and
/// order.
pub fn dedupe_case_insensitive(items: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}

/// Union of every project's tools across the given projects, deduplicated.
pub fn collect_tool_vocabulary(projects: &[ExperienceProjectRow]) -> Vec<String> {
    let all: Vec<String> = projects.iter().flat_map(|p| p.tools_list()).collect();
    dedupe_case_insensitive(all)
}

fn format_projects(projects: &[ExperienceProjectRow]) -> String {
    projects
        .iter()
        .map(|p| {
            format!(
                "**{}**\n- Problem: {}\n- Actions: {}\n- Tools: {}\n- Outcomes: {}\n- Impact Area: {}",
                p.short_name, p.problem_context, p.actions, p.tools, p.outcomes, p.impact_area
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}
