//! Template Resolver — picks the one template configured for a target
//! (role, level, specialization) triple.

use sqlx::PgPool;
use tracing::info;

use crate::models::template::{TargetSpecialization, TemplateRow};
use crate::pipeline::error::PipelineError;

/// Normalizes a specialization string for membership checks: alphabetic
/// characters only, lowercased. "Full -Stack" and "full_stack" both become
/// "fullstack".
pub fn normalize_specialization(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

/// Selects a template from the candidates stored for one (role, level) pair.
///
/// A recognized specialization requires an exact specialized template; an
/// unrecognized or absent one falls back to the specialization-free template.
/// Candidate specializations are compared by normalized key, so stored
/// cosmetic variants still match.
pub fn select_template(
    candidates: Vec<TemplateRow>,
    role: &str,
    level: &str,
    specialization: Option<&str>,
) -> Result<TemplateRow, PipelineError> {
    let recognized = specialization
        .map(normalize_specialization)
        .and_then(|key| TargetSpecialization::from_normalized(&key));

    match recognized {
        Some(spec) => candidates
            .into_iter()
            .find(|t| {
                t.target_specialization
                    .as_deref()
                    .map(normalize_specialization)
                    .as_deref()
                    == Some(spec.normalized_key())
            })
            .ok_or_else(|| PipelineError::NoTemplateFound {
                role: role.to_string(),
                level: level.to_string(),
                specialization: specialization.map(str::to_string),
            }),
        None => candidates
            .into_iter()
            .find(|t| t.target_specialization.is_none())
            .ok_or_else(|| PipelineError::NoTemplateFound {
                role: role.to_string(),
                level: level.to_string(),
                specialization: None,
            }),
    }
}

/// Loads the stored candidates for (role, level) and selects among them.
pub async fn resolve_template(
    pool: &PgPool,
    role: &str,
    level: &str,
    specialization: Option<&str>,
) -> Result<TemplateRow, PipelineError> {
    let candidates = sqlx::query_as::<_, TemplateRow>(
        r#"
        SELECT id, target_role, target_level, target_specialization,
               markup_path, style_tier, max_skill_categories, created_at
        FROM resume_templates
        WHERE target_role = $1 AND target_level = $2
        "#,
    )
    .bind(role)
    .bind(level)
    .fetch_all(pool)
    .await?;

    let template = select_template(candidates, role, level, specialization)?;
    info!(template_id = %template.id, role, level, "resolved template");
    Ok(template)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn template(specialization: Option<&str>) -> TemplateRow {
        TemplateRow {
            id: Uuid::new_v4(),
            target_role: "Software Engineer".to_string(),
            target_level: "Senior".to_string(),
            target_specialization: specialization.map(str::to_string),
            markup_path: "templates/swe_senior.html".to_string(),
            style_tier: "standard".to_string(),
            max_skill_categories: 5,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_normalization_strips_punctuation_and_case() {
        assert_eq!(normalize_specialization("full -Stack"), "fullstack");
        assert_eq!(normalize_specialization("FULL_STACK"), "fullstack");
        assert_eq!(normalize_specialization("Data Platform"), "dataplatform");
    }

    #[test]
    fn test_irregular_specialization_resolves_to_specialized_template() {
        let specialized = template(Some("Full Stack"));
        let wanted = specialized.id;
        let result = select_template(
            vec![template(None), specialized],
            "Software Engineer",
            "Senior",
            Some("full -Stack"),
        )
        .unwrap();
        assert_eq!(result.id, wanted);
    }

    #[test]
    fn test_no_specialization_prefers_null_template() {
        let fallback = template(None);
        let wanted = fallback.id;
        let result = select_template(
            vec![template(Some("Backend")), fallback],
            "Software Engineer",
            "Senior",
            None,
        )
        .unwrap();
        assert_eq!(result.id, wanted);
    }

    #[test]
    fn test_unrecognized_specialization_falls_back_to_null_template() {
        let fallback = template(None);
        let wanted = fallback.id;
        let result = select_template(
            vec![template(Some("Backend")), fallback],
            "Software Engineer",
            "Senior",
            Some("Embedded Systems"),
        )
        .unwrap();
        assert_eq!(result.id, wanted);
    }

    #[test]
    fn test_recognized_specialization_without_template_names_all_dimensions() {
        let err = select_template(
            vec![template(None)],
            "Software Engineer",
            "Senior",
            Some("Backend"),
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Software Engineer"));
        assert!(message.contains("Senior"));
        assert!(message.contains("Backend"));
    }

    #[test]
    fn test_missing_fallback_template_fails_without_specialization() {
        let err = select_template(
            vec![template(Some("Backend"))],
            "Software Engineer",
            "Senior",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::NoTemplateFound { specialization: None, .. }));
    }

    #[test]
    fn test_stored_variant_of_specialization_still_matches() {
        let stored = template(Some("full-stack"));
        let wanted = stored.id;
        let result = select_template(
            vec![stored],
            "Software Engineer",
            "Senior",
            Some("Full Stack"),
        )
        .unwrap();
        assert_eq!(result.id, wanted);
    }
}
