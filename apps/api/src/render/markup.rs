//! Assembles a template's markup from a resume's content rows.
//!
//! Templates carry `{{first_role_bullets}}` .. `{{sixth_role_bullets}}`
//! placeholders (then `{{role_7_bullets}}` and up) plus `{{skills}}`; the
//! orchestrator fills them with rendered HTML fragments before handing the
//! markup to the renderer.

use crate::models::resume::{ResumeBulletRow, ResumeRoleRow, SkillCategoryRow};
use crate::pipeline::error::PipelineError;
use crate::pipeline::prompt::fill_placeholders;

const ORDINALS: [&str; 6] = ["first", "second", "third", "fourth", "fifth", "sixth"];

/// Placeholder name for the role at display position `idx` (zero-based).
pub fn role_placeholder(idx: usize) -> String {
    match ORDINALS.get(idx) {
        Some(ordinal) => format!("{ordinal}_role_bullets"),
        None => format!("role_{}_bullets", idx + 1),
    }
}

/// `<li>` fragment for one role's non-excluded bullets, in display order.
pub fn render_role_bullets(bullets: &[ResumeBulletRow]) -> String {
    bullets
        .iter()
        .filter(|b| !b.exclude)
        .map(|b| format!("<li>{}</li>", b.display_text()))
        .collect::<Vec<_>>()
        .join("\n        ")
}

/// `<div>` fragment for the non-excluded skill categories, in display order.
pub fn render_skills(categories: &[SkillCategoryRow]) -> String {
    categories
        .iter()
        .filter(|c| !c.exclude)
        .map(|c| {
            format!(
                r#"<div class="skill-category"><strong>{}:</strong> {}</div>"#,
                c.category,
                c.display_text()
            )
        })
        .collect::<Vec<_>>()
        .join("\n                    ")
}

/// Fills the template markup with per-role bullet fragments and the skills
/// fragment. Roles must be in display order with their bullets attached.
pub fn assemble_markup(
    template_markup: &str,
    roles: &[(ResumeRoleRow, Vec<ResumeBulletRow>)],
    skills: &[SkillCategoryRow],
) -> Result<String, PipelineError> {
    let mut replacements: Vec<(String, String)> = roles
        .iter()
        .enumerate()
        .map(|(idx, (_, bullets))| (role_placeholder(idx), render_role_bullets(bullets)))
        .collect();
    replacements.push(("skills".to_string(), render_skills(skills)));

    let borrowed: Vec<(&str, &str)> = replacements
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    fill_placeholders(template_markup, &borrowed)
}

/// `Company_Title.pdf`, keeping only alphanumerics, `_` and `-`.
pub fn pdf_filename(company: &str, title: &str) -> String {
    format!("{}_{}.pdf", sanitize(company), sanitize(title))
}

fn sanitize(text: &str) -> String {
    text.replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn bullet(text: &str, exclude: bool) -> ResumeBulletRow {
        ResumeBulletRow {
            id: Uuid::new_v4(),
            resume_role_id: Uuid::new_v4(),
            text: text.to_string(),
            override_text: String::new(),
            display_order: 1,
            exclude,
            created_at: Utc::now(),
        }
    }

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

    fn category(name: &str, skills: &str) -> SkillCategoryRow {
        SkillCategoryRow {
            id: Uuid::new_v4(),
            resume_id: Uuid::new_v4(),
            display_order: 1,
            category: name.to_string(),
            skills_text: skills.to_string(),
            override_text: String::new(),
            exclude: false,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_role_placeholders_switch_to_numbered_after_sixth() {
        assert_eq!(role_placeholder(0), "first_role_bullets");
        assert_eq!(role_placeholder(5), "sixth_role_bullets");
        assert_eq!(role_placeholder(6), "role_7_bullets");
    }

    #[test]
    fn test_excluded_bullets_are_not_rendered() {
        let html = render_role_bullets(&[
            bullet("Shipped the thing", false),
            bullet("Hidden achievement", true),
        ]);
        assert_eq!(html, "<li>Shipped the thing</li>");
    }

    #[test]
    fn test_skills_render_as_category_divs() {
        let html = render_skills(&[category("Languages", "Rust, SQL")]);
        assert_eq!(
            html,
            r#"<div class="skill-category"><strong>Languages:</strong> Rust, SQL</div>"#
        );
    }

    #[test]
    fn test_assembles_full_markup() {
        let template = "<ul>{{first_role_bullets}}</ul><section>{{skills}}</section>";
        let markup = assemble_markup(
            template,
            &[(role("Engineer", 1), vec![bullet("Did the work", false)])],
            &[category("Languages", "Rust")],
        )
        .unwrap();
        assert!(markup.contains("<li>Did the work</li>"));
        assert!(markup.contains("<strong>Languages:</strong> Rust"));
    }

    #[test]
    fn test_markup_missing_role_placeholder_is_contract_violation() {
        let err = assemble_markup(
            "<section>{{skills}}</section>",
            &[(role("Engineer", 1), vec![])],
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, PipelineError::UnresolvedPlaceholder { .. }));
    }

    #[test]
    fn test_pdf_filename_is_sanitized() {
        assert_eq!(
            pdf_filename("Acme, Inc.", "Senior Engineer (L5)"),
            "Acme_Inc_Senior_Engineer_L5.pdf"
        );
    }
}
