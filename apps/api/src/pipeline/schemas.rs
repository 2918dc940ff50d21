//! Declared record shapes consumed by the schema validator.
//!
//! These mirror the JSON the prompts instruct the model to return. All shapes
//! are closed (`deny_unknown_fields`); bounds live in the `Validate` impls so
//! violations carry field paths.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::models::job::{JobLevel, JobRole, WorkSetting};
use crate::pipeline::error::{FieldError, PipelineError};
use crate::pipeline::validate::{check_length, check_non_negative, check_range_f64, Validate};

// ────────────────────────────────────────────────────────────────────────────
// JD extraction: {Metadata, Requirement[]}
// ────────────────────────────────────────────────────────────────────────────

/// Structured job metadata extracted from a description. Immutable once the
/// job row is created.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Metadata {
    pub company: String,
    pub listing_job_title: String,
    pub role: JobRole,
    #[serde(default)]
    pub specialization: Option<String>,
    pub level: JobLevel,
    #[serde(default)]
    pub location: Option<String>,
    pub work_setting: WorkSetting,
    #[serde(default)]
    pub min_experience_years: Option<i64>,
    #[serde(default)]
    pub min_salary: Option<i64>,
    #[serde(default)]
    pub max_salary: Option<i64>,
}

impl Validate for Metadata {
    fn validate(&mut self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        self.company = self.company.trim().to_string();
        self.listing_job_title = self.listing_job_title.trim().to_string();
        if self.company.is_empty() {
            errors.push(FieldError::new("company", "must not be empty"));
        }
        if self.listing_job_title.is_empty() {
            errors.push(FieldError::new("listing_job_title", "must not be empty"));
        }
        check_non_negative(&mut errors, "min_experience_years", self.min_experience_years);
        check_non_negative(&mut errors, "min_salary", self.min_salary);
        check_non_negative(&mut errors, "max_salary", self.max_salary);
        if let (Some(min), Some(max)) = (self.min_salary, self.max_salary) {
            if min > max {
                errors.push(FieldError::new(
                    "min_salary",
                    format!("must be <= max_salary ({min} > {max})"),
                ));
            }
        }
        errors
    }
}

/// One weighted requirement. Order is not part of the shape — it is taken
/// verbatim from the returned sequence index.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RequirementRecord {
    pub text: String,
    pub keywords: Vec<String>,
    pub relevance: f64,
}

/// Full JD extraction result.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParsedJd {
    pub metadata: Metadata,
    pub requirements: Vec<RequirementRecord>,
}

impl Validate for ParsedJd {
    fn validate(&mut self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for err in self.metadata.validate() {
            errors.push(FieldError::new(format!("metadata.{}", err.path), err.reason));
        }
        for (i, req) in self.requirements.iter_mut().enumerate() {
            req.text = req.text.trim().to_string();
            if req.text.is_empty() {
                errors.push(FieldError::new(
                    format!("requirements[{i}].text"),
                    "must not be empty",
                ));
            }
            check_range_f64(
                &mut errors,
                format!("requirements[{i}].relevance"),
                req.relevance,
                0.0,
                1.0,
            );
        }
        errors
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Experience bullets
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulletItem {
    /// Priority ranking, starting from 1.
    pub order: i32,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BulletList {
    pub bullets: Vec<BulletItem>,
}

impl Validate for BulletList {
    fn validate(&mut self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.bullets.is_empty() {
            errors.push(FieldError::new("bullets", "must contain at least one bullet"));
        }
        let mut seen_orders = HashSet::new();
        for (i, bullet) in self.bullets.iter_mut().enumerate() {
            bullet.text = bullet.text.trim().to_string();
            if bullet.order < 1 {
                errors.push(FieldError::new(
                    format!("bullets[{i}].order"),
                    format!("must be >= 1, got {}", bullet.order),
                ));
            } else if !seen_orders.insert(bullet.order) {
                errors.push(FieldError::new(
                    format!("bullets[{i}].order"),
                    format!("duplicates order {}", bullet.order),
                ));
            }
            check_length(&mut errors, format!("bullets[{i}].text"), &bullet.text, 20, 500);
        }
        errors
    }
}

impl BulletList {
    /// Business rule, checked only after schema validation succeeds: the
    /// returned bullet count must not exceed the role config's budget.
    pub fn validate_max_count(&self, max_bullet_count: i32) -> Result<(), PipelineError> {
        if self.bullets.len() as i32 > max_bullet_count {
            return Err(PipelineError::TooManyItems {
                kind: "bullets",
                returned: self.bullets.len(),
                max: max_bullet_count,
            });
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skill categories
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillCategoryItem {
    /// Priority ranking, starting from 1.
    pub order: i32,
    /// Category label (e.g. "Programming Languages").
    pub category: String,
    /// Comma-separated list of technical skills.
    pub skills: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SkillCategoryList {
    pub skill_categories: Vec<SkillCategoryItem>,
}

impl Validate for SkillCategoryList {
    fn validate(&mut self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if self.skill_categories.is_empty() {
            errors.push(FieldError::new(
                "skill_categories",
                "must contain at least one skill category",
            ));
        }
        let mut seen_orders = HashSet::new();
        for (i, item) in self.skill_categories.iter_mut().enumerate() {
            item.category = item.category.trim().to_string();
            item.skills = item.skills.trim().to_string();
            if item.order < 1 {
                errors.push(FieldError::new(
                    format!("skill_categories[{i}].order"),
                    format!("must be >= 1, got {}", item.order),
                ));
            } else if !seen_orders.insert(item.order) {
                errors.push(FieldError::new(
                    format!("skill_categories[{i}].order"),
                    format!("duplicates order {}", item.order),
                ));
            }
            check_length(
                &mut errors,
                format!("skill_categories[{i}].category"),
                &item.category,
                3,
                100,
            );
            check_length(
                &mut errors,
                format!("skill_categories[{i}].skills"),
                &item.skills,
                2,
                500,
            );
        }
        errors
    }
}

impl SkillCategoryList {
    pub fn validate_max_count(&self, max_category_count: i32) -> Result<(), PipelineError> {
        if self.skill_categories.len() as i32 > max_category_count {
            return Err(PipelineError::TooManyItems {
                kind: "skill categories",
                returned: self.skill_categories.len(),
                max: max_category_count,
            });
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Interview preparation
// ────────────────────────────────────────────────────────────────────────────

/// Base interview-prep content: markdown sections persisted verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InterviewPrep {
    pub formatted_jd: String,
    pub company_context: String,
    pub primary_drivers: String,
    pub background_narrative: String,
}

impl Validate for InterviewPrep {
    fn validate(&mut self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for (path, field) in [
            ("formatted_jd", &mut self.formatted_jd),
            ("company_context", &mut self.company_context),
            ("primary_drivers", &mut self.primary_drivers),
            ("background_narrative", &mut self.background_narrative),
        ] {
            *field = field.trim().to_string();
            if field.is_empty() {
                errors.push(FieldError::new(path, "must not be empty"));
            }
        }
        errors
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Match evaluation
// ────────────────────────────────────────────────────────────────────────────

/// Transient match-evaluation result; persisted only by copy into a resume row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchResult {
    /// CSV string of requirement keywords not covered by the resume.
    pub unmet_requirements: String,
    /// Fraction of requirements met, rounded to two decimals on validation.
    pub match_ratio: f64,
}

impl Validate for MatchResult {
    fn validate(&mut self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        self.unmet_requirements = self.unmet_requirements.trim().to_string();
        check_range_f64(&mut errors, "match_ratio", self.match_ratio, 0.0, 1.0);
        if errors.is_empty() {
            self.match_ratio = (self.match_ratio * 100.0).round() / 100.0;
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::validate::validate_schema;
    use serde_json::json;

    fn valid_jd() -> serde_json::Value {
        json!({
            "metadata": {
                "company": "Acme",
                "listing_job_title": "Senior Software Engineer",
                "role": "Software Engineer",
                "specialization": "Backend",
                "level": "Senior",
                "location": "Seattle, WA",
                "work_setting": "Remote",
                "min_experience_years": 5,
                "min_salary": 150_000,
                "max_salary": 200_000
            },
            "requirements": [
                {"text": "Strong Python skills", "keywords": ["Python"], "relevance": 0.9},
                {"text": "Cloud experience", "keywords": ["AWS", "GCP"], "relevance": 0.7}
            ]
        })
    }

    #[test]
    fn test_valid_jd_round_trips_unchanged() {
        let parsed: ParsedJd = validate_schema(valid_jd()).unwrap();
        let round_tripped = serde_json::to_value(&parsed).unwrap();
        assert_eq!(round_tripped, valid_jd());
    }

    #[test]
    fn test_relevance_out_of_range_reports_indexed_path() {
        let mut value = valid_jd();
        value["requirements"][1]["relevance"] = json!(1.2);
        let err = validate_schema::<ParsedJd>(value).unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors[0].path, "requirements[1].relevance");
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_inverted_salary_bounds_rejected() {
        let mut value = valid_jd();
        value["metadata"]["min_salary"] = json!(250_000);
        let err = validate_schema::<ParsedJd>(value).unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors[0].path, "metadata.min_salary");
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_unknown_metadata_field_rejected() {
        let mut value = valid_jd();
        value["metadata"]["recruiter_email"] = json!("a@b.c");
        assert!(validate_schema::<ParsedJd>(value).is_err());
    }

    #[test]
    fn test_empty_keyword_list_is_allowed() {
        let mut value = valid_jd();
        value["requirements"][0]["keywords"] = json!([]);
        assert!(validate_schema::<ParsedJd>(value).is_ok());
    }

    #[test]
    fn test_bullet_text_length_bounds() {
        let err = validate_schema::<BulletList>(json!({
            "bullets": [{"order": 1, "text": "too short"}]
        }))
        .unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors[0].path, "bullets[0].text");
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_bullet_list_rejected() {
        let err = validate_schema::<BulletList>(json!({"bullets": []})).unwrap_err();
        assert!(matches!(err, PipelineError::SchemaValidationFailed { .. }));
    }

    #[test]
    fn test_max_count_exceeded_names_both_counts() {
        let list: BulletList = validate_schema(json!({
            "bullets": (1..=5).map(|i| json!({
                "order": i,
                "text": format!("Did a meaningful, measurable thing number {i}")
            })).collect::<Vec<_>>()
        }))
        .unwrap();

        let err = list.validate_max_count(2).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("5 bullets"), "{message}");
        assert!(message.contains("maximum allowed is 2"), "{message}");
    }

    #[test]
    fn test_max_count_at_limit_passes() {
        let list: BulletList = validate_schema(json!({
            "bullets": [
                {"order": 1, "text": "Shipped a search relevance overhaul"},
                {"order": 2, "text": "Cut ETL pipeline runtime by eighty percent"}
            ]
        }))
        .unwrap();
        assert!(list.validate_max_count(2).is_ok());
    }

    #[test]
    fn test_duplicate_bullet_orders_rejected() {
        let err = validate_schema::<BulletList>(json!({
            "bullets": [
                {"order": 1, "text": "Shipped a search relevance overhaul"},
                {"order": 1, "text": "Cut ETL pipeline runtime by eighty percent"}
            ]
        }))
        .unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors[0].path, "bullets[1].order");
                assert!(errors[0].reason.contains("duplicates order 1"));
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_skill_category_orders_rejected() {
        let err = validate_schema::<SkillCategoryList>(json!({
            "skill_categories": [
                {"order": 2, "category": "Languages", "skills": "Rust, SQL"},
                {"order": 2, "category": "Data Stores", "skills": "Postgres, Redis"}
            ]
        }))
        .unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors[0].path, "skill_categories[1].order");
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_interview_prep_sections_must_be_non_empty() {
        let err = validate_schema::<InterviewPrep>(json!({
            "formatted_jd": "## Requirements\n- Rust",
            "company_context": "   ",
            "primary_drivers": "Latency and reliability work",
            "background_narrative": "Five years of backend systems"
        }))
        .unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors[0].path, "company_context");
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_skill_category_bounds() {
        let err = validate_schema::<SkillCategoryList>(json!({
            "skill_categories": [{"order": 0, "category": "ML", "skills": "x"}]
        }))
        .unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();
                assert!(paths.contains(&"skill_categories[0].order"));
                assert!(paths.contains(&"skill_categories[0].category"));
                assert!(paths.contains(&"skill_categories[0].skills"));
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_match_ratio_rounded_to_two_decimals() {
        let result: MatchResult = validate_schema(json!({
            "unmet_requirements": " Go, Ruby on Rails ",
            "match_ratio": 0.666_666
        }))
        .unwrap();
        assert_eq!(result.match_ratio, 0.67);
        assert_eq!(result.unmet_requirements, "Go, Ruby on Rails");
    }

    #[test]
    fn test_match_ratio_out_of_range_rejected() {
        let err = validate_schema::<MatchResult>(json!({
            "unmet_requirements": "",
            "match_ratio": 1.01
        }))
        .unwrap_err();
        assert!(matches!(err, PipelineError::SchemaValidationFailed { .. }));
    }
}
