//! Requirement Extractor — turns raw job-description text into validated
//! metadata plus an ordered requirement list.

use std::path::Path;

use tracing::info;

use crate::llm::LanguageModel;
use crate::pipeline::error::PipelineError;
use crate::pipeline::normalize::{normalize_output, NormalizeMode};
use crate::pipeline::prompt::fill_placeholders;
use crate::pipeline::prompts;
use crate::pipeline::schemas::ParsedJd;
use crate::pipeline::validate::validate_schema;

const PARSE_JD_MAX_TOKENS: u32 = 4000;

/// Resolves the job-description content from the two input channels.
///
/// `text` wins when it carries non-blank content; otherwise the source file is
/// read. Neither present is `MissingInput`.
pub async fn read_jd_content(
    source: Option<&Path>,
    text: Option<&str>,
) -> Result<String, PipelineError> {
    match (text, source) {
        (Some(t), _) if !t.trim().is_empty() => Ok(t.to_string()),
        (_, Some(path)) => Ok(tokio::fs::read_to_string(path).await?),
        _ => Err(PipelineError::MissingInput),
    }
}

/// Parses a job description into structured metadata and requirements.
///
/// Exactly one of `source` or `text` must carry content; `text` wins when both
/// are given. Requirement order is whatever sequence the model returned.
pub async fn parse_jd(
    llm: &dyn LanguageModel,
    source: Option<&Path>,
    text: Option<&str>,
) -> Result<ParsedJd, PipelineError> {
    let jd_content = read_jd_content(source, text).await?;

    let prompt = fill_placeholders(prompts::PARSE_JD, &[("JOB_DESCRIPTION", &jd_content)])?;
    let response = llm.generate(&prompt, PARSE_JD_MAX_TOKENS).await?;

    let value = normalize_output(&response, NormalizeMode::Strict)?;
    let parsed: ParsedJd = validate_schema(value)?;

    info!(
        company = %parsed.metadata.company,
        title = %parsed.metadata.listing_job_title,
        requirements = parsed.requirements.len(),
        "parsed job description"
    );
    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::test_support::ScriptedLlm;
    use std::io::Write;

    fn jd_response() -> String {
        serde_json::json!({
            "metadata": {
                "company": "Acme",
                "listing_job_title": "Backend Engineer II",
                "role": "Software Engineer",
                "specialization": "Backend",
                "level": "II",
                "location": null,
                "work_setting": "Hybrid",
                "min_experience_years": 3,
                "min_salary": null,
                "max_salary": null
            },
            "requirements": [
                {"text": "Rust in production", "keywords": ["Rust"], "relevance": 0.95},
                {"text": "Postgres experience", "keywords": ["PostgreSQL"], "relevance": 0.8}
            ]
        })
        .to_string()
    }

    #[tokio::test]
    async fn test_missing_both_inputs_fails_fast() {
        let llm = ScriptedLlm::new(vec![]);
        let err = parse_jd(&llm, None, None).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_blank_text_without_source_fails_fast() {
        let llm = ScriptedLlm::new(vec![]);
        let err = parse_jd(&llm, None, Some("   ")).await.unwrap_err();
        assert!(matches!(err, PipelineError::MissingInput));
    }

    #[tokio::test]
    async fn test_parses_raw_text_and_preserves_order() {
        let llm = ScriptedLlm::new(vec![jd_response()]);
        let parsed = parse_jd(&llm, None, Some("We need a backend engineer..."))
            .await
            .unwrap();
        assert_eq!(parsed.metadata.company, "Acme");
        assert_eq!(parsed.requirements[0].text, "Rust in production");
        assert_eq!(parsed.requirements[1].text, "Postgres experience");
    }

    #[tokio::test]
    async fn test_reads_description_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "Looking for a Backend Engineer II at Acme.").unwrap();

        let llm = ScriptedLlm::new(vec![jd_response()]);
        let parsed = parse_jd(&llm, Some(file.path()), None).await.unwrap();
        assert_eq!(parsed.metadata.listing_job_title, "Backend Engineer II");
        assert!(llm.last_prompt().contains("Looking for a Backend Engineer II"));
    }

    #[tokio::test]
    async fn test_truncated_response_is_not_repaired() {
        let llm = ScriptedLlm::new(vec![r#"{"metadata": {"company": "Acme""#.to_string()]);
        let err = parse_jd(&llm, None, Some("jd text")).await.unwrap_err();
        assert!(matches!(err, PipelineError::OutputTruncated));
    }
}
