//! Output Normalizer — extracts a JSON value from raw model text.
//!
//! Both modes share the truncation check as a fast-fail gate before any parse
//! attempt. Strict mode never repairs (used where a later stage must see the
//! raw truncation/malformed distinction); lenient mode attempts a
//! deterministic structural repair before giving up.

use serde_json::Value;

use crate::pipeline::error::PipelineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Parse or fail. No repair attempt.
    Strict,
    /// On parse failure, balance brackets/braces, drop trailing garbage, and
    /// re-parse once.
    Lenient,
}

/// Extracts a JSON value from raw model output.
///
/// Steps: strip code fences, trim, fail `OutputTruncated` unless the text ends
/// with `}` or `]`, then parse (with one repair attempt in lenient mode).
/// Pure function — no side effects.
pub fn normalize_output(text: &str, mode: NormalizeMode) -> Result<Value, PipelineError> {
    let cleaned = strip_code_fences(text);

    if !(cleaned.ends_with('}') || cleaned.ends_with(']')) {
        return Err(PipelineError::OutputTruncated);
    }

    match serde_json::from_str(&cleaned) {
        Ok(value) => Ok(value),
        Err(_) if mode == NormalizeMode::Lenient => repair_and_parse(&cleaned),
        Err(_) => Err(PipelineError::MalformedOutput { text: cleaned }),
    }
}

/// Removes ```json / ``` fence markers anywhere in the text and trims.
/// Models sometimes emit fences mid-response, so this is a global replace
/// rather than a prefix/suffix strip.
pub fn strip_code_fences(text: &str) -> String {
    text.replace("```json", "").replace("```", "").trim().to_string()
}

fn repair_and_parse(cleaned: &str) -> Result<Value, PipelineError> {
    let Some(start) = cleaned.find(['{', '[']) else {
        return Err(PipelineError::MalformedOutput {
            text: cleaned.to_string(),
        });
    };

    let repaired = repair_structure(&cleaned[start..]);

    serde_json::from_str(&repaired).map_err(|_| PipelineError::MalformedOutput {
        text: cleaned.to_string(),
    })
}

/// Deterministic bracket-balancing repair.
///
/// Scans outside string literals tracking open scopes. A closer that matches
/// the innermost scope closes it; a closer matching an outer scope closes the
/// intermediate scopes first; a closer matching nothing is dropped. Once the
/// outermost scope closes, the rest of the text is trailing garbage and is
/// discarded. Scopes still open at end-of-text are closed in reverse order.
fn repair_structure(slice: &str) -> String {
    let mut out = String::with_capacity(slice.len() + 4);
    let mut stack: Vec<char> = Vec::new();
    let mut in_string = false;
    let mut escaped = false;

    for c in slice.chars() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            '{' => {
                stack.push('}');
                out.push(c);
            }
            '[' => {
                stack.push(']');
                out.push(c);
            }
            '}' | ']' => {
                if stack.last() == Some(&c) {
                    stack.pop();
                    out.push(c);
                } else if stack.contains(&c) {
                    while let Some(top) = stack.pop() {
                        out.push(top);
                        if top == c {
                            break;
                        }
                    }
                }
                // else: stray closer, dropped
                if stack.is_empty() {
                    return out;
                }
            }
            _ => out.push(c),
        }
    }

    if in_string {
        out.push('"');
    }
    while let Some(top) = stack.pop() {
        out.push(top);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_object_parses_in_both_modes() {
        let text = r#"{"company": "Acme"}"#;
        for mode in [NormalizeMode::Strict, NormalizeMode::Lenient] {
            let value = normalize_output(text, mode).unwrap();
            assert_eq!(value, json!({"company": "Acme"}));
        }
    }

    #[test]
    fn test_fenced_json_is_unwrapped() {
        let text = "```json\n{\"company\": \"Acme\"}\n```";
        let value = normalize_output(text, NormalizeMode::Strict).unwrap();
        assert_eq!(value, json!({"company": "Acme"}));
    }

    #[test]
    fn test_truncated_output_rejected_regardless_of_content() {
        let text = r#"{"company": "Acme", "listing_job_title": "Eng"#;
        let err = normalize_output(text, NormalizeMode::Lenient).unwrap_err();
        assert!(matches!(err, PipelineError::OutputTruncated));
    }

    #[test]
    fn test_plain_prose_not_ending_in_brace_is_truncated() {
        let err = normalize_output("Sorry, I cannot help with that.", NormalizeMode::Strict)
            .unwrap_err();
        assert!(matches!(err, PipelineError::OutputTruncated));
    }

    #[test]
    fn test_strict_mode_never_repairs() {
        // Ends with } so it passes the truncation gate, but the array is
        // never closed — strict must report malformed, not repair.
        let text = r#"{"bullets": [1, 2}"#;
        let err = normalize_output(text, NormalizeMode::Strict).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedOutput { .. }));
    }

    #[test]
    fn test_lenient_mode_balances_missing_array_closer() {
        let text = r#"{"bullets": [1, 2}"#;
        let value = normalize_output(text, NormalizeMode::Lenient).unwrap();
        assert_eq!(value, json!({"bullets": [1, 2]}));
    }

    #[test]
    fn test_lenient_mode_drops_trailing_garbage() {
        let text = r#"{"order": 1} and that concludes the list]"#;
        let value = normalize_output(text, NormalizeMode::Lenient).unwrap();
        assert_eq!(value, json!({"order": 1}));
    }

    #[test]
    fn test_lenient_mode_drops_leading_prose() {
        let text = r#"Here is the JSON: {"order": 1}"#;
        let value = normalize_output(text, NormalizeMode::Lenient).unwrap();
        assert_eq!(value, json!({"order": 1}));
    }

    #[test]
    fn test_brackets_inside_strings_are_not_structural() {
        let text = r#"{"text": "arrays [like this] and braces {too}"}"#;
        let value = normalize_output(text, NormalizeMode::Lenient).unwrap();
        assert_eq!(
            value["text"],
            json!("arrays [like this] and braces {too}")
        );
    }

    #[test]
    fn test_unrepairable_output_is_malformed_with_text() {
        let text = r#"{"a": 1,,}"#;
        let err = normalize_output(text, NormalizeMode::Lenient).unwrap_err();
        match err {
            PipelineError::MalformedOutput { text } => assert!(text.contains(",,")),
            other => panic!("expected MalformedOutput, got {other:?}"),
        }
    }

    #[test]
    fn test_array_response_accepted() {
        let text = r#"[{"order": 1}, {"order": 2}]"#;
        let value = normalize_output(text, NormalizeMode::Strict).unwrap();
        assert!(value.is_array());
    }
}
