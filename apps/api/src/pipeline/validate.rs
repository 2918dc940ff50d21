//! Schema Validator — turns a normalized JSON value into a validated, typed
//! record.
//!
//! Deserialization handles shape (closed shapes use `deny_unknown_fields`);
//! the `Validate` pass then collects every field-level bound violation as a
//! `(path, reason)` pair. Violations are reported as a list, never a single
//! opaque message.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::pipeline::error::{FieldError, PipelineError};

/// Field-level validation for a deserialized record. Implementations may also
/// normalize in place (trim strings, round ratios) the way the declared shape
/// demands.
pub trait Validate {
    fn validate(&mut self) -> Vec<FieldError>;
}

/// Validates a normalized value against a declared record shape.
///
/// Structural failures (missing/unknown fields, wrong types) surface as a
/// single root-path entry; bound violations surface one entry per field.
pub fn validate_schema<T>(value: Value) -> Result<T, PipelineError>
where
    T: DeserializeOwned + Validate,
{
    let mut record: T = serde_json::from_value(value).map_err(|e| {
        PipelineError::SchemaValidationFailed {
            errors: vec![FieldError::new("$", e.to_string())],
        }
    })?;

    let errors = record.validate();
    if errors.is_empty() {
        Ok(record)
    } else {
        Err(PipelineError::SchemaValidationFailed { errors })
    }
}

/// Pushes an error if `value` falls outside `[min, max]`.
pub fn check_range_f64(
    errors: &mut Vec<FieldError>,
    path: impl Into<String>,
    value: f64,
    min: f64,
    max: f64,
) {
    if !(min..=max).contains(&value) {
        errors.push(FieldError::new(
            path,
            format!("must be within [{min}, {max}], got {value}"),
        ));
    }
}

/// Pushes an error if an optional integer is negative.
pub fn check_non_negative(errors: &mut Vec<FieldError>, path: impl Into<String>, value: Option<i64>) {
    if let Some(v) = value {
        if v < 0 {
            errors.push(FieldError::new(path, format!("must be >= 0, got {v}")));
        }
    }
}

/// Pushes an error if the trimmed string length falls outside `[min, max]`.
pub fn check_length(
    errors: &mut Vec<FieldError>,
    path: impl Into<String>,
    value: &str,
    min: usize,
    max: usize,
) {
    let len = value.chars().count();
    if len < min || len > max {
        errors.push(FieldError::new(
            path,
            format!("length must be within [{min}, {max}] characters, got {len}"),
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Sample {
        score: f64,
        label: String,
    }

    impl Validate for Sample {
        fn validate(&mut self) -> Vec<FieldError> {
            let mut errors = Vec::new();
            self.label = self.label.trim().to_string();
            check_range_f64(&mut errors, "score", self.score, 0.0, 1.0);
            check_length(&mut errors, "label", &self.label, 3, 10);
            errors
        }
    }

    #[test]
    fn test_valid_record_passes_and_is_normalized() {
        let sample: Sample =
            validate_schema(json!({"score": 0.5, "label": "  okay  "})).unwrap();
        assert_eq!(sample.label, "okay");
    }

    #[test]
    fn test_unknown_field_rejected_for_closed_shape() {
        let err = validate_schema::<Sample>(json!({
            "score": 0.5, "label": "okay", "extra": true
        }))
        .unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors[0].path, "$");
                assert!(errors[0].reason.contains("extra"), "{}", errors[0].reason);
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_every_bound_violation_reported() {
        let err =
            validate_schema::<Sample>(json!({"score": 1.5, "label": "x"})).unwrap_err();
        match err {
            PipelineError::SchemaValidationFailed { errors } => {
                assert_eq!(errors.len(), 2);
                assert_eq!(errors[0].path, "score");
                assert_eq!(errors[1].path, "label");
            }
            other => panic!("expected SchemaValidationFailed, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_field_is_structural_failure() {
        let err = validate_schema::<Sample>(json!({"score": 0.5})).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::SchemaValidationFailed { .. }
        ));
    }
}
