//! Prompt Assembler — fills `{{NAME}}` placeholders in a template string.

use crate::pipeline::error::PipelineError;

/// Replaces each `{{KEY}}` placeholder with its trimmed value.
///
/// Every mapping key must have a matching placeholder in the template —
/// a missing one is `UnresolvedPlaceholder`, a development-time contract
/// violation. Placeholders with no mapping entry are left in place so a
/// template can be filled across multiple stages.
pub fn fill_placeholders(
    template: &str,
    replacements: &[(&str, &str)],
) -> Result<String, PipelineError> {
    let mut result = template.to_string();
    for (key, value) in replacements {
        let placeholder = format!("{{{{{key}}}}}");
        if !result.contains(&placeholder) {
            return Err(PipelineError::UnresolvedPlaceholder {
                name: (*key).to_string(),
            });
        }
        result = result.replace(&placeholder, value.trim());
    }
    Ok(result)
}
