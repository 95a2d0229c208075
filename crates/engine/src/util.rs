//! Internal helpers for input normalization.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so every operation applies the same rules to user text.

use crate::{EngineError, ResultEngine};

/// Trim a required name, rejecting empty input.
pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidArgument(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive key used for uniqueness checks on names.
pub(crate) fn name_key(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

/// Trim optional text, mapping blank input to `None`.
pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
