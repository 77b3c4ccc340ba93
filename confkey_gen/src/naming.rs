//! Wildcard name templates for generated types.
//!
//! A template is a short identifier containing at most one `*`. The wildcard
//! is replaced by the annotated enum's name, so `"*Config"` applied to `Db`
//! yields `DbConfig`.

use crate::error::GenerationError;

/// Wildcard marker inside a name template.
pub const WILDCARD: char = '*';

/// Template used for the annotation type when none is given.
pub const DEFAULT_ANNOTATION_NAME: &str = "*Config";
/// Template used for the configuration bean when none is given.
pub const DEFAULT_CONFIGURATION_BEAN_NAME: &str = "*ConfigBean";
/// Template used for the path override variable when none is given.
pub const DEFAULT_SYSTEM_PROPERTY_NAME: &str = "*ConfigPath";

/// Reports whether `template` is an acceptable name template.
///
/// Accepts ASCII letters with at most one wildcard, which may lead, trail,
/// or sit between letters. A lone wildcard is rejected.
#[must_use]
pub fn is_valid_template(template: &str) -> bool {
    let mut wildcards = 0_usize;
    let mut letters = 0_usize;
    for ch in template.chars() {
        if ch == WILDCARD {
            wildcards += 1;
        } else if ch.is_ascii_alphabetic() {
            letters += 1;
        } else {
            return false;
        }
    }
    wildcards <= 1 && letters > 0
}

/// Resolves `template` against `base`.
///
/// `parameter` names the attribute being resolved and appears in the error
/// message.
///
/// # Errors
///
/// Returns [`GenerationError::InvalidParameter`] when `base` is absent or
/// empty, or when `template` is absent or malformed.
pub fn resolve_name(
    parameter: &str,
    base: Option<&str>,
    template: Option<&str>,
) -> Result<String, GenerationError> {
    let Some(base_name) = base.filter(|name| !name.is_empty()) else {
        return Err(GenerationError::invalid_parameter("Invalid class name"));
    };
    match template {
        Some(pattern) if is_valid_template(pattern) => {
            Ok(pattern.replacen(WILDCARD, base_name, 1))
        }
        _ => Err(GenerationError::invalid_parameter(format!(
            "Invalid {parameter} pattern"
        ))),
    }
}

/// Resolves the generated annotation type's name.
///
/// # Errors
///
/// See [`resolve_name`].
pub fn annotation_name(base: &str, template: Option<&str>) -> Result<String, GenerationError> {
    resolve_name("annotation_name", Some(base), template)
}

/// Resolves the generated configuration bean's name.
///
/// # Errors
///
/// See [`resolve_name`].
pub fn configuration_bean_name(
    base: &str,
    template: Option<&str>,
) -> Result<String, GenerationError> {
    resolve_name("configuration_bean_name", Some(base), template)
}

/// Resolves the environment variable that overrides the property-file path.
///
/// The override name is free-form, so it is substituted without pattern
/// validation.
#[must_use]
pub fn system_property_name(base: &str, template: Option<&str>) -> String {
    template.map_or_else(
        || DEFAULT_SYSTEM_PROPERTY_NAME.replace(WILDCARD, base),
        |pattern| pattern.replace(WILDCARD, base),
    )
}
