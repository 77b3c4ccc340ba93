//! Marker scanning over a declaration's members.
//!
//! Each role is resolved independently: the first member of the matching
//! kind that carries the role's marker wins. Later duplicates are ignored
//! rather than rejected; see [`FIRST_MATCH_POLICY`].

use crate::error::GenerationError;
use crate::model::{AttributeValue, Declaration, Marker, MemberKind, PASS_ANNOTATIONS};

/// Describes the duplicate-marker rule [`first_marked`] implements.
///
/// Descriptive only; nothing reads it. When several members carry the same
/// marker, the one declared first is used and the rest are ignored.
pub const FIRST_MATCH_POLICY: &str = "first-match-wins";

/// Separator between path segments.
const PATH_SEPARATOR: &str = "::";

/// A member selected for a marker role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerFinding {
    /// Role the member fills.
    pub role: Marker,
    /// Name of the selected member.
    pub member: String,
}

impl MarkerFinding {
    /// Renders the finding as template text.
    ///
    /// Methods become zero-argument call references (`validator()`);
    /// constants stay bare.
    #[must_use]
    pub fn reference(&self) -> String {
        match self.role.member_kind() {
            MemberKind::Method => format!("{}()", self.member),
            MemberKind::Constant => self.member.clone(),
        }
    }
}

/// Everything the scanner extracts from one declaration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    /// Method supplying the value validator.
    pub validator: Option<MarkerFinding>,
    /// Method supplying the key string.
    pub key_string: Option<MarkerFinding>,
    /// Constant marked as the default key.
    pub default_key: Option<MarkerFinding>,
    /// Constant marked as the null value.
    pub null_value: Option<MarkerFinding>,
    /// Bare qualified names of annotations copied onto the bean.
    pub passed_annotations: Vec<String>,
}

/// Scans `declaration` for every marker role and the pass-through list.
#[must_use]
pub fn scan(declaration: &Declaration) -> Metadata {
    Metadata {
        validator: first_marked(declaration, Marker::Validator),
        key_string: first_marked(declaration, Marker::KeyString),
        default_key: first_marked(declaration, Marker::DefaultKey),
        null_value: first_marked(declaration, Marker::NullValue),
        passed_annotations: passed_annotations(declaration),
    }
}

/// Returns the first member of the right kind carrying `role`.
#[must_use]
pub fn first_marked(declaration: &Declaration, role: Marker) -> Option<MarkerFinding> {
    declaration
        .members
        .iter()
        .filter(|member| member.kind == role.member_kind())
        .find(|member| member.has_marker(role))
        .map(|member| MarkerFinding {
            role,
            member: member.name.clone(),
        })
}

/// Resolves the default key, falling back to the first declared constant.
///
/// # Errors
///
/// Returns [`GenerationError::EmptyEnumeration`] when the enum has no
/// constants.
pub fn default_key(declaration: &Declaration, metadata: &Metadata) -> Result<String, GenerationError> {
    if let Some(found) = &metadata.default_key {
        return Ok(found.reference());
    }
    declaration
        .constants()
        .next()
        .map(|constant| constant.name.clone())
        .ok_or_else(|| GenerationError::EmptyEnumeration {
            name: declaration.name.clone(),
        })
}

/// Lists the pass-through annotations as bare qualified names.
///
/// Entries live under the annotation's `value` attribute. A missing
/// annotation or attribute yields an empty list.
#[must_use]
pub fn passed_annotations(declaration: &Declaration) -> Vec<String> {
    let Some(annotation) = declaration.annotation(PASS_ANNOTATIONS) else {
        return Vec::new();
    };
    match annotation.value("value") {
        Some(AttributeValue::List(entries)) => entries.iter().filter_map(entry_name).collect(),
        Some(single) => entry_name(single).into_iter().collect(),
        None => Vec::new(),
    }
}

fn entry_name(value: &AttributeValue) -> Option<String> {
    match value {
        AttributeValue::Path(text) | AttributeValue::Str(text) => Some(bare_qualified_name(text)),
        AttributeValue::Bool(_) | AttributeValue::List(_) => None,
    }
}

/// Normalises a rendered path into a bare qualified name.
///
/// Token streams render paths with spaces around `::`; only those are
/// removed, so string literals and other spacing survive. A trailing
/// type-literal suffix is then stripped.
#[must_use]
pub fn bare_qualified_name(text: &str) -> String {
    let compact = compact_path_separators(text.trim());
    strip_type_literal(&compact).to_owned()
}

fn compact_path_separators(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    let mut in_string = false;
    let mut escaped = false;
    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
        } else if ch.is_whitespace() {
            let mut run = String::from(ch);
            while let Some(next) = chars.next_if(|c| c.is_whitespace()) {
                run.push(next);
            }
            let follows_separator = out.ends_with(PATH_SEPARATOR);
            let precedes_separator = chars.clone().take(2).eq(PATH_SEPARATOR.chars());
            if !follows_separator && !precedes_separator {
                out.push_str(&run);
            }
        } else {
            in_string = ch == '"';
            out.push(ch);
        }
    }
    out
}

/// Strips `::<>`, which token streams render as `::< >`.
fn strip_type_literal(text: &str) -> &str {
    text.strip_suffix('>')
        .map(str::trim_end)
        .and_then(|rest| rest.strip_suffix('<'))
        .map(str::trim_end)
        .and_then(|rest| rest.strip_suffix(PATH_SEPARATOR))
        .map_or(text, str::trim_end)
}
