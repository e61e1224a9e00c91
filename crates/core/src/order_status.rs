//! Order status domain rules.
//!
//! Field validation for status names, handles and colors, the per-field
//! error accumulator surfaced to callers on a failed save, and the
//! position arithmetic used when reordering.

use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use validator::{ValidationError, ValidationErrors};

use crate::error::CoreError;
use crate::types::DbId;

/// Sort order assigned when a status is saved without one.
pub const DEFAULT_SORT_ORDER: i32 = 999;

/// Color assigned when a status is saved without one.
pub const DEFAULT_COLOR: &str = "green";

/// Display colors a status may be tagged with.
pub const STATUS_COLORS: &[&str] = &[
    "green",
    "orange",
    "red",
    "blue",
    "yellow",
    "pink",
    "purple",
    "turquoise",
    "light",
    "grey",
    "black",
];

/// Maximum length of a status name or handle.
pub const MAX_FIELD_LEN: usize = 255;

/// Handles that would collide with record attribute names.
const RESERVED_HANDLES: &[&str] = &[
    "attribute",
    "attributes",
    "dateCreated",
    "dateUpdated",
    "errors",
    "false",
    "fields",
    "handle",
    "id",
    "name",
    "no",
    "null",
    "this",
    "true",
    "uid",
    "yes",
];

static HANDLE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9_]*$").expect("valid handle regex"));

/// Resolve the stored sort order. Unset and zero both fall back to
/// [`DEFAULT_SORT_ORDER`].
pub fn effective_sort_order(sort_order: Option<i32>) -> i32 {
    match sort_order {
        None | Some(0) => DEFAULT_SORT_ORDER,
        Some(n) => n,
    }
}

/// Resolve the stored color. Unset falls back to [`DEFAULT_COLOR`]; a set
/// color has already passed [`validate_color`].
pub fn effective_color(color: Option<&str>) -> &str {
    color.unwrap_or(DEFAULT_COLOR)
}

fn field_error(code: &'static str, message: String) -> ValidationError {
    ValidationError::new(code).with_message(message.into())
}

/// Validate a status display name: required, at most [`MAX_FIELD_LEN`] chars.
pub fn validate_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(field_error("required", "Name cannot be blank.".to_string()));
    }
    if name.chars().count() > MAX_FIELD_LEN {
        return Err(field_error(
            "length",
            format!("Name must be at most {MAX_FIELD_LEN} characters."),
        ));
    }
    Ok(())
}

/// Validate a status handle.
///
/// A handle starts with a letter, continues with letters, digits or
/// underscores, and must not be a reserved word (compared case-insensitively).
pub fn validate_handle(handle: &str) -> Result<(), ValidationError> {
    if handle.is_empty() {
        return Err(field_error("required", "Handle cannot be blank.".to_string()));
    }
    if handle.len() > MAX_FIELD_LEN {
        return Err(field_error(
            "length",
            format!("Handle must be at most {MAX_FIELD_LEN} characters."),
        ));
    }
    if !HANDLE_PATTERN.is_match(handle) {
        return Err(field_error(
            "format",
            format!("\u{201c}{handle}\u{201d} isn\u{2019}t a valid handle."),
        ));
    }
    if RESERVED_HANDLES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(handle))
    {
        return Err(field_error(
            "reserved",
            format!("\u{201c}{handle}\u{201d} is a reserved word."),
        ));
    }
    Ok(())
}

/// Validate a status color against [`STATUS_COLORS`].
pub fn validate_color(color: &str) -> Result<(), ValidationError> {
    if STATUS_COLORS.contains(&color) {
        Ok(())
    } else {
        Err(field_error(
            "color",
            format!("Color must be one of: {}.", STATUS_COLORS.join(", ")),
        ))
    }
}

// ---------------------------------------------------------------------------
// FieldErrors
// ---------------------------------------------------------------------------

/// Validation messages collected per field.
///
/// Fields are kept in name order so error output is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether any message was recorded for `field`.
    pub fn has(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Messages recorded for `field`, empty if none.
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Return `Ok(())` if empty, otherwise the errors themselves.
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, field_errors) in errors.field_errors() {
            for err in field_errors {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| err.code.to_string());
                out.add(field.to_string(), message);
            }
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Id helpers
// ---------------------------------------------------------------------------

/// Remove duplicate ids, keeping the first occurrence of each.
pub fn dedup_ids(ids: &[DbId]) -> Vec<DbId> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Compute `(id, sort_order)` pairs for a reorder request.
///
/// Positions are 1-based in the order given. An id listed twice is a
/// validation error.
pub fn reorder_positions(ids: &[DbId]) -> Result<Vec<(DbId, i32)>, CoreError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let mut positions = Vec::with_capacity(ids.len());
    for (index, &id) in ids.iter().enumerate() {
        if !seen.insert(id) {
            return Err(CoreError::Validation(format!(
                "Order status {id} appears more than once in the reorder list"
            )));
        }
        let position = i32::try_from(index + 1).map_err(|_| {
            CoreError::Validation("Too many order statuses to reorder".to_string())
        })?;
        positions.push((id, position));
    }
    Ok(positions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_order_defaults_when_unset_or_zero() {
        assert_eq!(effective_sort_order(None), 999);
        assert_eq!(effective_sort_order(Some(0)), 999);
        assert_eq!(effective_sort_order(Some(4)), 4);
        assert_eq!(effective_sort_order(Some(-1)), -1);
    }

    #[test]
    fn color_defaults_when_unset() {
        assert_eq!(effective_color(None), "green");
        assert_eq!(effective_color(Some("red")), "red");
    }

    #[test]
    fn blank_color_is_rejected_rather_than_defaulted() {
        assert_eq!(validate_color("  ").unwrap_err().code, "color");
        assert_eq!(validate_color("").unwrap_err().code, "color");
    }

    #[test]
    fn name_must_not_be_blank() {
        assert!(validate_name("Shipped").is_ok());
        let err = validate_name("   ").unwrap_err();
        assert_eq!(err.code, "required");
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(validate_name(&"a".repeat(255)).is_ok());
        assert_eq!(validate_name(&"a".repeat(256)).unwrap_err().code, "length");
    }

    #[test]
    fn handle_format() {
        assert!(validate_handle("new").is_ok());
        assert!(validate_handle("awaitingPayment").is_ok());
        assert!(validate_handle("on_hold_2").is_ok());
        assert_eq!(validate_handle("").unwrap_err().code, "required");
        assert_eq!(validate_handle("2fast").unwrap_err().code, "format");
        assert_eq!(validate_handle("on-hold").unwrap_err().code, "format");
        assert_eq!(validate_handle("with space").unwrap_err().code, "format");
    }

    #[test]
    fn reserved_handles_are_rejected_case_insensitively() {
        assert_eq!(validate_handle("id").unwrap_err().code, "reserved");
        assert_eq!(validate_handle("Handle").unwrap_err().code, "reserved");
        assert_eq!(validate_handle("DATECREATED").unwrap_err().code, "reserved");
    }

    #[test]
    fn color_must_be_in_palette() {
        assert!(validate_color("turquoise").is_ok());
        let err = validate_color("magenta").unwrap_err();
        assert_eq!(err.code, "color");
        assert!(err.message.unwrap().contains("green"));
    }

    #[test]
    fn field_errors_accumulate_per_field() {
        let mut errors = FieldErrors::new();
        assert!(errors.is_empty());
        errors.add("handle", "taken");
        errors.add("handle", "bad format");
        errors.add("emails", "missing");

        assert!(errors.has("handle"));
        assert_eq!(errors.get("handle"), ["taken", "bad format"]);
        assert!(errors.get("name").is_empty());
        assert_eq!(
            errors.to_string(),
            "emails: missing; handle: taken; handle: bad format"
        );
    }

    #[test]
    fn field_errors_serialize_as_map() {
        let mut errors = FieldErrors::new();
        errors.add("name", "Name cannot be blank.");
        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json, serde_json::json!({ "name": ["Name cannot be blank."] }));
    }

    #[test]
    fn field_errors_into_result() {
        let mut errors = FieldErrors::new();
        errors.add("name", "one");
        assert!(errors.into_result().is_err());
        assert!(FieldErrors::new().into_result().is_ok());
    }

    #[test]
    fn dedup_keeps_first_occurrence() {
        assert_eq!(dedup_ids(&[3, 1, 3, 2, 1]), vec![3, 1, 2]);
        assert!(dedup_ids(&[]).is_empty());
    }

    #[test]
    fn reorder_positions_are_one_based() {
        let positions = reorder_positions(&[3, 1, 2]).unwrap();
        assert_eq!(positions, vec![(3, 1), (1, 2), (2, 3)]);
    }

    #[test]
    fn reorder_rejects_duplicates() {
        let err = reorder_positions(&[1, 2, 1]).unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
