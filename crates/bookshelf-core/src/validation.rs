//! Payload validation shared by the resource records.
//!
//! Request bodies arrive as loose JSON objects. Each resource decodes them
//! into a typed draft or patch through [`decode_payload`] and then checks
//! field contents with the helpers below, so nothing duck-typed reaches the
//! store.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Fields that carry the store identifier and are never written by clients.
pub const IDENTIFIER_FIELDS: &[&str] = &["_id", "id"];

/// Result type alias for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Reasons a payload is rejected before it reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The payload had no writable fields.
    #[error("payload must contain at least one field")]
    EmptyPayload,

    /// A field is present but its value is unacceptable.
    #[error("invalid value for `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },

    /// `availableCopies` would exceed `totalCopies`.
    #[error("availableCopies ({available}) cannot exceed totalCopies ({total})")]
    CopiesExceedTotal { available: i64, total: i64 },

    /// A patch tried to set a field to `null`.
    #[error("`{0}` cannot be null; fields can be changed but not removed")]
    NullField(String),

    /// The payload does not have the expected shape (unknown field, wrong type, missing field).
    #[error("malformed payload: {0}")]
    Malformed(String),
}

impl ValidationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Remove identifier fields from a payload. Identifiers are immutable and
/// assigned by the store.
pub fn strip_identifiers(payload: &mut Map<String, Value>) {
    for field in IDENTIFIER_FIELDS {
        payload.remove(*field);
    }
}

/// Strip identifiers and decode the remaining object into `T`.
///
/// Returns [`ValidationError::EmptyPayload`] when nothing is left to decode.
pub fn decode_payload<T: DeserializeOwned>(mut payload: Map<String, Value>) -> ValidationResult<T> {
    strip_identifiers(&mut payload);
    if payload.is_empty() {
        return Err(ValidationError::EmptyPayload);
    }
    serde_json::from_value(Value::Object(payload))
        .map_err(|e| ValidationError::Malformed(e.to_string()))
}

/// [`decode_payload`] for partial updates: a `null` value is rejected
/// rather than read as "absent", and a patch that changes nothing is empty.
pub fn decode_patch<T>(mut payload: Map<String, Value>) -> ValidationResult<T>
where
    T: DeserializeOwned + Default + PartialEq,
{
    strip_identifiers(&mut payload);
    if let Some((field, _)) = payload.iter().find(|(_, value)| value.is_null()) {
        return Err(ValidationError::NullField(field.clone()));
    }
    let patch: T = decode_payload(payload)?;
    if patch == T::default() {
        return Err(ValidationError::EmptyPayload);
    }
    Ok(patch)
}

/// Reject blank strings.
pub fn check_text(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::invalid(field, "must not be empty"));
    }
    Ok(())
}

/// Reject blank strings when the field is present.
pub fn check_optional_text(field: &'static str, value: Option<&str>) -> ValidationResult<()> {
    match value {
        Some(v) => check_text(field, v),
        None => Ok(()),
    }
}

/// Reject negative counts.
pub fn check_non_negative(field: &'static str, value: Option<i64>) -> ValidationResult<()> {
    match value {
        Some(v) if v < 0 => Err(ValidationError::invalid(field, "must not be negative")),
        _ => Ok(()),
    }
}

/// Require an absolute http(s) URL.
pub fn check_link(field: &'static str, value: Option<&str>) -> ValidationResult<()> {
    let Some(raw) = value else {
        return Ok(());
    };
    let parsed = url::Url::parse(raw).map_err(|e| ValidationError::invalid(field, e.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(ValidationError::invalid(
            field,
            format!("unsupported scheme `{other}`"),
        )),
    }
}

/// Minimal address shape check: one `@` with something on both sides.
pub fn check_email(field: &'static str, value: Option<&str>) -> ValidationResult<()> {
    let Some(email) = value else {
        return Ok(());
    };
    let mut parts = email.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None)
            if !local.trim().is_empty() && !domain.trim().is_empty() =>
        {
            Ok(())
        }
        _ => Err(ValidationError::invalid(field, "must be an email address")),
    }
}

/// `available <= total`, when both counts are known.
pub fn check_copies(available: Option<i64>, total: Option<i64>) -> ValidationResult<()> {
    match (available, total) {
        (Some(available), Some(total)) if available > total => {
            Err(ValidationError::CopiesExceedTotal { available, total })
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, PartialEq, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Draft {
        title: Option<String>,
    }

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_strip_identifiers() {
        let mut payload = object(json!({"_id": "x", "id": "y", "title": "A"}));
        strip_identifiers(&mut payload);
        assert_eq!(payload.len(), 1);
        assert!(payload.contains_key("title"));
    }

    #[test]
    fn test_decode_rejects_empty() {
        let err = decode_payload::<Draft>(Map::new()).unwrap_err();
        assert_eq!(err, ValidationError::EmptyPayload);
    }

    #[test]
    fn test_decode_rejects_identifier_only_payload() {
        let err = decode_payload::<Draft>(object(json!({"_id": "abc"}))).unwrap_err();
        assert_eq!(err, ValidationError::EmptyPayload);
    }

    #[test]
    fn test_decode_rejects_unknown_field() {
        let err = decode_payload::<Draft>(object(json!({"colour": "red"}))).unwrap_err();
        assert!(matches!(err, ValidationError::Malformed(msg) if msg.contains("colour")));
    }

    #[test]
    fn test_decode_patch_rejects_null() {
        let err = decode_patch::<Draft>(object(json!({"title": null}))).unwrap_err();
        assert_eq!(err, ValidationError::NullField("title".to_string()));
        assert!(err.to_string().contains("title"));
    }

    #[test]
    fn test_decode_patch_ignores_null_identifier() {
        let err = decode_patch::<Draft>(object(json!({"_id": null}))).unwrap_err();
        assert_eq!(err, ValidationError::EmptyPayload);
    }

    #[test]
    fn test_check_text() {
        assert!(check_text("title", "Dune").is_ok());
        assert!(check_text("title", "   ").is_err());
        assert!(check_optional_text("title", None).is_ok());
    }

    #[test]
    fn test_check_link() {
        assert!(check_link("coverImage", Some("https://img.example.com/a.png")).is_ok());
        assert!(check_link("coverImage", Some("ftp://example.com/a.png")).is_err());
        assert!(check_link("coverImage", Some("not a url")).is_err());
        assert!(check_link("coverImage", None).is_ok());
    }

    #[test]
    fn test_check_email() {
        assert!(check_email("email", Some("ada@example.com")).is_ok());
        assert!(check_email("email", Some("ada.example.com")).is_err());
        assert!(check_email("email", Some("a@b@c")).is_err());
        assert!(check_email("email", Some("@example.com")).is_err());
    }

    #[test]
    fn test_check_copies() {
        assert!(check_copies(Some(3), Some(3)).is_ok());
        assert!(check_copies(Some(3), None).is_ok());
        assert_eq!(
            check_copies(Some(4), Some(3)),
            Err(ValidationError::CopiesExceedTotal {
                available: 4,
                total: 3
            })
        );
    }

    #[test]
    fn test_check_non_negative() {
        assert!(check_non_negative("batch", Some(0)).is_ok());
        assert!(check_non_negative("batch", Some(-1)).is_err());
    }
}
