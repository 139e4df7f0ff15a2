//! JSON response body decoding.
//!
//! A response body is only accepted when its top-level JSON value is an
//! object. Malformed JSON and well-formed JSON of the wrong shape fail with
//! different `DecodeErrorKind`s so callers can tell them apart.

use serde_json::{Map, Value};

/// A decoded top-level JSON object.
pub type JsonObject = Map<String, Value>;

/// Why a body could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeErrorKind {
    /// The body is not valid JSON.
    Syntax,
    /// The body is valid JSON but its top-level value is not an object.
    NotAnObject,
}

impl DecodeErrorKind {
    /// Stable numeric code reported across the FFI boundary.
    pub fn code(&self) -> i64 {
        match self {
            DecodeErrorKind::Syntax => 1,
            DecodeErrorKind::NotAnObject => 99,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct DecodeError {
    pub kind: DecodeErrorKind,
    pub message: String,
}

/// Parse `body` and require a JSON object at the top level.
///
/// `{}` decodes to an empty map, never to an error.
pub fn decode_object(body: &[u8]) -> Result<JsonObject, DecodeError> {
    let value: Value = serde_json::from_slice(body).map_err(|e| DecodeError {
        kind: DecodeErrorKind::Syntax,
        message: format!("invalid JSON: {e}"),
    })?;
    match value {
        Value::Object(map) => Ok(map),
        other => Err(DecodeError {
            kind: DecodeErrorKind::NotAnObject,
            message: format!("expected a JSON object, found {}", type_name(&other)),
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_decodes() {
        let map = decode_object(br#"{"a": 1}"#).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map["a"], json!(1));
    }

    #[test]
    fn empty_object_is_not_a_failure() {
        let map = decode_object(b"{}").unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn array_is_a_shape_error() {
        let err = decode_object(b"[1,2,3]").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::NotAnObject);
        assert_eq!(err.kind.code(), 99);
        assert!(err.message.contains("an array"));
    }

    #[test]
    fn scalars_are_shape_errors() {
        for body in [&b"42"[..], b"\"text\"", b"true", b"null"] {
            let err = decode_object(body).unwrap_err();
            assert_eq!(err.kind, DecodeErrorKind::NotAnObject);
        }
    }

    #[test]
    fn garbage_is_a_syntax_error() {
        let err = decode_object(b"not json").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Syntax);
        assert_eq!(err.kind.code(), 1);
    }

    #[test]
    fn empty_body_is_a_syntax_error() {
        let err = decode_object(b"").unwrap_err();
        assert_eq!(err.kind, DecodeErrorKind::Syntax);
    }

    #[test]
    fn nested_values_survive() {
        let map = decode_object(br#"{"list":[1,"two",null],"obj":{"ok":true},"n":1.5}"#).unwrap();
        assert_eq!(map["list"], json!([1, "two", null]));
        assert_eq!(map["obj"]["ok"], json!(true));
        assert_eq!(map["n"], json!(1.5));
    }
}
