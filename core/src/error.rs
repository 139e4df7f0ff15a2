//! Error types for the JSON API client.
//!
//! # Design
//! Every failed request ends in exactly one `ApiError`. The three variants
//! map to the three error domains of the pipeline: the transport never
//! produced a response, the response status was rejected by the
//! `StatusPolicy`, or the body was not a JSON object. Status and decode
//! errors keep the raw response body for diagnostics.

use crate::decode::DecodeError;

/// Stable discriminants for the error domains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ErrorKind {
    Transport = 1,
    Status = 2,
    Decode = 3,
}

/// Why a transport failed before a response was received.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    /// The request could not be sent as described, e.g. it has no url.
    InvalidRequest,
    TimedOut,
    /// The caller cancelled the request through its `RequestHandle`.
    Cancelled,
    Io,
    Other,
}

impl TransportErrorKind {
    pub fn code(&self) -> i64 {
        match self {
            TransportErrorKind::InvalidRequest => 1,
            TransportErrorKind::TimedOut => 2,
            TransportErrorKind::Cancelled => 3,
            TransportErrorKind::Io => 4,
            TransportErrorKind::Other => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn cancelled() -> Self {
        Self::new(TransportErrorKind::Cancelled, "request cancelled")
    }
}

/// The terminal failure of a dispatched request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// A response arrived but its status code was rejected.
    #[error("HTTP {status}")]
    Status { status: u16, body: Vec<u8> },

    #[error("decode error: {error}")]
    Decode { error: DecodeError, body: Vec<u8> },
}

impl ApiError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport(_) => ErrorKind::Transport,
            ApiError::Status { .. } => ErrorKind::Status,
            ApiError::Decode { .. } => ErrorKind::Decode,
        }
    }

    /// Machine-readable code within the error's domain. For status errors
    /// this is the HTTP status itself.
    pub fn code(&self) -> i64 {
        match self {
            ApiError::Transport(e) => e.kind.code(),
            ApiError::Status { status, .. } => i64::from(*status),
            ApiError::Decode { error, .. } => error.kind.code(),
        }
    }

    /// Raw response body attached for diagnostics, if a response was received.
    pub fn payload(&self) -> Option<&[u8]> {
        match self {
            ApiError::Transport(_) => None,
            ApiError::Status { body, .. } | ApiError::Decode { body, .. } => Some(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeErrorKind;

    #[test]
    fn status_error_reports_http_code_and_body() {
        let err = ApiError::Status {
            status: 404,
            body: b"missing".to_vec(),
        };
        assert_eq!(err.kind(), ErrorKind::Status);
        assert_eq!(err.code(), 404);
        assert_eq!(err.payload(), Some(&b"missing"[..]));
        assert_eq!(err.to_string(), "HTTP 404");
    }

    #[test]
    fn transport_error_has_no_payload() {
        let err: ApiError = TransportError::new(TransportErrorKind::TimedOut, "timed out").into();
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.code(), 2);
        assert!(err.payload().is_none());
        assert_eq!(err.to_string(), "transport error: timed out");
    }

    #[test]
    fn decode_error_keeps_kind_code() {
        let err = ApiError::Decode {
            error: DecodeError {
                kind: DecodeErrorKind::NotAnObject,
                message: "expected a JSON object, found an array".to_string(),
            },
            body: b"[]".to_vec(),
        };
        assert_eq!(err.kind(), ErrorKind::Decode);
        assert_eq!(err.code(), 99);
        assert_eq!(err.payload(), Some(&b"[]"[..]));
    }

    #[test]
    fn error_kind_discriminants_are_stable() {
        assert_eq!(ErrorKind::Transport as u8, 1);
        assert_eq!(ErrorKind::Status as u8, 2);
        assert_eq!(ErrorKind::Decode as u8, 3);
    }
}
