//! Pluggable resolution and status policies.
//!
//! # Design
//! `RequestPipeline` asks three strategies how to turn an `ApiRequest` into a
//! transport request and how to judge a response status:
//!
//! - `UrlResolver` computes the final url.
//! - `BodyResolver` computes the request body.
//! - `StatusPolicy` decides which status codes are errors.
//!
//! Each trait is implemented for plain closures, so a one-off override does
//! not need a named type.

use crate::encode::stringify_query;
use crate::error::ApiError;
use crate::request::ApiRequest;

pub trait UrlResolver: Send + Sync {
    fn resolve_url(&self, request: &ApiRequest) -> Option<String>;
}

pub trait BodyResolver: Send + Sync {
    fn resolve_body(&self, request: &ApiRequest) -> Option<Vec<u8>>;
}

pub trait StatusPolicy: Send + Sync {
    /// Return `Some` to reject the response with that error.
    fn evaluate(&self, status: u16, body: &[u8]) -> Option<ApiError>;
}

impl<F> UrlResolver for F
where
    F: Fn(&ApiRequest) -> Option<String> + Send + Sync,
{
    fn resolve_url(&self, request: &ApiRequest) -> Option<String> {
        self(request)
    }
}

impl<F> BodyResolver for F
where
    F: Fn(&ApiRequest) -> Option<Vec<u8>> + Send + Sync,
{
    fn resolve_body(&self, request: &ApiRequest) -> Option<Vec<u8>> {
        self(request)
    }
}

impl<F> StatusPolicy for F
where
    F: Fn(u16, &[u8]) -> Option<ApiError> + Send + Sync,
{
    fn evaluate(&self, status: u16, body: &[u8]) -> Option<ApiError> {
        self(status, body)
    }
}

/// Uses the request's `url` verbatim.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestUrl;

impl UrlResolver for RequestUrl {
    fn resolve_url(&self, request: &ApiRequest) -> Option<String> {
        request.url.clone()
    }
}

/// Builds `{base_url}/{api}/{version}/{action}` from the request's endpoint,
/// leaving out empty segments.
///
/// Falls back to the request's `url` when neither `api` nor `action` is set.
#[derive(Debug, Clone)]
pub struct PathUrl {
    base_url: String,
}

impl PathUrl {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl UrlResolver for PathUrl {
    fn resolve_url(&self, request: &ApiRequest) -> Option<String> {
        if request.api.is_empty() && request.action.is_empty() {
            return request.url.clone();
        }
        let mut url = self.base_url.clone();
        for segment in [&request.api, &request.version, &request.action] {
            let segment = segment.trim_matches('/');
            if !segment.is_empty() {
                url.push('/');
                url.push_str(segment);
            }
        }
        Some(url)
    }
}

/// An explicit body wins; otherwise a non-empty `query` is sent as a
/// percent-encoded `key=value&...` string; otherwise there is no body.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBody;

impl BodyResolver for QueryBody {
    fn resolve_body(&self, request: &ApiRequest) -> Option<Vec<u8>> {
        if let Some(body) = &request.body {
            return Some(body.clone());
        }
        if !request.query.is_empty() {
            return Some(stringify_query(&request.query, true).into_bytes());
        }
        None
    }
}

/// Accepts exactly 200.
#[derive(Debug, Clone, Copy, Default)]
pub struct OnlyOk;

impl StatusPolicy for OnlyOk {
    fn evaluate(&self, status: u16, body: &[u8]) -> Option<ApiError> {
        (status != 200).then(|| ApiError::Status {
            status,
            body: body.to_vec(),
        })
    }
}

/// Accepts every 2xx status.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnySuccess;

impl StatusPolicy for AnySuccess {
    fn evaluate(&self, status: u16, body: &[u8]) -> Option<ApiError> {
        (!(200..300).contains(&status)).then(|| ApiError::Status {
            status,
            body: body.to_vec(),
        })
    }
}
