//! I/O-free request resolution and response interpretation.
//!
//! # Design
//! `RequestPipeline` splits a JSON API call into the two halves that do not
//! touch the network: `resolve_request` turns an `ApiRequest` into the
//! `HttpRequest` a transport executes, and `interpret_response` turns what
//! the transport reported into the single terminal `ApiResult`. `ApiClient`
//! runs a transport between the two; the FFI crate lets a foreign host do
//! the same with its own HTTP stack.

use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::decode::{decode_object, JsonObject};
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::request::ApiRequest;
use crate::strategy::{BodyResolver, OnlyOk, QueryBody, RequestUrl, StatusPolicy, UrlResolver};

/// The terminal outcome of one API call: a decoded object or an error,
/// never both and never neither.
pub type ApiResult = Result<JsonObject, ApiError>;

#[derive(Clone)]
pub struct RequestPipeline {
    url_resolver: Arc<dyn UrlResolver>,
    body_resolver: Arc<dyn BodyResolver>,
    status_policy: Arc<dyn StatusPolicy>,
}

impl Default for RequestPipeline {
    fn default() -> Self {
        Self {
            url_resolver: Arc::new(RequestUrl),
            body_resolver: Arc::new(QueryBody),
            status_policy: Arc::new(OnlyOk),
        }
    }
}

impl fmt::Debug for RequestPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestPipeline").finish_non_exhaustive()
    }
}

impl RequestPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_url_resolver(mut self, resolver: impl UrlResolver + 'static) -> Self {
        self.url_resolver = Arc::new(resolver);
        self
    }

    pub fn with_body_resolver(mut self, resolver: impl BodyResolver + 'static) -> Self {
        self.body_resolver = Arc::new(resolver);
        self
    }

    pub fn with_status_policy(mut self, policy: impl StatusPolicy + 'static) -> Self {
        self.status_policy = Arc::new(policy);
        self
    }

    /// Build the transport request. `method`, `headers`, `timeout` and
    /// `cellular` are copied verbatim; `url` and `body` come from the
    /// resolvers.
    pub fn resolve_request(&self, request: &ApiRequest) -> HttpRequest {
        let url = self.url_resolver.resolve_url(request);
        let body = self.body_resolver.resolve_body(request);
        trace!(
            method = %request.method,
            url = url.as_deref().unwrap_or("<none>"),
            body_len = body.as_ref().map_or(0, Vec::len),
            "resolved request"
        );
        HttpRequest {
            method: request.method,
            url,
            headers: request.headers.clone(),
            body,
            timeout: request.timeout,
            cellular: request.cellular,
        }
    }

    /// Classify a transport outcome.
    ///
    /// A transport error is passed through untouched. Otherwise the status
    /// policy runs first, and only an accepted response has its body decoded.
    pub fn interpret_response(&self, outcome: Result<HttpResponse, TransportError>) -> ApiResult {
        let response = outcome?;
        if let Some(err) = self.status_policy.evaluate(response.status, &response.body) {
            return Err(err);
        }
        decode_object(&response.body).map_err(|error| ApiError::Decode {
            error,
            body: response.body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::DecodeErrorKind;
    use crate::error::TransportErrorKind;
    use crate::http::HttpMethod;
    use crate::strategy::{AnySuccess, PathUrl};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn resolve_copies_fields_verbatim() {
        let req = ApiRequest::new(HttpMethod::Put)
            .with_url("http://localhost/x")
            .with_header("x-token", "abc")
            .with_timeout(Duration::from_secs(3))
            .with_cellular(false);
        let http = RequestPipeline::new().resolve_request(&req);
        assert_eq!(http.method, HttpMethod::Put);
        assert_eq!(http.url.as_deref(), Some("http://localhost/x"));
        assert_eq!(http.headers["x-token"], "abc");
        assert_eq!(http.timeout, Duration::from_secs(3));
        assert!(!http.cellular);
        assert!(http.body.is_none());
    }

    #[test]
    fn resolve_prefers_explicit_body() {
        let req = ApiRequest::post("http://x")
            .with_body(br#"{"k":1}"#.to_vec())
            .with_query("a", "b");
        let http = RequestPipeline::new().resolve_request(&req);
        assert_eq!(http.body, Some(br#"{"k":1}"#.to_vec()));
    }

    #[test]
    fn resolve_encodes_query_into_body() {
        let req = ApiRequest::post("http://x").with_query("q", "a&b");
        let http = RequestPipeline::new().resolve_request(&req);
        assert_eq!(http.body, Some(b"q=a%26b".to_vec()));
    }

    #[test]
    fn resolve_uses_injected_url_resolver() {
        let pipeline = RequestPipeline::new().with_url_resolver(PathUrl::new("http://api.local"));
        let req = ApiRequest::default().with_endpoint("orders", "v3", "create");
        let http = pipeline.resolve_request(&req);
        assert_eq!(http.url.as_deref(), Some("http://api.local/orders/v3/create"));
    }

    #[test]
    fn resolve_uses_injected_body_resolver() {
        let pipeline = RequestPipeline::new()
            .with_body_resolver(|req: &ApiRequest| Some(req.action.clone().into_bytes()));
        let req = ApiRequest::default().with_endpoint("", "", "ping");
        assert_eq!(pipeline.resolve_request(&req).body, Some(b"ping".to_vec()));
    }

    #[test]
    fn transport_error_passes_through() {
        let err = TransportError::new(TransportErrorKind::Io, "connection refused");
        let result = RequestPipeline::new().interpret_response(Err(err.clone()));
        assert_eq!(result.unwrap_err(), ApiError::Transport(err));
    }

    #[test]
    fn non_200_is_a_status_error_with_body() {
        let result = RequestPipeline::new().interpret_response(Ok(HttpResponse::new(404, "nope")));
        assert_eq!(
            result.unwrap_err(),
            ApiError::Status {
                status: 404,
                body: b"nope".to_vec()
            }
        );
    }

    #[test]
    fn status_is_checked_before_decoding() {
        let result =
            RequestPipeline::new().interpret_response(Ok(HttpResponse::new(500, r#"{"ok":false}"#)));
        assert!(matches!(result, Err(ApiError::Status { status: 500, .. })));
    }

    #[test]
    fn ok_object_decodes() {
        let map = RequestPipeline::new()
            .interpret_response(Ok(HttpResponse::new(200, r#"{"ok": true}"#)))
            .unwrap();
        assert_eq!(map["ok"], json!(true));
    }

    #[test]
    fn malformed_body_is_a_decode_error_with_body() {
        let result = RequestPipeline::new().interpret_response(Ok(HttpResponse::new(200, "oops")));
        match result.unwrap_err() {
            ApiError::Decode { error, body } => {
                assert_eq!(error.kind, DecodeErrorKind::Syntax);
                assert_eq!(body, b"oops".to_vec());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn custom_policy_accepts_created() {
        let pipeline = RequestPipeline::new().with_status_policy(AnySuccess);
        let map = pipeline
            .interpret_response(Ok(HttpResponse::new(201, r#"{"id": 9}"#)))
            .unwrap();
        assert_eq!(map["id"], json!(9));
    }
}
