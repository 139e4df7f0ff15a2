//! The HTTP transport seam.
//!
//! # Design
//! A `Transport` executes one `HttpRequest` and reports either a response,
//! whatever its status code, or a `TransportError` when no response was
//! received. Connection handling, TLS and redirects belong to the transport.
//! `UreqTransport` is the bundled implementation; tests and embedders plug in
//! their own.

use std::future::Future;

use tracing::trace;

use crate::error::{TransportError, TransportErrorKind};
use crate::http::{HttpRequest, HttpResponse};

pub trait Transport: Send + Sync + 'static {
    fn execute(
        &self,
        request: HttpRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// Blocking `ureq` agent driven from tokio's blocking thread pool.
///
/// A fresh agent is configured per request so that each request's `timeout`
/// applies as ureq's global timeout. The `cellular` flag has no meaning here
/// and is ignored.
#[derive(Debug, Clone, Copy, Default)]
pub struct UreqTransport;

impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        tokio::task::spawn_blocking(move || execute_blocking(request))
            .await
            .map_err(|e| TransportError::new(TransportErrorKind::Other, format!("transport task failed: {e}")))?
    }
}

fn execute_blocking(request: HttpRequest) -> Result<HttpResponse, TransportError> {
    let url = request
        .url
        .ok_or_else(|| TransportError::new(TransportErrorKind::InvalidRequest, "request has no url"))?;
    if !request.cellular {
        trace!("cellular access policy is not enforced by the ureq transport");
    }

    let agent: ureq::Agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .timeout_global(Some(request.timeout))
        .build()
        .new_agent();

    let mut builder = ureq::http::Request::builder()
        .method(request.method.as_str())
        .uri(url.as_str());
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }

    let sent = match request.body {
        Some(body) => builder.body(body).map(|req| agent.run(req)),
        None => builder.body(()).map(|req| agent.run(req)),
    }
    .map_err(|e| TransportError::new(TransportErrorKind::InvalidRequest, e.to_string()))?;
    let mut response = sent.map_err(map_ureq_error)?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| {
            (
                k.as_str().to_string(),
                v.to_str().unwrap_or("(binary)").to_string(),
            )
        })
        .collect();
    let body = response.body_mut().read_to_vec().map_err(map_ureq_error)?;

    Ok(HttpResponse { status, headers, body })
}

fn map_ureq_error(err: ureq::Error) -> TransportError {
    let kind = match &err {
        ureq::Error::Timeout(_) => TransportErrorKind::TimedOut,
        ureq::Error::Io(_) => TransportErrorKind::Io,
        ureq::Error::BadUri(_) => TransportErrorKind::InvalidRequest,
        _ => TransportErrorKind::Other,
    };
    TransportError::new(kind, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_url_is_rejected_before_sending() {
        let err = UreqTransport.execute(HttpRequest::default()).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::InvalidRequest);
    }

    #[tokio::test]
    async fn unreachable_host_is_a_transport_error() {
        // Nothing listens on port 1.
        let request = HttpRequest {
            url: Some("http://127.0.0.1:1/".to_string()),
            ..HttpRequest::default()
        };
        assert!(UreqTransport.execute(request).await.is_err());
    }
}
