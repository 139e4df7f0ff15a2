//! Asynchronous JSON API client.
//!
//! # Design
//! `ApiClient` pairs a `RequestPipeline` with a `Transport` and the tokio
//! runtime it spawns onto. `send` is the awaitable form of one call;
//! `dispatch` spawns it and reports the outcome through a callback.
//!
//! The callback is an `FnOnce` invoked exactly once per dispatch. Normally it
//! runs on the tokio worker thread that completes the request. If the task is
//! torn down first, by `RequestHandle::cancel` or by the runtime shutting
//! down, it runs on the thread that drops the task and receives a
//! `Cancelled` transport error.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::{JoinError, JoinHandle};
use tracing::debug;
use uuid::Uuid;

use crate::error::{ApiError, TransportError};
use crate::pipeline::{ApiResult, RequestPipeline};
use crate::request::ApiRequest;
use crate::strategy::{BodyResolver, StatusPolicy, UrlResolver};
use crate::transport::Transport;

#[derive(Debug)]
pub struct ApiClient<T> {
    transport: Arc<T>,
    pipeline: RequestPipeline,
    runtime: Handle,
}

impl<T> Clone for ApiClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            pipeline: self.pipeline.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

impl<T: Transport> ApiClient<T> {
    /// Create a client that dispatches onto the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime. Use `with_runtime` to
    /// build a client from elsewhere.
    pub fn new(transport: T) -> Self {
        Self::with_runtime(transport, Handle::current())
    }

    pub fn with_runtime(transport: T, runtime: Handle) -> Self {
        Self {
            transport: Arc::new(transport),
            pipeline: RequestPipeline::default(),
            runtime,
        }
    }

    pub fn with_pipeline(mut self, pipeline: RequestPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn with_url_resolver(mut self, resolver: impl UrlResolver + 'static) -> Self {
        self.pipeline = self.pipeline.with_url_resolver(resolver);
        self
    }

    pub fn with_body_resolver(mut self, resolver: impl BodyResolver + 'static) -> Self {
        self.pipeline = self.pipeline.with_body_resolver(resolver);
        self
    }

    pub fn with_status_policy(mut self, policy: impl StatusPolicy + 'static) -> Self {
        self.pipeline = self.pipeline.with_status_policy(policy);
        self
    }

    pub fn pipeline(&self) -> &RequestPipeline {
        &self.pipeline
    }

    /// Resolve, execute and interpret one request.
    pub async fn send(&self, request: &ApiRequest) -> ApiResult {
        let http = self.pipeline.resolve_request(request);
        let outcome = self.transport.execute(http).await;
        self.pipeline.interpret_response(outcome)
    }

    /// Start `request` in the background and hand its outcome to `callback`.
    pub fn dispatch<F>(&self, request: ApiRequest, callback: F) -> RequestHandle
    where
        F: FnOnce(ApiResult) + Send + 'static,
    {
        let id = Uuid::new_v4();
        let guard = CallbackGuard {
            id,
            callback: Some(callback),
        };
        let client = self.clone();
        debug!(%id, method = %request.method, "dispatching request");

        let task = self.runtime.spawn(async move {
            let result = client.send(&request).await;
            match &result {
                Ok(object) => debug!(%id, keys = object.len(), "request succeeded"),
                Err(err) => debug!(%id, kind = ?err.kind(), code = err.code(), "request failed: {err}"),
            }
            guard.fire(result);
        });

        RequestHandle { id, task }
    }
}

/// Owns a dispatch callback. Dropping it unfired delivers a cancellation.
struct CallbackGuard<F: FnOnce(ApiResult)> {
    id: Uuid,
    callback: Option<F>,
}

impl<F: FnOnce(ApiResult)> CallbackGuard<F> {
    fn fire(mut self, result: ApiResult) {
        if let Some(callback) = self.callback.take() {
            callback(result);
        }
    }
}

impl<F: FnOnce(ApiResult)> Drop for CallbackGuard<F> {
    fn drop(&mut self) {
        if let Some(callback) = self.callback.take() {
            debug!(id = %self.id, "request torn down before completion");
            callback(Err(ApiError::Transport(TransportError::cancelled())));
        }
    }
}

/// Handle to one dispatched request.
///
/// Dropping the handle does not cancel the request.
#[derive(Debug)]
pub struct RequestHandle {
    id: Uuid,
    task: JoinHandle<()>,
}

impl RequestHandle {
    /// Identifier attached to this request's log events.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Abandon the request. Has no effect once the callback has run.
    ///
    /// The callback receives a `Cancelled` transport error. Work the
    /// transport already handed off keeps running: with `UreqTransport` the
    /// blocking call holds a thread of tokio's blocking pool until the
    /// response arrives or the request's `timeout` (60 seconds by default)
    /// elapses, and its result is discarded.
    pub fn cancel(&self) {
        self.task.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait until the callback has returned. Fails only if the callback
    /// panicked.
    pub async fn wait(self) -> Result<(), JoinError> {
        match self.task.await {
            Err(err) if err.is_cancelled() => Ok(()),
            other => other,
        }
    }
}
