//! Client-side helper layer for JSON APIs over HTTP.
//!
//! # Overview
//! A caller describes a logical API call as an `ApiRequest`. The
//! `RequestPipeline` resolves it into a plain `HttpRequest`, a `Transport`
//! executes it, and the pipeline classifies the outcome into exactly one
//! `ApiResult`: a decoded JSON object or an `ApiError`.
//!
//! # Design
//! - Resolution and interpretation never touch the network, so they can be
//!   driven by a foreign host through the FFI crate (host-does-IO pattern).
//! - Url resolution, body resolution and status evaluation are injected
//!   strategies rather than overridable methods.
//! - `ApiClient::dispatch` runs a request on tokio and invokes its callback
//!   exactly once.

pub mod client;
pub mod decode;
pub mod encode;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod request;
pub mod strategy;
pub mod transport;

pub use client::{ApiClient, RequestHandle};
pub use decode::{decode_object, DecodeError, DecodeErrorKind, JsonObject};
pub use encode::{stringify_params, stringify_query};
pub use error::{ApiError, ErrorKind, TransportError, TransportErrorKind};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use pipeline::{ApiResult, RequestPipeline};
pub use request::ApiRequest;
pub use strategy::{AnySuccess, BodyResolver, OnlyOk, PathUrl, QueryBody, RequestUrl, StatusPolicy, UrlResolver};
pub use transport::{Transport, UreqTransport};
