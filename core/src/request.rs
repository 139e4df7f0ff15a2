//! JSON-API request configuration.
//!
//! # Design
//! `ApiRequest` carries every field of the generic `HttpRequest` plus the
//! logical endpoint (`api`, `action`, `version`) and the `query` parameters.
//! It is never sent as-is: a `RequestPipeline` resolves it into an
//! `HttpRequest` first. An explicit `body` always takes precedence over a
//! body derived from `query`.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use crate::http::{HttpMethod, DEFAULT_TIMEOUT};

/// Describes one logical API call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: HttpMethod,
    pub url: Option<String>,
    pub headers: HashMap<String, String>,
    pub body: Option<Vec<u8>>,
    pub timeout: Duration,
    pub cellular: bool,
    pub api: String,
    pub action: String,
    pub version: String,
    pub query: BTreeMap<String, String>,
}

impl Default for ApiRequest {
    fn default() -> Self {
        Self {
            method: HttpMethod::Get,
            url: None,
            headers: HashMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT,
            cellular: true,
            api: String::new(),
            action: String::new(),
            version: String::new(),
            query: BTreeMap::new(),
        }
    }
}

impl ApiRequest {
    pub fn new(method: HttpMethod) -> Self {
        Self {
            method,
            ..Self::default()
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get).with_url(url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post).with_url(url)
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cellular(mut self, cellular: bool) -> Self {
        self.cellular = cellular;
        self
    }

    /// Set the logical endpoint used by URL resolvers such as `PathUrl`.
    pub fn with_endpoint(
        mut self,
        api: impl Into<String>,
        version: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.api = api.into();
        self.version = version.into();
        self.action = action.into();
        self
    }

    pub fn with_query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }
}
