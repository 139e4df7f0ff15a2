//! A small JSON API used to exercise clients over real HTTP.
//!
//! Every route answers with a predictable shape so tests can assert on the
//! three failure domains of a client as well as on success.

use std::collections::HashMap;
use std::time::Duration;

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    routing::{any, get},
    Json, Router,
};
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::debug;

pub fn app() -> Router {
    Router::new()
        .route("/echo", get(echo).post(echo))
        .route("/array", get(array))
        .route("/malformed", get(malformed))
        .route("/status/{code}", any(status))
        .route("/slow/{ms}", get(slow))
        .route("/{api}/{version}/{action}", any(endpoint))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Decode an `application/x-www-form-urlencoded` style body into a JSON
/// object of strings. Pairs without `=` are dropped.
pub fn parse_form(body: &str) -> Map<String, Value> {
    body.split('&')
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            Some((decode(key), Value::String(decode(value))))
        })
        .collect()
}

fn decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

async fn echo(Query(query): Query<HashMap<String, String>>, body: String) -> Json<Value> {
    Json(json!({
        "query": query,
        "form": parse_form(&body),
    }))
}

async fn endpoint(
    Path((api, version, action)): Path<(String, String, String)>,
    body: String,
) -> Json<Value> {
    debug!(%api, %version, %action, "endpoint hit");
    Json(json!({
        "api": api,
        "version": version,
        "action": action,
        "params": parse_form(&body),
    }))
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<Value>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(json!({ "status": status.as_u16() })))
}

async fn array() -> Json<Value> {
    Json(json!([1, 2, 3]))
}

async fn malformed() -> (StatusCode, &'static str) {
    (StatusCode::OK, "not json")
}

async fn slow(Path(ms): Path<u64>) -> Json<Value> {
    tokio::time::sleep(Duration::from_millis(ms)).await;
    Json(json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_form_decodes_values() {
        let form = parse_form("name=Ada%20Lovelace&id=7");
        assert_eq!(form["name"], "Ada Lovelace");
        assert_eq!(form["id"], "7");
    }

    #[test]
    fn parse_form_empty_body() {
        assert!(parse_form("").is_empty());
    }

    #[test]
    fn parse_form_skips_pairs_without_equals() {
        let form = parse_form("flag&k=v");
        assert_eq!(form.len(), 1);
        assert_eq!(form["k"], "v");
    }

    #[test]
    fn parse_form_keeps_escaped_separators() {
        let form = parse_form("q=a%26b%3Dc");
        assert_eq!(form["q"], "a&b=c");
    }
}
