//! Verify resolution and interpretation against JSON test vectors stored in
//! `test-vectors/`.
//!
//! Each vector names an input and the expected outcome. Decoded objects are
//! compared as parsed JSON, never as raw strings.

use japi_core::{ApiRequest, HttpMethod, HttpResponse, RequestPipeline};

fn pipeline() -> RequestPipeline {
    RequestPipeline::new()
}

// ---------------------------------------------------------------------------
// Resolve
// ---------------------------------------------------------------------------

#[test]
fn resolve_test_vectors() {
    let raw = include_str!("../../test-vectors/resolve.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let p = pipeline();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let input = &case["input"];
        let expected = &case["expected_request"];

        let method: HttpMethod = input["method"].as_str().unwrap().parse().unwrap();
        let mut request = ApiRequest::new(method).with_url(input["url"].as_str().unwrap());
        for (key, value) in input["query"].as_object().unwrap() {
            request = request.with_query(key.as_str(), value.as_str().unwrap());
        }
        if let Some(body) = input["body"].as_str() {
            request = request.with_body(body.as_bytes().to_vec());
        }

        let resolved = p.resolve_request(&request);
        assert_eq!(resolved.method.as_str(), expected["method"].as_str().unwrap(), "{name}: method");
        assert_eq!(resolved.url.as_deref(), expected["url"].as_str(), "{name}: url");
        let body = resolved.body.map(|b| String::from_utf8(b).unwrap());
        assert_eq!(body.as_deref(), expected["body"].as_str(), "{name}: body");
    }
}

// ---------------------------------------------------------------------------
// Interpret
// ---------------------------------------------------------------------------

#[test]
fn response_test_vectors() {
    let raw = include_str!("../../test-vectors/responses.json");
    let vectors: serde_json::Value = serde_json::from_str(raw).unwrap();

    let p = pipeline();
    for case in vectors["cases"].as_array().unwrap() {
        let name = case["name"].as_str().unwrap();
        let body = case["body"].as_str().unwrap();
        let response = HttpResponse::new(case["status"].as_u64().unwrap() as u16, body);
        let expected = &case["expected"];

        match p.interpret_response(Ok(response)) {
            Ok(object) => {
                assert_eq!(
                    serde_json::Value::Object(object),
                    expected["ok"],
                    "{name}: decoded object"
                );
            }
            Err(err) => {
                let expected_err = &expected["error"];
                assert!(!expected_err.is_null(), "{name}: unexpected error {err}");
                assert_eq!(err.kind() as u64, expected_err["kind"].as_u64().unwrap(), "{name}: kind");
                assert_eq!(err.code(), expected_err["code"].as_i64().unwrap(), "{name}: code");
                assert_eq!(err.payload(), Some(body.as_bytes()), "{name}: payload");
            }
        }
    }
}
