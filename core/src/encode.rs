//! URL parameter encoding.
//!
//! Turns a flat string-keyed mapping into `key=value` pairs joined by `&`.
//! Values, never keys, are percent-encoded when asked to, escaping every
//! byte that is not an ASCII letter or digit.

use std::collections::BTreeMap;

use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use serde_json::{Map, Value};

/// Encode a mapping of JSON values. Entries whose value is not a JSON string
/// are skipped without error.
///
/// Pair order follows the map's iteration order; callers must not rely on it.
pub fn stringify_params(params: &Map<String, Value>, url_encode: bool) -> String {
    join_pairs(
        params
            .iter()
            .filter_map(|(key, value)| value.as_str().map(|v| (key.as_str(), v))),
        url_encode,
    )
}

/// Encode a mapping whose values are all strings.
pub fn stringify_query(query: &BTreeMap<String, String>, url_encode: bool) -> String {
    join_pairs(query.iter().map(|(k, v)| (k.as_str(), v.as_str())), url_encode)
}

fn join_pairs<'a>(pairs: impl Iterator<Item = (&'a str, &'a str)>, url_encode: bool) -> String {
    let mut out = String::new();
    for (key, value) in pairs {
        if !out.is_empty() {
            out.push('&');
        }
        out.push_str(key);
        out.push('=');
        if url_encode {
            out.extend(utf8_percent_encode(value, NON_ALPHANUMERIC));
        } else {
            out.push_str(value);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn empty_mapping_yields_empty_string() {
        assert_eq!(stringify_params(&Map::new(), true), "");
        assert_eq!(stringify_query(&BTreeMap::new(), false), "");
    }

    #[test]
    fn non_string_values_are_skipped() {
        let params = object(json!({
            "name": "ada",
            "age": 36,
            "admin": true,
            "tags": ["a"],
            "nothing": null,
            "nested": {"k": "v"}
        }));
        assert_eq!(stringify_params(&params, false), "name=ada");
    }

    #[test]
    fn pairs_are_joined_with_ampersand() {
        let params = object(json!({"a": "1", "b": "2"}));
        let out = stringify_params(&params, false);
        let mut pairs: Vec<&str> = out.split('&').collect();
        pairs.sort();
        assert_eq!(pairs, vec!["a=1", "b=2"]);
    }

    #[test]
    fn without_encoding_values_pass_through() {
        let mut query = BTreeMap::new();
        query.insert("q".to_string(), "a b&c=d".to_string());
        assert_eq!(stringify_query(&query, false), "q=a b&c=d");
    }

    #[test]
    fn encoding_escapes_everything_but_alphanumerics() {
        let mut query = BTreeMap::new();
        query.insert("q".to_string(), "a b-c.d_e~f/é".to_string());
        assert_eq!(stringify_query(&query, true), "q=a%20b%2Dc%2Ed%5Fe%7Ef%2F%C3%A9");
    }

    #[test]
    fn keys_are_never_encoded() {
        let mut query = BTreeMap::new();
        query.insert("a key".to_string(), "v v".to_string());
        assert_eq!(stringify_query(&query, true), "a key=v%20v");
    }

    #[test]
    fn encoded_values_stay_in_the_safe_set() {
        let params = object(json!({"x": "!*'();:@&=+$,/?#[] ü\n"}));
        let out = stringify_params(&params, true);
        let value = out.strip_prefix("x=").unwrap();
        assert!(value.chars().all(|c| c.is_ascii_alphanumeric() || c == '%'));
    }
}
