//! Form and query string decoding module
//!
//! Parses `application/x-www-form-urlencoded` bodies and URL query strings
//! into key/value pairs. Keys and values are percent-decoded; `+` in form
//! data decodes to a space. On a repeated key the first occurrence wins,
//! matching common body-parser behavior.

use std::collections::HashMap;

/// Parse an urlencoded string (query or form body) into a map
pub fn parse_urlencoded(input: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for pair in input.split('&') {
        if pair.is_empty() {
            continue;
        }
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        map.entry(decode_component(raw_key))
            .or_insert_with(|| decode_component(raw_value));
    }
    map
}

/// Look up a single parameter in a raw query string
pub fn query_param(query: &str, name: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
        if decode_component(raw_key) == name {
            Some(decode_component(raw_value))
        } else {
            None
        }
    })
}

/// Percent-decode one component, with `+` as space
///
/// Malformed percent sequences fall back to the raw text rather than failing
/// the whole request.
fn decode_component(raw: &str) -> String {
    let plus_decoded = raw.replace('+', " ");
    match urlencoding::decode(&plus_decoded) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => plus_decoded,
    }
}
