//! Cookie header parsing module
//!
//! Minimal `Cookie:` request header parsing; this server only ever reads the
//! `_csrf` cookie. Attributes and quoting beyond RFC 6265 simple pairs are
//! not interpreted.

/// Extract a cookie value by name from a `Cookie` header value
pub fn get_cookie<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        if key.trim() == name {
            Some(value.trim())
        } else {
            None
        }
    })
}
