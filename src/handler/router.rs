//! Request routing dispatch module
//!
//! Maps each inbound (method, path) to exactly one handler, enforces the
//! body-size limit on POSTs, converts handler errors to responses, and emits
//! the access log line.

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::{Method, Request, Response, StatusCode};

use crate::error::AppError;
use crate::handler::{files, users};
use crate::http::{self, cookie};
use crate::logger::{self, AccessLogEntry};
use crate::security::CsrfSigner;
use crate::state::AppState;

/// Main entry point for HTTP request handling
pub async fn handle_request(
    req: Request<hyper::body::Incoming>,
    state: Arc<AppState>,
    remote_addr: SocketAddr,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let mut entry = AccessLogEntry::new(
        remote_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.user_agent = req
        .headers()
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string);

    let response = match dispatch(req, &state).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    };

    if state
        .cached_access_log
        .load(std::sync::atomic::Ordering::Relaxed)
    {
        entry.status = response.status().as_u16();
        entry.body_bytes = response
            .headers()
            .get("content-length")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
            .unwrap_or(0);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

/// Dispatch to the matching handler
async fn dispatch(
    req: Request<hyper::body::Incoming>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, AppError> {
    let method = req.method().clone();
    let path = req.uri().path().to_string();

    match (method, path.as_str()) {
        (Method::GET, "/") => Ok(http::build_text_response(
            StatusCode::OK,
            "Bienvenue sur le serveur!",
        )),
        (Method::GET, "/hello") => Ok(http::build_text_response(StatusCode::OK, "Hello World!")),
        (Method::GET, "/form") => Ok(handle_form(&req, state)),
        (Method::GET, p) if p.starts_with("/files/") => {
            let raw_filename = &p["/files/".len()..];
            let (data, content_type) = files::read_upload(
                &state.config.storage.upload_dir,
                state.config.security.strict_path_check,
                raw_filename,
            )
            .await?;
            Ok(http::build_file_response(data, content_type))
        }
        (Method::GET, "/user") => users::lookup_users(state, req.uri().query()).await,
        (Method::POST, "/data") => handle_data(req, state).await,
        (Method::OPTIONS, _) => Ok(http::build_options_response()),
        (Method::GET | Method::POST, _) => {
            Ok(http::build_404_response("404 Not Found"))
        }
        _ => {
            logger::log_warning(&format!("Method not allowed on {path}"));
            Ok(http::build_405_response())
        }
    }
}

/// `GET /form`: issue a CSRF token, setting the secret cookie when absent
fn handle_form(req: &Request<hyper::body::Incoming>, state: &AppState) -> Response<Full<Bytes>> {
    let existing_secret = req
        .headers()
        .get("cookie")
        .and_then(|v| v.to_str().ok())
        .and_then(|h| cookie::get_cookie(h, "_csrf"))
        .filter(|s| !s.is_empty())
        .map(ToString::to_string);

    let (secret, set_cookie) = match existing_secret {
        Some(secret) => (secret, None),
        None => {
            let secret = CsrfSigner::generate_secret();
            let cookie = format!("_csrf={secret}; Path=/; HttpOnly; SameSite=Strict");
            (secret, Some(cookie))
        }
    };

    let token = state.csrf.issue(&secret);
    http::build_json_response(
        StatusCode::OK,
        &serde_json::json!({ "csrfToken": token }),
        set_cookie.as_deref(),
    )
}

/// `POST /data`: size-check and buffer the body, then hand off
async fn handle_data(
    req: Request<hyper::body::Incoming>,
    state: &AppState,
) -> Result<Response<Full<Bytes>>, AppError> {
    if let Some(resp) = check_body_size(req.headers(), state.config.http.max_body_size) {
        return Ok(resp);
    }

    let (parts, body) = req.into_parts();
    let cookie_header = header_str(&parts.headers, "cookie");
    let csrf_header = header_str(&parts.headers, "x-csrf-token");
    let content_type = header_str(&parts.headers, "content-type");

    let bytes = body
        .collect()
        .await
        .map_err(|_| AppError::InvalidBody)?
        .to_bytes();

    users::submit_data(
        state,
        cookie_header.as_deref(),
        csrf_header.as_deref(),
        content_type.as_deref(),
        &bytes,
    )
    .await
}

fn header_str(headers: &hyper::HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size(
    headers: &hyper::HeaderMap,
    max_body_size: u64,
) -> Option<Response<Full<Bytes>>> {
    let content_length = headers.get("content-length")?;
    let Ok(size_str) = content_length.to_str() else {
        logger::log_warning("Content-Length header contains non-ASCII characters");
        return None;
    };
    let Ok(size) = size_str.parse::<u64>() else {
        logger::log_warning(&format!(
            "Invalid Content-Length value: '{size_str}', skipping size check"
        ));
        return None;
    };
    if size > max_body_size {
        logger::log_error(&format!(
            "Request body too large: {size} bytes (max: {max_body_size})"
        ));
        return Some(http::build_413_response());
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use hyper::HeaderMap;

    fn headers_with_length(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("content-length", value.parse().unwrap());
        headers
    }

    #[test]
    fn test_body_size_over_limit_is_413() {
        let headers = headers_with_length("2048");
        let resp = check_body_size(&headers, 1024).unwrap();
        assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn test_body_size_at_limit_passes() {
        let headers = headers_with_length("1024");
        assert!(check_body_size(&headers, 1024).is_none());
    }

    #[test]
    fn test_missing_content_length_skips_check() {
        assert!(check_body_size(&HeaderMap::new(), 1024).is_none());
    }

    #[test]
    fn test_unparseable_content_length_skips_check() {
        let headers = headers_with_length("not-a-number");
        assert!(check_body_size(&headers, 1024).is_none());
    }
}
