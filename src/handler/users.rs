//! User lookup and form submission endpoints
//!
//! `/user` reads `name` from the query string with no validation and runs
//! the posture-selected lookup. `/data` is the mitigated counterpart:
//! CSRF-verified, validated, parameterized insert.

use http_body_util::Full;
use hyper::body::Bytes;
use hyper::{Response, StatusCode};

use crate::db;
use crate::error::AppError;
use crate::http::{self, cookie, form};
use crate::security::escape_html;
use crate::state::AppState;

/// `GET /user?name=<string>`
///
/// Misses respond 200 with a not-found message rather than 404; the
/// inconsistency with `/files` is inherited behavior and kept.
pub async fn lookup_users(
    state: &AppState,
    query: Option<&str>,
) -> Result<Response<Full<Bytes>>, AppError> {
    let name = query
        .and_then(|q| form::query_param(q, "name"))
        .unwrap_or_default();

    let rows = if state.config.security.parameterized_lookup {
        db::find_users_parameterized(&state.db, &name).await?
    } else {
        db::find_users_concatenated(&state.db, &name).await?
    };

    if rows.is_empty() {
        return Ok(http::build_text_response(
            StatusCode::OK,
            "Utilisateur non trouvé",
        ));
    }
    let serialized = serde_json::to_string(&rows).map_err(|e| {
        AppError::Storage(sqlx::Error::Decode(Box::new(e)))
    })?;
    Ok(http::build_text_response(
        StatusCode::OK,
        &format!("Utilisateur trouvé : {serialized}"),
    ))
}

/// Fields extracted from a `/data` request body
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SubmitBody {
    /// Present only if the field was a string
    pub name: Option<String>,
    pub age: Option<String>,
    pub csrf_token: Option<String>,
}

/// `POST /data` with an urlencoded or JSON body `{name, age}`
pub async fn submit_data(
    state: &AppState,
    cookie_header: Option<&str>,
    csrf_header: Option<&str>,
    content_type: Option<&str>,
    body: &[u8],
) -> Result<Response<Full<Bytes>>, AppError> {
    let fields = parse_body(content_type, body)?;

    // CSRF gate runs before any validation or state change
    let secret = cookie_header
        .and_then(|h| cookie::get_cookie(h, "_csrf"))
        .ok_or(AppError::CsrfRejected)?;
    let token = csrf_header
        .or(fields.csrf_token.as_deref())
        .ok_or(AppError::CsrfRejected)?;
    if !state.csrf.verify(secret, token) {
        return Err(AppError::CsrfRejected);
    }

    let name = validate_name(fields.name.as_deref())?;
    let age = validate_age(fields.age.as_deref())?;

    db::insert_user(&state.db, &name, age).await?;

    // JSON payload, so escaping is defense in depth here
    let message = format!("Bonjour {}, vous avez {age} ans.", escape_html(&name));
    Ok(http::build_json_response(
        StatusCode::OK,
        &serde_json::json!({ "message": message }),
        None,
    ))
}

/// Decode the body fields from urlencoded or JSON form
pub fn parse_body(content_type: Option<&str>, body: &[u8]) -> Result<SubmitBody, AppError> {
    let is_json = content_type.is_some_and(|ct| ct.starts_with("application/json"));
    if is_json {
        let value: serde_json::Value =
            serde_json::from_slice(body).map_err(|_| AppError::InvalidBody)?;
        return Ok(SubmitBody {
            // A non-string name stays None and fails name validation later
            name: value.get("name").and_then(|v| v.as_str()).map(String::from),
            age: value.get("age").map(json_scalar_to_string),
            csrf_token: value
                .get("_csrf")
                .and_then(|v| v.as_str())
                .map(String::from),
        });
    }

    let text = std::str::from_utf8(body).map_err(|_| AppError::InvalidBody)?;
    let mut map = form::parse_urlencoded(text);
    Ok(SubmitBody {
        name: map.remove("name"),
        age: map.remove("age"),
        csrf_token: map.remove("_csrf"),
    })
}

fn json_scalar_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `name` must be a string that is non-empty after trimming
pub fn validate_name(name: Option<&str>) -> Result<String, AppError> {
    let trimmed = name.ok_or(AppError::InvalidName)?.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidName);
    }
    Ok(trimmed.to_string())
}

/// `age` must parse as an integer in [0, 120]
pub fn validate_age(age: Option<&str>) -> Result<i64, AppError> {
    let parsed: i64 = age
        .ok_or(AppError::InvalidAge)?
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidAge)?;
    if !(0..=120).contains(&parsed) {
        return Err(AppError::InvalidAge);
    }
    Ok(parsed)
}
