//! Session cookie handling for nomboard-dash
//!
//! Wraps the framework-independent `SessionGate` with axum handlers and
//! middleware:
//! - `GET /api/auth/check`
//! - `POST /api/auth/login`
//! - `POST /api/auth/logout`
//! - `require_session` for protected routes

use axum::{
    body::Bytes,
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use nomboard_common::session::{SESSION_COOKIE_NAME, SESSION_MAX_AGE};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::AppState;

// ========================================
// Cookie helpers
// ========================================

/// `Set-Cookie` value establishing a session
///
/// `Secure` is set outside development so the cookie never travels over
/// plain HTTP in production.
pub fn session_cookie(token: &str, secure: bool) -> String {
    build_cookie(&encode_cookie_value(token), SESSION_MAX_AGE.as_secs(), secure)
}

/// `Set-Cookie` value removing the session
pub fn cleared_session_cookie(secure: bool) -> String {
    build_cookie("", 0, secure)
}

fn build_cookie(value: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; Max-Age={}; HttpOnly; SameSite=Strict",
        SESSION_COOKIE_NAME, value, max_age
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Session token from the request's `Cookie` headers, if any
pub fn read_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .and_then(|(_, value)| decode_cookie_value(value))
}

/// Percent-encode everything outside the RFC 3986 unreserved set
fn encode_cookie_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'.' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }
    encoded
}

/// Reverse of `encode_cookie_value`; `None` on malformed escapes
fn decode_cookie_value(value: &str) -> Option<String> {
    let bytes = value.as_bytes();
    let mut decoded = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = value.get(i + 1..i + 3)?;
            decoded.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            decoded.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(decoded).ok()
}

// ========================================
// Handlers
// ========================================

/// GET /api/auth/check
///
/// 200 `{authenticated: true}` with a valid session cookie, 401 otherwise.
pub async fn check_session(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = read_session_cookie(&headers);

    if state.gate.verify(token.as_deref()) {
        (StatusCode::OK, Json(json!({ "authenticated": true }))).into_response()
    } else {
        (StatusCode::UNAUTHORIZED, Json(json!({ "authenticated": false }))).into_response()
    }
}

/// POST /api/auth/login
///
/// Body `{password: string}`. Every failure path waits the gate's fixed
/// delay before answering.
pub async fn login(State(state): State<AppState>, body: Bytes) -> Response {
    let password = serde_json::from_slice::<Value>(&body)
        .ok()
        .and_then(|json| json.get("password").and_then(Value::as_str).map(str::to_string))
        .filter(|password| !password.is_empty());

    let Some(password) = password else {
        state.gate.reject_delay().await;
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Password required" })),
        )
            .into_response();
    };

    let token = match state.gate.authenticate(Some(&password)).await {
        Ok(token) => token,
        Err(_) => {
            warn!("Rejected login attempt");
            return (
                StatusCode::UNAUTHORIZED,
                Json(json!({ "error": "Invalid password" })),
            )
                .into_response();
        }
    };

    let secure = !state.config.environment.is_development();
    let cookie = match HeaderValue::from_str(&session_cookie(token.as_str(), secure)) {
        Ok(cookie) => cookie,
        Err(e) => {
            warn!("Failed to build session cookie: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Server error" })),
            )
                .into_response();
        }
    };

    info!("Operator logged in");
    (
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(json!({ "success": true })),
    )
        .into_response()
}

/// POST /api/auth/logout
///
/// Always succeeds; expires the session cookie.
pub async fn logout(State(state): State<AppState>) -> Response {
    let secure = !state.config.environment.is_development();

    (
        StatusCode::OK,
        [(header::SET_COOKIE, cleared_session_cookie(secure))],
        Json(json!({ "success": true })),
    )
        .into_response()
}

// ========================================
// Middleware
// ========================================

/// Reject requests without a valid session cookie
///
/// Applied to every data and diagnostics route. Rejections wait the gate's
/// fixed delay and answer 401 `{error: "Unauthorized"}`.
pub async fn require_session(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let token = read_session_cookie(request.headers());

    if !state.gate.verify(token.as_deref()) {
        state.gate.reject_delay().await;
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "error": "Unauthorized" })),
        )
            .into_response();
    }

    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("pw", true);

        assert!(cookie.starts_with("auth_token=pw;"));
        assert!(cookie.contains("Max-Age=14400"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Strict"));
        assert!(cookie.contains("Path=/"));
        assert!(cookie.ends_with("; Secure"));

        assert!(!session_cookie("pw", false).contains("Secure"));
    }

    #[test]
    fn test_cleared_cookie_expires_immediately() {
        let cookie = cleared_session_cookie(false);
        assert!(cookie.starts_with("auth_token=;"));
        assert!(cookie.contains("Max-Age=0"));
    }

    #[test]
    fn test_cookie_value_round_trips_special_characters() {
        let secret = "p@ss; word=é%";
        let cookie = session_cookie(secret, false);
        let value = cookie.split(';').next().unwrap();

        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_str(value).unwrap());

        assert_eq!(read_session_cookie(&headers).as_deref(), Some(secret));
    }

    #[test]
    fn test_read_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("lang=fr; auth_token=abc123; other=1"),
        );

        assert_eq!(read_session_cookie(&headers).as_deref(), Some("abc123"));
    }

    #[test]
    fn test_read_cookie_absent_or_malformed() {
        let mut headers = HeaderMap::new();
        assert_eq!(read_session_cookie(&headers), None);

        headers.insert(header::COOKIE, HeaderValue::from_static("auth_token=%G1"));
        assert_eq!(read_session_cookie(&headers), None);
    }
}
