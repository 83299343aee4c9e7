//! UTF-8 charset enforcement
//!
//! Counterpart of the classic servlet encoding filter: every response that
//! declares a content type leaves the server with an explicit UTF-8
//! charset, so no intermediary can guess a legacy encoding.

use axum::{
    extract::Request,
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};

/// Middleware that stamps `charset=utf-8` onto the response content type
pub async fn force_utf8_charset(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;

    let headers = response.headers_mut();
    let updated = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .filter(|ct| !ct.to_ascii_lowercase().contains("charset"))
        .map(|ct| format!("{}; charset=utf-8", ct));

    if let Some(updated) = updated {
        if let Ok(value) = HeaderValue::from_str(&updated) {
            headers.insert(header::CONTENT_TYPE, value);
        }
    }

    response
}
