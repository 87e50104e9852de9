//! `projectflow_session` cookie, parsed and built with the `cookie` crate
//! that `tower-sessions` re-exports

use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use tower_sessions::cookie::time::Duration;
use tower_sessions::cookie::{Cookie, SameSite};

pub const SESSION_COOKIE_NAME: &str = "projectflow_session";

/// Session id carried by the request's `Cookie` headers, if any.
pub fn read_session_id(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

/// Session cookie living `max_age_secs`, HTTP-only and `SameSite=Lax` so the
/// provider redirect back to the callback still carries it.
pub fn session_cookie(session_id: &str, max_age_secs: u64) -> Cookie<'static> {
    let max_age = i64::try_from(max_age_secs).unwrap_or(i64::MAX);
    Cookie::build((SESSION_COOKIE_NAME, session_id.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(Duration::seconds(max_age))
        .build()
}

/// Append a `Set-Cookie` header when `cookie` is present. Session ids are
/// URL-safe base64, so the conversion only fails on a corrupted id.
pub fn append_session_cookie(headers: &mut HeaderMap, cookie: Option<&Cookie<'_>>) {
    if let Some(value) = cookie.and_then(|c| HeaderValue::from_str(&c.to_string()).ok()) {
        headers.append(SET_COOKIE, value);
    }
}
