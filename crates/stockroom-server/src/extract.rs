//! Request extractors for sessions, roles and AJAX detection.

use std::convert::Infallible;

use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use stockroom_auth::{Role, SessionUser};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;
use crate::views;

pub const LOGIN_PATH: &str = "/auth/login";

/// Value of the named cookie, if the request carries it.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.trim())
}

/// `Set-Cookie` value for a new session.
pub fn session_cookie(name: &str, value: &str, max_age_secs: u64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        name, value, max_age_secs
    )
}

/// `Set-Cookie` value that removes the session cookie.
pub fn clear_cookie(name: &str) -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", name)
}

/// Raw session cookie, if any.
pub struct SessionCookie(pub Option<String>);

#[async_trait]
impl FromRequestParts<AppState> for SessionCookie {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        Ok(SessionCookie(
            cookie_value(&parts.headers, state.cookie_name()).map(str::to_string),
        ))
    }
}

/// The logged-in user, or `None` for anonymous requests.
pub struct MaybeUser(pub Option<SessionUser>);

#[async_trait]
impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let Some(cookie) = cookie_value(&parts.headers, state.cookie_name()) else {
            return Ok(MaybeUser(None));
        };
        Ok(MaybeUser(state.sessions.current(cookie)?))
    }
}

/// Any logged-in user. Anonymous requests are sent to the login page.
pub struct CurrentUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        match MaybeUser::from_request_parts(parts, state).await {
            Ok(MaybeUser(Some(user))) => Ok(CurrentUser(user)),
            Ok(MaybeUser(None)) => Err(Redirect::to(LOGIN_PATH).into_response()),
            Err(e) => Err(e.into_response()),
        }
    }
}

fn forbidden(user: &SessionUser, required: Role, path: &str) -> Response {
    warn!(user = %user.username, role = %user.role, required = %required, path, "access denied");
    let message = match required {
        Role::Admin => "Access denied: administrator rights are required to manage products, categories and users.",
        _ => "Access denied: staff rights are required for this page.",
    };
    (
        StatusCode::FORBIDDEN,
        Html(views::error_page(StatusCode::FORBIDDEN, message)),
    )
        .into_response()
}

async fn require_role(parts: &mut Parts, state: &AppState, required: Role) -> Result<SessionUser, Response> {
    let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
    if user.has_permission(required) {
        Ok(user)
    } else {
        Err(forbidden(&user, required, parts.uri.path()))
    }
}

/// A logged-in admin.
pub struct AdminUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Admin).await.map(AdminUser)
    }
}

/// A logged-in staff member or admin.
pub struct StaffUser(pub SessionUser);

#[async_trait]
impl FromRequestParts<AppState> for StaffUser {
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        require_role(parts, state, Role::Staff).await.map(StaffUser)
    }
}

/// Whether the client asked for JSON instead of a redirect.
pub struct Ajax(pub bool);

pub fn is_ajax(headers: &HeaderMap) -> bool {
    let xhr = headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.eq_ignore_ascii_case("XMLHttpRequest"))
        .unwrap_or(false);
    let wants_json = headers
        .get(header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("json"))
        .unwrap_or(false);
    xhr || wants_json
}

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for Ajax {
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Ajax(is_ajax(&parts.headers)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_cookie_value() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; stockroom_sid=sess_abc ; other=1"),
        );
        assert_eq!(cookie_value(&headers, "stockroom_sid"), Some("sess_abc"));
        assert_eq!(cookie_value(&headers, "theme"), Some("dark"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn test_is_ajax() {
        let mut headers = HeaderMap::new();
        assert!(!is_ajax(&headers));

        headers.insert("x-requested-with", HeaderValue::from_static("XMLHttpRequest"));
        assert!(is_ajax(&headers));

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json, */*"));
        assert!(is_ajax(&headers));

        headers.insert(header::ACCEPT, HeaderValue::from_static("text/html"));
        assert!(!is_ajax(&headers));
    }

    #[test]
    fn test_cookie_strings() {
        assert_eq!(
            session_cookie("sid", "sess_x", 60),
            "sid=sess_x; Path=/; HttpOnly; SameSite=Lax; Max-Age=60"
        );
        assert!(clear_cookie("sid").contains("Max-Age=0"));
    }
}
