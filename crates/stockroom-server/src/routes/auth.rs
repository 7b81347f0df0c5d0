use axum::extract::{Form, Query, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use stockroom_auth::{AuthError, Registration};
use tracing::info;

use crate::error::AppResult;
use crate::extract::{clear_cookie, session_cookie, MaybeUser, SessionCookie, LOGIN_PATH};
use crate::state::AppState;
use crate::views;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_form).post(login))
        .route("/logout", get(logout))
        .route("/register", get(register_form).post(register))
}

#[derive(Debug, Default, Deserialize)]
struct LoginQuery {
    registered: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

fn login_message(error: &AuthError) -> String {
    match error {
        AuthError::UnknownUser(_) => "Username does not exist".to_string(),
        AuthError::InvalidCredentials => "Incorrect password".to_string(),
        other => other.to_string(),
    }
}

async fn login_form(MaybeUser(user): MaybeUser, Query(query): Query<LoginQuery>) -> Response {
    if user.is_some() {
        return Redirect::to("/products").into_response();
    }
    let notice = query
        .registered
        .map(|_| "Registration successful. Please log in.");
    Html(views::auth::login(None, notice, "")).into_response()
}

async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> AppResult<Response> {
    match state.users.authenticate(&form.username, &form.password).await {
        Ok(user) => {
            let id = state.sessions.login(user)?;
            let cookie = session_cookie(state.cookie_name(), id.as_str(), state.sessions.ttl().as_secs());
            Ok(([(header::SET_COOKIE, cookie)], Redirect::to("/products")).into_response())
        }
        Err(e) if e.is_client_error() => {
            info!(user = %form.username, reason = %e, "login rejected");
            Ok(Html(views::auth::login(Some(&login_message(&e)), None, &form.username)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

async fn logout(State(state): State<AppState>, SessionCookie(cookie): SessionCookie) -> Response {
    if let Some(cookie) = cookie {
        state.sessions.logout(&cookie);
    }
    (
        [(header::SET_COOKIE, clear_cookie(state.cookie_name()))],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

async fn register_form(MaybeUser(user): MaybeUser) -> Response {
    if user.is_some() {
        return Redirect::to("/products").into_response();
    }
    Html(views::auth::register(None, "")).into_response()
}

async fn register(State(state): State<AppState>, Form(form): Form<Registration>) -> AppResult<Response> {
    match state.users.register(&form).await {
        Ok(user) => {
            info!(user = %user.username, "self-registration");
            Ok(Redirect::to(&format!("{}?registered=1", LOGIN_PATH)).into_response())
        }
        Err(e) if e.is_client_error() => {
            Ok(Html(views::auth::register(Some(&e.to_string()), &form.username)).into_response())
        }
        Err(e) => Err(e.into()),
    }
}
