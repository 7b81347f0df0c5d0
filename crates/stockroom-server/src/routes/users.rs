use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use stockroom_auth::{AuthError, PublicUser, SessionUser, UserInput};
use stockroom_commerce::UserId;
use tracing::info;

use super::{redirect_with_error, MessageQuery};
use crate::error::AppResult;
use crate::extract::{AdminUser, SessionCookie};
use crate::state::AppState;
use crate::views;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/add", get(add_form).post(add))
        .route("/edit/:id", get(edit_form).post(edit))
        .route("/delete/:id", post(delete))
}

async fn list(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Query(query): Query<MessageQuery>,
) -> AppResult<Html<String>> {
    let users = state.users.list().await?;
    Ok(Html(views::users::list(&user, &users, query.error())))
}

fn rejected(user: &SessionUser, editing: Option<&PublicUser>, input: &UserInput, error: &AuthError) -> Response {
    let html = views::users::form(user, editing, &input.username, input.role, Some(&error.to_string()));
    (StatusCode::BAD_REQUEST, Html(html)).into_response()
}

async fn add_form(AdminUser(user): AdminUser) -> Html<String> {
    Html(views::users::form(&user, None, "", Default::default(), None))
}

async fn add(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Form(input): Form<UserInput>,
) -> AppResult<Response> {
    match state.users.create(&input).await {
        Ok(created) => {
            info!(admin = %user.username, user = %created.username, role = %created.role, "user created");
            Ok(Redirect::to("/users").into_response())
        }
        Err(e) if e.is_client_error() => Ok(rejected(&user, None, &input, &e)),
        Err(e) => Err(e.into()),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.users.get(&UserId::from(id)).await {
        Ok(editing) => Ok(Html(views::users::form(
            &user,
            Some(&editing),
            &editing.username,
            editing.role,
            None,
        ))
        .into_response()),
        Err(AuthError::UnknownUser(_)) => Ok(Redirect::to("/users").into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn edit(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    SessionCookie(cookie): SessionCookie,
    Path(id): Path<String>,
    Form(input): Form<UserInput>,
) -> AppResult<Response> {
    let id = UserId::from(id);
    match state.users.update(&id, &input).await {
        Ok(updated) => {
            info!(admin = %user.username, user = %updated.username, "user updated");
            // Editing yourself must show up in the current session.
            if updated.id == user.id {
                if let Some(cookie) = cookie {
                    state.sessions.refresh(&cookie, &SessionUser::from(&updated))?;
                }
            }
            Ok(Redirect::to("/users").into_response())
        }
        Err(AuthError::UnknownUser(_)) => Ok(redirect_with_error("/users", "User not found")),
        Err(e) if e.is_client_error() => {
            let editing = state.users.get(&id).await?;
            Ok(rejected(&user, Some(&editing), &input, &e))
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.users.delete(&UserId::from(id), &user.id).await {
        Ok(()) => Ok(Redirect::to("/users").into_response()),
        Err(AuthError::CannotDeleteSelf) => Ok(redirect_with_error(
            "/users",
            "You cannot delete your own account",
        )),
        Err(e) if e.is_client_error() => Ok(redirect_with_error("/users", &e.to_string())),
        Err(e) => Err(e.into()),
    }
}
