use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::{get, post};
use axum::Router;
use stockroom_auth::SessionUser;
use stockroom_commerce::catalog::{Category, CategoryInput};
use stockroom_commerce::CommerceError;

use super::{redirect_with_error, MessageQuery};
use crate::error::AppResult;
use crate::extract::AdminUser;
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
    let categories = state.categories.list().await?;
    Ok(Html(views::categories::list(&user, &categories, query.error())))
}

fn rejected(user: &SessionUser, category: Option<&Category>, input: &CategoryInput, error: &CommerceError) -> Response {
    let html = views::categories::form(
        user,
        category,
        &input.name,
        input.description.as_deref().unwrap_or_default(),
        Some(&error.to_string()),
    );
    (StatusCode::BAD_REQUEST, Html(html)).into_response()
}

async fn add_form(AdminUser(user): AdminUser) -> Html<String> {
    Html(views::categories::form(&user, None, "", "", None))
}

async fn add(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Form(input): Form<CategoryInput>,
) -> AppResult<Response> {
    match state.categories.create(input.clone()).await {
        Ok(_) => Ok(Redirect::to("/categories").into_response()),
        Err(e) if e.is_client_error() => Ok(rejected(&user, None, &input, &e)),
        Err(e) => Err(e.into()),
    }
}

async fn edit_form(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.categories.get(&id).await {
        Ok(category) => Ok(Html(views::categories::form(
            &user,
            Some(&category),
            &category.name,
            category.description.as_deref().unwrap_or_default(),
            None,
        ))
        .into_response()),
        Err(e) if e.is_not_found() => Ok(Redirect::to("/categories").into_response()),
        Err(e) => Err(e.into()),
    }
}

async fn edit(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
    Form(input): Form<CategoryInput>,
) -> AppResult<Response> {
    match state.categories.update(&id, input.clone()).await {
        Ok(_) => Ok(Redirect::to("/categories").into_response()),
        Err(e) if e.is_not_found() => Ok(redirect_with_error("/categories", &e.to_string())),
        Err(e) if e.is_client_error() => {
            let category = state.categories.get(&id).await?;
            Ok(rejected(&user, Some(&category), &input, &e))
        }
        Err(e) => Err(e.into()),
    }
}

async fn delete(
    State(state): State<AppState>,
    AdminUser(_user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Response> {
    match state.categories.delete(&id).await {
        Ok(()) => Ok(Redirect::to("/categories").into_response()),
        Err(e) if e.is_client_error() => Ok(redirect_with_error("/categories", &e.to_string())),
        Err(e) => Err(e.into()),
    }
}
