use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use serde_json::json;
use stockroom_commerce::audit::AuditAction;
use tracing::error;

use crate::error::{AppError, AppResult};
use crate::extract::AdminUser;
use crate::state::AppState;
use crate::views;

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/product/:id", get(by_product))
        .route("/user/:id", get(by_user))
        .route("/action/:action", get(by_action))
        .route("/api/stats", get(stats))
}

async fn list(State(state): State<AppState>, AdminUser(user): AdminUser) -> AppResult<Html<String>> {
    let logs = state.audit.all().await?;
    let stats = state.audit.stats().await?;
    Ok(Html(views::logs::list(&user, &logs, &stats)))
}

async fn by_product(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let logs = state.audit.by_product(&id).await?;
    let name = logs
        .first()
        .map(|l| l.product_name.clone())
        .unwrap_or(id);
    let heading = format!("Product history: {}", name);
    Ok(Html(views::logs::filtered(&user, &heading, &logs)))
}

async fn by_user(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let logs = state.audit.by_user(&id).await?;
    let name = logs.first().map(|l| l.username.clone()).unwrap_or(id);
    let heading = format!("Activity of {}", name);
    Ok(Html(views::logs::filtered(&user, &heading, &logs)))
}

async fn by_action(
    State(state): State<AppState>,
    AdminUser(user): AdminUser,
    Path(action): Path<String>,
) -> AppResult<Html<String>> {
    let action: AuditAction = action
        .to_uppercase()
        .parse()
        .map_err(|_| AppError::NotFound(format!("Unknown audit action: {}", action)))?;
    let logs = state.audit.by_action(action).await?;
    Ok(Html(views::logs::filtered(&user, &views::logs::action_heading(action), &logs)))
}

async fn stats(State(state): State<AppState>, AdminUser(_user): AdminUser) -> Response {
    match state.audit.stats().await {
        Ok(stats) => Json(stats).into_response(),
        Err(e) => {
            error!(error = %e, "audit stats failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": e.to_string() })),
            )
                .into_response()
        }
    }
}
