//! HTTP routes.

mod auth;
mod cart;
mod categories;
mod logs;
mod media;
mod products;
mod users;

use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use tower::ServiceBuilder;

use crate::state::AppState;
use crate::telemetry::request_tracing;
use crate::views;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { Redirect::to("/products") }))
        .nest("/auth", auth::routes())
        .nest("/products", products::routes())
        .nest("/categories", categories::routes())
        .nest("/users", users::routes())
        .nest("/cart", cart::routes())
        .nest("/logs", logs::routes())
        .route("/media/*key", get(media::serve))
        .fallback(not_found)
        .layer(ServiceBuilder::new().layer(middleware::from_fn(request_tracing)))
        .with_state(state)
}

async fn not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(views::error_page(StatusCode::NOT_FOUND, "Page not found")),
    )
        .into_response()
}

/// `?error=` carried across a redirect.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct MessageQuery {
    pub error: Option<String>,
}

impl MessageQuery {
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref().filter(|e| !e.is_empty())
    }
}

/// Redirect back to a page with an error message in the query string.
pub(crate) fn redirect_with_error(path: &str, message: &str) -> Response {
    Redirect::to(&format!("{}?error={}", path, views::url_encode(message))).into_response()
}
