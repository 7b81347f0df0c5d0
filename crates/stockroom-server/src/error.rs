//! Request-level errors and how they render.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use stockroom_auth::AuthError;
use stockroom_cache::CacheError;
use stockroom_commerce::CommerceError;
use stockroom_db::DbError;
use thiserror::Error;
use tracing::error;

use crate::views;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Commerce(#[from] CommerceError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Db(#[from] DbError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error("Media error: {0}")]
    Media(#[from] std::io::Error),

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Commerce(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            AppError::Commerce(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Auth(AuthError::UnknownUser(_)) => StatusCode::NOT_FOUND,
            AppError::Auth(e) if e.is_permission_error() => StatusCode::FORBIDDEN,
            AppError::Auth(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        (status, Html(views::error_page(status, &self.to_string()))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
