use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Serve a stored image by key.
pub(super) async fn serve(State(state): State<AppState>, Path(key): Path<String>) -> AppResult<Response> {
    let (bytes, content_type) = state
        .media
        .read(&key)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".to_string()))?;
    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        bytes,
    )
        .into_response())
}
