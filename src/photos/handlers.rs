use axum::{
    extract::{DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use bytes::Bytes;
use tracing::instrument;

use super::dto::{CancelledUploadResponse, CellPhotoResponse, ClearedResponse, PendingUploadResponse};
use super::services::{remove_override, resolve_cell, upload_override, EffectivePhoto, PhotoSource};
use crate::{error::reject, state::AppState, week::calendar};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/photos/:date/:row_id", get(get_cell_photo))
        .route("/uploads/pending", get(get_pending_upload))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/photos/:date/:row_id",
            delete(clear_cell_photo).put(put_cell_photo),
        )
        .route("/uploads/pending", delete(cancel_pending_upload))
        .layer(DefaultBodyLimit::max(20 * 1024 * 1024)) // 20MB
}

#[instrument(skip(state))]
pub async fn get_cell_photo(
    State(state): State<AppState>,
    Path((date, row_id)): Path<(String, String)>,
) -> Result<Json<CellPhotoResponse>, (StatusCode, String)> {
    let day = calendar::parse_date(&date).map_err(reject)?;
    let photo = resolve_cell(&state, day, &row_id).await.map_err(reject)?;
    Ok(Json(CellPhotoResponse {
        date: calendar::date_key(day),
        row_id,
        photo,
    }))
}

/// PUT /photos/:date/:row_id, body is the raw image file.
#[instrument(skip(state, body), fields(bytes = body.len()))]
pub async fn put_cell_photo(
    State(state): State<AppState>,
    Path((date, row_id)): Path<(String, String)>,
    body: Bytes,
) -> Result<Json<CellPhotoResponse>, (StatusCode, String)> {
    if body.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "image body is required".into()));
    }
    let day = calendar::parse_date(&date).map_err(reject)?;
    let image = upload_override(&state, day, &row_id, body)
        .await
        .map_err(reject)?;
    Ok(Json(CellPhotoResponse {
        date: calendar::date_key(day),
        row_id,
        photo: Some(EffectivePhoto {
            image,
            source: PhotoSource::Override,
        }),
    }))
}

#[instrument(skip(state))]
pub async fn clear_cell_photo(
    State(state): State<AppState>,
    Path((date, row_id)): Path<(String, String)>,
) -> Result<Json<ClearedResponse>, (StatusCode, String)> {
    let day = calendar::parse_date(&date).map_err(reject)?;
    let cleared = remove_override(&state, day, &row_id)
        .await
        .map_err(reject)?;
    Ok(Json(ClearedResponse {
        date: calendar::date_key(day),
        row_id,
        cleared,
    }))
}

pub async fn get_pending_upload(State(state): State<AppState>) -> Json<PendingUploadResponse> {
    Json(PendingUploadResponse {
        pending: state.uploads.pending(),
    })
}

#[instrument(skip(state))]
pub async fn cancel_pending_upload(State(state): State<AppState>) -> Json<CancelledUploadResponse> {
    Json(CancelledUploadResponse {
        cancelled: state.uploads.cancel(),
    })
}
