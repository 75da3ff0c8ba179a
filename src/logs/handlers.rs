use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Json, Router,
};
use tracing::instrument;

use super::dto::{CreateLogRequest, DateQuery, DeleteLogResponse};
use super::repo_types::MealLogEntry;
use super::services::{add_log, list_logs, remove_log};
use crate::{error::reject, state::AppState, week::calendar};

pub fn log_routes() -> Router<AppState> {
    Router::new()
        .route("/logs", get(list_entries).post(create_entry))
        .route("/logs/:id", delete(delete_entry))
}

#[instrument(skip(state))]
pub async fn list_entries(
    State(state): State<AppState>,
    Query(q): Query<DateQuery>,
) -> Result<Json<Vec<MealLogEntry>>, (StatusCode, String)> {
    let date = q
        .date
        .as_deref()
        .map(calendar::parse_date)
        .transpose()
        .map_err(reject)?;
    let entries = list_logs(&state, date).await.map_err(reject)?;
    Ok(Json(entries))
}

#[instrument(skip(state, payload))]
pub async fn create_entry(
    State(state): State<AppState>,
    Json(payload): Json<CreateLogRequest>,
) -> Result<(StatusCode, Json<MealLogEntry>), (StatusCode, String)> {
    let entry = add_log(&state, payload).await.map_err(reject)?;
    Ok((StatusCode::CREATED, Json(entry)))
}

#[instrument(skip(state))]
pub async fn delete_entry(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteLogResponse>, (StatusCode, String)> {
    let deleted = remove_log(&state, &id).await.map_err(reject)?;
    Ok(Json(DeleteLogResponse { id, deleted }))
}
