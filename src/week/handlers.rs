use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;

use super::calendar;
use super::dto::{DeletedRowResponse, RowTitleRequest, TodayResponse, WeekRowsResponse};
use super::repo_types::WeekRow;
use super::services::{add_row, delete_row, list_rows, rename_row, reset_week};
use crate::{
    error::reject,
    photos::{dto::WeekView, services::week_grid},
    state::AppState,
};

pub fn week_routes() -> Router<AppState> {
    Router::new()
        .route("/calendar/today", get(get_today))
        .route("/weeks/:date", get(get_week))
        .route("/weeks/:date/rows", get(get_rows).post(create_row))
        .route(
            "/weeks/:date/rows/:row_id",
            patch(update_row).delete(remove_row),
        )
        .route("/weeks/:date/reset", post(reset_rows))
}

pub async fn get_today(
    State(state): State<AppState>,
) -> Result<Json<TodayResponse>, (StatusCode, String)> {
    let today = calendar::today(state.config.utc_offset);
    let week_key = calendar::week_key(today).map_err(reject)?;
    Ok(Json(TodayResponse {
        today: calendar::date_key(today),
        week_key,
    }))
}

#[instrument(skip(state))]
pub async fn get_week(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<WeekView>, (StatusCode, String)> {
    let day = calendar::parse_date(&date).map_err(reject)?;
    let view = week_grid(&state, day).await.map_err(reject)?;
    Ok(Json(view))
}

#[instrument(skip(state))]
pub async fn get_rows(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<WeekRowsResponse>, (StatusCode, String)> {
    let week_key = calendar::week_key_for(&date).map_err(reject)?;
    let rows = list_rows(&state, &week_key).await.map_err(reject)?;
    Ok(Json(WeekRowsResponse { week_key, rows }))
}

#[instrument(skip(state))]
pub async fn create_row(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<RowTitleRequest>,
) -> Result<(StatusCode, Json<WeekRow>), (StatusCode, String)> {
    let week_key = calendar::week_key_for(&date).map_err(reject)?;
    let row = add_row(&state, &week_key, &payload.title)
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(row)))
}

#[instrument(skip(state))]
pub async fn update_row(
    State(state): State<AppState>,
    Path((date, row_id)): Path<(String, String)>,
    Json(payload): Json<RowTitleRequest>,
) -> Result<Json<WeekRow>, (StatusCode, String)> {
    let week_key = calendar::week_key_for(&date).map_err(reject)?;
    let row = rename_row(&state, &week_key, &row_id, &payload.title)
        .await
        .map_err(reject)?;
    Ok(Json(row))
}

#[instrument(skip(state))]
pub async fn remove_row(
    State(state): State<AppState>,
    Path((date, row_id)): Path<(String, String)>,
) -> Result<Json<DeletedRowResponse>, (StatusCode, String)> {
    let week_key = calendar::week_key_for(&date).map_err(reject)?;
    let overrides_removed = delete_row(&state, &week_key, &row_id)
        .await
        .map_err(reject)?;
    Ok(Json(DeletedRowResponse {
        week_key,
        row_id,
        overrides_removed,
    }))
}

#[instrument(skip(state))]
pub async fn reset_rows(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<WeekRowsResponse>, (StatusCode, String)> {
    let week_key = calendar::week_key_for(&date).map_err(reject)?;
    let rows = reset_week(&state, &week_key).await.map_err(reject)?;
    Ok(Json(WeekRowsResponse { week_key, rows }))
}
