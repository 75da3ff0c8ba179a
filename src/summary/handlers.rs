use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::instrument;

use super::services::{status_for, summary_for, DayStatus, DaySummary};
use super::tdee::{bmr_mifflin_st_jeor, estimate_daily_target};
use crate::{error::reject, profile::repo::load_profile, state::AppState, week::calendar};

#[derive(Debug, Serialize)]
pub struct TdeeResponse {
    pub bmr: Option<f64>,
    pub daily_target: Option<u32>,
}

pub fn summary_routes() -> Router<AppState> {
    Router::new()
        .route("/summary/:date", get(get_summary))
        .route("/status/:date", get(get_status))
        .route("/tdee", get(get_tdee))
}

#[instrument(skip(state))]
pub async fn get_summary(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DaySummary>, (StatusCode, String)> {
    let date = calendar::parse_date(&date).map_err(reject)?;
    let summary = summary_for(&state, date).await.map_err(reject)?;
    Ok(Json(summary))
}

#[instrument(skip(state))]
pub async fn get_status(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayStatus>, (StatusCode, String)> {
    let date = calendar::parse_date(&date).map_err(reject)?;
    let status = status_for(&state, date).await.map_err(reject)?;
    Ok(Json(status))
}

#[instrument(skip(state))]
pub async fn get_tdee(
    State(state): State<AppState>,
) -> Result<Json<TdeeResponse>, (StatusCode, String)> {
    let profile = load_profile(state.store.as_ref()).await.map_err(reject)?;
    let daily_target = estimate_daily_target(&profile);
    Ok(Json(TdeeResponse {
        bmr: daily_target.map(|_| bmr_mifflin_st_jeor(&profile)),
        daily_target,
    }))
}
