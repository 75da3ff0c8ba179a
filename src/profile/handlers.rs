use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde_json::{Map, Value};
use tracing::{info, instrument};

use super::dto::ProfileResponse;
use super::normalize::{normalize, unrecognized_keys};
use super::repo::{load_profile, save_profile};
use crate::{error::reject, state::AppState, summary::tdee::estimate_daily_target};

pub fn profile_routes() -> Router<AppState> {
    Router::new().route("/profile", get(get_profile).put(put_profile))
}

#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let profile = load_profile(state.store.as_ref()).await.map_err(reject)?;
    Ok(Json(ProfileResponse {
        daily_target: estimate_daily_target(&profile),
        profile,
        ignored_keys: Vec::new(),
    }))
}

/// Accepts any object; recognized keys are normalized, the rest reported back.
#[instrument(skip(state, raw))]
pub async fn put_profile(
    State(state): State<AppState>,
    Json(raw): Json<Map<String, Value>>,
) -> Result<Json<ProfileResponse>, (StatusCode, String)> {
    let profile = normalize(&raw);
    save_profile(state.store.as_ref(), &profile)
        .await
        .map_err(reject)?;

    let daily_target = estimate_daily_target(&profile);
    info!(?daily_target, "profile saved");
    Ok(Json(ProfileResponse {
        daily_target,
        profile,
        ignored_keys: unrecognized_keys(&raw),
    }))
}
