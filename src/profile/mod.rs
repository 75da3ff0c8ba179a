mod dto;
pub mod handlers;
pub mod normalize;
pub mod repo;
pub mod repo_types;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::profile_routes()
}
