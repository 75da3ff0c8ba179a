pub mod handlers;
pub mod services;
pub mod tdee;

use crate::state::AppState;
use axum::Router;

pub fn router() -> Router<AppState> {
    handlers::summary_routes()
}
