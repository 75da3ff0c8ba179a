use serde::{Deserialize, Serialize};

use super::repo_types::WeekRow;

#[derive(Debug, Deserialize)]
pub struct RowTitleRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Serialize)]
pub struct WeekRowsResponse {
    pub week_key: String,
    pub rows: Vec<WeekRow>,
}

#[derive(Debug, Serialize)]
pub struct DeletedRowResponse {
    pub week_key: String,
    pub row_id: String,
    pub overrides_removed: usize,
}

#[derive(Debug, Serialize)]
pub struct TodayResponse {
    pub today: String,
    pub week_key: String,
}
