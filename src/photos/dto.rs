use serde::Serialize;

use super::services::EffectivePhoto;
use crate::images::slot::PendingUpload;
use crate::week::repo_types::WeekRow;

#[derive(Debug, Serialize)]
pub struct CellPhotoResponse {
    pub date: String,
    pub row_id: String,
    pub photo: Option<EffectivePhoto>,
}

#[derive(Debug, Serialize)]
pub struct ClearedResponse {
    pub date: String,
    pub row_id: String,
    pub cleared: bool,
}

#[derive(Debug, Serialize)]
pub struct CancelledUploadResponse {
    pub cancelled: Option<PendingUpload>,
}

#[derive(Debug, Serialize)]
pub struct PendingUploadResponse {
    pub pending: Option<PendingUpload>,
}

#[derive(Debug, Serialize)]
pub struct DayColumn {
    pub date: String,
    pub weekday: &'static str,
}

#[derive(Debug, Serialize)]
pub struct GridCell {
    pub date: String,
    pub photo: Option<EffectivePhoto>,
}

#[derive(Debug, Serialize)]
pub struct GridRow {
    #[serde(flatten)]
    pub row: WeekRow,
    pub cells: Vec<GridCell>,
}

/// Everything the weekly photo page renders.
#[derive(Debug, Serialize)]
pub struct WeekView {
    pub week_key: String,
    pub title: String,
    pub prev_week: String,
    pub next_week: String,
    pub days: Vec<DayColumn>,
    pub rows: Vec<GridRow>,
}
