use bytes::Bytes;
use serde::Serialize;
use time::Date;
use tracing::{info, warn};

use super::dto::{DayColumn, GridCell, GridRow, WeekView};
use super::repo::{self, PhotoOverrides};
use crate::error::DiaryError;
use crate::images::{normalize_image, slot::PendingUpload, EncodedImage};
use crate::logs::{repo as logs_repo, repo_types::MealLogEntry};
use crate::state::AppState;
use crate::week::{
    calendar::{self, date_key, WEEKDAY_NAMES},
    repo::find_week,
    repo_types::WeekRow,
    services::{default_rows, list_rows},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PhotoSource {
    Override,
    Log,
}

/// The photo a grid cell shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EffectivePhoto {
    pub image: EncodedImage,
    pub source: PhotoSource,
}

/// Override first; otherwise the photo of the last logged entry on that date
/// whose meal equals the row title exactly.
pub fn resolve_effective_photo(
    overrides: &PhotoOverrides,
    logs: &[MealLogEntry],
    date: Date,
    row: &WeekRow,
) -> Option<EffectivePhoto> {
    if let Some(image) = overrides.get(&date_key(date), &row.id) {
        return Some(EffectivePhoto {
            image: image.clone(),
            source: PhotoSource::Override,
        });
    }
    logs.iter()
        .rev()
        .filter(|e| e.date == date && e.meal == row.title)
        .find_map(|e| e.photo.clone())
        .map(|image| EffectivePhoto {
            image,
            source: PhotoSource::Log,
        })
}

/// The row `row_id` names in the week containing `date`, without creating
/// the week's default rows on disk.
async fn listed_row(st: &AppState, date: Date, row_id: &str) -> Result<Option<WeekRow>, DiaryError> {
    let week_key = calendar::week_key(date)?;
    let rows = find_week(st.store.as_ref(), &week_key)
        .await?
        .unwrap_or_else(default_rows);
    Ok(rows.into_iter().find(|r| r.id == row_id))
}

/// Resolves one cell without writing anything. A row id the week does not
/// list resolves to nothing.
pub async fn resolve_cell(
    st: &AppState,
    date: Date,
    row_id: &str,
) -> Result<Option<EffectivePhoto>, DiaryError> {
    let Some(row) = listed_row(st, date, row_id).await? else {
        return Ok(None);
    };
    let store = st.store.as_ref();
    let overrides = repo::load_overrides(store).await?;
    let logs = logs_repo::list_all(store).await?;
    Ok(resolve_effective_photo(&overrides, &logs, date, &row))
}

/// Normalizes `raw` and stores it as the cell's override. Holds the single
/// upload slot while the image is processed. Only rows the week lists
/// accept a photo.
pub async fn upload_override(
    st: &AppState,
    date: Date,
    row_id: &str,
    raw: Bytes,
) -> Result<EncodedImage, DiaryError> {
    if listed_row(st, date, row_id).await?.is_none() {
        return Err(DiaryError::NotFound(format!(
            "row `{}` in week of {}",
            row_id,
            date_key(date)
        )));
    }
    let ticket = st.uploads.begin(PendingUpload::Cell {
        date: date_key(date),
        row_id: row_id.to_string(),
    })?;

    let image = normalize_image(raw, &st.config.image).await?;
    let stored = repo::set_override_checked(st.store.as_ref(), date, row_id, image.clone(), || {
        ticket.ensure_current()
    })
    .await;
    if let Err(DiaryError::Superseded) = stored {
        warn!(date = %ticket.target().date(), %row_id, "upload finished after being superseded, discarding");
    }
    stored?;
    info!(
        date = %ticket.target().date(),
        %row_id,
        size = image.as_data_url().len(),
        "photo override stored"
    );
    Ok(image)
}

pub async fn remove_override(st: &AppState, date: Date, row_id: &str) -> Result<bool, DiaryError> {
    let cleared = repo::clear_override(st.store.as_ref(), date, row_id).await?;
    if cleared {
        info!(date = %date_key(date), %row_id, "photo override cleared");
    }
    Ok(cleared)
}

/// The week containing `date`: rows, seven day columns and every cell's photo.
pub async fn week_grid(st: &AppState, date: Date) -> Result<WeekView, DiaryError> {
    let monday = calendar::monday_of(date)?;
    debug_assert!(calendar::is_monday(monday));
    let week_key = date_key(monday);
    let dates = calendar::week_dates(monday)?;
    let rows = list_rows(st, &week_key).await?;

    let store = st.store.as_ref();
    let overrides = repo::load_overrides(store).await?;
    let logs = logs_repo::list_all(store).await?;

    let grid = rows
        .into_iter()
        .map(|row| GridRow {
            cells: dates
                .iter()
                .map(|d| GridCell {
                    date: date_key(*d),
                    photo: resolve_effective_photo(&overrides, &logs, *d, &row),
                })
                .collect(),
            row,
        })
        .collect();

    Ok(WeekView {
        title: format!("{} ~ {}", date_key(dates[0]), date_key(dates[6])),
        prev_week: date_key(calendar::shift_weeks(monday, -1)?),
        next_week: date_key(calendar::shift_weeks(monday, 1)?),
        days: dates
            .iter()
            .zip(WEEKDAY_NAMES)
            .map(|(d, weekday)| DayColumn {
                date: date_key(*d),
                weekday,
            })
            .collect(),
        rows: grid,
        week_key,
    })
}
