use base64ct::{Base64, Encoding};
use bytes::Bytes;
use time::Date;
use tracing::info;
use uuid::Uuid;

use super::cold::is_cold_food;
use super::dto::CreateLogRequest;
use super::repo;
use super::repo_types::MealLogEntry;
use crate::error::DiaryError;
use crate::images::{normalize_image, slot::PendingUpload, EncodedImage};
use crate::state::AppState;
use crate::week::calendar;

pub struct NewLogEntry {
    pub date: Date,
    pub meal: String,
    pub food: String,
    pub calories: i64,
    pub photo: Option<EncodedImage>,
}

/// Validates the input and fixes the entry's id and cold flag.
pub fn build_entry(new: NewLogEntry) -> Result<MealLogEntry, DiaryError> {
    let meal = new.meal.trim().to_string();
    let food = new.food.trim().to_string();
    if meal.is_empty() {
        return Err(DiaryError::InvalidInput("meal is required".into()));
    }
    if food.is_empty() {
        return Err(DiaryError::InvalidInput("food is required".into()));
    }
    let calories = u32::try_from(new.calories).map_err(|_| {
        DiaryError::InvalidInput(format!("calories must be between 0 and {}", u32::MAX))
    })?;

    Ok(MealLogEntry {
        id: Uuid::new_v4().to_string(),
        date: new.date,
        cold: is_cold_food(&food),
        meal,
        food,
        calories,
        photo: new.photo,
    })
}

pub async fn add_log(st: &AppState, req: CreateLogRequest) -> Result<MealLogEntry, DiaryError> {
    let date = match req.date.as_deref() {
        Some(raw) => calendar::parse_date(raw)?,
        None => calendar::today(st.config.utc_offset),
    };
    let (photo, ticket) = match req.photo_b64.as_deref() {
        Some(b64) if !b64.trim().is_empty() => {
            let raw = Base64::decode_vec(b64.trim())
                .map_err(|e| DiaryError::InvalidInput(format!("photo_b64: {}", e)))?;
            // log photos take the same single slot as cell uploads
            let ticket = st.uploads.begin(PendingUpload::LogPhoto {
                date: calendar::date_key(date),
                meal: req.meal.trim().to_string(),
            })?;
            let image = normalize_image(Bytes::from(raw), &st.config.image).await?;
            (Some(image), Some(ticket))
        }
        _ => (None, None),
    };

    let entry = build_entry(NewLogEntry {
        date,
        meal: req.meal,
        food: req.food,
        calories: req.calories,
        photo,
    })?;
    let store = st.store.as_ref();
    match &ticket {
        Some(t) => repo::append_checked(store, entry.clone(), || t.ensure_current()).await?,
        None => repo::append(store, entry.clone()).await?,
    }
    info!(entry_id = %entry.id, date = %entry.date, calories = entry.calories, cold = entry.cold, "meal logged");
    Ok(entry)
}

pub async fn remove_log(st: &AppState, id: &str) -> Result<bool, DiaryError> {
    let removed = repo::remove(st.store.as_ref(), id).await?;
    if removed {
        info!(entry_id = %id, "meal log removed");
    }
    Ok(removed)
}

pub async fn list_logs(st: &AppState, date: Option<Date>) -> Result<Vec<MealLogEntry>, DiaryError> {
    match date {
        Some(d) => repo::list_by_date(st.store.as_ref(), d).await,
        None => repo::list_all(st.store.as_ref()).await,
    }
}
