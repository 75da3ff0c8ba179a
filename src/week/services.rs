use tracing::{debug, info, warn};
use uuid::Uuid;

use super::repo::{self, ROWS};
use super::repo_types::WeekRow;
use crate::error::DiaryError;
use crate::photos::repo::OVERRIDES;
use crate::state::AppState;
use crate::storage::MAX_CAS_ATTEMPTS;

pub const PLACEHOLDER_TITLE: &str = "Untitled meal";

pub fn default_rows() -> Vec<WeekRow> {
    vec![
        WeekRow::new("breakfast", "Breakfast"),
        WeekRow::new("lunch", "Lunch"),
        WeekRow::new("dinner", "Dinner"),
        WeekRow::new("snack", "Snack"),
    ]
}

fn clean_title(raw: &str) -> String {
    let t = raw.trim();
    if t.is_empty() {
        PLACEHOLDER_TITLE.to_string()
    } else {
        t.to_string()
    }
}

fn new_row_id(existing: &[WeekRow]) -> String {
    loop {
        let id = format!("row-{}", Uuid::new_v4().simple());
        if existing.iter().all(|r| r.id != id) {
            return id;
        }
    }
}

fn row_not_found(week_key: &str, row_id: &str) -> DiaryError {
    DiaryError::NotFound(format!("row `{}` in week {}", row_id, week_key))
}

/// Rows of the week, seeding and saving the default four on first access.
pub async fn list_rows(st: &AppState, week_key: &str) -> Result<Vec<WeekRow>, DiaryError> {
    let store = st.store.as_ref();
    if let Some(rows) = repo::find_week(store, week_key).await? {
        return Ok(rows);
    }
    let rows = ROWS
        .update(store, |weeks| {
            Ok(weeks
                .entry(week_key.to_string())
                .or_insert_with(default_rows)
                .clone())
        })
        .await?;
    debug!(%week_key, "week initialized with default rows");
    Ok(rows)
}

pub async fn add_row(st: &AppState, week_key: &str, title: &str) -> Result<WeekRow, DiaryError> {
    let title = clean_title(title);
    let row = ROWS
        .update(st.store.as_ref(), |weeks| {
            let rows = weeks
                .entry(week_key.to_string())
                .or_insert_with(default_rows);
            let row = WeekRow::new(new_row_id(rows), title.clone());
            rows.push(row.clone());
            Ok(row)
        })
        .await?;
    info!(%week_key, row_id = %row.id, title = %row.title, "row added");
    Ok(row)
}

/// Only the title changes; photos logged under the old title stop matching.
pub async fn rename_row(
    st: &AppState,
    week_key: &str,
    row_id: &str,
    title: &str,
) -> Result<WeekRow, DiaryError> {
    let title = clean_title(title);
    let row = ROWS
        .update(st.store.as_ref(), |weeks| {
            let rows = weeks
                .entry(week_key.to_string())
                .or_insert_with(default_rows);
            let row = rows
                .iter_mut()
                .find(|r| r.id == row_id)
                .ok_or_else(|| row_not_found(week_key, row_id))?;
            row.title = title.clone();
            Ok(row.clone())
        })
        .await?;
    info!(%week_key, %row_id, title = %row.title, "row renamed");
    Ok(row)
}

/// Removes the row and every override keyed to its id, on any date, in one
/// commit. Returns how many overrides went with it.
///
/// Default row ids (`lunch`, ...) are shared by every week, so deleting a
/// default row also clears that row's overrides in other weeks that still
/// list it; those cells fall back to log photos.
pub async fn delete_row(st: &AppState, week_key: &str, row_id: &str) -> Result<usize, DiaryError> {
    let store = st.store.as_ref();
    for attempt in 1..=MAX_CAS_ATTEMPTS {
        let mut rows = ROWS.load(store).await?;
        let mut overrides = OVERRIDES.load(store).await?;

        let week = rows
            .value
            .entry(week_key.to_string())
            .or_insert_with(default_rows);
        let pos = week
            .iter()
            .position(|r| r.id == row_id)
            .ok_or_else(|| row_not_found(week_key, row_id))?;
        week.remove(pos);
        let cleared = overrides.value.remove_row(row_id);

        // overrides are always staged so a concurrent set for this row conflicts
        let writes = vec![ROWS.stage(&rows)?, OVERRIDES.stage(&overrides)?];
        match store.commit(writes).await {
            Ok(()) => {
                info!(%week_key, %row_id, cleared, "row deleted");
                return Ok(cleared);
            }
            Err(DiaryError::Conflict(key)) => {
                debug!(%key, attempt, "row delete raced, retrying");
            }
            Err(e) => return Err(e),
        }
    }
    warn!(%week_key, %row_id, "row delete kept conflicting");
    Err(DiaryError::Conflict(ROWS.key().to_string()))
}

/// Back to the default four rows. Overrides are left alone; ones pointing at
/// rows that are gone simply stop resolving.
pub async fn reset_week(st: &AppState, week_key: &str) -> Result<Vec<WeekRow>, DiaryError> {
    let rows = ROWS
        .update(st.store.as_ref(), |weeks| {
            let rows = default_rows();
            weeks.insert(week_key.to_string(), rows.clone());
            Ok(rows)
        })
        .await?;
    info!(%week_key, "week reset to default rows");
    Ok(rows)
}

#[cfg(test)]
mod week_tests {
    use super::*;
    use crate::images::EncodedImage;
    use crate::photos::repo::{get_override, set_override};
    use time::macros::date;

    const WEEK: &str = "2025-01-06";

    fn img() -> EncodedImage {
        EncodedImage::from_jpeg(b"jpeg")
    }

    #[tokio::test]
    async fn first_listing_seeds_and_persists_defaults() {
        let st = AppState::fake();
        assert!(repo::find_week(st.store.as_ref(), WEEK).await.unwrap().is_none());
        let rows = list_rows(&st, WEEK).await.unwrap();
        let ids: Vec<_> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["breakfast", "lunch", "dinner", "snack"]);
        assert_eq!(repo::find_week(st.store.as_ref(), WEEK).await.unwrap(), Some(rows));
    }

    #[tokio::test]
    async fn added_rows_append_with_unique_ids() {
        let st = AppState::fake();
        let a = add_row(&st, WEEK, "  Late snack ").await.unwrap();
        let b = add_row(&st, WEEK, "   ").await.unwrap();
        assert_eq!(a.title, "Late snack");
        assert_eq!(b.title, PLACEHOLDER_TITLE);
        assert_ne!(a.id, b.id);

        let rows = list_rows(&st, WEEK).await.unwrap();
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[4], a);
        assert_eq!(rows[5], b);
    }

    #[tokio::test]
    async fn rename_trims_and_keeps_id() {
        let st = AppState::fake();
        let row = rename_row(&st, WEEK, "lunch", " Brunch ").await.unwrap();
        assert_eq!(row, WeekRow::new("lunch", "Brunch"));
        let blank = rename_row(&st, WEEK, "lunch", "").await.unwrap();
        assert_eq!(blank.title, PLACEHOLDER_TITLE);
        let err = rename_row(&st, WEEK, "nope", "x").await.unwrap_err();
        assert!(matches!(err, DiaryError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_cascades_overrides_across_dates() {
        let st = AppState::fake();
        let store = st.store.as_ref();
        let row = add_row(&st, WEEK, "Tea").await.unwrap();
        set_override(store, date!(2025 - 01 - 06), &row.id, img()).await.unwrap();
        set_override(store, date!(2025 - 03 - 12), &row.id, img()).await.unwrap();
        set_override(store, date!(2025 - 01 - 06), "lunch", img()).await.unwrap();

        assert_eq!(delete_row(&st, WEEK, &row.id).await.unwrap(), 2);
        assert!(list_rows(&st, WEEK).await.unwrap().iter().all(|r| r.id != row.id));
        assert!(get_override(store, date!(2025 - 01 - 06), &row.id).await.unwrap().is_none());
        assert!(get_override(store, date!(2025 - 03 - 12), &row.id).await.unwrap().is_none());
        assert!(get_override(store, date!(2025 - 01 - 06), "lunch").await.unwrap().is_some());

        let again = delete_row(&st, WEEK, &row.id).await.unwrap_err();
        assert!(matches!(again, DiaryError::NotFound(_)));
    }

    #[tokio::test]
    async fn reset_restores_defaults_but_keeps_overrides() {
        let st = AppState::fake();
        let row = add_row(&st, WEEK, "Tea").await.unwrap();
        set_override(st.store.as_ref(), date!(2025 - 01 - 07), &row.id, img())
            .await
            .unwrap();

        let rows = reset_week(&st, WEEK).await.unwrap();
        assert_eq!(rows, default_rows());
        assert!(get_override(st.store.as_ref(), date!(2025 - 01 - 07), &row.id)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn deleting_a_default_row_clears_it_in_other_weeks() {
        let st = AppState::fake();
        let store = st.store.as_ref();
        set_override(store, date!(2025 - 01 - 14), "lunch", img()).await.unwrap();

        assert_eq!(delete_row(&st, WEEK, "lunch").await.unwrap(), 1);
        assert!(list_rows(&st, "2025-01-13").await.unwrap().iter().any(|r| r.id == "lunch"));
        assert!(get_override(store, date!(2025 - 01 - 14), "lunch").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn weeks_are_independent() {
        let st = AppState::fake();
        add_row(&st, WEEK, "Tea").await.unwrap();
        assert_eq!(list_rows(&st, "2025-01-13").await.unwrap(), default_rows());
    }
}
