use super::repo_types::{WeekRow, WeekRows};
use crate::error::DiaryError;
use crate::storage::{Collection, KvStore};

pub const ROWS: Collection<WeekRows> = Collection::new("diet_week_rows_v1");

/// Rows of a week as stored; `None` if the week was never opened.
pub async fn find_week(store: &dyn KvStore, week_key: &str) -> Result<Option<Vec<WeekRow>>, DiaryError> {
    Ok(ROWS.get(store).await?.remove(week_key))
}
