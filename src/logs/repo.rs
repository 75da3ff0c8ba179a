use time::Date;

use super::repo_types::MealLogEntry;
use crate::error::DiaryError;
use crate::storage::{Collection, KvStore};

pub const LOGS: Collection<Vec<MealLogEntry>> = Collection::new("diet_logs_v1");

/// All entries in insertion order.
pub async fn list_all(store: &dyn KvStore) -> Result<Vec<MealLogEntry>, DiaryError> {
    LOGS.get(store).await
}

pub async fn list_by_date(store: &dyn KvStore, date: Date) -> Result<Vec<MealLogEntry>, DiaryError> {
    let mut entries = list_all(store).await?;
    entries.retain(|e| e.date == date);
    Ok(entries)
}

pub async fn append(store: &dyn KvStore, entry: MealLogEntry) -> Result<(), DiaryError> {
    LOGS.update(store, |entries| {
        entries.push(entry.clone());
        Ok(())
    })
    .await
}

/// Appends only while `still_wanted` holds; it is checked on every attempt,
/// right before the write is staged.
pub async fn append_checked<G>(
    store: &dyn KvStore,
    entry: MealLogEntry,
    still_wanted: G,
) -> Result<(), DiaryError>
where
    G: Fn() -> Result<(), DiaryError>,
{
    LOGS.update(store, |entries| {
        still_wanted()?;
        entries.push(entry.clone());
        Ok(())
    })
    .await
}

/// Returns whether an entry with `id` existed.
pub async fn remove(store: &dyn KvStore, id: &str) -> Result<bool, DiaryError> {
    let exists = list_all(store).await?.iter().any(|e| e.id == id);
    if !exists {
        return Ok(false);
    }
    LOGS.update(store, |entries| {
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    })
    .await
}
