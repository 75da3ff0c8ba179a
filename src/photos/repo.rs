use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::error::DiaryError;
use crate::images::EncodedImage;
use crate::storage::{Collection, KvStore};
use crate::week::calendar::date_key;

/// Manual photos keyed by date key, then row id. A date with no overrides
/// left is removed, never kept as an empty map.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoOverrides(BTreeMap<String, BTreeMap<String, EncodedImage>>);

impl PhotoOverrides {
    pub fn get(&self, date: &str, row_id: &str) -> Option<&EncodedImage> {
        self.0.get(date).and_then(|rows| rows.get(row_id))
    }

    pub fn set(&mut self, date: &str, row_id: &str, image: EncodedImage) {
        self.0
            .entry(date.to_string())
            .or_default()
            .insert(row_id.to_string(), image);
    }

    /// Returns whether anything was removed.
    pub fn clear(&mut self, date: &str, row_id: &str) -> bool {
        let Some(rows) = self.0.get_mut(date) else {
            return false;
        };
        let removed = rows.remove(row_id).is_some();
        if rows.is_empty() {
            self.0.remove(date);
        }
        removed
    }

    /// Drops every override for `row_id` on any date; returns how many.
    pub fn remove_row(&mut self, row_id: &str) -> usize {
        let mut removed = 0;
        self.0.retain(|_, rows| {
            if rows.remove(row_id).is_some() {
                removed += 1;
            }
            !rows.is_empty()
        });
        removed
    }

    #[cfg(test)]
    pub fn has_date(&self, date: &str) -> bool {
        self.0.contains_key(date)
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

pub const OVERRIDES: Collection<PhotoOverrides> = Collection::new("diet_photo_overrides_v1");

pub async fn load_overrides(store: &dyn KvStore) -> Result<PhotoOverrides, DiaryError> {
    OVERRIDES.get(store).await
}

pub async fn get_override(
    store: &dyn KvStore,
    date: Date,
    row_id: &str,
) -> Result<Option<EncodedImage>, DiaryError> {
    Ok(load_overrides(store).await?.get(&date_key(date), row_id).cloned())
}

#[cfg(test)]
pub async fn set_override(
    store: &dyn KvStore,
    date: Date,
    row_id: &str,
    image: EncodedImage,
) -> Result<(), DiaryError> {
    set_override_checked(store, date, row_id, image, || Ok(())).await
}

/// Overwrites the cell's override while `still_wanted` holds. The check runs
/// inside every compare-and-swap attempt, so a failing check writes nothing.
pub async fn set_override_checked<G>(
    store: &dyn KvStore,
    date: Date,
    row_id: &str,
    image: EncodedImage,
    still_wanted: G,
) -> Result<(), DiaryError>
where
    G: Fn() -> Result<(), DiaryError>,
{
    let key = date_key(date);
    OVERRIDES
        .update(store, |all| {
            still_wanted()?;
            all.set(&key, row_id, image.clone());
            Ok(())
        })
        .await
}

pub async fn clear_override(store: &dyn KvStore, date: Date, row_id: &str) -> Result<bool, DiaryError> {
    if get_override(store, date, row_id).await?.is_none() {
        return Ok(false);
    }
    let key = date_key(date);
    OVERRIDES.update(store, |all| Ok(all.clear(&key, row_id))).await
}
