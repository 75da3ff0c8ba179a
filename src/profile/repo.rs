use serde_json::{Map, Value};

use super::normalize::{normalize, to_canonical};
use super::repo_types::Profile;
use crate::error::DiaryError;
use crate::storage::{Collection, KvStore};

/// Stored as a loose object so older, differently keyed saves still load.
pub const PROFILE: Collection<Map<String, Value>> = Collection::new("diet_profile_v1");

pub async fn load_profile(store: &dyn KvStore) -> Result<Profile, DiaryError> {
    Ok(normalize(&PROFILE.get(store).await?))
}

/// Replaces the stored profile wholesale.
pub async fn save_profile(store: &dyn KvStore, profile: &Profile) -> Result<(), DiaryError> {
    let canonical = to_canonical(profile)?;
    PROFILE
        .update(store, |stored| {
            *stored = canonical.clone();
            Ok(())
        })
        .await
}
