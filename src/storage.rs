use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Mutex;

use anyhow::Context;
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::error::DiaryError;

/// Attempts `Collection::update` makes before giving up on a contended key.
pub const MAX_CAS_ATTEMPTS: usize = 5;

/// A stored blob together with the version it was written at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versioned {
    pub value: String,
    pub version: i64,
}

/// One staged write. `expected_version` is 0 when the key must not exist yet.
#[derive(Debug, Clone)]
pub struct Write {
    pub key: String,
    pub value: String,
    pub expected_version: i64,
}

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, DiaryError>;

    /// Applies every write or none of them.
    ///
    /// Fails with `Conflict` when any key moved past its expected version, and
    /// with `StorageCapacityExceeded` when the result would not fit.
    async fn commit(&self, writes: Vec<Write>) -> Result<(), DiaryError>;
}

/// Process-local store, used when no database is configured and in tests.
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Versioned>>,
    capacity: usize,
}

impl MemoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Writes a raw blob, bypassing versions and capacity.
    #[cfg(test)]
    pub fn seed(&self, key: &str, value: &str) {
        let mut entries = self.entries.lock().unwrap();
        let version = entries.get(key).map_or(0, |v| v.version) + 1;
        entries.insert(
            key.to_string(),
            Versioned {
                value: value.to_string(),
                version,
            },
        );
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, DiaryError> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;
        Ok(entries.get(key).cloned())
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<(), DiaryError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| anyhow::anyhow!("memory store lock poisoned"))?;

        for w in &writes {
            let current = entries.get(&w.key).map_or(0, |v| v.version);
            if current != w.expected_version {
                return Err(DiaryError::Conflict(w.key.clone()));
            }
        }

        let untouched: usize = entries
            .iter()
            .filter(|(k, _)| !writes.iter().any(|w| &w.key == *k))
            .map(|(k, v)| k.len() + v.value.len())
            .sum();
        let needed = untouched
            + writes
                .iter()
                .map(|w| w.key.len() + w.value.len())
                .sum::<usize>();
        if needed > self.capacity {
            warn!(needed, capacity = self.capacity, "memory store full, write refused");
            return Err(DiaryError::StorageCapacityExceeded {
                needed,
                capacity: self.capacity,
            });
        }

        for w in writes {
            let version = w.expected_version + 1;
            entries.insert(
                w.key,
                Versioned {
                    value: w.value,
                    version,
                },
            );
        }
        Ok(())
    }
}

/// A value read from a collection plus the version it came from.
#[derive(Debug, Clone)]
pub struct Snapshot<T> {
    pub value: T,
    pub version: i64,
}

/// Typed handle on one persisted collection.
pub struct Collection<T> {
    key: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Reads the collection. A blob that no longer parses is replaced by the
    /// default in memory only; the stored version is kept so the next write
    /// overwrites it.
    pub async fn load(&self, store: &dyn KvStore) -> Result<Snapshot<T>, DiaryError> {
        let Some(stored) = store.get(self.key).await? else {
            return Ok(Snapshot {
                value: T::default(),
                version: 0,
            });
        };
        let value = match serde_json::from_str::<T>(&stored.value) {
            Ok(v) => v,
            Err(e) => {
                warn!(key = self.key, error = %e, "malformed persisted data, using empty default");
                T::default()
            }
        };
        Ok(Snapshot {
            value,
            version: stored.version,
        })
    }

    pub async fn get(&self, store: &dyn KvStore) -> Result<T, DiaryError> {
        Ok(self.load(store).await?.value)
    }

    /// Builds the write that replaces `snapshot`'s version with its value.
    pub fn stage(&self, snapshot: &Snapshot<T>) -> Result<Write, DiaryError> {
        let value = serde_json::to_string(&snapshot.value)
            .with_context(|| format!("serialize collection {}", self.key))?;
        Ok(Write {
            key: self.key.to_string(),
            value,
            expected_version: snapshot.version,
        })
    }

    /// Load, mutate, compare-and-swap. The closure may run more than once when
    /// another writer gets in between; an error from it aborts without writing.
    pub async fn update<R, F>(&self, store: &dyn KvStore, mut mutate: F) -> Result<R, DiaryError>
    where
        F: FnMut(&mut T) -> Result<R, DiaryError>,
    {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            let mut snapshot = self.load(store).await?;
            let out = mutate(&mut snapshot.value)?;
            match store.commit(vec![self.stage(&snapshot)?]).await {
                Ok(()) => return Ok(out),
                Err(DiaryError::Conflict(key)) => {
                    debug!(%key, attempt, "version moved, retrying update");
                }
                Err(e) => return Err(e),
            }
        }
        warn!(key = self.key, "giving up after repeated conflicts");
        Err(DiaryError::Conflict(self.key.to_string()))
    }
}
