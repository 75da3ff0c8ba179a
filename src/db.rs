use anyhow::Context;
use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{info, warn};

use crate::error::DiaryError;
use crate::storage::{KvStore, Versioned, Write};

/// Postgres-backed key/value store. Every collection is one row in
/// `kv_entries`; writes compare-and-swap on the `version` column.
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
    capacity: usize,
}

impl PgStore {
    pub async fn connect(database_url: &str, capacity: usize) -> anyhow::Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .context("connect to database")?;

        if let Err(e) = sqlx::migrate!("./migrations").run(&db).await {
            warn!(error = %e, "migration failed; continuing");
        }
        info!(capacity, "postgres store ready");
        Ok(Self { db, capacity })
    }
}

#[async_trait]
impl KvStore for PgStore {
    async fn get(&self, key: &str) -> Result<Option<Versioned>, DiaryError> {
        let row = sqlx::query_as::<_, (String, i64)>(
            r#"
            SELECT value, version
              FROM kv_entries
             WHERE key = $1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.db)
        .await
        .with_context(|| format!("load kv entry {}", key))?;

        Ok(row.map(|(value, version)| Versioned { value, version }))
    }

    async fn commit(&self, writes: Vec<Write>) -> Result<(), DiaryError> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        for w in &writes {
            let affected = if w.expected_version == 0 {
                sqlx::query(
                    r#"
                    INSERT INTO kv_entries (key, value, version)
                    VALUES ($1, $2, 1)
                    ON CONFLICT (key) DO NOTHING
                    "#,
                )
                .bind(&w.key)
                .bind(&w.value)
                .execute(&mut *tx)
                .await
                .context("insert kv entry")?
                .rows_affected()
            } else {
                sqlx::query(
                    r#"
                    UPDATE kv_entries
                       SET value = $2, version = version + 1, updated_at = now()
                     WHERE key = $1 AND version = $3
                    "#,
                )
                .bind(&w.key)
                .bind(&w.value)
                .bind(w.expected_version)
                .execute(&mut *tx)
                .await
                .context("update kv entry")?
                .rows_affected()
            };

            // tx rolls back on drop
            if affected == 0 {
                return Err(DiaryError::Conflict(w.key.clone()));
            }
        }

        let used: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(octet_length(key) + octet_length(value)), 0)::BIGINT
              FROM kv_entries
            "#,
        )
        .fetch_one(&mut *tx)
        .await
        .context("measure kv usage")?;

        let needed = usize::try_from(used).unwrap_or(usize::MAX);
        if needed > self.capacity {
            warn!(needed, capacity = self.capacity, "storage quota exceeded, rolling back");
            return Err(DiaryError::StorageCapacityExceeded {
                needed,
                capacity: self.capacity,
            });
        }

        tx.commit().await.context("commit tx")?;
        Ok(())
    }
}
