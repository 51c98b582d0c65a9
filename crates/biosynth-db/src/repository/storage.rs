//! # Client Storage Repository
//!
//! Key/value access to the `client_storage` table. Values are opaque
//! TEXT; typed repositories layer JSON on top.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// One stored row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StoredBlob {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

/// Repository for raw keyed blobs.
#[derive(Debug, Clone)]
pub struct ClientStorageRepository {
    pool: SqlitePool,
}

impl ClientStorageRepository {
    /// Creates a new ClientStorageRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ClientStorageRepository { pool }
    }

    /// Returns the value stored under `key`, if any.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.get_blob(key).await?.map(|blob| blob.value))
    }

    /// Returns the full row stored under `key`, if any.
    pub async fn get_blob(&self, key: &str) -> DbResult<Option<StoredBlob>> {
        let blob = sqlx::query_as::<_, StoredBlob>(
            r#"
            SELECT key, value, updated_at
            FROM client_storage
            WHERE key = ?1
            "#,
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(blob)
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub async fn put(&self, key: &str, value: &str) -> DbResult<()> {
        let now = Utc::now();

        debug!(key = %key, bytes = value.len(), "Writing client storage");

        sqlx::query(
            r#"
            INSERT INTO client_storage (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Deletes `key`. Returns true if a row was removed.
    pub async fn remove(&self, key: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM client_storage WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::pool::{Database, DbConfig};

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let storage = db.storage();

        assert_eq!(storage.get("k").await.unwrap(), None);

        storage.put("k", "one").await.unwrap();
        let first = storage.get_blob("k").await.unwrap().unwrap();
        assert_eq!(first.value, "one");

        storage.put("k", "two").await.unwrap();
        let second = storage.get_blob("k").await.unwrap().unwrap();
        assert_eq!(second.value, "two");
        assert!(second.updated_at >= first.updated_at);
    }

    #[tokio::test]
    async fn test_remove() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let storage = db.storage();

        storage.put("k", "v").await.unwrap();
        assert!(storage.remove("k").await.unwrap());
        assert!(!storage.remove("k").await.unwrap());
        assert_eq!(storage.get("k").await.unwrap(), None);
    }
}
