use anyhow::Result;
use async_trait::async_trait;
use log::debug;
use sqlx::{migrate::MigrateDatabase, Row, Sqlite, SqlitePool};
use std::path::Path;
use std::sync::Arc;

use super::traits::BlobStore;

/// File name of the studio database inside the data directory
pub const DATABASE_FILE: &str = "studio.db";

/// DbConnection stores collection blobs in a single `key_values` table
#[derive(Clone)]
pub struct DbConnection {
    pool: Arc<SqlitePool>,
}

impl DbConnection {
    /// Create a new database connection
    pub async fn new(url: &str) -> Result<Self> {
        // Create database if it doesn't exist
        if !Sqlite::database_exists(url).await.unwrap_or(false) {
            Sqlite::create_database(url).await?
        }

        let pool = SqlitePool::connect(url).await?;

        Self::setup_schema(&pool).await?;

        Ok(Self { pool: Arc::new(pool) })
    }

    /// Open (or create) the studio database inside a data directory
    pub async fn init(data_directory: &Path) -> Result<Self> {
        let url = format!("sqlite:{}", data_directory.join(DATABASE_FILE).display());
        Self::new(&url).await
    }

    /// Initialize a test database with a unique name
    #[cfg(test)]
    pub async fn init_test() -> Result<Self> {
        let test_id = uuid::Uuid::new_v4().to_string();
        let db_url = format!("file:memdb_{}?mode=memory&cache=shared", test_id);

        Self::new(&db_url).await
    }

    async fn setup_schema(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS key_values (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
            "#,
        )
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Store a key-value pair, overwriting any existing value for the same key
    pub async fn put_value(&self, key: &str, value: &str) -> Result<()> {
        sqlx::query("INSERT OR REPLACE INTO key_values (key, value) VALUES (?, ?)")
            .bind(key)
            .bind(value)
            .execute(&*self.pool)
            .await?;
        Ok(())
    }

    /// Retrieve a value by its key
    pub async fn get_value(&self, key: &str) -> Result<Option<String>> {
        let row = sqlx::query("SELECT value FROM key_values WHERE key = ?")
            .bind(key)
            .fetch_optional(&*self.pool)
            .await?;

        Ok(row.map(|r| r.get("value")))
    }

    /// Store several key-value pairs in one transaction
    pub async fn put_values(&self, entries: &[(&str, String)]) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        for (key, value) in entries {
            sqlx::query("INSERT OR REPLACE INTO key_values (key, value) VALUES (?, ?)")
                .bind(*key)
                .bind(value.as_str())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    /// List all keys in alphabetical order
    #[cfg(test)]
    pub async fn list_keys(&self) -> Result<Vec<String>> {
        let rows = sqlx::query("SELECT key FROM key_values ORDER BY key")
            .fetch_all(&*self.pool)
            .await?;
        Ok(rows.iter().map(|row| row.get("key")).collect())
    }
}

#[async_trait]
impl BlobStore for DbConnection {
    async fn load(&self, collection: &str) -> Result<Option<String>> {
        debug!("Loading collection {} from sqlite", collection);
        self.get_value(collection).await
    }

    async fn save(&self, collection: &str, blob: &str) -> Result<()> {
        debug!("Saving collection {} to sqlite ({} bytes)", collection, blob.len());
        self.put_value(collection, blob).await
    }

    async fn save_all(&self, blobs: &[(&str, String)]) -> Result<()> {
        debug!("Saving {} collections to sqlite in one transaction", blobs.len());
        self.put_values(blobs).await
    }
}
