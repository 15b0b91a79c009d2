//! Persistence for derived document records.
//!
//! The registry is a flat `file_id -> (file_name, file_path)` table. It never validates that the
//! recorded path exists; a missing file surfaces when the caller reads it.

use async_trait::async_trait;
use chrono::Utc;
use pdf_customizer_types::{DerivedDocumentRecord, NewDocumentRecord};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised by a [`DocumentRegistry`].
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("a record with file_id {0} already exists")]
    Duplicate(String),
    #[error("invalid database url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: sqlx::Error,
    },
    #[error("failed to apply registry migrations: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("registry database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Insert and lookup of derived document records.
#[async_trait]
pub trait DocumentRegistry: Send + Sync {
    /// Store a new record. Fails with [`RegistryError::Duplicate`] when the id is taken.
    async fn insert(&self, record: &NewDocumentRecord)
        -> Result<DerivedDocumentRecord, RegistryError>;

    /// Look up a record by its identifier.
    async fn find_by_file_id(
        &self,
        file_id: &str,
    ) -> Result<Option<DerivedDocumentRecord>, RegistryError>;
}

/// SQLite-backed registry. Each operation checks out its own pooled connection, which is
/// returned to the pool when the operation ends.
#[derive(Debug, Clone)]
pub struct SqliteRegistry {
    pool: SqlitePool,
}

impl SqliteRegistry {
    /// Open (creating if needed) the database at `database_url` and apply migrations.
    pub async fn connect(database_url: &str) -> Result<Self, RegistryError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|source| RegistryError::InvalidUrl {
                url: database_url.to_string(),
                source,
            })?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    /// Registry backed by a private in-memory database.
    ///
    /// The pool holds exactly one connection that never expires, since every SQLite memory
    /// connection owns a separate database.
    pub async fn in_memory() -> Result<Self, RegistryError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::from_pool(pool).await
    }

    async fn from_pool(pool: SqlitePool) -> Result<Self, RegistryError> {
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl DocumentRegistry for SqliteRegistry {
    async fn insert(
        &self,
        record: &NewDocumentRecord,
    ) -> Result<DerivedDocumentRecord, RegistryError> {
        let created_at = Utc::now();
        let mut conn = self.pool.acquire().await?;
        let result = sqlx::query(
            "INSERT INTO pdf_files (file_id, file_name, file_path, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.file_id)
        .bind(&record.file_name)
        .bind(&record.file_path)
        .bind(created_at)
        .execute(&mut *conn)
        .await;

        match result {
            Ok(_) => {
                tracing::debug!(file_id = %record.file_id, "registered derived document");
                Ok(DerivedDocumentRecord {
                    file_id: record.file_id.clone(),
                    file_name: record.file_name.clone(),
                    file_path: record.file_path.clone(),
                    created_at,
                })
            }
            Err(sqlx::Error::Database(err)) if err.is_unique_violation() => {
                Err(RegistryError::Duplicate(record.file_id.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn find_by_file_id(
        &self,
        file_id: &str,
    ) -> Result<Option<DerivedDocumentRecord>, RegistryError> {
        let mut conn = self.pool.acquire().await?;
        let row = sqlx::query(
            "SELECT file_id, file_name, file_path, created_at FROM pdf_files WHERE file_id = ? LIMIT 1",
        )
        .bind(file_id)
        .fetch_optional(&mut *conn)
        .await?;
        row.map(|row| record_from_row(&row)).transpose()
    }
}

fn record_from_row(row: &SqliteRow) -> Result<DerivedDocumentRecord, RegistryError> {
    Ok(DerivedDocumentRecord {
        file_id: row.try_get("file_id")?,
        file_name: row.try_get("file_name")?,
        file_path: row.try_get("file_path")?,
        created_at: row.try_get("created_at")?,
    })
}
