use async_trait::async_trait;
use jiff::Timestamp;
use ppa_core::repository::{ReadRepository, Repository, Result};
use ppa_core::{ExpiryExtension, ShortCode, ShortLink, StorageError};
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::{MySqlPool, Row};
use std::time::Duration;
use tracing::debug;
use typed_builder::TypedBuilder;

/// Connection pool settings for [`MySqlRepository::connect`].
#[derive(Debug, Clone, TypedBuilder)]
pub struct MySqlSettings {
    #[builder(default = 10)]
    max_connections: u32,
    #[builder(default = Duration::from_secs(5))]
    acquire_timeout: Duration,
}

impl Default for MySqlSettings {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// MySQL implementation of the repository contract.
///
/// Links live in the `short_links` table with the code as primary key, so
/// uniqueness is enforced by the database. Timestamps are stored as Unix
/// milliseconds. Expired rows are kept and returned by reads.
#[derive(Debug, Clone)]
pub struct MySqlRepository {
    pool: MySqlPool,
}

impl MySqlRepository {
    /// Creates a repository from an existing MySQL connection pool.
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    /// Creates a repository by opening a new MySQL connection pool.
    pub async fn connect(database_url: &str, settings: &MySqlSettings) -> Result<Self> {
        let pool = MySqlPoolOptions::new()
            .max_connections(settings.max_connections)
            .acquire_timeout(settings.acquire_timeout)
            .connect(database_url)
            .await
            .map_err(map_sqlx_error)?;
        debug!(
            max_connections = settings.max_connections,
            "connected to mysql"
        );
        Ok(Self::new(pool))
    }

    /// Creates the `short_links` table if it does not exist yet.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(include_str!("../ddl/mysql/short_links.sql"))
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Closes the pool, waiting for checked-out connections to be returned.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn parse_timestamp(column: &str, millis: i64) -> Result<Timestamp> {
    Timestamp::from_millisecond(millis).map_err(|e| {
        StorageError::InvalidData(format!("invalid {column} timestamp '{millis}': {e}"))
    })
}

fn link_from_row(row: &MySqlRow) -> Result<ShortLink> {
    let code: String = row.try_get("code").map_err(map_sqlx_error)?;
    let destination: String = row.try_get("destination").map_err(map_sqlx_error)?;
    let created_at: i64 = row.try_get("created_at").map_err(map_sqlx_error)?;
    let expires_at: Option<i64> = row.try_get("expires_at").map_err(map_sqlx_error)?;

    Ok(ShortLink {
        code: ShortCode::new_unchecked(code),
        destination,
        created_at: parse_timestamp("created_at", created_at)?,
        expires_at: expires_at
            .map(|millis| parse_timestamp("expires_at", millis))
            .transpose()?,
    })
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(sqlx::error::DatabaseError::is_unique_violation)
}

fn map_sqlx_error(err: sqlx::Error) -> StorageError {
    let message = err.to_string();

    match err {
        sqlx::Error::PoolTimedOut => StorageError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StorageError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StorageError::InvalidData(message),
        _ => StorageError::Query(message),
    }
}

#[async_trait]
impl ReadRepository for MySqlRepository {
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        let row = sqlx::query(
            r#"
            SELECT code, destination, created_at, expires_at
            FROM short_links
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.as_ref().map(link_from_row).transpose()
    }

    async fn exists(&self, code: &ShortCode) -> Result<bool> {
        let exists = sqlx::query(
            r#"
            SELECT 1
            FROM short_links
            WHERE code = ?
            LIMIT 1
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?
        .is_some();

        Ok(exists)
    }
}

#[async_trait]
impl Repository for MySqlRepository {
    async fn insert(&self, link: ShortLink) -> Result<()> {
        let result = sqlx::query(
            r#"
            INSERT INTO short_links (code, destination, created_at, expires_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(link.code.as_str())
        .bind(&link.destination)
        .bind(link.created_at.as_millisecond())
        .bind(link.expires_at.map(|ts| ts.as_millisecond()))
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(err) if is_unique_violation(&err) => {
                Err(StorageError::Conflict(link.code.to_string()))
            }
            Err(err) => Err(map_sqlx_error(err)),
        }
    }

    async fn update_destination(&self, code: &ShortCode, destination: &str) -> Result<bool> {
        // An unchanged destination must not count as a modified row, whatever
        // the client's found-rows setting.
        let result = sqlx::query(
            r#"
            UPDATE short_links
            SET destination = ?
            WHERE code = ?
              AND destination <> ?
            "#,
        )
        .bind(destination)
        .bind(code.as_str())
        .bind(destination)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(result.rows_affected() == 1)
    }

    async fn extend_expiry(
        &self,
        code: &ShortCode,
        extension: ExpiryExtension,
    ) -> Result<Option<Timestamp>> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let row = sqlx::query(
            r#"
            SELECT expires_at
            FROM short_links
            WHERE code = ?
            FOR UPDATE
            "#,
        )
        .bind(code.as_str())
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        let Some(row) = row else {
            tx.rollback().await.map_err(map_sqlx_error)?;
            return Ok(None);
        };

        let current: Option<i64> = row.try_get("expires_at").map_err(map_sqlx_error)?;
        let current = current
            .map(|millis| parse_timestamp("expires_at", millis))
            .transpose()?;
        let expires_at = extension.apply(current);

        sqlx::query(
            r#"
            UPDATE short_links
            SET expires_at = ?
            WHERE code = ?
            "#,
        )
        .bind(expires_at.as_millisecond())
        .bind(code.as_str())
        .execute(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;

        Ok(Some(expires_at))
    }
}
