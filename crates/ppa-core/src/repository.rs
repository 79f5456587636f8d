use crate::error::StorageError;
use crate::expiry::ExpiryExtension;
use crate::link::ShortLink;
use crate::shortcode::ShortCode;
use async_trait::async_trait;
use jiff::Timestamp;

/// Result type for repository operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// A read-only view of a repository.
#[async_trait]
pub trait ReadRepository: Send + Sync + 'static {
    /// Retrieves the link stored under a short code, expired or not.
    /// Returns `None` if the code does not exist.
    async fn get(&self, code: &ShortCode) -> Result<Option<ShortLink>>;

    /// Checks whether a short code already exists in the repository.
    async fn exists(&self, code: &ShortCode) -> Result<bool>;
}

/// Persistence contract for short links.
///
/// Every write touches exactly one record and is atomic with respect to that
/// record.
#[async_trait]
pub trait Repository: ReadRepository {
    /// Inserts a new link. Returns `Err(Conflict)` if the code already exists.
    async fn insert(&self, link: ShortLink) -> Result<()>;

    /// Replaces the destination of an existing link.
    /// Returns `true` only if the record was modified: `false` when the code
    /// does not exist or already points at `destination`.
    async fn update_destination(&self, code: &ShortCode, destination: &str) -> Result<bool>;

    /// Pushes back the expiry of an existing link.
    /// Returns the new expiry, or `None` if the code does not exist.
    async fn extend_expiry(
        &self,
        code: &ShortCode,
        extension: ExpiryExtension,
    ) -> Result<Option<Timestamp>>;
}
