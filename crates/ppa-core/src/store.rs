use crate::link::ShortLink;
use crate::shortcode::ShortCode;
use async_trait::async_trait;

type Result<T> = std::result::Result<T, crate::error::StoreError>;

/// Short-link resolution store.
///
/// A missing code is an expected outcome and is reported as `false` or
/// `None`. Errors are reserved for invalid input and storage faults.
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Creates a short link for `destination` and returns its code.
    async fn create(&self, destination: &str) -> Result<ShortCode>;

    /// Points an existing code at a new destination.
    /// Returns `true` iff exactly one record was modified, so `false` if the
    /// code does not exist or already resolves to `destination`.
    async fn update_destination(&self, code: &ShortCode, destination: &str) -> Result<bool>;

    /// Resolves a short code to its destination.
    /// Returns `None` if the code does not exist or has expired.
    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>>;

    /// Extends the expiry of a code by `days`, starting from its current
    /// expiry or from now if it has none.
    /// Returns `false` if the code does not exist.
    async fn extend_expiry(&self, code: &ShortCode, days: u32) -> Result<bool>;

    /// Returns the stored link, including expired ones.
    async fn inspect(&self, code: &ShortCode) -> Result<Option<ShortLink>>;
}
