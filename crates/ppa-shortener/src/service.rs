use crate::settings::StoreSettings;
use async_trait::async_trait;
use ppa_core::{
    Clock, ExpiryExtension, LinkStore, Repository, ShortCode, ShortLink, StorageError,
    StoreError, SystemClock,
};
use ppa_generator::Generator;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, trace};

type Result<T> = std::result::Result<T, StoreError>;

/// A concrete implementation of the [`LinkStore`] trait.
///
/// This service wraps a `Repository`, a `Generator` and a `Clock` to handle:
/// - Destination validation
/// - Collision resolution for digest-derived codes
/// - Read-time expiry checks
/// - Per-call timeouts on the repository
///
/// Storage errors are returned unchanged and never retried. Only code
/// generation is retried, and only after the insert was rejected.
#[derive(Debug, Clone)]
pub struct LinkStoreService<R, G, C = SystemClock> {
    repository: Arc<R>,
    generator: Arc<G>,
    clock: Arc<C>,
    settings: StoreSettings,
}

impl<R: Repository, G: Generator> LinkStoreService<R, G, SystemClock> {
    /// Creates a new `LinkStoreService` using the system clock and default settings.
    pub fn new(repository: R, generator: G) -> Self {
        Self::with_clock(repository, generator, SystemClock, StoreSettings::default())
    }

    pub fn with_settings(repository: R, generator: G, settings: StoreSettings) -> Self {
        Self::with_clock(repository, generator, SystemClock, settings)
    }
}

impl<R: Repository, G: Generator, C: Clock> LinkStoreService<R, G, C> {
    pub fn with_clock(repository: R, generator: G, clock: C, settings: StoreSettings) -> Self {
        Self {
            repository: Arc::new(repository),
            generator: Arc::new(generator),
            clock: Arc::new(clock),
            settings,
        }
    }

    /// Returns a reference to the underlying repository.
    pub fn repository(&self) -> &R {
        &self.repository
    }

    /// Validates that the URL has a valid format (has a scheme and host).
    fn validate_url(url: &str) -> Result<()> {
        if url.is_empty() {
            return Err(StoreError::InvalidUrl("URL cannot be empty".to_string()));
        }

        let Some((scheme, rest)) = url.split_once("://") else {
            return Err(StoreError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        };

        let scheme = scheme.to_lowercase();
        if scheme != "http" && scheme != "https" {
            return Err(StoreError::InvalidUrl(format!(
                "URL scheme must be http or https: {}",
                scheme
            )));
        }

        let host = rest.split(['/', '?', '#']).next().unwrap_or_default();
        if host.is_empty() || url.chars().any(char::is_whitespace) {
            return Err(StoreError::InvalidUrl(format!(
                "URL must have a valid scheme and host: {}",
                url
            )));
        }

        Ok(())
    }

    /// Runs a repository call under the configured timeout.
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> Result<T>
    where
        F: Future<Output = std::result::Result<T, StorageError>>,
    {
        let timeout = self.settings.operation_timeout;
        match tokio::time::timeout(timeout, call).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Storage(StorageError::Timeout(format!(
                "{operation} did not complete within {timeout:?}"
            )))),
        }
    }

    /// Tries to claim `code` for `destination`.
    ///
    /// Returns `true` when the code now maps to the destination, either
    /// because the insert succeeded or because an active link for the same
    /// destination already holds it.
    async fn claim(&self, code: &ShortCode, destination: &str) -> Result<bool> {
        let now = self.clock.now();
        let link = ShortLink::new(code.clone(), destination, now);

        match self.bounded("insert", self.repository.insert(link)).await {
            Ok(()) => return Ok(true),
            Err(StoreError::Storage(StorageError::Conflict(_))) => {}
            Err(e) => return Err(e),
        }

        let existing = self.bounded("get", self.repository.get(code)).await?;
        Ok(existing.is_some_and(|link| link.destination == destination && link.is_active_at(now)))
    }
}

#[async_trait]
impl<R: Repository, G: Generator, C: Clock> LinkStore for LinkStoreService<R, G, C> {
    async fn create(&self, destination: &str) -> Result<ShortCode> {
        Self::validate_url(destination)?;

        let mut code = self.generator.generate(destination);
        let mut attempt = 0;

        loop {
            if self.claim(&code, destination).await? {
                debug!(code = %code, destination, attempt, "created short link");
                return Ok(code);
            }

            attempt += 1;
            if attempt > self.settings.max_collision_retries {
                break;
            }
            trace!(code = %code, attempt, "short code taken, trying a longer one");

            code = match self.generator.fallback(destination, attempt) {
                Some(next) => next,
                None => break,
            };
        }

        Err(StoreError::CodeSpaceExhausted(destination.to_string()))
    }

    async fn update_destination(&self, code: &ShortCode, destination: &str) -> Result<bool> {
        Self::validate_url(destination)?;

        let updated = self
            .bounded(
                "update_destination",
                self.repository.update_destination(code, destination),
            )
            .await?;

        debug!(code = %code, destination, updated, "updated destination");
        Ok(updated)
    }

    async fn resolve(&self, code: &ShortCode) -> Result<Option<String>> {
        trace!(code = %code, "resolving short code");

        let Some(link) = self.bounded("get", self.repository.get(code)).await? else {
            trace!(code = %code, "short code not found");
            return Ok(None);
        };

        if !link.is_active_at(self.clock.now()) {
            debug!(code = %code, "short link has expired");
            return Ok(None);
        }

        debug!(code = %code, destination = %link.destination, "resolved short code");
        Ok(Some(link.destination))
    }

    async fn extend_expiry(&self, code: &ShortCode, days: u32) -> Result<bool> {
        if days == 0 {
            return Err(StoreError::InvalidExpiry(
                "days to add must be positive".to_string(),
            ));
        }

        let extension = ExpiryExtension::days(self.clock.now(), days);
        let expires_at = self
            .bounded(
                "extend_expiry",
                self.repository.extend_expiry(code, extension),
            )
            .await?;

        match expires_at {
            Some(expires_at) => {
                debug!(code = %code, %expires_at, "extended expiry");
                Ok(true)
            }
            None => {
                trace!(code = %code, "short code not found");
                Ok(false)
            }
        }
    }

    async fn inspect(&self, code: &ShortCode) -> Result<Option<ShortLink>> {
        self.bounded("get", self.repository.get(code)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::{SignedDuration, Timestamp};
    use ppa_core::repository::ReadRepository;
    use ppa_core::ManualClock;
    use ppa_generator::DigestGenerator;
    use ppa_storage::InMemoryRepository;
    use std::time::Duration;

    const EXAMPLE: &str = "https://www.example.com";
    const EXAMPLE_NEW: &str = "https://www.example.com/new";

    fn start() -> Timestamp {
        Timestamp::from_second(1_700_000_000).unwrap()
    }

    fn test_service() -> (
        LinkStoreService<InMemoryRepository, DigestGenerator, ManualClock>,
        ManualClock,
    ) {
        let clock = ManualClock::new(start());
        let service = LinkStoreService::with_clock(
            InMemoryRepository::new(),
            DigestGenerator::default(),
            clock.clone(),
            StoreSettings::default(),
        );
        (service, clock)
    }

    fn code(s: &str) -> ShortCode {
        ShortCode::new_unchecked(s)
    }

    /// Always derives the same code, so every create after the first collides.
    struct ConstantGenerator;

    impl Generator for ConstantGenerator {
        fn generate(&self, _destination: &str) -> ShortCode {
            code("www.ppa.in/000000")
        }

        fn fallback(&self, _destination: &str, _attempt: u32) -> Option<ShortCode> {
            Some(code("www.ppa.in/000000"))
        }
    }

    /// A repository whose backend is down.
    struct UnavailableRepository;

    #[async_trait]
    impl ReadRepository for UnavailableRepository {
        async fn get(
            &self,
            _code: &ShortCode,
        ) -> std::result::Result<Option<ShortLink>, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn exists(&self, _code: &ShortCode) -> std::result::Result<bool, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    #[async_trait]
    impl Repository for UnavailableRepository {
        async fn insert(&self, _link: ShortLink) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn update_destination(
            &self,
            _code: &ShortCode,
            _destination: &str,
        ) -> std::result::Result<bool, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }

        async fn extend_expiry(
            &self,
            _code: &ShortCode,
            _extension: ExpiryExtension,
        ) -> std::result::Result<Option<Timestamp>, StorageError> {
            Err(StorageError::Unavailable("connection refused".to_string()))
        }
    }

    /// A repository that never answers.
    struct StalledRepository;

    #[async_trait]
    impl ReadRepository for StalledRepository {
        async fn get(
            &self,
            _code: &ShortCode,
        ) -> std::result::Result<Option<ShortLink>, StorageError> {
            std::future::pending().await
        }

        async fn exists(&self, _code: &ShortCode) -> std::result::Result<bool, StorageError> {
            std::future::pending().await
        }
    }

    #[async_trait]
    impl Repository for StalledRepository {
        async fn insert(&self, _link: ShortLink) -> std::result::Result<(), StorageError> {
            std::future::pending().await
        }

        async fn update_destination(
            &self,
            _code: &ShortCode,
            _destination: &str,
        ) -> std::result::Result<bool, StorageError> {
            std::future::pending().await
        }

        async fn extend_expiry(
            &self,
            _code: &ShortCode,
            _extension: ExpiryExtension,
        ) -> std::result::Result<Option<Timestamp>, StorageError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn create_then_resolve_round_trip() {
        let (service, _) = test_service();

        let code = service.create("https://www.rust-lang.org").await.unwrap();

        assert_eq!(
            service.resolve(&code).await.unwrap().as_deref(),
            Some("https://www.rust-lang.org")
        );
    }

    #[tokio::test]
    async fn create_stores_fresh_record() {
        let (service, _) = test_service();

        let code = service.create(EXAMPLE).await.unwrap();

        let link = service.inspect(&code).await.unwrap().unwrap();
        assert_eq!(link.destination, EXAMPLE);
        assert_eq!(link.created_at, start());
        assert_eq!(link.expires_at, None);
    }

    #[tokio::test]
    async fn create_update_resolve_scenario() {
        let (service, _) = test_service();

        let code = service.create(EXAMPLE).await.unwrap();
        assert_eq!(code.as_str(), "www.ppa.in/cdb4d8");

        assert!(service.update_destination(&code, EXAMPLE_NEW).await.unwrap());
        assert_eq!(
            service.resolve(&code).await.unwrap().as_deref(),
            Some(EXAMPLE_NEW)
        );
    }

    #[tokio::test]
    async fn extend_expiry_scenario() {
        let (service, clock) = test_service();
        let code = service.create(EXAMPLE).await.unwrap();

        assert!(service.extend_expiry(&code, 30).await.unwrap());

        let link = service.inspect(&code).await.unwrap().unwrap();
        let expiry = start() + SignedDuration::from_hours(24 * 30);
        assert_eq!(link.expires_at, Some(expiry));

        clock.set(expiry - SignedDuration::from_secs(1));
        assert_eq!(
            service.resolve(&code).await.unwrap().as_deref(),
            Some(EXAMPLE)
        );

        clock.set(expiry);
        assert_eq!(
            service.resolve(&code).await.unwrap().as_deref(),
            Some(EXAMPLE)
        );

        clock.set(expiry + SignedDuration::from_millis(1));
        assert_eq!(service.resolve(&code).await.unwrap(), None);

        // still stored
        assert!(service.inspect(&code).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn extend_expiry_adds_to_existing_expiry() {
        let (service, clock) = test_service();
        let code = service.create(EXAMPLE).await.unwrap();

        service.extend_expiry(&code, 30).await.unwrap();
        clock.advance(SignedDuration::from_hours(24));
        service.extend_expiry(&code, 10).await.unwrap();

        let link = service.inspect(&code).await.unwrap().unwrap();
        assert_eq!(
            link.expires_at,
            Some(start() + SignedDuration::from_hours(24 * 40))
        );
    }

    #[tokio::test]
    async fn extend_expiry_rejects_zero_days() {
        let (service, _) = test_service();
        let code = service.create(EXAMPLE).await.unwrap();

        let err = service.extend_expiry(&code, 0).await.unwrap_err();

        assert!(matches!(err, StoreError::InvalidExpiry(_)));
        let link = service.inspect(&code).await.unwrap().unwrap();
        assert_eq!(link.expires_at, None);
    }

    #[tokio::test]
    async fn missing_code_is_not_an_error() {
        let (service, _) = test_service();
        let missing = code("www.ppa.in/ffffff");

        assert_eq!(service.resolve(&missing).await.unwrap(), None);
        assert!(!service
            .update_destination(&missing, EXAMPLE)
            .await
            .unwrap());
        assert!(!service.extend_expiry(&missing, 30).await.unwrap());
        assert!(service.inspect(&missing).await.unwrap().is_none());
        assert!(service.repository().is_empty());
    }

    #[tokio::test]
    async fn create_rejects_invalid_urls() {
        let (service, _) = test_service();

        for url in ["", "not-a-valid-url", "ftp://example.com", "https://", "https:///path"] {
            let err = service.create(url).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidUrl(_)), "{url}");
        }
        assert!(service.repository().is_empty());
    }

    #[tokio::test]
    async fn update_to_same_destination_modifies_nothing() {
        let (service, _) = test_service();
        let code = service.create(EXAMPLE).await.unwrap();

        assert!(!service.update_destination(&code, EXAMPLE).await.unwrap());
        assert_eq!(
            service.resolve(&code).await.unwrap().as_deref(),
            Some(EXAMPLE)
        );
    }

    #[tokio::test]
    async fn update_rejects_invalid_url() {
        let (service, _) = test_service();
        let code = service.create(EXAMPLE).await.unwrap();

        let err = service.update_destination(&code, "").await.unwrap_err();

        assert!(matches!(err, StoreError::InvalidUrl(_)));
        assert_eq!(
            service.resolve(&code).await.unwrap().as_deref(),
            Some(EXAMPLE)
        );
    }

    #[tokio::test]
    async fn shortening_same_destination_is_idempotent() {
        let (service, _) = test_service();

        let first = service.create(EXAMPLE).await.unwrap();
        let second = service.create(EXAMPLE).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn collision_falls_back_to_longer_code() {
        let (service, _) = test_service();
        let code = service.create(EXAMPLE).await.unwrap();
        service.update_destination(&code, EXAMPLE_NEW).await.unwrap();

        // the primary code now belongs to another destination
        let fallback = service.create(EXAMPLE).await.unwrap();

        assert_eq!(fallback.as_str(), "www.ppa.in/cdb4d88");
        assert_eq!(
            service.resolve(&code).await.unwrap().as_deref(),
            Some(EXAMPLE_NEW)
        );
        assert_eq!(
            service.resolve(&fallback).await.unwrap().as_deref(),
            Some(EXAMPLE)
        );
    }

    #[tokio::test]
    async fn expired_link_for_same_destination_is_not_reused() {
        let (service, clock) = test_service();
        let code = service.create(EXAMPLE).await.unwrap();
        service.extend_expiry(&code, 1).await.unwrap();
        clock.advance(SignedDuration::from_hours(48));

        let fresh = service.create(EXAMPLE).await.unwrap();

        assert_ne!(fresh, code);
        assert_eq!(
            service.resolve(&fresh).await.unwrap().as_deref(),
            Some(EXAMPLE)
        );
    }

    #[tokio::test]
    async fn exhausted_retries_fail() {
        let settings = StoreSettings::builder().max_collision_retries(3).build();
        let service =
            LinkStoreService::with_settings(InMemoryRepository::new(), ConstantGenerator, settings);

        service.create("https://one.example").await.unwrap();
        let err = service.create("https://two.example").await.unwrap_err();

        assert!(matches!(err, StoreError::CodeSpaceExhausted(_)));
        assert_eq!(service.repository().len(), 1);
    }

    #[tokio::test]
    async fn storage_errors_propagate() {
        let service = LinkStoreService::new(UnavailableRepository, DigestGenerator::default());
        let c = code("www.ppa.in/cdb4d8");

        let errors = [
            service.create(EXAMPLE).await.unwrap_err(),
            service.update_destination(&c, EXAMPLE).await.unwrap_err(),
            service.resolve(&c).await.unwrap_err(),
            service.extend_expiry(&c, 1).await.unwrap_err(),
        ];

        for err in errors {
            assert!(matches!(
                err,
                StoreError::Storage(StorageError::Unavailable(_))
            ));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_storage_times_out() {
        let settings = StoreSettings::builder()
            .operation_timeout(Duration::from_millis(100))
            .build();
        let service =
            LinkStoreService::with_settings(StalledRepository, DigestGenerator::default(), settings);

        let err = service.resolve(&code("www.ppa.in/cdb4d8")).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::Timeout(_))));

        let err = service.create(EXAMPLE).await.unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::Timeout(_))));
    }
}
