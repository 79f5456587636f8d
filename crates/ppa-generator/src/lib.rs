pub mod digest;
pub mod error;

pub use digest::DigestGenerator;
pub use error::{GeneratorError, Result};

use ppa_core::ShortCode;

/// Trait for deriving short codes from destinations.
///
/// Implementations are pure functions of the destination and don't interact
/// with storage, so they are safe to call again after a failed insert.
pub trait Generator: Send + Sync + 'static {
    /// Derives the primary short code for a destination.
    ///
    /// The same destination always yields the same code.
    fn generate(&self, destination: &str) -> ShortCode;

    /// Derives the candidate to try after `attempt` collisions (starting at 1).
    ///
    /// Returns `None` once the generator has no further candidates.
    fn fallback(&self, destination: &str, attempt: u32) -> Option<ShortCode>;
}
