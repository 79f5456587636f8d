//! Core types and traits for the ppa short-link store.
//!
//! This crate provides the domain model shared by the generator, the
//! storage backends and the link store service.

pub mod clock;
pub mod error;
pub mod expiry;
pub mod link;
pub mod repository;
pub mod shortcode;
pub mod store;

pub use clock::{Clock, SystemClock};
#[cfg(any(test, feature = "test-util"))]
pub use clock::ManualClock;
pub use error::{CoreError, StorageError, StoreError};
pub use expiry::{ExpiryExtension, Validity};
pub use link::ShortLink;
pub use repository::{ReadRepository, Repository};
pub use shortcode::ShortCode;
pub use store::LinkStore;
