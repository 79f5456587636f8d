//! Short-link store service.
//!
//! This crate wires a code [`Generator`](ppa_generator::Generator) and a
//! [`Repository`](ppa_core::Repository) into a [`LinkStore`]. Core types are
//! re-exported from `ppa_core`.

pub mod service;
pub mod settings;

pub use ppa_core::{LinkStore, ShortCode, ShortLink, StoreError};
pub use service::LinkStoreService;
pub use settings::StoreSettings;
