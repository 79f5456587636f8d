pub mod memory;
pub mod mysql;

pub use memory::InMemoryRepository;
pub use mysql::{MySqlRepository, MySqlSettings};
pub use ppa_core::repository::{ReadRepository, Repository, Result};
pub use ppa_core::StorageError;
