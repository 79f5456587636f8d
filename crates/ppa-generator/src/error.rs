use ppa_core::CoreError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, GeneratorError>;

#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("invalid namespace '{namespace}': {source}")]
    InvalidNamespace {
        namespace: String,
        #[source]
        source: CoreError,
    },
    #[error("code length must be between 1 and {max}, got {len}")]
    InvalidCodeLength { len: usize, max: usize },
}
