use crate::expiry::{self, Validity};
use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A stored short link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortLink {
    /// Unique identifier of the link.
    pub code: ShortCode,
    /// The URL the code resolves to.
    pub destination: String,
    /// When the link was created.
    pub created_at: Timestamp,
    /// When the link expires, if ever.
    pub expires_at: Option<Timestamp>,
}

impl ShortLink {
    /// A fresh link that never expires.
    pub fn new(code: ShortCode, destination: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            code,
            destination: destination.into(),
            created_at,
            expires_at: None,
        }
    }

    pub fn validity_at(&self, now: Timestamp) -> Validity {
        Validity::at(self.expires_at, now)
    }

    pub fn is_active_at(&self, now: Timestamp) -> bool {
        expiry::is_valid(self.expires_at, now)
    }
}
