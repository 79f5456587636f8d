//! Read-time validity of short links.
//!
//! Validity is never stored. It is recomputed from `expires_at` and the
//! current time on every read, with no grace period.

use jiff::{SignedDuration, Timestamp};

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Validity state of a short link at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    Active,
    Expired,
}

impl Validity {
    pub fn at(expires_at: Option<Timestamp>, now: Timestamp) -> Self {
        if is_valid(expires_at, now) {
            Validity::Active
        } else {
            Validity::Expired
        }
    }
}

/// Returns `true` if a link with the given expiry may still be resolved at `now`.
///
/// A link without expiry never expires. Otherwise the link stays valid up to
/// and including the expiry instant.
pub fn is_valid(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    match expires_at {
        None => true,
        Some(expires_at) => now <= expires_at,
    }
}

/// An additive change to a link's expiry.
///
/// The new expiry is the current one pushed back by `extend_by`, or
/// `base_if_unset + extend_by` when the link had no expiry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpiryExtension {
    base_if_unset: Timestamp,
    extend_by: SignedDuration,
}

impl ExpiryExtension {
    pub fn new(base_if_unset: Timestamp, extend_by: SignedDuration) -> Self {
        Self {
            base_if_unset,
            extend_by,
        }
    }

    /// Extension by a whole number of days starting from `now` for links
    /// without expiry.
    pub fn days(now: Timestamp, days: u32) -> Self {
        Self::new(now, SignedDuration::from_secs(i64::from(days) * SECONDS_PER_DAY))
    }

    pub fn base_if_unset(&self) -> Timestamp {
        self.base_if_unset
    }

    pub fn extend_by(&self) -> SignedDuration {
        self.extend_by
    }

    /// Computes the new expiry. Saturates at [`Timestamp::MAX`].
    pub fn apply(&self, current: Option<Timestamp>) -> Timestamp {
        let base = current.unwrap_or(self.base_if_unset);
        base.checked_add(self.extend_by).unwrap_or(Timestamp::MAX)
    }
}
