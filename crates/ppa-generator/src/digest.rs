use crate::error::{GeneratorError, Result};
use crate::Generator;
use ppa_core::ShortCode;
use sha2::{Digest, Sha256};

pub const DEFAULT_NAMESPACE: &str = "www.ppa.in/";
pub const DEFAULT_CODE_LEN: usize = 6;

/// Hex characters in a SHA-256 digest.
const DIGEST_HEX_LEN: usize = 64;

/// Derives short codes from the SHA-256 digest of the destination.
///
/// The code is the namespace followed by the first `code_len` hex characters
/// of the digest. Fallback candidates take one more hex character per attempt
/// until the digest is exhausted.
#[derive(Debug, Clone)]
pub struct DigestGenerator {
    namespace: String,
    code_len: usize,
}

impl Default for DigestGenerator {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            code_len: DEFAULT_CODE_LEN,
        }
    }
}

impl DigestGenerator {
    /// Creates a generator for `namespace` with `code_len` hex characters.
    ///
    /// The namespace is checked against the longest code this generator can
    /// emit (the full digest), so every candidate is a valid [`ShortCode`].
    pub fn new(namespace: impl Into<String>, code_len: usize) -> Result<Self> {
        let namespace = namespace.into();
        if !(1..=DIGEST_HEX_LEN).contains(&code_len) {
            return Err(GeneratorError::InvalidCodeLength {
                len: code_len,
                max: DIGEST_HEX_LEN,
            });
        }
        let longest = format!("{namespace}{}", "0".repeat(DIGEST_HEX_LEN));
        if let Err(source) = ShortCode::new(longest) {
            return Err(GeneratorError::InvalidNamespace { namespace, source });
        }
        Ok(Self {
            namespace,
            code_len,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn code_len(&self) -> usize {
        self.code_len
    }

    fn digest_hex(destination: &str) -> String {
        hex::encode(Sha256::digest(destination.as_bytes()))
    }

    fn code_with_len(&self, destination: &str, len: usize) -> ShortCode {
        let hex = Self::digest_hex(destination);
        ShortCode::new_unchecked(format!("{}{}", self.namespace, &hex[..len]))
    }
}

impl Generator for DigestGenerator {
    fn generate(&self, destination: &str) -> ShortCode {
        self.code_with_len(destination, self.code_len)
    }

    fn fallback(&self, destination: &str, attempt: u32) -> Option<ShortCode> {
        let len = self
            .code_len
            .checked_add(usize::try_from(attempt).ok()?)?;
        (len <= DIGEST_HEX_LEN).then(|| self.code_with_len(destination, len))
    }
}
