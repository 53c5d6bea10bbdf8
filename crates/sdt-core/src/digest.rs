//! # Fingerprints — Content Hashes for Cache Validity
//!
//! Defines `Fingerprint`, the cache-validity key of the augmentation cache.
//! A fingerprint is a SHA-256 digest over the canonical bytes of a source
//! output schema.
//!
//! ## Invariant
//!
//! `Fingerprint` can only be computed from `CanonicalBytes`, so every
//! fingerprint in the system is insensitive to key order and whitespace.
//! Any change to the *content* of the output schema changes the fingerprint.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalBytes;
use crate::error::CanonicalizationError;

/// A SHA-256 content fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint {
    bytes: [u8; 32],
}

impl Fingerprint {
    /// Compute the fingerprint of canonical bytes.
    pub fn of(data: &CanonicalBytes) -> Self {
        let hash = Sha256::digest(data.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&hash);
        Self { bytes }
    }

    /// Raw 32-byte digest value.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.bytes
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "sha256:{}", self.to_hex())
    }
}

/// Canonicalize a value and fingerprint it in one step.
///
/// # Errors
///
/// Propagates `CanonicalizationError` from [`CanonicalBytes::new`].
pub fn fingerprint(value: &impl Serialize) -> Result<Fingerprint, CanonicalizationError> {
    Ok(Fingerprint::of(&CanonicalBytes::new(value)?))
}
