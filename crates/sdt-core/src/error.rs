//! # Error Types
//!
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations. Each crate defines the narrow enum for its own
//! failures; this one covers canonicalization.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
