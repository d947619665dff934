//! Error types for Dakuaz core.

use thiserror::Error;

/// Errors that can occur while building, decoding or checking a credential.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The input length does not match the fixed record width.
    #[error("malformed record: expected {expected} bytes, got {actual}")]
    MalformedRecord { expected: usize, actual: usize },

    /// Key material was rejected or the signature primitive failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Hash mismatch or signature mismatch. The two are not distinguished.
    #[error("credential verification failed")]
    VerificationFailed,

    /// The credential is past its expiry instant.
    #[error("credential expired at {expire_at}")]
    Expired { expire_at: i64 },

    /// A renewal would not move the expiry forward.
    #[error("renewal must extend expiry: current {current}, proposed {proposed}")]
    ExpiryNotExtended { current: i64, proposed: i64 },
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
