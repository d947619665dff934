//! Error types for the transport cipher.

use thiserror::Error;

/// Errors that can occur while sealing or opening a transport blob.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The ciphertext could not be decrypted (too short to hold a nonce).
    #[error("decryption error: {0}")]
    Decrypt(String),

    /// The decrypted payload is not the expected fixed record width.
    #[error("invalid record size: expected {expected} bytes, got {actual}")]
    InvalidRecordSize { expected: usize, actual: usize },

    /// Reading the source or writing the sink failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cipher operations.
pub type Result<T> = std::result::Result<T, CipherError>;
