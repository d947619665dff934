//! Error types for the Authority.

use dakuaz_cipher::CipherError;
use dakuaz_core::{CoreError, Level};
use dakuaz_store::StoreError;
use thiserror::Error;

/// Errors that can occur during Authority operations.
///
/// Cryptographic and format errors are terminal. Only
/// [`AuthorityError::StoreUnavailable`] is worth retrying.
#[derive(Debug, Error)]
pub enum AuthorityError {
    /// The input length does not match the fixed record width.
    #[error("malformed record: expected {expected} bytes, got {actual}")]
    MalformedRecord { expected: usize, actual: usize },

    /// Key material was rejected or the signature primitive failed.
    #[error("signing error: {0}")]
    Signing(String),

    /// Hash mismatch or signature mismatch.
    #[error("credential verification failed")]
    VerificationFailure,

    /// The credential is past its expiry instant.
    #[error("credential expired at {expire_at}")]
    Expired { expire_at: i64 },

    /// A renewal would not move the expiry forward.
    #[error("renewal must extend expiry: current {current}, proposed {proposed}")]
    Renewal { current: i64, proposed: i64 },

    /// The token has a live revocation record.
    #[error("credential revoked")]
    Revoked,

    /// The presented credential is not the latest known state for its token.
    #[error("rotation mismatch: credential is not the latest for its token")]
    Mismatch,

    /// The backing store timed out or failed.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// A transport blob could not be opened.
    #[error("decryption error: {0}")]
    Decrypt(String),

    /// A transport blob opened to the wrong record width.
    #[error("invalid record size: expected {expected} bytes, got {actual}")]
    InvalidRecordSize { expected: usize, actual: usize },

    /// The credential lacks some required capability bits.
    #[error("not authorized: missing level bits {missing}")]
    Unauthorized { missing: Level },

    /// A stored value is not a valid encoded hash.
    #[error("corrupt store record: {0}")]
    CorruptRecord(String),
}

impl AuthorityError {
    /// Whether retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, AuthorityError::StoreUnavailable(_))
    }

    /// Stable category name for logs.
    pub fn category(&self) -> &'static str {
        match self {
            AuthorityError::MalformedRecord { .. } => "malformed",
            AuthorityError::Signing(_) => "signing",
            AuthorityError::VerificationFailure => "verification",
            AuthorityError::Expired { .. } => "expired",
            AuthorityError::Renewal { .. } => "renewal",
            AuthorityError::Revoked => "revoked",
            AuthorityError::Mismatch => "mismatch",
            AuthorityError::StoreUnavailable(_) => "store_unavailable",
            AuthorityError::Decrypt(_) => "decrypt",
            AuthorityError::InvalidRecordSize { .. } => "record_size",
            AuthorityError::Unauthorized { .. } => "unauthorized",
            AuthorityError::CorruptRecord(_) => "corrupt_record",
        }
    }
}

impl From<CoreError> for AuthorityError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::MalformedRecord { expected, actual } => {
                AuthorityError::MalformedRecord { expected, actual }
            }
            CoreError::Signing(msg) => AuthorityError::Signing(msg),
            CoreError::VerificationFailed => AuthorityError::VerificationFailure,
            CoreError::Expired { expire_at } => AuthorityError::Expired { expire_at },
            CoreError::ExpiryNotExtended { current, proposed } => {
                AuthorityError::Renewal { current, proposed }
            }
        }
    }
}

impl From<CipherError> for AuthorityError {
    fn from(err: CipherError) -> Self {
        match err {
            CipherError::Decrypt(msg) => AuthorityError::Decrypt(msg),
            CipherError::InvalidRecordSize { expected, actual } => {
                AuthorityError::InvalidRecordSize { expected, actual }
            }
            CipherError::Io(e) => AuthorityError::Decrypt(e.to_string()),
        }
    }
}

impl From<StoreError> for AuthorityError {
    fn from(err: StoreError) -> Self {
        AuthorityError::StoreUnavailable(err.to_string())
    }
}

/// Result type for Authority operations.
pub type Result<T> = std::result::Result<T, AuthorityError>;
