//! Store key and value encoding.
//!
//! Token identities and binding hashes are written to the backends as
//! URL-safe base64 without padding.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use dakuaz_core::{Blake2bHash, TokenId};

use crate::error::{AuthorityError, Result};

/// Store key for a token identity.
pub fn token_key(token: &TokenId) -> String {
    URL_SAFE_NO_PAD.encode(token.as_bytes())
}

/// Store value for a binding hash.
pub fn hash_value(hash: &Blake2bHash) -> String {
    URL_SAFE_NO_PAD.encode(hash.as_bytes())
}

/// Parse a stored hash value.
pub fn decode_hash(value: &str) -> Result<Blake2bHash> {
    let bytes = URL_SAFE_NO_PAD
        .decode(value)
        .map_err(|e| AuthorityError::CorruptRecord(e.to_string()))?;
    Blake2bHash::try_from(bytes.as_slice())
        .map_err(|_| AuthorityError::CorruptRecord(format!("hash of {} bytes", bytes.len())))
}
