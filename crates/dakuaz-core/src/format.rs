//! Record format variants.
//!
//! The wire record carries no version byte, so the format must be known out of
//! band. Decoding always names a format explicitly; [`RecordFormat::detect`]
//! only guesses from the length.

use serde::{Deserialize, Serialize};

use crate::canonical::CREDENTIAL_SIZE;
use crate::credential::Credential;
use crate::crypto::{Blake2bHash, SigningSeed};
use crate::error::Result;
use crate::legacy::{LegacyCredential, LEGACY_CREDENTIAL_SIZE};

/// A known credential record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordFormat {
    /// 157 bytes: id, i8 class, i8 level, expiry, echo flag, signature.
    Legacy,
    /// 255 bytes: token, id, i8 class, u32 level, expiry, hash, signature.
    Current,
}

impl RecordFormat {
    /// Fixed record width of this format.
    pub const fn size(self) -> usize {
        match self {
            Self::Legacy => LEGACY_CREDENTIAL_SIZE,
            Self::Current => CREDENTIAL_SIZE,
        }
    }

    /// Guess a format from a record length.
    ///
    /// This is a heuristic: a discriminator byte would be required to make it
    /// reliable.
    pub fn detect(len: usize) -> Option<Self> {
        match len {
            LEGACY_CREDENTIAL_SIZE => Some(Self::Legacy),
            CREDENTIAL_SIZE => Some(Self::Current),
            _ => None,
        }
    }
}

/// A decoded credential of either format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnyCredential {
    Legacy(LegacyCredential),
    Current(Credential),
}

impl AnyCredential {
    /// Decode `bytes` as the given format.
    pub fn decode(format: RecordFormat, bytes: &[u8]) -> Result<Self> {
        match format {
            RecordFormat::Legacy => LegacyCredential::from_bytes(bytes).map(Self::Legacy),
            RecordFormat::Current => Credential::from_bytes(bytes).map(Self::Current),
        }
    }

    /// Encode in the credential's own format.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Legacy(c) => c.to_bytes().to_vec(),
            Self::Current(c) => c.to_bytes().to_vec(),
        }
    }

    pub fn format(&self) -> RecordFormat {
        match self {
            Self::Legacy(_) => RecordFormat::Legacy,
            Self::Current(_) => RecordFormat::Current,
        }
    }

    pub fn id(&self) -> &Blake2bHash {
        match self {
            Self::Legacy(c) => &c.id,
            Self::Current(c) => &c.id,
        }
    }

    pub fn expire_at(&self) -> i64 {
        match self {
            Self::Legacy(c) => c.expire_at,
            Self::Current(c) => c.expire_at,
        }
    }

    pub fn verify(&self, seed: &SigningSeed) -> bool {
        match self {
            Self::Legacy(c) => c.verify(seed),
            Self::Current(c) => c.verify(seed),
        }
    }

    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.expire_at()
    }

    /// The current-format credential, if that is what this is.
    pub fn as_current(&self) -> Option<&Credential> {
        match self {
            Self::Current(c) => Some(c),
            Self::Legacy(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::SEED_SIZE;
    use crate::error::CoreError;
    use crate::level::Level;

    fn seed() -> SigningSeed {
        SigningSeed::from_bytes([0x33; SEED_SIZE])
    }

    #[test]
    fn test_detect_by_length() {
        assert_eq!(RecordFormat::detect(157), Some(RecordFormat::Legacy));
        assert_eq!(RecordFormat::detect(255), Some(RecordFormat::Current));
        assert_eq!(RecordFormat::detect(141), None);
    }

    #[test]
    fn test_formats_never_coerced() {
        let legacy = LegacyCredential::issue_at("alice", 1, 1, 2_000_000_000, false, &seed()).unwrap();
        let bytes = legacy.to_bytes();

        let err = AnyCredential::decode(RecordFormat::Current, &bytes).unwrap_err();
        assert!(matches!(err, CoreError::MalformedRecord { expected: 255, .. }));

        let decoded = AnyCredential::decode(RecordFormat::Legacy, &bytes).unwrap();
        assert_eq!(decoded.format(), RecordFormat::Legacy);
        assert!(decoded.as_current().is_none());
        assert!(decoded.verify(&seed()));
    }

    #[test]
    fn test_current_roundtrip_through_variant() {
        let c = Credential::issue("alice", 1, Level(3), 600, &seed()).unwrap();
        let any = AnyCredential::decode(RecordFormat::Current, &c.to_bytes()).unwrap();
        assert_eq!(any.encode(), c.to_bytes().to_vec());
        assert_eq!(any.id(), &c.id);
        assert_eq!(any.as_current(), Some(&c));
    }
}
