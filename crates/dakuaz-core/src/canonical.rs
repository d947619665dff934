//! Canonical byte layout of a credential and its hash binding.
//!
//! The record is positional: fields are concatenated in a fixed order with
//! fixed widths, no separators and no length prefixes.
//!
//! ```text
//! offset  width  field
//!      0     64  token      raw
//!     64     32  id         BLAKE2b-256(principal)
//!     96      1  class      i8
//!     97      4  level      u32 big-endian
//!    101      8  expire_at  i64 big-endian
//!    109     32  hash       binding digest
//!    141    114  signature  Ed448 over hash
//!    ---
//!    255
//! ```
//!
//! The binding digest is
//! `BLAKE2b-256(BLAKE2b-256(token || id || be64(class) || be64(level) || be64(expire_at)))`
//! with `class` sign-extended and `level` zero-extended to 64 bits. Any other
//! byte order produces signatures that will not verify elsewhere.

use crate::credential::Credential;
use crate::crypto::{Blake2bHash, Ed448Signature, DIGEST_SIZE, SIGNATURE_SIZE};
use crate::error::{CoreError, Result};
use crate::level::Level;
use crate::types::{TokenId, TOKEN_SIZE};

/// Field widths and offsets of the current record layout.
pub mod layout {
    use super::{DIGEST_SIZE, SIGNATURE_SIZE, TOKEN_SIZE};

    pub const TOKEN: usize = 0;
    pub const ID: usize = TOKEN + TOKEN_SIZE;
    pub const CLASS: usize = ID + DIGEST_SIZE;
    pub const LEVEL: usize = CLASS + 1;
    pub const EXPIRE_AT: usize = LEVEL + 4;
    pub const HASH: usize = EXPIRE_AT + 8;
    pub const SIGNATURE: usize = HASH + DIGEST_SIZE;
    pub const END: usize = SIGNATURE + SIGNATURE_SIZE;
}

/// Total width of a serialized credential.
pub const CREDENTIAL_SIZE: usize = layout::END;

/// Width of the pre-image fed to the inner binding digest.
pub const BINDING_MESSAGE_SIZE: usize = TOKEN_SIZE + DIGEST_SIZE + 8 + 8 + 8;

/// Build the binding pre-image from the bound fields.
pub fn binding_message(
    token: &TokenId,
    id: &Blake2bHash,
    class: i8,
    level: Level,
    expire_at: i64,
) -> [u8; BINDING_MESSAGE_SIZE] {
    let mut buf = [0u8; BINDING_MESSAGE_SIZE];
    let mut at = 0;
    for part in [
        &token.0[..],
        &id.0[..],
        &i64::from(class).to_be_bytes()[..],
        &u64::from(level.bits()).to_be_bytes()[..],
        &expire_at.to_be_bytes()[..],
    ] {
        buf[at..at + part.len()].copy_from_slice(part);
        at += part.len();
    }
    buf
}

/// Compute the binding digest over the bound fields.
pub fn binding_hash(
    token: &TokenId,
    id: &Blake2bHash,
    class: i8,
    level: Level,
    expire_at: i64,
) -> Blake2bHash {
    let inner = Blake2bHash::digest(&binding_message(token, id, class, level, expire_at));
    Blake2bHash::digest(inner.as_bytes())
}

/// Encode a credential to its fixed-width record.
pub fn encode_record(credential: &Credential) -> [u8; CREDENTIAL_SIZE] {
    let mut buf = [0u8; CREDENTIAL_SIZE];
    buf[layout::TOKEN..layout::ID].copy_from_slice(&credential.token.0);
    buf[layout::ID..layout::CLASS].copy_from_slice(&credential.id.0);
    buf[layout::CLASS] = credential.class as u8;
    buf[layout::LEVEL..layout::EXPIRE_AT].copy_from_slice(&credential.level.bits().to_be_bytes());
    buf[layout::EXPIRE_AT..layout::HASH].copy_from_slice(&credential.expire_at.to_be_bytes());
    buf[layout::HASH..layout::SIGNATURE].copy_from_slice(&credential.hash.0);
    buf[layout::SIGNATURE..layout::END].copy_from_slice(&credential.signature.0);
    buf
}

/// Decode a fixed-width record. The length must match exactly.
pub fn decode_record(bytes: &[u8]) -> Result<Credential> {
    if bytes.len() != CREDENTIAL_SIZE {
        return Err(CoreError::MalformedRecord {
            expected: CREDENTIAL_SIZE,
            actual: bytes.len(),
        });
    }

    let mut token = [0u8; TOKEN_SIZE];
    token.copy_from_slice(&bytes[layout::TOKEN..layout::ID]);
    let mut id = [0u8; DIGEST_SIZE];
    id.copy_from_slice(&bytes[layout::ID..layout::CLASS]);
    let mut level = [0u8; 4];
    level.copy_from_slice(&bytes[layout::LEVEL..layout::EXPIRE_AT]);
    let mut expire_at = [0u8; 8];
    expire_at.copy_from_slice(&bytes[layout::EXPIRE_AT..layout::HASH]);
    let mut hash = [0u8; DIGEST_SIZE];
    hash.copy_from_slice(&bytes[layout::HASH..layout::SIGNATURE]);
    let mut signature = [0u8; SIGNATURE_SIZE];
    signature.copy_from_slice(&bytes[layout::SIGNATURE..layout::END]);

    Ok(Credential {
        token: TokenId(token),
        id: Blake2bHash(id),
        class: bytes[layout::CLASS] as i8,
        level: Level(u32::from_be_bytes(level)),
        expire_at: i64::from_be_bytes(expire_at),
        hash: Blake2bHash(hash),
        signature: Ed448Signature(signature),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_offsets() {
        assert_eq!(layout::ID, 64);
        assert_eq!(layout::CLASS, 96);
        assert_eq!(layout::LEVEL, 97);
        assert_eq!(layout::EXPIRE_AT, 101);
        assert_eq!(layout::HASH, 109);
        assert_eq!(layout::SIGNATURE, 141);
        assert_eq!(CREDENTIAL_SIZE, 255);
        assert_eq!(BINDING_MESSAGE_SIZE, 120);
    }

    #[test]
    fn test_binding_message_widens_integers() {
        let token = TokenId([0x11; TOKEN_SIZE]);
        let id = Blake2bHash([0x22; DIGEST_SIZE]);
        let msg = binding_message(&token, &id, -1, Level(0x0102_0304), 0x0a0b);

        assert_eq!(&msg[..64], &[0x11; 64][..]);
        assert_eq!(&msg[64..96], &[0x22; 32][..]);
        // class -1 sign-extends to eight 0xff bytes
        assert_eq!(&msg[96..104], &[0xff; 8][..]);
        assert_eq!(&msg[104..112], &[0, 0, 0, 0, 1, 2, 3, 4][..]);
        assert_eq!(&msg[112..120], &[0, 0, 0, 0, 0, 0, 0x0a, 0x0b][..]);
    }

    #[test]
    fn test_binding_hash_is_double_digest() {
        let token = TokenId([0x01; TOKEN_SIZE]);
        let id = Blake2bHash::digest(b"alice");
        let msg = binding_message(&token, &id, 1, Level(3), 1_700_000_000);
        let expected = Blake2bHash::digest(Blake2bHash::digest(&msg).as_bytes());
        assert_eq!(binding_hash(&token, &id, 1, Level(3), 1_700_000_000), expected);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let err = decode_record(&[0u8; CREDENTIAL_SIZE - 1]).unwrap_err();
        assert!(matches!(
            err,
            CoreError::MalformedRecord { expected: 255, actual: 254 }
        ));
        assert!(decode_record(&[0u8; CREDENTIAL_SIZE + 1]).is_err());
        assert!(decode_record(&[]).is_err());
    }

    #[test]
    fn test_field_positions_in_record() {
        let credential = Credential {
            token: TokenId([0xaa; TOKEN_SIZE]),
            id: Blake2bHash([0xbb; DIGEST_SIZE]),
            class: -2,
            level: Level(0xdead_beef),
            expire_at: -5,
            hash: Blake2bHash([0xcc; DIGEST_SIZE]),
            signature: Ed448Signature([0xdd; SIGNATURE_SIZE]),
        };
        let bytes = encode_record(&credential);

        assert_eq!(bytes[layout::CLASS], 0xfe);
        assert_eq!(&bytes[layout::LEVEL..layout::EXPIRE_AT], &[0xde, 0xad, 0xbe, 0xef]);
        assert_eq!(&bytes[layout::EXPIRE_AT..layout::HASH], &(-5i64).to_be_bytes());
        assert_eq!(bytes[layout::HASH], 0xcc);
        assert_eq!(bytes[layout::SIGNATURE], 0xdd);
        assert_eq!(decode_record(&bytes).unwrap(), credential);
    }
}
