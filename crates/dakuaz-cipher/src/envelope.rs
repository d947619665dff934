//! Sealing and opening transport blobs.
//!
//! Blob layout: `nonce (24 bytes) || XChaCha20(plaintext)`. There is no
//! authentication tag. Opening with the wrong password yields garbage rather
//! than an error; a wrapped credential's own signature is what detects it.

use std::io::{ErrorKind, Read, Write};

use crate::crypto::{TransportKey, TransportNonce, NONCE_SIZE};
use crate::error::{CipherError, Result};

/// I/O buffer size used by the streaming forms. Not part of the format.
pub const CHUNK_SIZE: usize = 64;

/// Seal `plaintext` under `password` with a fresh random nonce.
pub fn seal(plaintext: &[u8], password: &[u8]) -> Vec<u8> {
    seal_with_nonce(plaintext, password, &TransportNonce::generate())
}

/// Seal with a caller-chosen nonce. A nonce must never be reused with the
/// same password.
pub fn seal_with_nonce(plaintext: &[u8], password: &[u8], nonce: &TransportNonce) -> Vec<u8> {
    let mut out = Vec::with_capacity(NONCE_SIZE + plaintext.len());
    out.extend_from_slice(nonce.as_bytes());
    out.extend_from_slice(plaintext);
    TransportKey::derive(password)
        .keystream(nonce)
        .apply(&mut out[NONCE_SIZE..]);
    out
}

/// Open a blob produced by [`seal`].
pub fn open(ciphertext: &[u8], password: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.len() < NONCE_SIZE {
        return Err(CipherError::Decrypt(format!(
            "ciphertext of {} bytes is shorter than the {}-byte nonce",
            ciphertext.len(),
            NONCE_SIZE
        )));
    }
    let (prefix, body) = ciphertext.split_at(NONCE_SIZE);
    let mut nonce = [0u8; NONCE_SIZE];
    nonce.copy_from_slice(prefix);

    let mut plaintext = body.to_vec();
    TransportKey::derive(password)
        .keystream(&TransportNonce(nonce))
        .apply(&mut plaintext);
    Ok(plaintext)
}

/// Open a blob that must decrypt to exactly `N` bytes.
///
/// The width check is the only integrity signal this layer has.
pub fn open_record<const N: usize>(ciphertext: &[u8], password: &[u8]) -> Result<[u8; N]> {
    let plaintext = open(ciphertext, password)?;
    plaintext
        .as_slice()
        .try_into()
        .map_err(|_| CipherError::InvalidRecordSize {
            expected: N,
            actual: plaintext.len(),
        })
}

/// Seal everything read from `src` into `dst` in [`CHUNK_SIZE`] pieces.
///
/// Returns the number of plaintext bytes consumed.
pub fn seal_stream<R: Read, W: Write>(src: &mut R, dst: &mut W, password: &[u8]) -> Result<u64> {
    let nonce = TransportNonce::generate();
    dst.write_all(nonce.as_bytes())?;
    xor_copy(src, dst, &TransportKey::derive(password), &nonce)
}

/// Open a sealed stream from `src` into `dst`.
///
/// Returns the number of plaintext bytes written.
pub fn open_stream<R: Read, W: Write>(src: &mut R, dst: &mut W, password: &[u8]) -> Result<u64> {
    let mut nonce = [0u8; NONCE_SIZE];
    src.read_exact(&mut nonce).map_err(|e| match e.kind() {
        ErrorKind::UnexpectedEof => {
            CipherError::Decrypt("stream ended before the nonce was read".into())
        }
        _ => CipherError::Io(e),
    })?;
    xor_copy(src, dst, &TransportKey::derive(password), &TransportNonce(nonce))
}

fn xor_copy<R: Read, W: Write>(
    src: &mut R,
    dst: &mut W,
    key: &TransportKey,
    nonce: &TransportNonce,
) -> Result<u64> {
    let mut keystream = key.keystream(nonce);
    let mut buf = [0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let n = match src.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        };
        keystream.apply(&mut buf[..n]);
        dst.write_all(&buf[..n])?;
        total += n as u64;
    }

    Ok(total)
}
