//! SHA256 double-hashing and the scrypt proof-of-work hash.

use alloc::string::String;

use sha2::{Digest, Sha256};

use crate::error::{DecodeError, HashError};

/// Length of every hash handled by this crate.
pub const HASH_LENGTH: usize = 32;

/// Dogecoin's double SHA256: SHA256(SHA256(data)).
///
/// This is the block identity hash, the transaction ID and the merkle
/// tree combiner. It is never used to measure work.
#[inline]
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    let mut result = [0u8; 32];
    result.copy_from_slice(&second);
    result
}

/// Single SHA256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// Double SHA256 of two concatenated hashes.
#[inline]
pub fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut combined = [0u8; 64];
    combined[..32].copy_from_slice(left);
    combined[32..].copy_from_slice(right);
    double_sha256(&combined)
}

/// Scrypt with N=1024, r=1, p=1 and the input as its own salt.
///
/// This is the proof-of-work hash for headers, both the chain's own
/// (when not merge-mined) and the parent block's.
pub fn scrypt_hash(data: &[u8]) -> Result<[u8; 32], HashError> {
    let params = scrypt::Params::new(10, 1, 1, HASH_LENGTH).map_err(|_| HashError::InvalidParams)?;
    let mut output = [0u8; 32];
    scrypt::scrypt(data, data, &params, &mut output).map_err(|_| HashError::InvalidOutputLen)?;
    Ok(output)
}

/// Reverse the byte order of a 32-byte array.
///
/// Hashes are displayed in reverse byte order.
#[inline]
pub fn reverse_bytes(bytes: &[u8; 32]) -> [u8; 32] {
    let mut reversed = *bytes;
    reversed.reverse();
    reversed
}

/// Convert a hash to its display format (reversed hex).
pub fn hash_to_display_hex(hash: &[u8; 32]) -> String {
    hex::encode(reverse_bytes(hash))
}

/// Parse a hash from its display format back to internal byte order.
pub fn hash_from_display_hex(s: &str) -> Result<[u8; 32], DecodeError> {
    let mut hash = [0u8; 32];
    hex::decode_to_slice(s, &mut hash).map_err(|_| DecodeError::InvalidHex)?;
    Ok(reverse_bytes(&hash))
}
