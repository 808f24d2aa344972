//! Error types for decoding and validation.

use thiserror::Error;

use crate::validation::RejectReason;

/// Result type alias for operations that decode and validate headers.
pub type Result<T> = core::result::Result<T, Error>;

/// Top-level error: the input either failed to decode or was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The bytes are not a well-formed header.
    #[error("decode error: {0}")]
    Decode(#[from] DecodeError),

    /// The header decoded but failed validation.
    #[error("header rejected: {0}")]
    Rejected(#[from] RejectReason),
}

/// Failure to read consensus-encoded bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// Input ended before a field was complete.
    #[error("unexpected end of input: needed {needed} bytes, {available} available")]
    UnexpectedEof { needed: usize, available: usize },

    /// A length prefix exceeds the allowed maximum.
    #[error("vector length {len} exceeds maximum {max}")]
    OversizedVector { len: u64, max: u64 },

    /// Bytes were left over after a complete value was read.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),

    /// A CompactSize used a longer form than its value needs.
    #[error("non-canonical compact size")]
    NonCanonicalVarInt,

    /// Hex input could not be decoded.
    #[error("invalid hex input")]
    InvalidHex,
}

/// Failure of the scrypt hash backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum HashError {
    #[error("invalid scrypt parameters")]
    InvalidParams,

    #[error("invalid scrypt output length")]
    InvalidOutputLen,
}
