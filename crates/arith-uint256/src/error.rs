//! Errors produced by 256-bit arithmetic.

use thiserror::Error;

/// Failure of a fallible [`ArithU256`](crate::ArithU256) operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum UintError {
    /// The divisor was zero.
    #[error("division by zero")]
    DivisionByZero,
    /// A strict hex parse met an empty string, a non-hex character or more than 64 digits.
    #[error("invalid 256-bit hex string")]
    InvalidHex,
}
