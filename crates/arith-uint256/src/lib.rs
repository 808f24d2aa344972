//! Fixed-width 256-bit unsigned integers for proof-of-work targets.
//!
//! This crate provides:
//! - [`ArithU256`], an eight-word little-endian unsigned integer with
//!   wrapping add/sub/mul, long division, shifts and bitwise operations
//! - The "compact" 32-bit target encoding (`nBits`) used in block headers
//! - Big-endian hex parsing and formatting

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod compact;
pub mod error;
pub mod uint;

pub use compact::{compact_to_target, target_to_compact, DecodedCompact};
pub use error::UintError;
pub use uint::ArithU256;
