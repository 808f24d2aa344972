//! Dogecoin header proof-of-work and merge-mining validation.
//!
//! This crate provides pure Rust implementations of:
//! - Block header and transaction serialization
//! - SHA256 double-hashing and the scrypt proof-of-work hash
//! - Merkle roots and branches
//! - Compact-target proof-of-work checks against chain parameters
//! - AuxPoW (merge-mining) proof decoding, construction and validation

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

pub mod auxpow;
pub mod block;
pub mod coinbase;
pub mod encode;
pub mod error;
pub mod hash;
pub mod merkle;
pub mod network;
pub mod pow;
pub mod transaction;
pub mod validation;

pub use arith_uint256::{ArithU256, DecodedCompact};
pub use auxpow::{get_expected_index, AuxPow, AuxPowHeader, MERGED_MINING_HEADER};
pub use block::BlockHeader;
pub use coinbase::CoinbaseBuilder;
pub use error::{DecodeError, Error, HashError, Result};
pub use hash::{double_sha256, scrypt_hash, sha256};
pub use merkle::{compute_merkle_root, MerkleBranch};
pub use network::{ChainParams, Network};
pub use pow::{block_proof, check_proof_of_work, PowError};
pub use transaction::{Transaction, TxIn, TxOut};
pub use validation::{
    validate_auxpow, validate_header_bytes, validate_header_hex, PowSource, RejectReason,
};
