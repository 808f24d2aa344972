//! Header proof-of-work validation, merge-mined or not.

use core::fmt;

use thiserror::Error;
use tracing::{debug, trace};

use crate::auxpow::AuxPowHeader;
use crate::error::{DecodeError, Result};
use crate::network::ChainParams;
use crate::pow::{check_proof_of_work, PowError};

/// Which header's work failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowSource {
    /// The header itself, when it is not merge-mined.
    Aux,
    /// The parent block of a merge-mined header.
    Parent,
}

impl fmt::Display for PowSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PowSource::Aux => f.write_str("aux"),
            PowSource::Parent => f.write_str("parent"),
        }
    }
}

/// Why a header was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("block does not have our chain ID (got {got}, expected {expected})")]
    WrongChainId { got: i32, expected: i32 },

    #[error("no auxpow on block with auxpow version")]
    AuxPowBitWithoutPayload,

    #[error("auxpow on block with non-auxpow version")]
    AuxPowPayloadWithoutBit,

    #[error("auxpow coinbase is not the first parent transaction")]
    NotCoinbase,

    #[error("auxpow parent has our chain ID")]
    ParentHasOurChainId,

    #[error("auxpow chain merkle branch too long ({0} levels)")]
    ChainBranchTooLong(usize),

    #[error("auxpow coinbase is not in the parent merkle tree")]
    MerkleRootMismatch,

    #[error("auxpow coinbase has no inputs")]
    MissingCoinbaseInput,

    #[error("auxpow missing chain merkle root in parent coinbase")]
    MissingChainMerkleRoot,

    #[error("multiple merged mining headers in coinbase")]
    MultipleMergedMiningHeaders,

    #[error("merged mining header is not just before chain merkle root")]
    MergedMiningHeaderMisplaced,

    #[error("auxpow chain merkle root must start in the first 20 bytes (found at {0})")]
    ChainMerkleRootTooLate(usize),

    #[error("auxpow missing chain merkle tree size and nonce in parent coinbase")]
    MissingMerkleSizeAndNonce,

    #[error("auxpow merkle branch size does not match parent coinbase (expected {expected}, got {got})")]
    MerkleSizeMismatch { expected: u32, got: u32 },

    #[error("auxpow wrong index (expected {expected}, got {got})")]
    WrongChainIndex { expected: u32, got: i32 },

    #[error("{0} proof of work failed: {1}")]
    ProofOfWorkInvalid(PowSource, PowError),
}

/// Validate a header's proof of work, following the merge-mining proof if
/// one is attached.
///
/// Pure and stateless: the result depends only on `header` and `params`.
pub fn validate_auxpow(
    header: &AuxPowHeader,
    params: &ChainParams,
) -> core::result::Result<(), RejectReason> {
    let result = check_header(header, params);
    match &result {
        Ok(()) => trace!(
            version = header.header.version,
            auxpow = header.auxpow.is_some(),
            "header proof of work accepted"
        ),
        Err(reason) => debug!(
            chain_id = header.header.chain_id(),
            version = header.header.version,
            reason = %reason,
            "header rejected"
        ),
    }
    result
}

fn check_header(
    header: &AuxPowHeader,
    params: &ChainParams,
) -> core::result::Result<(), RejectReason> {
    let block = &header.header;
    let chain_id = block.chain_id();

    // Legacy blocks predate merge-mining and carry no chain ID.
    if !block.is_legacy() && params.strict_chain_id && chain_id != params.auxpow_chain_id {
        return Err(RejectReason::WrongChainId {
            got: chain_id,
            expected: params.auxpow_chain_id,
        });
    }

    let Some(auxpow) = &header.auxpow else {
        if block.is_auxpow() {
            return Err(RejectReason::AuxPowBitWithoutPayload);
        }
        let pow_hash = block
            .pow_hash()
            .map_err(|e| RejectReason::ProofOfWorkInvalid(PowSource::Aux, e.into()))?;
        return check_proof_of_work(&pow_hash, block.bits, params)
            .map_err(|e| RejectReason::ProofOfWorkInvalid(PowSource::Aux, e));
    };

    if !block.is_auxpow() {
        return Err(RejectReason::AuxPowPayloadWithoutBit);
    }

    auxpow.check(&block.block_hash(), chain_id, params)?;

    // The parent carries the work, measured against this chain's target.
    let parent_hash = auxpow
        .parent_pow_hash()
        .map_err(|e| RejectReason::ProofOfWorkInvalid(PowSource::Parent, e.into()))?;
    check_proof_of_work(&parent_hash, block.bits, params)
        .map_err(|e| RejectReason::ProofOfWorkInvalid(PowSource::Parent, e))
}

/// Decode a serialized header (with its proof, if flagged) and validate it.
pub fn validate_header_bytes(bytes: &[u8], params: &ChainParams) -> Result<AuxPowHeader> {
    let header = AuxPowHeader::deserialize(bytes)?;
    validate_auxpow(&header, params)?;
    Ok(header)
}

/// Hex form of [`validate_header_bytes`].
pub fn validate_header_hex(s: &str, params: &ChainParams) -> Result<AuxPowHeader> {
    let bytes = hex::decode(s.trim()).map_err(|_| DecodeError::InvalidHex)?;
    validate_header_bytes(&bytes, params)
}
