//! Merge-mining proofs.
//!
//! An [`AuxPow`] shows that a parent-chain block committed to this chain's
//! block hash: the hash sits in an auxiliary chain merkle tree whose root
//! appears in the parent coinbase script, and that coinbase is proven into
//! the parent header's merkle root.

use alloc::vec::Vec;

use crate::block::BlockHeader;
use crate::coinbase::CoinbaseBuilder;
use crate::encode::Reader;
use crate::error::{DecodeError, HashError};
use crate::hash::reverse_bytes;
use crate::merkle::MerkleBranch;
use crate::network::ChainParams;
use crate::transaction::Transaction;
use crate::validation::RejectReason;

/// Magic marking the chain merkle root in a parent coinbase script.
pub const MERGED_MINING_HEADER: [u8; 4] = [0xfa, 0xbe, 0x6d, 0x6d];

/// Deepest chain merkle tree a proof may use.
pub const MAX_CHAIN_BRANCH_LENGTH: usize = 30;

/// Without the magic, the root must start within this many script bytes.
pub const MAX_ROOT_OFFSET_WITHOUT_HEADER: usize = 20;

/// Slot a chain occupies in a chain merkle tree of height `h`, fixed by the
/// tree nonce so the same work cannot serve one chain twice.
///
/// All arithmetic wraps at 32 bits. Consensus heights are at most
/// [`MAX_CHAIN_BRANCH_LENGTH`]; for `h >= 32` every `u32` already fits the
/// tree and the value is returned unreduced.
pub fn get_expected_index(nonce: u32, chain_id: i32, h: u32) -> u32 {
    let mut rand = nonce;
    rand = rand.wrapping_mul(1103515245).wrapping_add(12345);
    rand = rand.wrapping_add(chain_id as u32);
    rand = rand.wrapping_mul(1103515245).wrapping_add(12345);
    match 1u32.checked_shl(h) {
        Some(size) => rand % size,
        None => rand,
    }
}

/// The merge-mining proof attached to an AuxPoW header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxPow {
    /// Parent-chain coinbase committing to the chain merkle root.
    pub coinbase_tx: Transaction,
    /// Parent block hash as sent on the wire. Not checked.
    pub parent_hash: [u8; 32],
    /// Proves `coinbase_tx` into the parent merkle root.
    pub coinbase_branch: MerkleBranch,
    /// Proves this chain's block hash into the chain merkle root.
    pub chain_branch: MerkleBranch,
    pub parent_header: BlockHeader,
}

impl AuxPow {
    /// Build the smallest valid proof for `header`: a one-chain tree and a
    /// parent block holding only the coinbase.
    ///
    /// Sets the AuxPoW flag on `header` first, since the committed hash must
    /// include it. The parent nonce still has to be ground until its
    /// proof-of-work hash meets the target.
    pub fn create_minimal(header: &mut BlockHeader) -> Self {
        header.set_auxpow_flag(true);

        let coinbase_tx = CoinbaseBuilder::new(header.block_hash()).build();

        let mut parent_header = BlockHeader::default();
        parent_header.version = 1;
        parent_header.merkle_root = coinbase_tx.txid();

        AuxPow {
            coinbase_tx,
            parent_hash: [0u8; 32],
            coinbase_branch: MerkleBranch::default(),
            chain_branch: MerkleBranch::default(),
            parent_header,
        }
    }

    /// Check that this proof commits to `aux_block_hash` for `chain_id`.
    ///
    /// Proof of work is not checked here.
    pub fn check(
        &self,
        aux_block_hash: &[u8; 32],
        chain_id: i32,
        params: &ChainParams,
    ) -> Result<(), RejectReason> {
        if self.coinbase_branch.side_mask != 0 {
            return Err(RejectReason::NotCoinbase);
        }

        if params.strict_chain_id && self.parent_header.chain_id() == chain_id {
            return Err(RejectReason::ParentHasOurChainId);
        }

        let branch_len = self.chain_branch.len();
        if branch_len > MAX_CHAIN_BRANCH_LENGTH {
            return Err(RejectReason::ChainBranchTooLong(branch_len));
        }

        // Script byte order.
        let chain_root = reverse_bytes(&self.chain_branch.compute_root(aux_block_hash));

        let coinbase_root = self.coinbase_branch.compute_root(&self.coinbase_tx.txid());
        if coinbase_root != self.parent_header.merkle_root {
            return Err(RejectReason::MerkleRootMismatch);
        }

        let script = &self
            .coinbase_tx
            .inputs
            .first()
            .ok_or(RejectReason::MissingCoinbaseInput)?
            .script_sig;

        let root_pos = find(script, &chain_root).ok_or(RejectReason::MissingChainMerkleRoot)?;

        match find(script, &MERGED_MINING_HEADER) {
            Some(header_pos) => {
                if find(&script[header_pos + 1..], &MERGED_MINING_HEADER).is_some() {
                    return Err(RejectReason::MultipleMergedMiningHeaders);
                }
                if header_pos + MERGED_MINING_HEADER.len() != root_pos {
                    return Err(RejectReason::MergedMiningHeaderMisplaced);
                }
            }
            None => {
                if root_pos > MAX_ROOT_OFFSET_WITHOUT_HEADER {
                    return Err(RejectReason::ChainMerkleRootTooLate(root_pos));
                }
            }
        }

        let tail = &script[root_pos + chain_root.len()..];
        if tail.len() < 8 {
            return Err(RejectReason::MissingMerkleSizeAndNonce);
        }
        let size = u32::from_le_bytes([tail[0], tail[1], tail[2], tail[3]]);
        let nonce = u32::from_le_bytes([tail[4], tail[5], tail[6], tail[7]]);

        let height = branch_len as u32;
        let expected_size = 1u32 << height;
        if size != expected_size {
            return Err(RejectReason::MerkleSizeMismatch {
                expected: expected_size,
                got: size,
            });
        }

        let expected_index = get_expected_index(nonce, chain_id, height);
        if u32::try_from(self.chain_branch.side_mask) != Ok(expected_index) {
            return Err(RejectReason::WrongChainIndex {
                expected: expected_index,
                got: self.chain_branch.side_mask,
            });
        }

        Ok(())
    }

    /// Scrypt hash of the parent header, which carries the work.
    pub fn parent_pow_hash(&self) -> Result<[u8; 32], HashError> {
        self.parent_header.pow_hash()
    }

    pub fn encode(&self, output: &mut Vec<u8>) {
        self.coinbase_tx.encode(output);
        output.extend_from_slice(&self.parent_hash);
        self.coinbase_branch.encode(output);
        self.chain_branch.encode(output);
        output.extend_from_slice(&self.parent_header.serialize());
    }

    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(AuxPow {
            coinbase_tx: Transaction::decode_from(reader)?,
            parent_hash: reader.read_hash()?,
            coinbase_branch: MerkleBranch::decode_from(reader)?,
            chain_branch: MerkleBranch::decode_from(reader)?,
            parent_header: BlockHeader::decode_from(reader)?,
        })
    }
}

/// A block header with its merge-mining proof, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxPowHeader {
    pub header: BlockHeader,
    pub auxpow: Option<AuxPow>,
}

impl AuxPowHeader {
    pub fn new(header: BlockHeader, auxpow: Option<AuxPow>) -> Self {
        AuxPowHeader { header, auxpow }
    }

    /// Hash identifying the block.
    pub fn block_hash(&self) -> [u8; 32] {
        self.header.block_hash()
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(512);
        self.encode(&mut output);
        output
    }

    /// Write the header, then the proof if one is attached.
    pub fn encode(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.header.serialize());
        if let Some(auxpow) = &self.auxpow {
            auxpow.encode(output);
        }
    }

    /// Read the header, then a proof only if the version carries the
    /// AuxPoW flag.
    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let header = BlockHeader::decode_from(reader)?;
        let auxpow = if header.is_auxpow() {
            Some(AuxPow::decode_from(reader)?)
        } else {
            None
        };
        Ok(AuxPowHeader { header, auxpow })
    }

    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let header = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(header)
    }

    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        let bytes = hex::decode(s.trim()).map_err(|_| DecodeError::InvalidHex)?;
        Self::deserialize(&bytes)
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}
