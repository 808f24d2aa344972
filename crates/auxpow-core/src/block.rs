//! Dogecoin block header serialization and version-field helpers.

use arith_uint256::{ArithU256, DecodedCompact};

use crate::encode::Reader;
use crate::error::{DecodeError, HashError};
use crate::hash::{double_sha256, scrypt_hash};

/// Size of a block header in bytes.
pub const BLOCK_HEADER_SIZE: usize = 80;

/// Version bit flagging an attached AuxPoW payload.
pub const VERSION_AUXPOW: i32 = 1 << 8;

/// Multiplier placing the chain ID in the upper half of the version.
pub const VERSION_CHAIN_START: i32 = 1 << 16;

/// A block header (80 bytes).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BlockHeader {
    /// Base version, AuxPoW flag and chain ID packed together.
    pub version: i32,
    /// Hash of the previous block (internal byte order).
    pub prev_block_hash: [u8; 32],
    /// Merkle root of all transactions.
    pub merkle_root: [u8; 32],
    /// Block timestamp (Unix time).
    pub timestamp: u32,
    /// Difficulty target in compact "bits" format.
    pub bits: u32,
    /// Nonce for proof of work.
    pub nonce: u32,
}

impl BlockHeader {
    /// Create a new block header.
    pub fn new(
        version: i32,
        prev_block_hash: [u8; 32],
        merkle_root: [u8; 32],
        timestamp: u32,
        bits: u32,
    ) -> Self {
        BlockHeader {
            version,
            prev_block_hash,
            merkle_root,
            timestamp,
            bits,
            nonce: 0,
        }
    }

    /// Serialize the block header to 80 bytes.
    pub fn serialize(&self) -> [u8; BLOCK_HEADER_SIZE] {
        let mut header = [0u8; BLOCK_HEADER_SIZE];

        header[0..4].copy_from_slice(&self.version.to_le_bytes());
        header[4..36].copy_from_slice(&self.prev_block_hash);
        header[36..68].copy_from_slice(&self.merkle_root);
        header[68..72].copy_from_slice(&self.timestamp.to_le_bytes());
        header[72..76].copy_from_slice(&self.bits.to_le_bytes());
        header[76..80].copy_from_slice(&self.nonce.to_le_bytes());

        header
    }

    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(BlockHeader {
            version: reader.read_i32_le()?,
            prev_block_hash: reader.read_hash()?,
            merkle_root: reader.read_hash()?,
            timestamp: reader.read_u32_le()?,
            bits: reader.read_u32_le()?,
            nonce: reader.read_u32_le()?,
        })
    }

    /// Decode a header from exactly 80 bytes.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let header = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(header)
    }

    /// Compute the block hash (double SHA256). This identifies the block;
    /// it is not the proof-of-work hash.
    pub fn block_hash(&self) -> [u8; 32] {
        double_sha256(&self.serialize())
    }

    /// Compute the proof-of-work hash (scrypt).
    pub fn pow_hash(&self) -> Result<[u8; 32], HashError> {
        scrypt_hash(&self.serialize())
    }

    /// Decode the compact `bits` field.
    pub fn target(&self) -> DecodedCompact {
        ArithU256::from_compact(self.bits)
    }

    /// Chain ID carried in the upper half of the version.
    pub fn chain_id(&self) -> i32 {
        self.version >> 16
    }

    /// Whether the AuxPoW flag is set.
    pub fn is_auxpow(&self) -> bool {
        self.version & VERSION_AUXPOW != 0
    }

    /// Whether this header predates merge-mining and so carries no chain ID.
    /// One stray version-2 block without AuxPoW is also treated as legacy.
    pub fn is_legacy(&self) -> bool {
        self.version == 1 || (self.version == 2 && self.chain_id() == 0)
    }

    /// Version with the AuxPoW flag and chain ID stripped.
    pub fn base_version(&self) -> i32 {
        self.version % VERSION_AUXPOW
    }

    /// Replace the chain ID, keeping the base version and AuxPoW flag.
    pub fn set_chain_id(&mut self, chain_id: i32) {
        self.version %= VERSION_CHAIN_START;
        self.version |= chain_id.wrapping_mul(VERSION_CHAIN_START);
    }

    pub fn set_auxpow_flag(&mut self, auxpow: bool) {
        if auxpow {
            self.version |= VERSION_AUXPOW;
        } else {
            self.version &= !VERSION_AUXPOW;
        }
    }
}
