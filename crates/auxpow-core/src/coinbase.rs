//! Parent-chain coinbase construction for merge-mining.
//!
//! A merge-mined block is proven by a parent-chain coinbase whose input
//! script commits to the auxiliary chain merkle root, followed by the
//! merkle tree size and nonce that fix each chain's slot in that tree.

use alloc::vec;
use alloc::vec::Vec;

use crate::auxpow::MERGED_MINING_HEADER;
use crate::hash::reverse_bytes;
use crate::transaction::{Transaction, TxIn, TxOut};

/// Builder for constructing parent coinbase transactions.
#[derive(Debug, Clone)]
pub struct CoinbaseBuilder {
    /// Root of the auxiliary chain merkle tree (internal byte order).
    chain_merkle_root: [u8; 32],
    /// Leaf count of the auxiliary chain merkle tree.
    merkle_size: u32,
    /// Nonce feeding the chain slot selection.
    merkle_nonce: u32,
    /// Parent block height (BIP34), if the parent chain requires it.
    block_height: Option<u32>,
    /// Prefix the commitment with the merged-mining magic.
    merged_mining_header: bool,
    /// Extra nonce data for parent merkle root variation.
    extra_nonce: Option<[u8; 8]>,
    outputs: Vec<TxOut>,
}

impl CoinbaseBuilder {
    /// Create a builder committing to `chain_merkle_root`, for a tree
    /// holding a single chain.
    pub fn new(chain_merkle_root: [u8; 32]) -> Self {
        CoinbaseBuilder {
            chain_merkle_root,
            merkle_size: 1,
            merkle_nonce: 0,
            block_height: None,
            merged_mining_header: false,
            extra_nonce: None,
            outputs: Vec::new(),
        }
    }

    /// Set the chain merkle tree size and nonce.
    pub fn with_merkle_params(mut self, size: u32, nonce: u32) -> Self {
        self.merkle_size = size;
        self.merkle_nonce = nonce;
        self
    }

    /// Start the script with the parent block height.
    pub fn with_block_height(mut self, height: u32) -> Self {
        self.block_height = Some(height);
        self
    }

    /// Prefix the commitment with `fa be 6d 6d`.
    pub fn with_merged_mining_header(mut self, enabled: bool) -> Self {
        self.merged_mining_header = enabled;
        self
    }

    /// Set the extra nonce (used to vary the parent merkle root).
    pub fn with_extra_nonce(mut self, extra_nonce: [u8; 8]) -> Self {
        self.extra_nonce = Some(extra_nonce);
        self
    }

    pub fn with_output(mut self, value: u64, script_pubkey: Vec<u8>) -> Self {
        self.outputs.push(TxOut {
            value,
            script_pubkey,
        });
        self
    }

    /// Build the coinbase transaction.
    pub fn build(&self) -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TxIn::coinbase(self.build_script_sig())],
            outputs: self.outputs.clone(),
            lock_time: 0,
        }
    }

    /// Build the input script: `[height] <commitment> [extra nonce]`.
    pub fn build_script_sig(&self) -> Vec<u8> {
        let mut script_sig = Vec::with_capacity(64);

        if let Some(height) = self.block_height {
            let height_bytes = encode_block_height(height);
            script_sig.push(height_bytes.len() as u8); // Push opcode
            script_sig.extend_from_slice(&height_bytes);
        }

        let commitment = self.commitment();
        script_sig.push(commitment.len() as u8);
        script_sig.extend_from_slice(&commitment);

        if let Some(extra_nonce) = self.extra_nonce {
            script_sig.push(extra_nonce.len() as u8);
            script_sig.extend_from_slice(&extra_nonce);
        }

        script_sig
    }

    /// `[magic] root size nonce`, with the root in script byte order.
    fn commitment(&self) -> Vec<u8> {
        let mut commitment = Vec::with_capacity(44);
        if self.merged_mining_header {
            commitment.extend_from_slice(&MERGED_MINING_HEADER);
        }
        commitment.extend_from_slice(&reverse_bytes(&self.chain_merkle_root));
        commitment.extend_from_slice(&self.merkle_size.to_le_bytes());
        commitment.extend_from_slice(&self.merkle_nonce.to_le_bytes());
        commitment
    }
}

/// Encode a block height according to BIP34.
///
/// The height is minimally encoded as a little-endian integer with proper handling
/// of the sign bit.
fn encode_block_height(height: u32) -> Vec<u8> {
    if height == 0 {
        // Special case: OP_0 for height 0
        return vec![];
    }

    let mut bytes = Vec::new();
    let mut n = height;

    while n > 0 {
        bytes.push((n & 0xFF) as u8);
        n >>= 8;
    }

    // If the high bit is set, append a 0x00 byte to prevent it being
    // interpreted as negative
    if let Some(&last) = bytes.last() {
        if last & 0x80 != 0 {
            bytes.push(0x00);
        }
    }

    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_block_height() {
        assert_eq!(encode_block_height(0), Vec::<u8>::new());
        assert_eq!(encode_block_height(1), vec![0x01]);
        assert_eq!(encode_block_height(127), vec![0x7F]);
        // 0x80 needs padding to avoid reading as negative
        assert_eq!(encode_block_height(128), vec![0x80, 0x00]);
        assert_eq!(encode_block_height(256), vec![0x00, 0x01]);
        assert_eq!(encode_block_height(500000), vec![0x20, 0xA1, 0x07]);
    }

    #[test]
    fn test_minimal_script() {
        let mut root = [0u8; 32];
        root[0] = 0x01;
        root[31] = 0xff;

        let script = CoinbaseBuilder::new(root).build_script_sig();

        assert_eq!(script.len(), 41);
        assert_eq!(script[0], 0x28);
        assert_eq!(script[1], 0xff);
        assert_eq!(script[32], 0x01);
        assert_eq!(&script[33..], &[1, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_full_script_layout() {
        let root = [0x77u8; 32];
        let script = CoinbaseBuilder::new(root)
            .with_block_height(500000)
            .with_merged_mining_header(true)
            .with_merkle_params(8, 0xdeadbeef)
            .with_extra_nonce([9; 8])
            .build_script_sig();

        assert_eq!(&script[..4], &[0x03, 0x20, 0xA1, 0x07]);
        assert_eq!(script[4], 44);
        assert_eq!(&script[5..9], &MERGED_MINING_HEADER);
        assert_eq!(&script[9..41], &root);
        assert_eq!(&script[41..45], &[8, 0, 0, 0]);
        assert_eq!(&script[45..49], &[0xef, 0xbe, 0xad, 0xde]);
        assert_eq!(script[49], 8);
        assert_eq!(&script[50..], &[9; 8]);
    }

    #[test]
    fn test_build_coinbase() {
        let coinbase = CoinbaseBuilder::new([0u8; 32])
            .with_output(10_000 * 100_000_000, vec![0x51])
            .build();

        assert!(coinbase.is_coinbase());
        assert_eq!(coinbase.version, 1);
        assert_eq!(coinbase.outputs.len(), 1);
        assert_eq!(Transaction::deserialize(&coinbase.serialize()), Ok(coinbase));
    }
}
