//! Transactions in legacy (non-witness) serialization.
//!
//! Only the parent chain's coinbase travels inside an AuxPoW payload, but it
//! is an ordinary transaction on the wire, so the full shape is modelled.

use alloc::vec::Vec;

use crate::encode::{write_compact_size, write_var_bytes, Reader};
use crate::error::DecodeError;
use crate::hash::double_sha256;

/// Previous-output index marking a coinbase input.
pub const COINBASE_PREV_VOUT: u32 = 0xFFFF_FFFF;

/// Default input sequence.
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

/// A transaction input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    /// Spent transaction (internal byte order).
    pub prev_txid: [u8; 32],
    /// Spent output index.
    pub prev_vout: u32,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    /// An input spending the null outpoint, as a coinbase does.
    pub fn coinbase(script_sig: Vec<u8>) -> Self {
        TxIn {
            prev_txid: [0u8; 32],
            prev_vout: COINBASE_PREV_VOUT,
            script_sig,
            sequence: SEQUENCE_FINAL,
        }
    }

    fn encode(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.prev_txid);
        output.extend_from_slice(&self.prev_vout.to_le_bytes());
        write_var_bytes(&self.script_sig, output);
        output.extend_from_slice(&self.sequence.to_le_bytes());
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(TxIn {
            prev_txid: reader.read_hash()?,
            prev_vout: reader.read_u32_le()?,
            script_sig: reader.read_var_bytes()?,
            sequence: reader.read_u32_le()?,
        })
    }
}

/// A transaction output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    /// Amount in koinu.
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

impl TxOut {
    fn encode(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.value.to_le_bytes());
        write_var_bytes(&self.script_pubkey, output);
    }

    fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        Ok(TxOut {
            value: reader.read_u64_le()?,
            script_pubkey: reader.read_var_bytes()?,
        })
    }
}

/// A transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
}

impl Transaction {
    /// Serialize to consensus bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut output = Vec::with_capacity(200);
        self.encode(&mut output);
        output
    }

    pub fn encode(&self, output: &mut Vec<u8>) {
        output.extend_from_slice(&self.version.to_le_bytes());

        write_compact_size(self.inputs.len() as u64, output);
        for input in &self.inputs {
            input.encode(output);
        }

        write_compact_size(self.outputs.len() as u64, output);
        for out in &self.outputs {
            out.encode(output);
        }

        output.extend_from_slice(&self.lock_time.to_le_bytes());
    }

    pub fn decode_from(reader: &mut Reader<'_>) -> Result<Self, DecodeError> {
        let version = reader.read_i32_le()?;

        let input_count = reader.read_length()?;
        let inputs = (0..input_count)
            .map(|_| TxIn::decode_from(reader))
            .collect::<Result<Vec<_>, _>>()?;

        let output_count = reader.read_length()?;
        let outputs = (0..output_count)
            .map(|_| TxOut::decode_from(reader))
            .collect::<Result<Vec<_>, _>>()?;

        let lock_time = reader.read_u32_le()?;

        Ok(Transaction {
            version,
            inputs,
            outputs,
            lock_time,
        })
    }

    /// Decode a transaction that spans exactly `bytes`.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(bytes);
        let tx = Self::decode_from(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// Transaction ID (double SHA256 of the serialization).
    pub fn txid(&self) -> [u8; 32] {
        double_sha256(&self.serialize())
    }

    /// A single input spending the null outpoint.
    pub fn is_coinbase(&self) -> bool {
        self.inputs.len() == 1
            && self.inputs[0].prev_txid == [0u8; 32]
            && self.inputs[0].prev_vout == COINBASE_PREV_VOUT
    }
}
