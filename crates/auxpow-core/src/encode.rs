//! Consensus byte codec: little-endian integers, CompactSize lengths and
//! length-prefixed vectors.

use alloc::vec::Vec;

use crate::error::DecodeError;

/// Upper bound on any length prefix.
pub const MAX_VECTOR_SIZE: u64 = 0x0200_0000;

/// Encode a variable-length integer (Bitcoin CompactSize).
pub fn write_compact_size(value: u64, output: &mut Vec<u8>) {
    if value < 0xfd {
        output.push(value as u8);
    } else if value <= 0xffff {
        output.push(0xfd);
        output.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        output.push(0xfe);
        output.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        output.push(0xff);
        output.extend_from_slice(&value.to_le_bytes());
    }
}

/// Write a CompactSize length followed by the bytes.
pub fn write_var_bytes(bytes: &[u8], output: &mut Vec<u8>) {
    write_compact_size(bytes.len() as u64, output);
    output.extend_from_slice(bytes);
}

/// Write a CompactSize count followed by each 32-byte hash.
pub fn write_hashes(hashes: &[[u8; 32]], output: &mut Vec<u8>) {
    write_compact_size(hashes.len() as u64, output);
    for hash in hashes {
        output.extend_from_slice(hash);
    }
}

/// Cursor over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fail unless every byte has been consumed.
    pub fn finish(&self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if len > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                needed: len,
                available: self.remaining(),
            });
        }
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.read_bytes(N)?);
        Ok(array)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_le(&mut self) -> Result<u16, DecodeError> {
        self.read_array().map(u16::from_le_bytes)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, DecodeError> {
        self.read_array().map(u32::from_le_bytes)
    }

    pub fn read_i32_le(&mut self) -> Result<i32, DecodeError> {
        self.read_array().map(i32::from_le_bytes)
    }

    pub fn read_u64_le(&mut self) -> Result<u64, DecodeError> {
        self.read_array().map(u64::from_le_bytes)
    }

    pub fn read_hash(&mut self) -> Result<[u8; 32], DecodeError> {
        self.read_array()
    }

    /// Read a CompactSize, rejecting encodings longer than necessary.
    pub fn read_compact_size(&mut self) -> Result<u64, DecodeError> {
        let (value, min) = match self.read_u8()? {
            0xfd => (self.read_u16_le()? as u64, 0xfd),
            0xfe => (self.read_u32_le()? as u64, 0x1_0000),
            0xff => (self.read_u64_le()?, 0x1_0000_0000),
            small => return Ok(small as u64),
        };
        if value < min {
            return Err(DecodeError::NonCanonicalVarInt);
        }
        Ok(value)
    }

    /// Read a CompactSize length bounded by [`MAX_VECTOR_SIZE`].
    pub fn read_length(&mut self) -> Result<usize, DecodeError> {
        let len = self.read_compact_size()?;
        if len > MAX_VECTOR_SIZE {
            return Err(DecodeError::OversizedVector {
                len,
                max: MAX_VECTOR_SIZE,
            });
        }
        Ok(len as usize)
    }

    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_length()?;
        Ok(self.read_bytes(len)?.to_vec())
    }

    pub fn read_hashes(&mut self) -> Result<Vec<[u8; 32]>, DecodeError> {
        let count = self.read_length()?;
        let needed = count.saturating_mul(32);
        if needed > self.remaining() {
            return Err(DecodeError::UnexpectedEof {
                needed,
                available: self.remaining(),
            });
        }
        (0..count).map(|_| self.read_hash()).collect()
    }
}
