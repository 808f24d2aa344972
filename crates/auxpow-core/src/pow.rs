//! Proof-of-work target checks and chain-work accounting.

use arith_uint256::ArithU256;
use thiserror::Error;

use crate::error::HashError;
use crate::network::ChainParams;

/// Compact bits of the difficulty-1 target.
pub const DIFFICULTY_1_BITS: u32 = 0x1d00ffff;

/// Why a hash does not satisfy its claimed target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PowError {
    #[error("target has the sign bit set")]
    NegativeTarget,

    #[error("target is zero")]
    ZeroTarget,

    #[error("target overflows 256 bits")]
    Overflow,

    #[error("target is easier than the proof-of-work limit")]
    AboveLimit,

    #[error("hash is above target")]
    HashAboveTarget,

    #[error("proof-of-work hash failed: {0}")]
    Hash(#[from] HashError),
}

/// Decode `bits` and check it names a usable target for these parameters.
pub fn derive_target(bits: u32, params: &ChainParams) -> Result<ArithU256, PowError> {
    let decoded = ArithU256::from_compact(bits);
    if decoded.negative {
        return Err(PowError::NegativeTarget);
    }
    if decoded.overflow {
        return Err(PowError::Overflow);
    }
    if decoded.value.is_zero() {
        return Err(PowError::ZeroTarget);
    }
    if decoded.value > params.pow_limit {
        return Err(PowError::AboveLimit);
    }
    Ok(decoded.value)
}

/// Check a proof-of-work hash (raw bytes, least significant first) against
/// the target encoded in `bits`.
pub fn check_proof_of_work(hash: &[u8; 32], bits: u32, params: &ChainParams) -> Result<(), PowError> {
    let target = derive_target(bits, params)?;
    if !hash_meets_target(hash, &target) {
        return Err(PowError::HashAboveTarget);
    }
    Ok(())
}

/// Whether a hash is at or below a target.
#[inline]
pub fn hash_meets_target(hash: &[u8; 32], target: &ArithU256) -> bool {
    ArithU256::from_le_bytes(*hash) <= *target
}

/// Work a block with these bits contributes to its chain.
///
/// Invalid targets contribute nothing.
pub fn block_proof(bits: u32) -> ArithU256 {
    let decoded = ArithU256::from_compact(bits);
    if decoded.negative || decoded.overflow || decoded.value.is_zero() {
        return ArithU256::ZERO;
    }
    decoded.value.work_for_target()
}

/// Calculate approximate difficulty from bits.
///
/// Difficulty = difficulty-1 target / current target
pub fn bits_to_difficulty(bits: u32) -> f64 {
    let current = ArithU256::from_compact(bits).value.to_f64();
    let reference = ArithU256::from_compact(DIFFICULTY_1_BITS).value.to_f64();

    if current == 0.0 {
        return f64::INFINITY;
    }

    reference / current
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::Network;

    #[test]
    fn test_derive_target() {
        let params = Network::Mainnet.params();

        let target = derive_target(0x1e0ffff0, &params).unwrap();
        assert_eq!(
            target.to_hex(),
            "00000ffff0000000000000000000000000000000000000000000000000000000"
        );

        assert_eq!(derive_target(0x04923456, &params), Err(PowError::NegativeTarget));
        assert_eq!(derive_target(0, &params), Err(PowError::ZeroTarget));
        assert_eq!(derive_target(0x01003456, &params), Err(PowError::ZeroTarget));
        assert_eq!(derive_target(0xff123456, &params), Err(PowError::Overflow));
        // Truncated to a nonzero value but still flagged.
        assert_eq!(derive_target(0x2200_01ff, &params), Err(PowError::Overflow));
        // A negative overflowed encoding reports the sign first.
        assert_eq!(derive_target(0xff923456, &params), Err(PowError::NegativeTarget));
        // Mainnet limit is 0x1e0fffff; one more byte of mantissa is too easy.
        assert_eq!(derive_target(0x1e100000, &params), Err(PowError::AboveLimit));
        assert!(derive_target(0x1e0fffff, &params).is_ok());
    }

    #[test]
    fn test_regtest_limit() {
        let params = Network::Regtest.params();
        assert!(derive_target(0x207fffff, &params).is_ok());
        assert_eq!(derive_target(0x2100ffff, &params), Err(PowError::AboveLimit));
    }

    #[test]
    fn test_check_proof_of_work() {
        let params = Network::Mainnet.params();
        let bits = 0x1e0ffff0;
        let target = derive_target(bits, &params).unwrap();

        // Exactly on target passes.
        assert_eq!(check_proof_of_work(&target.to_le_bytes(), bits, &params), Ok(()));

        let above = target.increment();
        assert_eq!(
            check_proof_of_work(&above.to_le_bytes(), bits, &params),
            Err(PowError::HashAboveTarget)
        );

        // The top byte of the raw hash is the most significant.
        let mut hash = [0u8; 32];
        hash[31] = 0x01;
        assert_eq!(check_proof_of_work(&hash, bits, &params), Err(PowError::HashAboveTarget));
        hash[31] = 0x00;
        hash[0] = 0xff;
        assert_eq!(check_proof_of_work(&hash, bits, &params), Ok(()));
    }

    #[test]
    fn test_target_checked_before_hash() {
        let params = Network::Mainnet.params();
        assert_eq!(
            check_proof_of_work(&[0u8; 32], 0x1e100000, &params),
            Err(PowError::AboveLimit)
        );
    }

    #[test]
    fn test_block_proof() {
        assert_eq!(block_proof(0x1e0ffff0), ArithU256::from_u64(0x100010));
        assert_eq!(block_proof(DIFFICULTY_1_BITS), ArithU256::from_u64(0x1_0001_0001));
        assert_eq!(block_proof(0), ArithU256::ZERO);
        assert_eq!(block_proof(0x04923456), ArithU256::ZERO);
        assert_eq!(block_proof(0xff123456), ArithU256::ZERO);
    }

    #[test]
    fn test_difficulty_calculation() {
        assert!((bits_to_difficulty(DIFFICULTY_1_BITS) - 1.0).abs() < 1e-12);
        // Dogecoin genesis difficulty.
        assert!((bits_to_difficulty(0x1e0ffff0) - 0.000244140625).abs() < 1e-9);
        assert_eq!(bits_to_difficulty(0), f64::INFINITY);
    }
}
