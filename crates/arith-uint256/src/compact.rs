//! Compact ("nBits") target encoding.
//!
//! The 32-bit compact form is `[size (1 byte)][sign (1 bit)][mantissa (23 bits)]`
//! and denotes `mantissa * 256^(size - 3)`. Only the top three significant
//! bytes of a value survive encoding; everything below is truncated.

use crate::uint::ArithU256;

const SIGN_BIT: u32 = 0x0080_0000;
const MANTISSA_MASK: u32 = 0x007f_ffff;

/// Result of decoding a compact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedCompact {
    /// The decoded magnitude, ignoring the sign bit.
    pub value: ArithU256,
    /// The sign bit was set on a non-zero mantissa.
    pub negative: bool,
    /// The encoding names a value wider than 256 bits.
    pub overflow: bool,
}

impl ArithU256 {
    /// Decode a compact value.
    ///
    /// A set sign bit or an out-of-range size is reported through the flags,
    /// never as an error. Callers that consume a target decide what to do
    /// with either.
    pub fn from_compact(bits: u32) -> DecodedCompact {
        let size = bits >> 24;
        let mut word = bits & MANTISSA_MASK;
        let value = if size <= 3 {
            word >>= 8 * (3 - size);
            ArithU256::from_u64(word as u64)
        } else {
            ArithU256::from_u64(word as u64).shift_left(8 * (size - 3))
        };

        let negative = word != 0 && bits & SIGN_BIT != 0;
        let overflow = word != 0
            && (size > 34 || (word > 0xff && size > 33) || (word > 0xffff && size > 32));

        DecodedCompact { value, negative, overflow }
    }

    /// Encode this value in compact form.
    ///
    /// If the top mantissa byte would collide with the sign bit the mantissa
    /// is shifted down one byte and the size bumped instead. The sign bit is
    /// only set when `negative` is requested and the mantissa is non-zero.
    pub fn to_compact(&self, negative: bool) -> u32 {
        let mut size = (self.bits() + 7) / 8;
        let mut compact = if size <= 3 {
            (self.low_u64() << (8 * (3 - size))) as u32
        } else {
            self.shift_right(8 * (size - 3)).low_u64() as u32
        };

        if compact & SIGN_BIT != 0 {
            compact >>= 8;
            size += 1;
        }
        compact |= size << 24;
        if negative && compact & MANTISSA_MASK != 0 {
            compact |= SIGN_BIT;
        }
        compact
    }
}

/// Decode a compact target. Same as [`ArithU256::from_compact`].
pub fn compact_to_target(bits: u32) -> DecodedCompact {
    ArithU256::from_compact(bits)
}

/// Encode a target in compact form. Same as [`ArithU256::to_compact`].
pub fn target_to_compact(target: &ArithU256, negative: bool) -> u32 {
    target.to_compact(negative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn decode(bits: u32) -> (ArithU256, bool, bool) {
        let d = ArithU256::from_compact(bits);
        (d.value, d.negative, d.overflow)
    }

    #[test]
    fn test_zero_mantissas() {
        for bits in [
            0x0000_0000u32,
            0x0012_3456,
            0x0100_3456,
            0x0200_0056,
            0x0300_0000,
            0x0400_0000,
            0x0092_3456,
            0x0180_3456,
            0x0280_0056,
            0x0380_0000,
            0x0480_0000,
        ] {
            let (value, negative, overflow) = decode(bits);
            assert_eq!(value, ArithU256::ZERO, "bits {:08x}", bits);
            assert!(!negative, "bits {:08x}", bits);
            assert!(!overflow, "bits {:08x}", bits);
            assert_eq!(value.to_compact(negative), 0);
        }
    }

    #[test]
    fn test_small_sizes() {
        let (value, negative, overflow) = decode(0x0112_3456);
        assert_eq!(value, ArithU256::from_u64(0x12));
        assert!(!negative && !overflow);
        assert_eq!(value.to_compact(false), 0x0112_0000);

        let (value, negative, _) = decode(0x01fe_dcba);
        assert_eq!(value, ArithU256::from_u64(0x7e));
        assert!(negative);
        assert_eq!(value.to_compact(true), 0x01fe_0000);

        let (value, _, _) = decode(0x0212_3456);
        assert_eq!(value, ArithU256::from_u64(0x1234));
        assert_eq!(value.to_compact(false), 0x0212_3400);

        let (value, _, _) = decode(0x0312_3456);
        assert_eq!(value, ArithU256::from_u64(0x12_3456));
        assert_eq!(value.to_compact(false), 0x0312_3456);
    }

    #[test]
    fn test_sign_bit_collision_bumps_size() {
        assert_eq!(ArithU256::from_u64(0x80).to_compact(false), 0x0200_8000);

        let (value, negative, _) = decode(0x0500_9234);
        assert_eq!(value, ArithU256::from_u64(0x9234_0000));
        assert!(!negative);
        assert_eq!(value.to_compact(false), 0x0500_9234);
    }

    #[test]
    fn test_large_sizes() {
        let (value, negative, overflow) = decode(0x0412_3456);
        assert_eq!(value, ArithU256::from_u64(0x1234_5600));
        assert!(!negative && !overflow);
        assert_eq!(value.to_compact(false), 0x0412_3456);

        let (value, negative, _) = decode(0x0492_3456);
        assert_eq!(value, ArithU256::from_u64(0x1234_5600));
        assert!(negative);
        assert_eq!(value.to_compact(true), 0x0492_3456);

        let (value, negative, overflow) = decode(0x2012_3456);
        assert_eq!(
            value.to_hex(),
            "1234560000000000000000000000000000000000000000000000000000000000"
        );
        assert!(!negative && !overflow);
        assert_eq!(value.to_compact(false), 0x2012_3456);
    }

    #[test]
    fn test_overflow() {
        let (_, negative, overflow) = decode(0xff12_3456);
        assert!(!negative);
        assert!(overflow);

        // One byte of mantissa still fits at size 34, two do not.
        assert!(!decode(0x2200_0001).2);
        assert!(decode(0x2200_0100).2);
        assert!(!decode(0x2100_ffff).2);
        assert!(decode(0x2101_0000).2);
        assert!(decode(0x2300_0001).2);
    }

    #[test]
    fn test_genesis_target() {
        let decoded = compact_to_target(0x1d00ffff);
        assert_eq!(
            decoded.value.to_hex(),
            "00000000ffff0000000000000000000000000000000000000000000000000000"
        );
        assert!(!decoded.negative);
        assert!(!decoded.overflow);
        assert_eq!(target_to_compact(&decoded.value, false), 0x1d00ffff);
    }

    #[test]
    fn test_negative_flag_needs_mantissa() {
        assert_eq!(ArithU256::ZERO.to_compact(true), 0);
        assert_eq!(ArithU256::ONE.to_compact(true), 0x0181_0000);
    }

    proptest! {
        #[test]
        fn encoding_keeps_top_bytes(words in prop::array::uniform8(any::<u32>())) {
            let v = ArithU256::from_words(words);
            let decoded = ArithU256::from_compact(v.to_compact(false));
            prop_assert!(!decoded.negative);
            prop_assert!(!decoded.overflow);
            prop_assert!(decoded.value <= v);
            prop_assert_eq!(decoded.value.bits(), v.bits());
            // At least the top two significant bytes always survive.
            let size = (v.bits() + 7) / 8;
            prop_assert!(v - decoded.value < ArithU256::ONE << (8 * size.saturating_sub(2)));
        }

        #[test]
        fn canonical_compact_is_stable(size in 0u32..=34, mantissa in 0u32..=0x00ff_ffff) {
            let bits = (size << 24) | mantissa;
            let decoded = ArithU256::from_compact(bits);
            prop_assume!(!decoded.overflow);
            let canonical = decoded.value.to_compact(decoded.negative);
            let again = ArithU256::from_compact(canonical);
            prop_assert_eq!(again.value, decoded.value);
            prop_assert_eq!(again.negative, decoded.negative);
            prop_assert_eq!(again.value.to_compact(again.negative), canonical);
        }
    }
}
