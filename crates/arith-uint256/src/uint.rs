//! The 256-bit unsigned integer type.
//!
//! Values are stored as eight 32-bit words in little-endian word order
//! (word 0 is the least significant). All arithmetic is modular in 2^256:
//! carries out of the top word are discarded, matching the consensus code
//! that relies on it.

use alloc::string::String;
use core::cmp::Ordering;
use core::fmt;
use core::ops::{
    Add, AddAssign, BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Div,
    DivAssign, Mul, MulAssign, Neg, Not, Shl, ShlAssign, Shr, ShrAssign, Sub, SubAssign,
};
use core::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::UintError;

/// Number of 32-bit words in a value.
pub const WIDTH: usize = 8;

/// Number of bytes in a value.
pub const BYTES: usize = WIDTH * 4;

/// A 256-bit unsigned integer.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ArithU256 {
    words: [u32; WIDTH],
}

impl ArithU256 {
    /// The value 0.
    pub const ZERO: ArithU256 = ArithU256 { words: [0; WIDTH] };

    /// The value 1.
    pub const ONE: ArithU256 = ArithU256 { words: [1, 0, 0, 0, 0, 0, 0, 0] };

    /// The value 2^256 - 1.
    pub const MAX: ArithU256 = ArithU256 { words: [u32::MAX; WIDTH] };

    /// Create a value from little-endian words (word 0 least significant).
    pub const fn from_words(words: [u32; WIDTH]) -> Self {
        ArithU256 { words }
    }

    /// The little-endian words of this value.
    pub const fn words(&self) -> [u32; WIDTH] {
        self.words
    }

    /// Create a value from a 64-bit integer.
    pub const fn from_u64(value: u64) -> Self {
        let mut words = [0u32; WIDTH];
        words[0] = value as u32;
        words[1] = (value >> 32) as u32;
        ArithU256 { words }
    }

    /// The low 64 bits of this value.
    pub const fn low_u64(&self) -> u64 {
        self.words[0] as u64 | (self.words[1] as u64) << 32
    }

    /// Create a value from 32 raw bytes, least significant byte first.
    ///
    /// This is the layout of a hash as it comes out of SHA-256 or scrypt,
    /// so a block hash can be compared against a target directly.
    pub fn from_le_bytes(bytes: [u8; BYTES]) -> Self {
        let mut words = [0u32; WIDTH];
        for (word, chunk) in words.iter_mut().zip(bytes.chunks_exact(4)) {
            *word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }
        ArithU256 { words }
    }

    /// Serialize to 32 raw bytes, least significant byte first.
    pub fn to_le_bytes(&self) -> [u8; BYTES] {
        let mut bytes = [0u8; BYTES];
        for (chunk, word) in bytes.chunks_exact_mut(4).zip(self.words.iter()) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    /// Create a value from 32 bytes, most significant byte first.
    pub fn from_be_bytes(mut bytes: [u8; BYTES]) -> Self {
        bytes.reverse();
        Self::from_le_bytes(bytes)
    }

    /// Serialize to 32 bytes, most significant byte first.
    pub fn to_be_bytes(&self) -> [u8; BYTES] {
        let mut bytes = self.to_le_bytes();
        bytes.reverse();
        bytes
    }

    /// Whether this value is zero.
    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|&w| w == 0)
    }

    /// Position of the highest set bit plus one, or 0 for zero.
    pub fn bits(&self) -> u32 {
        for pos in (0..WIDTH).rev() {
            if self.words[pos] != 0 {
                return 32 * pos as u32 + (32 - self.words[pos].leading_zeros());
            }
        }
        0
    }

    /// Approximate this value as a double.
    pub fn to_f64(&self) -> f64 {
        let mut ret = 0.0;
        let mut fact = 1.0;
        for &word in &self.words {
            ret += fact * word as f64;
            fact *= 4_294_967_296.0;
        }
        ret
    }

    /// Logical left shift. Bits shifted past the top are discarded.
    pub fn shift_left(&self, shift: u32) -> Self {
        let mut result = Self::ZERO;
        let k = (shift / 32) as usize;
        let bits = shift % 32;
        for i in 0..WIDTH {
            if bits != 0 && i + k + 1 < WIDTH {
                result.words[i + k + 1] |= self.words[i] >> (32 - bits);
            }
            if i + k < WIDTH {
                result.words[i + k] |= self.words[i] << bits;
            }
        }
        result
    }

    /// Logical right shift.
    pub fn shift_right(&self, shift: u32) -> Self {
        let mut result = Self::ZERO;
        let k = (shift / 32) as usize;
        let bits = shift % 32;
        for i in 0..WIDTH {
            if bits != 0 && i > k {
                result.words[i - k - 1] |= self.words[i] << (32 - bits);
            }
            if i >= k {
                result.words[i - k] |= self.words[i] >> bits;
            }
        }
        result
    }

    /// Wrapping addition.
    pub fn wrapping_add(&self, other: &Self) -> Self {
        let mut result = Self::ZERO;
        let mut carry = 0u64;
        for i in 0..WIDTH {
            let n = carry + self.words[i] as u64 + other.words[i] as u64;
            result.words[i] = n as u32;
            carry = n >> 32;
        }
        result
    }

    /// Wrapping subtraction.
    pub fn wrapping_sub(&self, other: &Self) -> Self {
        self.wrapping_add(&other.wrapping_neg())
    }

    /// Two's complement negation.
    pub fn wrapping_neg(&self) -> Self {
        self.invert().wrapping_add(&Self::ONE)
    }

    /// Add one, wrapping at the top.
    pub fn increment(&self) -> Self {
        self.wrapping_add(&Self::ONE)
    }

    /// Subtract one, wrapping at zero.
    pub fn decrement(&self) -> Self {
        self.wrapping_sub(&Self::ONE)
    }

    /// Multiply by a 32-bit scalar, truncating to 256 bits.
    pub fn mul_u32(&self, scalar: u32) -> Self {
        let mut result = Self::ZERO;
        let mut carry = 0u64;
        for i in 0..WIDTH {
            let n = carry + scalar as u64 * self.words[i] as u64;
            result.words[i] = n as u32;
            carry = n >> 32;
        }
        result
    }

    /// Schoolbook 256x256 multiplication, truncating to 256 bits.
    pub fn wrapping_mul(&self, other: &Self) -> Self {
        let mut result = Self::ZERO;
        for j in 0..WIDTH {
            let mut carry = 0u64;
            for i in 0..WIDTH - j {
                let n = carry
                    + result.words[i + j] as u64
                    + self.words[j] as u64 * other.words[i] as u64;
                result.words[i + j] = n as u32;
                carry = n >> 32;
            }
        }
        result
    }

    /// Long division returning quotient and remainder.
    ///
    /// The divisor is aligned to the dividend's highest bit and walked back
    /// one bit at a time, subtracting wherever it fits.
    pub fn div_rem(&self, divisor: &Self) -> Result<(Self, Self), UintError> {
        let num_bits = self.bits();
        let div_bits = divisor.bits();
        if div_bits == 0 {
            return Err(UintError::DivisionByZero);
        }

        let mut quotient = Self::ZERO;
        let mut remainder = *self;
        if div_bits > num_bits {
            return Ok((quotient, remainder));
        }

        let mut shift = num_bits - div_bits;
        let mut div = divisor.shift_left(shift);
        loop {
            if remainder >= div {
                remainder = remainder.wrapping_sub(&div);
                quotient.words[(shift / 32) as usize] |= 1 << (shift % 32);
            }
            if shift == 0 {
                break;
            }
            div = div.shift_right(1);
            shift -= 1;
        }

        Ok((quotient, remainder))
    }

    /// Division discarding the remainder.
    pub fn checked_div(&self, divisor: &Self) -> Result<Self, UintError> {
        self.div_rem(divisor).map(|(quotient, _)| quotient)
    }

    /// Magnitude comparison, most significant word first.
    pub fn compare(&self, other: &Self) -> Ordering {
        for i in (0..WIDTH).rev() {
            match self.words[i].cmp(&other.words[i]) {
                Ordering::Equal => continue,
                ord => return ord,
            }
        }
        Ordering::Equal
    }

    /// Expected number of hashes needed to hit this target:
    /// `2^256 / (target + 1)`, computed as `!target / (target + 1) + 1`.
    pub fn work_for_target(&self) -> Self {
        let denominator = self.increment();
        if denominator.is_zero() {
            return Self::ONE;
        }
        match self.invert().checked_div(&denominator) {
            Ok(quotient) => quotient.increment(),
            Err(_) => Self::ZERO,
        }
    }

    /// Big-endian hex, 64 lowercase digits.
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_be_bytes())
    }

    /// Lenient big-endian hex parse.
    ///
    /// Leading whitespace and an optional `0x` prefix are skipped, digits are
    /// read up to the first non-hex character, and only the least significant
    /// 64 digits are kept. Anything unparseable reads as zero.
    pub fn from_hex(s: &str) -> Self {
        let trimmed = s.trim_start();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let len = digits
            .bytes()
            .position(|b| !b.is_ascii_hexdigit())
            .unwrap_or(digits.len());

        let mut le = [0u8; BYTES];
        let mut nibbles = digits.as_bytes()[..len].iter().rev().map(|&b| hex_value(b));
        for byte in le.iter_mut() {
            let Some(low) = nibbles.next() else { break };
            let high = nibbles.next().unwrap_or(0);
            *byte = low | (high << 4);
        }
        Self::from_le_bytes(le)
    }

    // Bitwise helpers. The operator traits below forward to these.

    fn invert(&self) -> Self {
        let mut result = *self;
        for w in result.words.iter_mut() {
            *w = !*w;
        }
        result
    }

    fn zip_with(&self, other: &Self, f: impl Fn(u32, u32) -> u32) -> Self {
        let mut result = Self::ZERO;
        for i in 0..WIDTH {
            result.words[i] = f(self.words[i], other.words[i]);
        }
        result
    }
}

fn hex_value(b: u8) -> u8 {
    match b {
        b'0'..=b'9' => b - b'0',
        b'a'..=b'f' => b - b'a' + 10,
        b'A'..=b'F' => b - b'A' + 10,
        _ => 0,
    }
}

impl From<u64> for ArithU256 {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl Ord for ArithU256 {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for ArithU256 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.compare(other))
    }
}

impl fmt::Debug for ArithU256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ArithU256({})", self.to_hex())
    }
}

impl fmt::Display for ArithU256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl fmt::LowerHex for ArithU256 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Strict parse: optional `0x`, then 1 to 64 hex digits and nothing else.
impl FromStr for ArithU256 {
    type Err = UintError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.is_empty()
            || digits.len() > BYTES * 2
            || !digits.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(UintError::InvalidHex);
        }
        Ok(Self::from_hex(digits))
    }
}

impl Serialize for ArithU256 {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ArithU256 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

macro_rules! impl_binary_op {
    ($trait:ident, $method:ident, $assign_trait:ident, $assign_method:ident, $body:expr) => {
        impl $trait for ArithU256 {
            type Output = ArithU256;

            fn $method(self, rhs: ArithU256) -> ArithU256 {
                let f: fn(&ArithU256, &ArithU256) -> ArithU256 = $body;
                f(&self, &rhs)
            }
        }

        impl $assign_trait for ArithU256 {
            fn $assign_method(&mut self, rhs: ArithU256) {
                *self = $trait::$method(*self, rhs);
            }
        }
    };
}

impl_binary_op!(Add, add, AddAssign, add_assign, |a, b| a.wrapping_add(b));
impl_binary_op!(Sub, sub, SubAssign, sub_assign, |a, b| a.wrapping_sub(b));
impl_binary_op!(Mul, mul, MulAssign, mul_assign, |a, b| a.wrapping_mul(b));
impl_binary_op!(BitAnd, bitand, BitAndAssign, bitand_assign, |a, b| a.zip_with(b, |x, y| x & y));
impl_binary_op!(BitOr, bitor, BitOrAssign, bitor_assign, |a, b| a.zip_with(b, |x, y| x | y));
impl_binary_op!(BitXor, bitxor, BitXorAssign, bitxor_assign, |a, b| a.zip_with(b, |x, y| x ^ y));

/// Panics on a zero divisor, like primitive integer division.
/// Use [`ArithU256::checked_div`] to handle it.
impl Div for ArithU256 {
    type Output = ArithU256;

    fn div(self, rhs: ArithU256) -> ArithU256 {
        match self.checked_div(&rhs) {
            Ok(quotient) => quotient,
            Err(_) => panic!("attempt to divide by zero"),
        }
    }
}

impl DivAssign for ArithU256 {
    fn div_assign(&mut self, rhs: ArithU256) {
        *self = *self / rhs;
    }
}

impl Mul<u32> for ArithU256 {
    type Output = ArithU256;

    fn mul(self, rhs: u32) -> ArithU256 {
        self.mul_u32(rhs)
    }
}

impl MulAssign<u32> for ArithU256 {
    fn mul_assign(&mut self, rhs: u32) {
        *self = self.mul_u32(rhs);
    }
}

impl Shl<u32> for ArithU256 {
    type Output = ArithU256;

    fn shl(self, rhs: u32) -> ArithU256 {
        self.shift_left(rhs)
    }
}

impl ShlAssign<u32> for ArithU256 {
    fn shl_assign(&mut self, rhs: u32) {
        *self = self.shift_left(rhs);
    }
}

impl Shr<u32> for ArithU256 {
    type Output = ArithU256;

    fn shr(self, rhs: u32) -> ArithU256 {
        self.shift_right(rhs)
    }
}

impl ShrAssign<u32> for ArithU256 {
    fn shr_assign(&mut self, rhs: u32) {
        *self = self.shift_right(rhs);
    }
}

impl Not for ArithU256 {
    type Output = ArithU256;

    fn not(self) -> ArithU256 {
        self.invert()
    }
}

impl Neg for ArithU256 {
    type Output = ArithU256;

    fn neg(self) -> ArithU256 {
        self.wrapping_neg()
    }
}
