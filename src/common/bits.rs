use std::{fmt::Display, mem, ops::Deref};

use num_traits::{PrimInt, Unsigned};

use super::error::{CodeError, CodeResult};

/// Bit width of a key.
pub const KEY_BITS: u32 = 64;

// Bit string
//------------------------------------------------------------------------------

/// Big-endian string of '0'/'1' characters, most significant bit first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BitString(String);

impl BitString {
    /// Encodes a key into a string of exactly [`KEY_BITS`] characters. Same
    /// codec as [`encode_bits`], which cannot overflow at this width.
    pub fn from_key(key: u64) -> Self {
        to_binary(key, KEY_BITS as usize)
    }

    pub(crate) fn from_raw(bits: String) -> Self {
        Self(bits)
    }

    /// Reads the string back as a key. See [`decode_bits`].
    pub fn to_key(&self) -> u64 {
        decode_bits(&self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Bit at `idx`, where anything but '1' reads as unset.
    pub fn bit(&self, idx: usize) -> bool {
        self.0.as_bytes().get(idx) == Some(&b'1')
    }

    pub fn bits(&self) -> impl Iterator<Item = bool> + '_ {
        self.0.bytes().map(|b| b == b'1')
    }

    /// Number of positions where the two strings disagree, counting any length
    /// difference as mismatches.
    pub fn hamming(&self, other: &BitString) -> usize {
        let diff = self.0.bytes().zip(other.0.bytes()).filter(|(a, b)| a != b).count();
        diff + self.0.len().abs_diff(other.0.len())
    }
}

impl Deref for BitString {
    type Target = str;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Display for BitString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// Bit codec
//------------------------------------------------------------------------------

/// Writes `value` as a big-endian binary string left-padded to `width`
/// characters. Fails if `value` needs more than `width` bits.
pub fn encode_bits<T>(value: T, width: u32) -> CodeResult<BitString>
where
    T: PrimInt + Unsigned,
{
    let max_bits = (mem::size_of::<T>() * 8) as u32;
    let used = max_bits - value.leading_zeros();
    if used > width {
        let key = value.to_u128().unwrap_or(u128::MAX);
        return Err(CodeError::InvalidKey { key, width });
    }
    Ok(to_binary(value, width as usize))
}

/// Repeated division by two, remainders reversed and left-padded with '0'.
fn to_binary<T>(value: T, width: usize) -> BitString
where
    T: PrimInt + Unsigned,
{
    if value.is_zero() {
        return BitString("0".repeat(width));
    }

    let two = T::one() + T::one();
    let mut rems = Vec::with_capacity(width);
    let mut num = value;
    while !num.is_zero() {
        rems.push(if (num % two).is_zero() { '0' } else { '1' });
        num = num / two;
    }

    let mut res = String::with_capacity(width);
    res.extend(std::iter::repeat('0').take(width.saturating_sub(rems.len())));
    res.extend(rems.iter().rev());
    BitString(res)
}

/// Folds a big-endian binary string into an integer. Never fails: characters
/// other than '1' count as 0, and bits beyond the width of `u64` shift out.
pub fn decode_bits(bits: &str) -> u64 {
    bits.bytes().fold(0u64, |num, b| (num << 1) | u64::from(b == b'1'))
}
