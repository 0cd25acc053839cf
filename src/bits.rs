use crate::error::{Error, Result};
use crate::field::{self, Fr};
use ff::Field;
use primitive_types::U256;

fn fr_bit(bit: bool) -> Fr {
    if bit { Fr::ONE } else { Fr::ZERO }
}

/// Returns the `index`-th binary digit of the canonical representative of `value`.
pub fn bit(value: Fr, index: usize) -> Fr {
    if index >= 256 {
        return Fr::ZERO;
    }
    fr_bit(field::fr_to_u256(value).bit(index))
}

/// Whether `value` is representable with `width` bits.
pub fn fits(value: U256, width: usize) -> bool {
    width >= 256 || value >> width == U256::zero()
}

/// Like `bit`, but fails if the whole value doesn't fit in `width` bits.
pub fn checked_bit(value: Fr, index: usize, width: usize) -> Result<Fr> {
    let value = field::fr_to_u256(value);
    if !fits(value, width) {
        return Err(Error::RangeOverflow { bits: width });
    }
    Ok(fr_bit(index < 256 && value.bit(index)))
}

pub fn decompose_bits(mut value: U256, width: usize) -> Result<Vec<Fr>> {
    if !fits(value, width) {
        return Err(Error::RangeOverflow { bits: width });
    }
    let mut bits = Vec::with_capacity(width);
    for _ in 0..width {
        bits.push(Fr::from((value & U256::one()).as_u64()));
        value >>= 1;
    }
    Ok(bits)
}

pub fn decompose_scalar(value: Fr, width: usize) -> Result<Vec<Fr>> {
    decompose_bits(field::fr_to_u256(value), width)
}
