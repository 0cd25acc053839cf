use crate::error::{Error, Result};
use ff::{Field, PrimeField};
use primitive_types::U256;

/// Scalar field of the BN254 curve, the field circom-style witnesses live in.
#[derive(PrimeField)]
#[PrimeFieldModulus = "21888242871839275222246405745257275088548364400416034343698204186575808495617"]
#[PrimeFieldGenerator = "7"]
#[PrimeFieldReprEndianness = "little"]
pub struct Fr([u64; 4]);

pub fn fr_to_u256(scalar: Fr) -> U256 {
    U256::from_little_endian(scalar.to_repr().as_ref())
}

pub fn fr_modulus() -> U256 {
    let max = Fr::ZERO - Fr::ONE;
    fr_to_u256(max) + 1
}

/// Converts a canonical representative to a field element, failing if `value >= p`.
pub fn u256_to_fr(value: U256) -> Result<Fr> {
    let mut repr = <Fr as PrimeField>::Repr::default();
    repr.as_mut().copy_from_slice(&value.to_little_endian());
    Fr::from_repr_vartime(repr).ok_or_else(|| Error::InvalidFieldElement(value.to_string()))
}

/// Reduces an arbitrary 256-bit integer modulo `p`.
pub fn reduce_u256(value: U256) -> Fr {
    let mut repr = <Fr as PrimeField>::Repr::default();
    repr.as_mut()
        .copy_from_slice(&(value % fr_modulus()).to_little_endian());
    // The remainder is always canonical.
    Fr::from_repr_vartime(repr).unwrap_or(Fr::ZERO)
}

fn check_decimal(text: &str) -> Result<()> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::InvalidFieldElement(text.to_string()));
    }
    Ok(())
}

/// Parses the decimal encoding of a canonical field element. Values `>= p` are rejected
/// rather than reduced.
pub fn parse_fr(text: &str) -> Result<Fr> {
    check_decimal(text)?;
    let value =
        U256::from_dec_str(text).map_err(|_| Error::InvalidFieldElement(text.to_string()))?;
    u256_to_fr(value)
}

/// Parses a decimal integer of any length and reduces it modulo `p`.
pub fn reduce_dec_str(text: &str) -> Result<Fr> {
    check_decimal(text)?;
    let ten = Fr::from(10);
    let mut value = Fr::ZERO;
    for digit in text.bytes() {
        value = value * ten + Fr::from(u64::from(digit - b'0'));
    }
    Ok(value)
}

pub fn fr_to_dec_string(scalar: Fr) -> String {
    fr_to_u256(scalar).to_string()
}
