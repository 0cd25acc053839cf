use crate::bits;
use crate::builder::{ConstraintSystem, LinearCombination, Signal};
use crate::error::{Error, Result};
use crate::field::{self, Fr};
use ff::{Field, PrimeField};
use primitive_types::U256;

/// `Σ bits[i] · 2^i`
pub fn recompose(bits: &[Signal]) -> LinearCombination<Fr> {
    let mut total = LinearCombination::zero();
    let mut power = Fr::ONE;
    for bit in bits {
        total = total.with_term(*bit, power);
        power = power.double();
    }
    total
}

/// Decomposes a scalar into `width` bits in little-endian order (bit #0 is the LSB, bit
/// #width-1 is the MSB).
///
/// Uses `width` boolean constraints plus one reconstruction constraint. Witness generation
/// fails with `RangeOverflow` if the value doesn't fit in `width` bits.
///
/// WARNING: this chip doesn't check that the resulting decomposition is less than the field
/// order, so it's unsafe if you're trying to decompose 254 or more bits: both `x` and `x + p`
/// would be accepted. Use the `StrictBitDecomposerChip` below for a canonical decomposition.
#[derive(Debug, Clone)]
pub struct BitDecomposerChip {
    value: Signal,
    bits: Vec<Signal>,
}

impl BitDecomposerChip {
    pub fn configure(
        cs: &mut ConstraintSystem<Fr>,
        name: &str,
        value: Signal,
        width: usize,
    ) -> Result<Self> {
        let bits = (0..width)
            .map(|i| {
                cs.alloc_internal(format!("{}.bit[{}]", name, i), move |witness| {
                    bits::checked_bit(witness.get(value)?, i, width)
                })
            })
            .collect::<Vec<_>>();
        for (i, bit) in bits.iter().enumerate() {
            cs.enforce_boolean(format!("{}.bit[{}]", name, i), *bit)?;
        }
        cs.enforce_equal(
            format!("{}.reconstruct", name),
            recompose(&bits),
            value.into(),
        )?;
        Ok(Self { value, bits })
    }

    pub fn value(&self) -> Signal {
        self.value
    }

    pub fn bits(&self) -> &[Signal] {
        &self.bits
    }
}

/// Checks that a value decomposed into little-endian bits is strictly less than a constant.
///
/// The bits are scanned from the MSB down while tracking whether the prefix seen so far equals
/// the prefix of the constant. Each step allocates one `eq` signal and one constraint; a final
/// linear constraint requires that the first differing digit was a 0 in the value and a 1 in
/// the constant.
///
/// NOTE: this chip doesn't constrain the booleanity of the input bits, so the outer circuit is
/// in charge of ensuring that. The `BitDecomposerChip` is guaranteed to output boolean bits.
///
/// NOTE: configuration fails with `RangeOverflow` if the constant doesn't fit in the number of
/// provided bits.
#[derive(Debug, Clone)]
pub struct LessThanConstChip {
    constant: U256,
    prefix_equal: Vec<Signal>,
}

impl LessThanConstChip {
    pub fn configure(
        cs: &mut ConstraintSystem<Fr>,
        name: &str,
        bits: &[Signal],
        constant: U256,
    ) -> Result<Self> {
        if !bits::fits(constant, bits.len()) {
            return Err(Error::RangeOverflow { bits: bits.len() });
        }
        let mut equal = LinearCombination::one();
        let mut less = LinearCombination::zero();
        let mut prefix_equal = Vec::with_capacity(bits.len());
        for i in (0..bits.len()).rev() {
            let digit = constant.bit(i);
            let matches = if digit {
                LinearCombination::from(bits[i])
            } else {
                LinearCombination::one() - bits[i].into()
            };
            let next = {
                let equal = equal.clone();
                let matches = matches.clone();
                cs.alloc_internal(format!("{}.eq[{}]", name, i), move |witness| {
                    Ok(equal.evaluate(witness)? * matches.evaluate(witness)?)
                })
            };
            cs.enforce(
                format!("{}.eq[{}]", name, i),
                equal.clone(),
                matches,
                next.into(),
            )?;
            if digit {
                // eq · (1 − bit): the prefixes matched and the value has a 0 where the
                // constant has a 1.
                less = less + equal - next.into();
            }
            equal = next.into();
            prefix_equal.push(next);
        }
        cs.enforce_equal(format!("{}.less", name), less, LinearCombination::one())?;
        Ok(Self {
            constant,
            prefix_equal,
        })
    }

    pub fn constant(&self) -> U256 {
        self.constant
    }

    /// The running equality flags, from the MSB down.
    pub fn prefix_equal(&self) -> &[Signal] {
        &self.prefix_equal
    }
}

/// Decomposes a scalar into its canonical `NUM_BITS`-bit little-endian representation.
///
/// The value is decomposed normally using `BitDecomposerChip`, then the resulting bits are
/// checked against the bit decomposition of `p`, the order of the scalar field. The second step
/// rules out aliased decompositions of `x + p`, so every field element has exactly one valid
/// decomposition.
#[derive(Debug, Clone)]
pub struct StrictBitDecomposerChip {
    decomposer: BitDecomposerChip,
    range_check: LessThanConstChip,
}

impl StrictBitDecomposerChip {
    pub const WIDTH: usize = Fr::NUM_BITS as usize;

    pub fn configure(cs: &mut ConstraintSystem<Fr>, name: &str, value: Signal) -> Result<Self> {
        let decomposer =
            BitDecomposerChip::configure(cs, &format!("{}.decompose", name), value, Self::WIDTH)?;
        let range_check = LessThanConstChip::configure(
            cs,
            &format!("{}.check_range", name),
            decomposer.bits(),
            field::fr_modulus(),
        )?;
        Ok(Self {
            decomposer,
            range_check,
        })
    }

    pub fn bits(&self) -> &[Signal] {
        self.decomposer.bits()
    }

    pub fn decomposer(&self) -> &BitDecomposerChip {
        &self.decomposer
    }

    pub fn range_check(&self) -> &LessThanConstChip {
        &self.range_check
    }
}

/// Outputs 1 if the input linear combination evaluates to zero and 0 otherwise.
///
///   value · inverse = 1 − out
///   value · out = 0
#[derive(Debug, Clone)]
pub struct IsZeroChip {
    inverse: Signal,
    out: Signal,
}

impl IsZeroChip {
    pub fn configure(
        cs: &mut ConstraintSystem<Fr>,
        name: &str,
        value: LinearCombination<Fr>,
    ) -> Result<Self> {
        let inverse = {
            let value = value.clone();
            cs.alloc_internal(format!("{}.inverse", name), move |witness| {
                Ok(Option::from(value.evaluate(witness)?.invert()).unwrap_or(Fr::ZERO))
            })
        };
        let out = {
            let value = value.clone();
            cs.alloc_internal(format!("{}.out", name), move |witness| {
                Ok(if value.evaluate(witness)?.is_zero_vartime() {
                    Fr::ONE
                } else {
                    Fr::ZERO
                })
            })
        };
        cs.enforce(
            format!("{}.inverse", name),
            value.clone(),
            inverse.into(),
            LinearCombination::one() - out.into(),
        )?;
        cs.enforce(
            format!("{}.out", name),
            value,
            out.into(),
            LinearCombination::zero(),
        )?;
        Ok(Self { inverse, out })
    }

    pub fn inverse(&self) -> Signal {
        self.inverse
    }

    pub fn out(&self) -> Signal {
        self.out
    }
}

/// Outputs 1 if the canonical value of the input is strictly less than `2^width`, and 0
/// otherwise.
///
/// The input is decomposed canonically with a `StrictBitDecomposerChip`, so the `width` low
/// bits and the remaining high bits are uniquely determined by the input. The output is 1 iff
/// all the high bits are zero, which is checked with an `IsZeroChip` over their sum (the sum is
/// at most `NUM_BITS`, so it can't wrap around).
///
/// The number of constraints doesn't depend on `width`.
#[derive(Debug, Clone)]
pub struct RangeComparatorChip {
    width: usize,
    decomposition: StrictBitDecomposerChip,
    is_zero: IsZeroChip,
}

impl RangeComparatorChip {
    /// The largest supported bit width. Every value in `[0, 2^CAPACITY)` is a field element.
    pub const MAX_WIDTH: u32 = Fr::CAPACITY;

    pub fn configure(
        cs: &mut ConstraintSystem<Fr>,
        name: &str,
        input: Signal,
        width: usize,
    ) -> Result<Self> {
        if width == 0 || width > Self::MAX_WIDTH as usize {
            return Err(Error::InvalidBitWidth {
                bits: width,
                max: Self::MAX_WIDTH,
            });
        }
        let decomposition = StrictBitDecomposerChip::configure(cs, name, input)?;
        let high = decomposition.bits()[width..]
            .iter()
            .fold(LinearCombination::zero(), |sum, bit| {
                sum.with_term(*bit, Fr::ONE)
            });
        let is_zero = IsZeroChip::configure(cs, &format!("{}.high_is_zero", name), high)?;
        Ok(Self {
            width,
            decomposition,
            is_zero,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn decomposition(&self) -> &StrictBitDecomposerChip {
        &self.decomposition
    }

    /// `Σ_{i<width} bit_i · 2^i`, equal to the input exactly when the output is 1.
    pub fn low(&self) -> LinearCombination<Fr> {
        recompose(&self.decomposition.bits()[..self.width])
    }

    pub fn is_zero(&self) -> &IsZeroChip {
        &self.is_zero
    }

    pub fn out(&self) -> Signal {
        self.is_zero.out()
    }
}
