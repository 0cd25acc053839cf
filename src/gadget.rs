use crate::builder::{ConstraintSystem, Signal, Witness};
use crate::chips::RangeComparatorChip;
use crate::error::Result;
use crate::field::{self, Fr};
use ff::Field;
use std::collections::BTreeMap;
use std::fmt;

/// Output of a range check: whether the input fits in the declared number of bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Output {
    pub out: bool,
}

impl Output {
    pub fn as_fr(&self) -> Fr {
        if self.out { Fr::ONE } else { Fr::ZERO }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", if self.out { "1" } else { "0" })
    }
}

/// A self-contained range check circuit with one input `in` and one boolean output `out`,
/// `out = 1` iff `in < 2^bits`.
///
/// The constraint system is built once and then only read, so a single instance can be shared
/// between threads and evaluated concurrently.
#[derive(Debug)]
pub struct CheckBitLength {
    bits: usize,
    cs: ConstraintSystem<Fr>,
    input: Signal,
    chip: RangeComparatorChip,
}

impl CheckBitLength {
    pub fn new(bits: usize) -> Result<Self> {
        let mut cs = ConstraintSystem::new();
        let input = cs.alloc_input("in");
        let chip = RangeComparatorChip::configure(&mut cs, "check_bit_length", input, bits)?;
        tracing::debug!(
            bits,
            signals = cs.num_signals(),
            constraints = cs.num_constraints(),
            "built CheckBitLength"
        );
        Ok(Self {
            bits,
            cs,
            input,
            chip,
        })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn constraint_system(&self) -> &ConstraintSystem<Fr> {
        &self.cs
    }

    pub fn num_constraints(&self) -> usize {
        self.cs.num_constraints()
    }

    pub fn input(&self) -> Signal {
        self.input
    }

    pub fn chip(&self) -> &RangeComparatorChip {
        &self.chip
    }

    pub fn out(&self) -> Signal {
        self.chip.out()
    }

    /// Generates and checks the witness for an input element.
    pub fn witness(&self, input: Fr) -> Result<Witness<Fr>> {
        self.cs.evaluate(&[input])
    }

    /// Generates a witness where the signals in `overrides` are chosen by the prover, for
    /// soundness testing. The witness is not checked.
    pub fn forge_witness(
        &self,
        input: Fr,
        overrides: &BTreeMap<Signal, Fr>,
    ) -> Result<Witness<Fr>> {
        self.cs.generate_witness_with_overrides(&[input], overrides)
    }

    pub fn evaluate_fr(&self, input: Fr) -> Result<Output> {
        // A satisfied witness forces `out` to be boolean.
        let out = self.witness(input)?.get(self.out())?;
        Ok(Output {
            out: out == Fr::ONE,
        })
    }

    /// Evaluates a decimal-encoded field element.
    pub fn evaluate(&self, input: &str) -> Result<Output> {
        let output = self.evaluate_fr(field::parse_fr(input)?)?;
        tracing::trace!(bits = self.bits, input, out = output.out, "evaluated");
        Ok(output)
    }
}
