use crate::error::{Error, Result};
use ff::PrimeField;
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Identifier of an allocated signal. Identifiers are assigned in allocation order and never
/// reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Signal(usize);

impl Signal {
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Input,
    Internal,
}

/// Computes the witness value of an internal signal.
pub type Hint<F> = Box<dyn Fn(&Witness<F>) -> Result<F> + Send + Sync>;

struct SignalInfo<F: PrimeField> {
    name: String,
    kind: SignalKind,
    hint: Option<Hint<F>>,
}

impl<F: PrimeField> fmt::Debug for SignalInfo<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalInfo")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .finish()
    }
}

/// `c₀ + Σ cᵢ · sᵢ`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearCombination<F: PrimeField> {
    terms: Vec<(Signal, F)>,
    constant: F,
}

impl<F: PrimeField> LinearCombination<F> {
    pub fn zero() -> Self {
        Self::constant(F::ZERO)
    }

    pub fn one() -> Self {
        Self::constant(F::ONE)
    }

    pub fn constant(value: F) -> Self {
        Self {
            terms: vec![],
            constant: value,
        }
    }

    pub fn from_signal(signal: Signal) -> Self {
        Self::zero().with_term(signal, F::ONE)
    }

    pub fn with_term(mut self, signal: Signal, coefficient: F) -> Self {
        self.terms.push((signal, coefficient));
        self
    }

    pub fn scale(mut self, factor: F) -> Self {
        for (_, coefficient) in self.terms.iter_mut() {
            *coefficient *= factor;
        }
        self.constant *= factor;
        self
    }

    pub fn terms(&self) -> &[(Signal, F)] {
        &self.terms
    }

    /// Whether the combination references no signal at all.
    pub fn is_constant(&self) -> bool {
        self.terms
            .iter()
            .all(|(_, coefficient)| bool::from(coefficient.is_zero()))
    }

    pub fn evaluate(&self, witness: &Witness<F>) -> Result<F> {
        self.terms
            .iter()
            .try_fold(self.constant, |acc, (signal, coefficient)| {
                Ok(acc + witness.get(*signal)? * coefficient)
            })
    }
}

impl<F: PrimeField> From<Signal> for LinearCombination<F> {
    fn from(signal: Signal) -> Self {
        Self::from_signal(signal)
    }
}

impl<F: PrimeField> Add for LinearCombination<F> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        self.terms.extend(rhs.terms);
        self.constant += rhs.constant;
        self
    }
}

impl<F: PrimeField> Neg for LinearCombination<F> {
    type Output = Self;

    fn neg(self) -> Self {
        self.scale(-F::ONE)
    }
}

impl<F: PrimeField> Sub for LinearCombination<F> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        self + -rhs
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConstraintKind {
    /// `s · (s − 1) = 0`
    Boolean,
    /// One of the factors is constant, so the constraint is linear in the signals.
    Linear,
    Quadratic,
}

/// `a · b = c`
#[derive(Debug, Clone)]
pub struct Constraint<F: PrimeField> {
    pub name: String,
    pub kind: ConstraintKind,
    pub a: LinearCombination<F>,
    pub b: LinearCombination<F>,
    pub c: LinearCombination<F>,
}

impl<F: PrimeField> Constraint<F> {
    pub fn is_satisfied(&self, witness: &Witness<F>) -> Result<bool> {
        let a = self.a.evaluate(witness)?;
        let b = self.b.evaluate(witness)?;
        let c = self.c.evaluate(witness)?;
        Ok(a * b == c)
    }
}

/// Values of all the signals of a constraint system, indexed by signal.
#[derive(Debug, Clone, PartialEq)]
pub struct Witness<F: PrimeField> {
    values: Vec<F>,
}

impl<F: PrimeField> Witness<F> {
    pub fn get(&self, signal: Signal) -> Result<F> {
        self.values
            .get(signal.0)
            .copied()
            .ok_or(Error::UnassignedSignal(signal.0))
    }

    /// Overwrites the value of a signal. Useful to forge witnesses in soundness tests.
    pub fn set(&mut self, signal: Signal, value: F) -> Result<()> {
        let slot = self
            .values
            .get_mut(signal.0)
            .ok_or(Error::UnassignedSignal(signal.0))?;
        *slot = value;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[F] {
        &self.values
    }
}

/// A minimal rank-1 constraint system. Gadgets allocate signals and register constraints of the
/// form `A · B = C`, where `A`, `B` and `C` are linear combinations of signals. Every internal
/// signal carries a hint computing its witness value from previously allocated signals, so a
/// fully built system can generate and check witnesses on its own.
///
/// After construction the system is read-only and witnesses are independent values, so one
/// system can serve many concurrent evaluations.
#[derive(Debug)]
pub struct ConstraintSystem<F: PrimeField> {
    signals: Vec<SignalInfo<F>>,
    constraints: Vec<Constraint<F>>,
}

impl<F: PrimeField> Default for ConstraintSystem<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: PrimeField> ConstraintSystem<F> {
    pub fn new() -> Self {
        Self {
            signals: vec![],
            constraints: vec![],
        }
    }

    fn alloc(&mut self, name: String, kind: SignalKind, hint: Option<Hint<F>>) -> Signal {
        let signal = Signal(self.signals.len());
        self.signals.push(SignalInfo { name, kind, hint });
        signal
    }

    /// Allocates a signal whose value is supplied by the caller at witness generation time.
    pub fn alloc_input(&mut self, name: impl Into<String>) -> Signal {
        self.alloc(name.into(), SignalKind::Input, None)
    }

    /// Allocates a signal computed by `hint`. The hint may only read signals allocated before
    /// this one.
    pub fn alloc_internal(
        &mut self,
        name: impl Into<String>,
        hint: impl Fn(&Witness<F>) -> Result<F> + Send + Sync + 'static,
    ) -> Signal {
        self.alloc(name.into(), SignalKind::Internal, Some(Box::new(hint)))
    }

    fn check_signals(&self, lc: &LinearCombination<F>) -> Result<()> {
        let allocated = self.signals.len();
        match lc.terms.iter().find(|(signal, _)| signal.0 >= allocated) {
            Some((signal, _)) => Err(Error::UnknownSignal(signal.0)),
            None => Ok(()),
        }
    }

    fn push(
        &mut self,
        name: String,
        kind: ConstraintKind,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
    ) -> Result<usize> {
        self.check_signals(&a)?;
        self.check_signals(&b)?;
        self.check_signals(&c)?;
        let index = self.constraints.len();
        self.constraints.push(Constraint {
            name,
            kind,
            a,
            b,
            c,
        });
        Ok(index)
    }

    /// Registers `a · b = c` and returns the index of the new constraint.
    pub fn enforce(
        &mut self,
        name: impl Into<String>,
        a: LinearCombination<F>,
        b: LinearCombination<F>,
        c: LinearCombination<F>,
    ) -> Result<usize> {
        let kind = if a.is_constant() || b.is_constant() {
            ConstraintKind::Linear
        } else {
            ConstraintKind::Quadratic
        };
        self.push(name.into(), kind, a, b, c)
    }

    /// `signal · (signal − 1) = 0`
    pub fn enforce_boolean(&mut self, name: impl Into<String>, signal: Signal) -> Result<usize> {
        self.push(
            name.into(),
            ConstraintKind::Boolean,
            signal.into(),
            LinearCombination::from(signal) - LinearCombination::one(),
            LinearCombination::zero(),
        )
    }

    /// `(lhs − rhs) · 1 = 0`
    pub fn enforce_equal(
        &mut self,
        name: impl Into<String>,
        lhs: LinearCombination<F>,
        rhs: LinearCombination<F>,
    ) -> Result<usize> {
        self.enforce_zero(name, lhs - rhs)
    }

    pub fn enforce_zero(
        &mut self,
        name: impl Into<String>,
        lc: LinearCombination<F>,
    ) -> Result<usize> {
        self.push(
            name.into(),
            ConstraintKind::Linear,
            lc,
            LinearCombination::one(),
            LinearCombination::zero(),
        )
    }

    pub fn num_signals(&self) -> usize {
        self.signals.len()
    }

    pub fn num_inputs(&self) -> usize {
        self.signals
            .iter()
            .filter(|signal| signal.kind == SignalKind::Input)
            .count()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn constraints(&self) -> &[Constraint<F>] {
        &self.constraints
    }

    pub fn signal_name(&self, signal: Signal) -> Option<&str> {
        self.signals.get(signal.0).map(|info| info.name.as_str())
    }

    pub fn signal_kind(&self, signal: Signal) -> Option<SignalKind> {
        self.signals.get(signal.0).map(|info| info.kind)
    }

    /// Computes every signal in allocation order. `inputs` provides the values of the input
    /// signals, in the order they were allocated.
    pub fn generate_witness(&self, inputs: &[F]) -> Result<Witness<F>> {
        self.generate_witness_with_overrides(inputs, &BTreeMap::new())
    }

    /// Like `generate_witness`, but the signals in `overrides` take the provided values
    /// instead of running their hints. Every other signal is still computed honestly from
    /// its predecessors, which models a prover that cheats on a chosen subset of signals.
    pub fn generate_witness_with_overrides(
        &self,
        inputs: &[F],
        overrides: &BTreeMap<Signal, F>,
    ) -> Result<Witness<F>> {
        let expected = self.num_inputs();
        if inputs.len() != expected {
            return Err(Error::InputCountMismatch {
                expected,
                actual: inputs.len(),
            });
        }
        let mut inputs = inputs.iter();
        let mut witness = Witness {
            values: Vec::with_capacity(self.signals.len()),
        };
        for (index, info) in self.signals.iter().enumerate() {
            let input = match info.kind {
                SignalKind::Input => inputs.next().copied(),
                SignalKind::Internal => None,
            };
            let value = match (overrides.get(&Signal(index)), input, &info.hint) {
                (Some(value), _, _) => *value,
                (None, Some(value), _) => value,
                (None, None, Some(hint)) => hint(&witness)?,
                (None, None, None) => return Err(Error::UnassignedSignal(index)),
            };
            witness.values.push(value);
        }
        Ok(witness)
    }

    /// Fails with `ConstraintViolation` naming the first constraint that doesn't hold.
    pub fn check(&self, witness: &Witness<F>) -> Result<()> {
        if witness.len() != self.signals.len() {
            let assigned = witness.len().min(self.signals.len());
            return Err(Error::UnassignedSignal(assigned));
        }
        for (index, constraint) in self.constraints.iter().enumerate() {
            if !constraint.is_satisfied(witness)? {
                tracing::debug!(index, name = %constraint.name, "constraint not satisfied");
                return Err(Error::ConstraintViolation {
                    index,
                    name: constraint.name.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn evaluate(&self, inputs: &[F]) -> Result<Witness<F>> {
        let witness = self.generate_witness(inputs)?;
        self.check(&witness)?;
        Ok(witness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Fr;
    use ff::Field;

    /// `out = x · y + 3`
    fn make_mul_add() -> (ConstraintSystem<Fr>, Signal, Signal, Signal) {
        let mut cs = ConstraintSystem::<Fr>::new();
        let x = cs.alloc_input("x");
        let y = cs.alloc_input("y");
        let out = cs.alloc_internal("out", move |w| Ok(w.get(x)? * w.get(y)? + Fr::from(3)));
        cs.enforce(
            "mul_add",
            x.into(),
            y.into(),
            LinearCombination::from(out) - LinearCombination::constant(Fr::from(3)),
        )
        .unwrap();
        (cs, x, y, out)
    }

    #[test]
    fn test_signal_allocation() {
        let mut cs = ConstraintSystem::<Fr>::new();
        let a = cs.alloc_input("a");
        let b = cs.alloc_internal("b", |_| Ok(Fr::ZERO));
        let c = cs.alloc_input("c");
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(c.index(), 2);
        assert_eq!(cs.num_signals(), 3);
        assert_eq!(cs.num_inputs(), 2);
        assert_eq!(cs.signal_name(b), Some("b"));
        assert_eq!(cs.signal_kind(a), Some(SignalKind::Input));
        assert_eq!(cs.signal_kind(b), Some(SignalKind::Internal));
    }

    #[test]
    fn test_evaluate() {
        let (cs, _, _, out) = make_mul_add();
        let witness = cs.evaluate(&[Fr::from(6), Fr::from(7)]).unwrap();
        assert_eq!(witness.get(out), Ok(Fr::from(45)));
        assert_eq!(witness.len(), 3);
        assert_eq!(witness.values(), &[Fr::from(6), Fr::from(7), Fr::from(45)]);
    }

    #[test]
    fn test_constraint_violation() {
        let (cs, _, _, out) = make_mul_add();
        let mut witness = cs.generate_witness(&[Fr::from(6), Fr::from(7)]).unwrap();
        witness.set(out, Fr::from(44)).unwrap();
        assert_eq!(
            cs.check(&witness),
            Err(Error::ConstraintViolation {
                index: 0,
                name: "mul_add".into()
            })
        );
    }

    #[test]
    fn test_overrides() {
        let (cs, _, _, out) = make_mul_add();
        let overrides = BTreeMap::from([(out, Fr::from(1))]);
        let witness = cs
            .generate_witness_with_overrides(&[Fr::from(2), Fr::from(2)], &overrides)
            .unwrap();
        assert_eq!(witness.get(out), Ok(Fr::from(1)));
        assert!(cs.check(&witness).is_err());
    }

    #[test]
    fn test_input_count_mismatch() {
        let (cs, _, _, _) = make_mul_add();
        assert_eq!(
            cs.generate_witness(&[Fr::ONE]),
            Err(Error::InputCountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert!(cs.generate_witness(&[Fr::ONE; 3]).is_err());
    }

    #[test]
    fn test_unknown_signal() {
        let (_, x, y, _) = make_mul_add();
        let mut other = ConstraintSystem::<Fr>::new();
        let z = other.alloc_input("z");
        assert_eq!(z, x);
        assert_eq!(
            other.enforce_equal("eq", z.into(), y.into()),
            Err(Error::UnknownSignal(1))
        );
        assert_eq!(other.num_constraints(), 0);
    }

    #[test]
    fn test_constraint_kinds() {
        let mut cs = ConstraintSystem::<Fr>::new();
        let x = cs.alloc_input("x");
        let y = cs.alloc_input("y");
        cs.enforce_boolean("bool", x).unwrap();
        cs.enforce_equal("eq", x.into(), y.into()).unwrap();
        cs.enforce(
            "scaled",
            LinearCombination::constant(Fr::from(2)),
            x.into(),
            y.into(),
        )
        .unwrap();
        cs.enforce("square", x.into(), x.into(), y.into()).unwrap();
        let kinds = cs
            .constraints()
            .iter()
            .map(|constraint| constraint.kind)
            .collect::<Vec<_>>();
        assert_eq!(
            kinds,
            vec![
                ConstraintKind::Boolean,
                ConstraintKind::Linear,
                ConstraintKind::Linear,
                ConstraintKind::Quadratic
            ]
        );
    }

    #[test]
    fn test_boolean_constraint() {
        let mut cs = ConstraintSystem::<Fr>::new();
        let x = cs.alloc_input("x");
        cs.enforce_boolean("bool", x).unwrap();
        assert!(cs.evaluate(&[Fr::ZERO]).is_ok());
        assert!(cs.evaluate(&[Fr::ONE]).is_ok());
        assert!(cs.evaluate(&[Fr::from(2)]).is_err());
        assert!(cs.evaluate(&[-Fr::ONE]).is_err());
    }

    #[test]
    fn test_linear_combination() {
        let mut cs = ConstraintSystem::<Fr>::new();
        let x = cs.alloc_input("x");
        let y = cs.alloc_input("y");
        let witness = cs.generate_witness(&[Fr::from(5), Fr::from(9)]).unwrap();
        let tripled = LinearCombination::from(x).scale(Fr::from(3));
        let lc = tripled - LinearCombination::from(y) + LinearCombination::constant(Fr::from(4));
        assert_eq!(lc.evaluate(&witness), Ok(Fr::from(10)));
        assert!(!lc.is_constant());
        assert!(LinearCombination::<Fr>::one().is_constant());
        assert_eq!(lc.terms().len(), 2);
    }

    #[test]
    fn test_short_witness() {
        let (cs, _, _, _) = make_mul_add();
        let mut other = ConstraintSystem::<Fr>::new();
        other.alloc_input("x");
        let witness = other.generate_witness(&[Fr::ONE]).unwrap();
        assert_eq!(cs.check(&witness), Err(Error::UnassignedSignal(1)));
    }
}
