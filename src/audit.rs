use crate::builder::{ConstraintKind, ConstraintSystem};
use crate::field::Fr;
use crate::gadget::CheckBitLength;
use std::collections::BTreeMap;
use std::fmt;

/// A circuit whose constraints can be counted against a declared bit width.
pub trait AuditSubject {
    fn name(&self) -> &str;
    fn declared_bits(&self) -> usize;
    fn constraint_system(&self) -> &ConstraintSystem<Fr>;
}

impl AuditSubject for CheckBitLength {
    fn name(&self) -> &str {
        "CheckBitLength"
    }

    fn declared_bits(&self) -> usize {
        self.bits()
    }

    fn constraint_system(&self) -> &ConstraintSystem<Fr> {
        CheckBitLength::constraint_system(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    PossibleUnderConstraint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditReport {
    pub name: String,
    pub bits: usize,
    pub constraints: usize,
    pub minimum: usize,
    pub by_kind: BTreeMap<ConstraintKind, usize>,
    pub verdict: Verdict,
}

impl AuditReport {
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }
}

impl fmt::Display for AuditReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} #Constraints: {} Expected: {}",
            self.name, self.constraints, self.minimum
        )?;
        for (kind, count) in &self.by_kind {
            writeln!(f, "  {:?}: {}", kind, count)?;
        }
        match self.verdict {
            Verdict::Pass => write!(f, "PASS"),
            Verdict::PossibleUnderConstraint => write!(f, "{}", UNDER_CONSTRAINED_WARNING),
        }
    }
}

/// Printed when a circuit has fewer than `b + 2` constraints.
pub const UNDER_CONSTRAINED_WARNING: &str = "WARNING: number of constraints is less than b + 2. \
     It is likely that you are not constraining the witnesses appropriately.";

/// A range check over `b` bits needs at least `b` booleanity constraints, a reconstruction
/// constraint and an output constraint. A circuit with fewer constraints almost certainly leaves
/// some witness unconstrained.
pub fn minimum_constraints(bits: usize) -> usize {
    bits + 2
}

pub fn constraint_count(subject: &impl AuditSubject) -> usize {
    subject.constraint_system().num_constraints()
}

pub fn audit_minimum(subject: &impl AuditSubject) -> bool {
    constraint_count(subject) >= minimum_constraints(subject.declared_bits())
}

/// The `#Constraints` line, followed by the warning when the count is below `b + 2`.
pub fn constraint_summary(subject: &impl AuditSubject) -> String {
    let mut summary = format!(
        "{} #Constraints: {} Expected: {}",
        subject.name(),
        constraint_count(subject),
        minimum_constraints(subject.declared_bits())
    );
    if !audit_minimum(subject) {
        summary.push('\n');
        summary.push_str(UNDER_CONSTRAINED_WARNING);
    }
    summary
}

/// Counts the constraints of `subject` by shape and compares the total with `b + 2`. The audit
/// reports a possible under-constraint, it doesn't reject the circuit.
pub fn audit(subject: &impl AuditSubject) -> AuditReport {
    let constraints = subject.constraint_system().constraints();
    let mut by_kind = BTreeMap::new();
    for constraint in constraints {
        *by_kind.entry(constraint.kind).or_insert(0) += 1;
    }
    let bits = subject.declared_bits();
    let minimum = minimum_constraints(bits);
    let verdict = if constraints.len() < minimum {
        tracing::warn!(
            name = subject.name(),
            constraints = constraints.len(),
            minimum,
            "{}",
            UNDER_CONSTRAINED_WARNING
        );
        Verdict::PossibleUnderConstraint
    } else {
        tracing::info!(
            name = subject.name(),
            constraints = constraints.len(),
            minimum,
            "constraint count audit passed"
        );
        Verdict::Pass
    };
    AuditReport {
        name: subject.name().to_string(),
        bits,
        constraints: constraints.len(),
        minimum,
        by_kind,
        verdict,
    }
}
