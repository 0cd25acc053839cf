pub mod audit;
pub mod bits;
pub mod builder;
pub mod cache;
pub mod chips;
pub mod error;
pub mod field;
pub mod gadget;

pub use audit::{AuditReport, AuditSubject, Verdict, audit, audit_minimum, constraint_count};
pub use builder::{ConstraintSystem, LinearCombination, Signal, Witness};
pub use error::{Error, Result};
pub use field::Fr;
pub use gadget::{CheckBitLength, Output};
