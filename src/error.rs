use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    #[error("invalid field element: {0:?}")]
    InvalidFieldElement(String),

    #[error("invalid bit width {bits} (must be between 1 and {max})")]
    InvalidBitWidth { bits: usize, max: u32 },

    /// A decomposition was asked to represent a value that doesn't fit in `bits` bits.
    #[error("value doesn't fit in {bits} bits")]
    RangeOverflow { bits: usize },

    #[error("constraint #{index} ({name}) is not satisfied")]
    ConstraintViolation { index: usize, name: String },

    #[error("signal #{0} was not allocated by this constraint system")]
    UnknownSignal(usize),

    #[error("signal #{0} has no assigned value")]
    UnassignedSignal(usize),

    #[error("expected {expected} input values, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
