use thiserror::Error;

use crate::tensor::ValueKind;

/// Errors returned when writing a decoded value into a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("types don't match: expected {expected}, got {actual}")]
    TypeMismatch {
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("cannot allocate {rows} matrix rows")]
    RowAllocation { rows: usize },
}
