use thiserror::Error;

/// Errors returned by the byte-level tensor reader.
///
/// # Examples
/// ```
/// use tensorbind_core::tensor::error::ReadError;
///
/// let err = ReadError::Truncated { needed: 4, actual: 3 };
/// assert!(err.to_string().contains("payload too short"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    Truncated { needed: usize, actual: usize },
    #[error("payload length {actual} is not a multiple of element width {width}")]
    Misaligned { width: usize, actual: usize },
    #[error("invalid UTF-8 in string element {index} at byte offset {offset}")]
    InvalidUtf8 { index: usize, offset: usize },
    #[error("payload holds {actual} elements, shape requires {expected}")]
    ElementCount { expected: usize, actual: usize },
    #[error("{trailing} trailing bytes after the last string element")]
    TrailingBytes { trailing: usize },
}

/// Errors returned by shape classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("unsupported shape rank {rank} (supported ranks are 1 and 2)")]
    UnsupportedRank { rank: usize },
    #[error("invalid dimension in shape {shape:?}")]
    InvalidDimension { shape: Vec<i64> },
}

/// Errors returned by datatype dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DatatypeError {
    #[error("unknown datatype: {0}")]
    Unknown(String),
    #[error("{0} not yet supported")]
    NotYetSupported(&'static str),
}
