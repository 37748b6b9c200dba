use std::collections::HashSet;

use thiserror::Error;

use crate::bind::{BindError, FieldRegistry, FieldSlot, TensorRecord};
use crate::response::{InferOutput, InferResponse};
use crate::tensor::error::{DatatypeError, ReadError, ShapeError};
use crate::tensor::{ValueKind, classify, dispatch};

/// Errors returned by `decode`. Every variant tied to an output names it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("invalid target: {reason}")]
    InvalidTarget { reason: String },
    #[error(
        "output '{name}' at index {index} has no raw content ({contents} payloads for {outputs} outputs)"
    )]
    InvalidResponse {
        name: String,
        index: usize,
        outputs: usize,
        contents: usize,
    },
    #[error("output '{name}': shape {shape:?} has unsupported rank {rank}")]
    UnsupportedRank {
        name: String,
        rank: usize,
        shape: Vec<i64>,
    },
    #[error("output '{name}': invalid dimension in shape {shape:?}")]
    InvalidDimension { name: String, shape: Vec<i64> },
    #[error("output '{name}': unknown datatype {datatype}")]
    UnknownDatatype { name: String, datatype: String },
    #[error("output '{name}': {datatype} not yet supported")]
    NotYetSupported {
        name: String,
        datatype: &'static str,
    },
    #[error("output '{name}': types don't match: field is {expected}, output decodes to {actual}")]
    TypeMismatch {
        name: String,
        expected: ValueKind,
        actual: ValueKind,
    },
    #[error("output '{name}': truncated payload: {source}")]
    Truncated {
        name: String,
        #[source]
        source: ReadError,
    },
    #[error("output '{name}': payload does not match shape: {source}")]
    ShapeMismatch {
        name: String,
        #[source]
        source: ReadError,
    },
    #[error("output '{name}': {source}")]
    InvalidUtf8 {
        name: String,
        #[source]
        source: ReadError,
    },
    #[error("no output named '{name}' in response")]
    MissingOutput { name: String },
}

impl DecodeError {
    fn from_shape(name: &str, shape: &[i64], err: ShapeError) -> Self {
        match err {
            ShapeError::UnsupportedRank { rank } => DecodeError::UnsupportedRank {
                name: name.to_string(),
                rank,
                shape: shape.to_vec(),
            },
            ShapeError::InvalidDimension { shape } => DecodeError::InvalidDimension {
                name: name.to_string(),
                shape,
            },
        }
    }

    fn from_datatype(name: &str, err: DatatypeError) -> Self {
        match err {
            DatatypeError::Unknown(datatype) => DecodeError::UnknownDatatype {
                name: name.to_string(),
                datatype,
            },
            DatatypeError::NotYetSupported(datatype) => DecodeError::NotYetSupported {
                name: name.to_string(),
                datatype,
            },
        }
    }

    fn from_bind(name: &str, shape: &[i64], err: BindError) -> Self {
        match err {
            BindError::TypeMismatch { expected, actual } => DecodeError::TypeMismatch {
                name: name.to_string(),
                expected,
                actual,
            },
            BindError::RowAllocation { .. } => DecodeError::InvalidDimension {
                name: name.to_string(),
                shape: shape.to_vec(),
            },
        }
    }

    fn from_read(name: &str, err: ReadError) -> Self {
        let name = name.to_string();
        match err {
            ReadError::Truncated { .. } | ReadError::Misaligned { .. } => {
                DecodeError::Truncated { name, source: err }
            }
            ReadError::ElementCount { .. } | ReadError::TrailingBytes { .. } => {
                DecodeError::ShapeMismatch { name, source: err }
            }
            ReadError::InvalidUtf8 { .. } => DecodeError::InvalidUtf8 { name, source: err },
        }
    }
}

/// Options for one `Decoder`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DecoderOptions {
    /// Fail with `MissingOutput` when a bound name is absent from the response.
    pub strict_names: bool,
}

/// Decode orchestrator.
///
/// Holds no state between calls; the field registry is rebuilt from the
/// record on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Decoder {
    options: DecoderOptions,
}

impl Decoder {
    pub fn new(options: DecoderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> DecoderOptions {
        self.options
    }

    /// Decode every bound output of `response` into `record`.
    ///
    /// Outputs are visited in response order. Unbound names are skipped.
    /// The first failing output aborts the call; fields bound before it
    /// keep their new values, so the record should be discarded on error.
    pub fn decode<Resp, R>(&self, response: &Resp, record: &mut R) -> Result<(), DecodeError>
    where
        Resp: InferResponse + ?Sized,
        R: TensorRecord + ?Sized,
    {
        let mut registry = FieldRegistry::build(record);
        let outputs = response.outputs();
        let contents = response.raw_output_contents();
        let mut decoded = HashSet::new();

        for (index, output) in outputs.iter().enumerate() {
            let name = output.name();
            let Some(slot) = registry.slot(name) else {
                tracing::trace!(name, index, "output not bound, skipping");
                continue;
            };
            let raw = contents
                .get(index)
                .ok_or_else(|| DecodeError::InvalidResponse {
                    name: name.to_string(),
                    index,
                    outputs: outputs.len(),
                    contents: contents.len(),
                })?;
            decode_output(output, raw, slot)?;
            decoded.insert(name);
        }

        if self.options.strict_names {
            if let Some(name) = registry
                .names()
                .into_iter()
                .find(|name| !decoded.contains(name))
            {
                return Err(DecodeError::MissingOutput {
                    name: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Decode `response` into `record` with default options.
///
/// # Examples
/// ```
/// use tensorbind_core::{ModelInferResponse, decode, tensor_record};
///
/// #[derive(Default)]
/// struct Output {
///     score: f32,
/// }
/// tensor_record!(Output { score: "score" });
///
/// let mut response = ModelInferResponse::new("model");
/// response.push_output("score", "FLOAT32", vec![1], vec![0x00, 0x00, 0x80, 0x3f]);
///
/// let mut output = Output::default();
/// decode(&response, &mut output)?;
/// assert_eq!(output.score, 1.0);
/// # Ok::<(), tensorbind_core::DecodeError>(())
/// ```
///
/// # Errors
/// Returns the first `DecodeError` met while classifying, dispatching,
/// decoding or binding a bound output.
pub fn decode<Resp, R>(response: &Resp, record: &mut R) -> Result<(), DecodeError>
where
    Resp: InferResponse + ?Sized,
    R: TensorRecord + ?Sized,
{
    Decoder::default().decode(response, record)
}

fn decode_output<O, S>(output: &O, raw: &[u8], slot: &mut S) -> Result<(), DecodeError>
where
    O: InferOutput + ?Sized,
    S: FieldSlot + ?Sized,
{
    let name = output.name();
    let shape = output.shape();
    let strategy = classify(shape).map_err(|err| DecodeError::from_shape(name, shape, err))?;
    let routine =
        dispatch(output.datatype(), strategy).map_err(|err| DecodeError::from_datatype(name, err))?;

    // Type guard runs before any byte is read.
    slot.check(routine.kind())
        .map_err(|err| DecodeError::from_bind(name, shape, err))?;
    let value = routine
        .decode(raw)
        .map_err(|err| DecodeError::from_read(name, err))?;
    slot.assign(value)
        .map_err(|err| DecodeError::from_bind(name, shape, err))?;

    tracing::debug!(name, kind = %routine.kind(), %strategy, bytes = raw.len(), "bound output");
    Ok(())
}
