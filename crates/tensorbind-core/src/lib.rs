//! tensorbind core library: decode inference output tensors into typed records.
//!
//! An inference response carries named outputs, each with a datatype tag, a
//! shape and a raw little-endian payload. This crate classifies each shape
//! (scalar, 1-D array, 2-D array), dispatches the datatype onto a decode
//! routine, decodes the payload and writes the value into the record field
//! bound to that output name, after checking that the field's Rust type is
//! exactly the type the output decodes to.
//!
//! Decoding is byte-oriented and side-effect free: payloads are fully
//! buffered, nothing is cached between calls and the only mutation is the
//! destination record.
//!
//! Invariants:
//! - Outputs pair with raw payloads by position, never by name.
//! - A field binds only when element type and nesting depth both match.
//! - The first failing output aborts the call.
//!
//! # Examples
//! ```
//! use tensorbind_core::{ModelInferResponse, decode, encode_string_payload, tensor_record};
//!
//! #[derive(Debug, Default)]
//! struct Classification {
//!     scores: Vec<f32>,
//!     labels: Vec<String>,
//! }
//!
//! tensor_record!(Classification {
//!     scores: "scores",
//!     labels: "labels",
//! });
//!
//! let mut response = ModelInferResponse::new("classifier");
//! let scores: Vec<u8> = [0.25f32, 0.75].iter().flat_map(|v| v.to_le_bytes()).collect();
//! response.push_output("scores", "FLOAT32", vec![1, 2], scores);
//! response.push_output("labels", "STRING", vec![1, 2], encode_string_payload(["cat", "dog"]));
//! response.push_output("debug", "INT8", vec![1], vec![0]);
//!
//! let mut out = Classification::default();
//! decode(&response, &mut out)?;
//! assert_eq!(out.scores, vec![0.25, 0.75]);
//! assert_eq!(out.labels, vec!["cat", "dog"]);
//! # Ok::<(), tensorbind_core::DecodeError>(())
//! ```

pub mod bind;
mod decode;
mod response;
pub mod tensor;

pub use bind::{
    BindError, DynamicField, DynamicRecord, FieldRegistry, FieldSlot, TensorField, TensorRecord,
};
pub use decode::{DecodeError, Decoder, DecoderOptions, decode};
pub use response::{InferOutput, InferResponse, ModelInferResponse, OutputTensor};
pub use tensor::{
    Datatype, DecodeRoutine, Depth, Element, ElementType, ShapeStrategy, TensorData, TensorValue,
    ValueKind, ValueShape, classify as classify_shape, dispatch, encode_string_payload,
};
