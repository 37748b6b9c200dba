//! Tensor payload decoding.
//!
//! Decoding is split into layers:
//! - `layout`: element widths and format constants (source of truth)
//! - `reader`: bounds-checked little-endian and string reads
//! - `shape`: shape classification into scalar / 1-D / 2-D strategies
//! - `datatype`: datatype tags and dispatch onto decode routines
//! - `parser`: decode routines (no direct byte indexing)
//! - `value`: decoded values and their static kinds
//! - `error`: explicit, actionable errors
//!
//! Every routine is pure; it reads one fully buffered payload and never
//! touches a destination record.

pub mod datatype;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod shape;
pub mod value;

pub use datatype::{Datatype, DecodeRoutine, dispatch, dispatch_datatype};
pub use parser::encode_string_payload;
pub use shape::{ShapeStrategy, classify};
pub use value::{Depth, Element, ElementType, TensorData, TensorValue, ValueKind, ValueShape};
