//! Binding decoded values into destination records.
//!
//! A record lists its bound fields once through `TensorRecord` (usually via
//! `tensor_record!`); the registry built from that listing maps output names
//! to type-checked field slots for the duration of one decode call.

pub mod dynamic;
pub mod error;
pub mod field;
pub mod registry;

pub use dynamic::{DynamicField, DynamicRecord};
pub use error::BindError;
pub use field::{FieldSlot, TensorField};
pub use registry::{FieldRegistry, TensorRecord};
