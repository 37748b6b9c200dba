use std::fmt;
use std::str::FromStr;

use super::error::{DatatypeError, ReadError};
use super::parser::{self, DecodeFn};
use super::shape::ShapeStrategy;
use super::value::{Depth, Element, ElementType, TensorValue, ValueKind};

/// Datatype tag declared by an inference output.
///
/// Tags are matched exactly and case-sensitively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Datatype {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    Int8,
    Int16,
    Int32,
    Int64,
    Float16,
    Float32,
    Float64,
    String,
}

impl Datatype {
    pub fn as_str(&self) -> &'static str {
        match self {
            Datatype::Bool => "BOOL",
            Datatype::UInt8 => "UINT8",
            Datatype::UInt16 => "UINT16",
            Datatype::UInt32 => "UINT32",
            Datatype::Int8 => "INT8",
            Datatype::Int16 => "INT16",
            Datatype::Int32 => "INT32",
            Datatype::Int64 => "INT64",
            Datatype::Float16 => "FLOAT16",
            Datatype::Float32 => "FLOAT32",
            Datatype::Float64 => "FLOAT64",
            Datatype::String => "STRING",
        }
    }
}

impl fmt::Display for Datatype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Datatype {
    type Err = DatatypeError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        let datatype = match tag {
            "BOOL" => Datatype::Bool,
            "UINT8" => Datatype::UInt8,
            "UINT16" => Datatype::UInt16,
            "UINT32" => Datatype::UInt32,
            "INT8" => Datatype::Int8,
            "INT16" => Datatype::Int16,
            "INT32" => Datatype::Int32,
            "INT64" => Datatype::Int64,
            "FLOAT16" => Datatype::Float16,
            "FLOAT32" => Datatype::Float32,
            "FLOAT64" => Datatype::Float64,
            "STRING" => Datatype::String,
            other => return Err(DatatypeError::Unknown(other.to_string())),
        };
        Ok(datatype)
    }
}

/// Concrete decode routine: element type, shape strategy and the function
/// that turns a payload into a value of that kind.
#[derive(Clone, Copy)]
pub struct DecodeRoutine {
    element: ElementType,
    strategy: ShapeStrategy,
    decode: DecodeFn,
}

impl DecodeRoutine {
    fn fixed<T>(strategy: ShapeStrategy) -> Self
    where
        T: super::reader::LittleEndian + Element,
    {
        Self {
            element: T::TYPE,
            strategy,
            decode: parser::decode_fixed::<T>,
        }
    }

    fn strings(strategy: ShapeStrategy) -> Self {
        Self {
            element: ElementType::String,
            strategy,
            decode: parser::decode_strings,
        }
    }

    pub fn element(&self) -> ElementType {
        self.element
    }

    pub fn strategy(&self) -> ShapeStrategy {
        self.strategy
    }

    /// Static type of every value this routine produces.
    pub fn kind(&self) -> ValueKind {
        ValueKind::new(self.element, Depth::from(self.strategy))
    }

    pub fn decode(&self, payload: &[u8]) -> Result<TensorValue, ReadError> {
        (self.decode)(payload, self.strategy)
    }
}

impl fmt::Debug for DecodeRoutine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodeRoutine")
            .field("element", &self.element)
            .field("strategy", &self.strategy)
            .finish()
    }
}

/// Select the decode routine for a datatype tag and shape strategy.
///
/// # Examples
/// ```
/// use tensorbind_core::{ShapeStrategy, dispatch};
///
/// let routine = dispatch("INT32", ShapeStrategy::Array1D { len: 2 }).unwrap();
/// assert_eq!(routine.kind().to_string(), "Vec<i32>");
/// assert!(dispatch("FLOAT16", ShapeStrategy::Scalar).is_err());
/// ```
///
/// # Errors
/// Returns `DatatypeError::Unknown` for tags outside the fixed set and
/// `DatatypeError::NotYetSupported` for `FLOAT16`.
pub fn dispatch(tag: &str, strategy: ShapeStrategy) -> Result<DecodeRoutine, DatatypeError> {
    let datatype: Datatype = tag.parse()?;
    dispatch_datatype(datatype, strategy)
}

pub fn dispatch_datatype(
    datatype: Datatype,
    strategy: ShapeStrategy,
) -> Result<DecodeRoutine, DatatypeError> {
    let routine = match datatype {
        Datatype::Bool => DecodeRoutine::fixed::<bool>(strategy),
        Datatype::UInt8 => DecodeRoutine::fixed::<u8>(strategy),
        Datatype::UInt16 => DecodeRoutine::fixed::<u16>(strategy),
        Datatype::UInt32 => DecodeRoutine::fixed::<u32>(strategy),
        Datatype::Int8 => DecodeRoutine::fixed::<i8>(strategy),
        Datatype::Int16 => DecodeRoutine::fixed::<i16>(strategy),
        Datatype::Int32 => DecodeRoutine::fixed::<i32>(strategy),
        Datatype::Int64 => DecodeRoutine::fixed::<i64>(strategy),
        Datatype::Float16 => {
            return Err(DatatypeError::NotYetSupported(Datatype::Float16.as_str()));
        }
        Datatype::Float32 => DecodeRoutine::fixed::<f32>(strategy),
        Datatype::Float64 => DecodeRoutine::fixed::<f64>(strategy),
        Datatype::String => DecodeRoutine::strings(strategy),
    };
    Ok(routine)
}
