use std::fmt;
use std::str::FromStr;

use serde::ser::SerializeSeq;
use serde::{Serialize, Serializer};

use super::shape::ShapeStrategy;

/// Element type a tensor decodes into, named after its Rust type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Bool,
    UInt8,
    UInt16,
    UInt32,
    Int8,
    Int16,
    Int32,
    Int64,
    Float32,
    Float64,
    String,
}

impl ElementType {
    pub const ALL: [ElementType; 11] = [
        ElementType::Bool,
        ElementType::UInt8,
        ElementType::UInt16,
        ElementType::UInt32,
        ElementType::Int8,
        ElementType::Int16,
        ElementType::Int32,
        ElementType::Int64,
        ElementType::Float32,
        ElementType::Float64,
        ElementType::String,
    ];

    pub fn rust_name(&self) -> &'static str {
        match self {
            ElementType::Bool => "bool",
            ElementType::UInt8 => "u8",
            ElementType::UInt16 => "u16",
            ElementType::UInt32 => "u32",
            ElementType::Int8 => "i8",
            ElementType::Int16 => "i16",
            ElementType::Int32 => "i32",
            ElementType::Int64 => "i64",
            ElementType::Float32 => "f32",
            ElementType::Float64 => "f64",
            ElementType::String => "String",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.rust_name())
    }
}

/// Nesting depth of a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Depth {
    Scalar,
    Vector,
    Matrix,
}

impl From<ShapeStrategy> for Depth {
    fn from(strategy: ShapeStrategy) -> Self {
        match strategy {
            ShapeStrategy::Scalar => Depth::Scalar,
            ShapeStrategy::Array1D { .. } => Depth::Vector,
            ShapeStrategy::Array2D { .. } => Depth::Matrix,
        }
    }
}

/// Full static type of a decoded value: element type plus nesting depth.
///
/// Two kinds are compatible only when they are equal; there is no widening.
///
/// # Examples
/// ```
/// use tensorbind_core::{Depth, ElementType, ValueKind};
///
/// let kind: ValueKind = "Vec<Vec<i32>>".parse().unwrap();
/// assert_eq!(kind, ValueKind::new(ElementType::Int32, Depth::Matrix));
/// assert_eq!(kind.to_string(), "Vec<Vec<i32>>");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueKind {
    pub element: ElementType,
    pub depth: Depth,
}

impl ValueKind {
    pub const fn new(element: ElementType, depth: Depth) -> Self {
        Self { element, depth }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.depth {
            Depth::Scalar => write!(f, "{}", self.element),
            Depth::Vector => write!(f, "Vec<{}>", self.element),
            Depth::Matrix => write!(f, "Vec<Vec<{}>>", self.element),
        }
    }
}

/// Error returned when a type description does not name a bindable type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownKind(pub String);

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "not a bindable field type: {}", self.0)
    }
}

impl std::error::Error for UnknownKind {}

impl FromStr for ValueKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        let (inner, depth) = if let Some(rest) = strip_vec(&compact) {
            match strip_vec(rest) {
                Some(inner) => (inner, Depth::Matrix),
                None => (rest, Depth::Vector),
            }
        } else {
            (compact.as_str(), Depth::Scalar)
        };
        let element = ElementType::ALL
            .into_iter()
            .find(|element| element.rust_name() == inner)
            .ok_or_else(|| UnknownKind(s.to_string()))?;
        Ok(ValueKind::new(element, depth))
    }
}

fn strip_vec(s: &str) -> Option<&str> {
    s.strip_prefix("Vec<")?.strip_suffix('>')
}

/// Flat, row-major element storage of one decoded output.
#[derive(Debug, Clone, PartialEq)]
pub enum TensorData {
    Bool(Vec<bool>),
    UInt8(Vec<u8>),
    UInt16(Vec<u16>),
    UInt32(Vec<u32>),
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    String(Vec<String>),
}

impl TensorData {
    pub fn element_type(&self) -> ElementType {
        match self {
            TensorData::Bool(_) => ElementType::Bool,
            TensorData::UInt8(_) => ElementType::UInt8,
            TensorData::UInt16(_) => ElementType::UInt16,
            TensorData::UInt32(_) => ElementType::UInt32,
            TensorData::Int8(_) => ElementType::Int8,
            TensorData::Int16(_) => ElementType::Int16,
            TensorData::Int32(_) => ElementType::Int32,
            TensorData::Int64(_) => ElementType::Int64,
            TensorData::Float32(_) => ElementType::Float32,
            TensorData::Float64(_) => ElementType::Float64,
            TensorData::String(_) => ElementType::String,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TensorData::Bool(v) => v.len(),
            TensorData::UInt8(v) => v.len(),
            TensorData::UInt16(v) => v.len(),
            TensorData::UInt32(v) => v.len(),
            TensorData::Int8(v) => v.len(),
            TensorData::Int16(v) => v.len(),
            TensorData::Int32(v) => v.len(),
            TensorData::Int64(v) => v.len(),
            TensorData::Float32(v) => v.len(),
            TensorData::Float64(v) => v.len(),
            TensorData::String(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Rust type that can be an element of a decoded tensor.
pub trait Element: Sized {
    const TYPE: ElementType;

    fn into_data(values: Vec<Self>) -> TensorData;

    /// Take the elements back out, or return the data untouched when it
    /// holds another element type.
    fn from_data(data: TensorData) -> Result<Vec<Self>, TensorData>;
}

macro_rules! impl_element {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Element for $ty {
                const TYPE: ElementType = ElementType::$variant;

                fn into_data(values: Vec<Self>) -> TensorData {
                    TensorData::$variant(values)
                }

                fn from_data(data: TensorData) -> Result<Vec<Self>, TensorData> {
                    match data {
                        TensorData::$variant(values) => Ok(values),
                        other => Err(other),
                    }
                }
            }
        )*
    };
}

impl_element! {
    bool => Bool,
    u8 => UInt8,
    u16 => UInt16,
    u32 => UInt32,
    i8 => Int8,
    i16 => Int16,
    i32 => Int32,
    i64 => Int64,
    f32 => Float32,
    f64 => Float64,
    String => String,
}

/// Arrangement of the flat elements of a decoded value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueShape {
    Scalar,
    Vector,
    Matrix { rows: usize, cols: usize },
}

impl ValueShape {
    pub fn depth(&self) -> Depth {
        match self {
            ValueShape::Scalar => Depth::Scalar,
            ValueShape::Vector => Depth::Vector,
            ValueShape::Matrix { .. } => Depth::Matrix,
        }
    }
}

/// One decoded output, ready to be bound to a field.
#[derive(Debug, Clone, PartialEq)]
pub struct TensorValue {
    shape: ValueShape,
    data: TensorData,
}

impl TensorValue {
    pub(crate) fn new(shape: ValueShape, data: TensorData) -> Self {
        Self { shape, data }
    }

    pub fn kind(&self) -> ValueKind {
        ValueKind::new(self.data.element_type(), self.shape.depth())
    }

    pub fn shape(&self) -> ValueShape {
        self.shape
    }

    pub fn data(&self) -> &TensorData {
        &self.data
    }

    pub fn into_scalar<T: Element>(self) -> Result<T, TensorValue> {
        if self.shape != ValueShape::Scalar {
            return Err(self);
        }
        let shape = self.shape;
        let mut values = T::from_data(self.data).map_err(|data| TensorValue::new(shape, data))?;
        match values.len() {
            1 => values.pop().ok_or_else(|| TensorValue::new(shape, T::into_data(Vec::new()))),
            _ => Err(TensorValue::new(shape, T::into_data(values))),
        }
    }

    pub fn into_vec<T: Element>(self) -> Result<Vec<T>, TensorValue> {
        if self.shape != ValueShape::Vector {
            return Err(self);
        }
        let shape = self.shape;
        T::from_data(self.data).map_err(|data| TensorValue::new(shape, data))
    }

    /// Split into `rows` rows of `cols` elements.
    ///
    /// Hands the value back when its kind differs or when the outer vector
    /// cannot be allocated.
    pub fn into_matrix<T: Element>(self) -> Result<Vec<Vec<T>>, TensorValue> {
        let ValueShape::Matrix { rows, cols } = self.shape else {
            return Err(self);
        };
        let shape = self.shape;
        let values = T::from_data(self.data).map_err(|data| TensorValue::new(shape, data))?;
        let mut matrix: Vec<Vec<T>> = Vec::new();
        if matrix.try_reserve_exact(rows).is_err() {
            return Err(TensorValue::new(shape, T::into_data(values)));
        }
        let mut elements = values.into_iter();
        matrix.extend((0..rows).map(|_| elements.by_ref().take(cols).collect()));
        Ok(matrix)
    }
}

impl Serialize for TensorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match &self.data {
            TensorData::Bool(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::UInt8(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::UInt16(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::UInt32(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::Int8(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::Int16(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::Int32(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::Int64(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::Float32(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::Float64(v) => serialize_shaped(v, self.shape, serializer),
            TensorData::String(v) => serialize_shaped(v, self.shape, serializer),
        }
    }
}

fn serialize_shaped<T: Serialize, S: Serializer>(
    values: &[T],
    shape: ValueShape,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match shape {
        ValueShape::Scalar => match values.first() {
            Some(value) => value.serialize(serializer),
            None => serializer.serialize_none(),
        },
        ValueShape::Vector => values.serialize(serializer),
        ValueShape::Matrix { rows, cols } => {
            // Rows are streamed; a zero-column matrix may declare many rows.
            let mut seq = serializer.serialize_seq(Some(rows))?;
            for row in 0..rows {
                let start = row.saturating_mul(cols);
                let end = start.saturating_add(cols);
                seq.serialize_element(values.get(start..end).unwrap_or(&[]))?;
            }
            seq.end()
        }
    }
}
