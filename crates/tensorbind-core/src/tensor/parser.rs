use super::error::ReadError;
use super::layout;
use super::reader::{LittleEndian, TensorReader};
use super::shape::ShapeStrategy;
use super::value::{Element, TensorData, TensorValue, ValueShape};

/// Decode routine selected by datatype dispatch.
pub type DecodeFn = fn(&[u8], ShapeStrategy) -> Result<TensorValue, ReadError>;

/// Decode a fixed-width little-endian payload.
///
/// Scalars require exactly one element; 1-D arrays take every whole
/// element in the payload; 2-D arrays require exactly `rows * cols`
/// elements.
pub fn decode_fixed<T: LittleEndian + Element>(
    payload: &[u8],
    strategy: ShapeStrategy,
) -> Result<TensorValue, ReadError> {
    let mut reader = TensorReader::new(payload);
    let (count, shape) = match strategy {
        ShapeStrategy::Scalar => {
            reader.require_len(T::WIDTH)?;
            let available = reader.element_count(T::WIDTH)?;
            if available > 1 {
                return Err(ReadError::ElementCount {
                    expected: 1,
                    actual: available,
                });
            }
            (1, ValueShape::Scalar)
        }
        ShapeStrategy::Array1D { .. } => (reader.element_count(T::WIDTH)?, ValueShape::Vector),
        ShapeStrategy::Array2D { rows, cols } => {
            let available = reader.element_count(T::WIDTH)?;
            let expected = strategy.element_count();
            if available < expected {
                return Err(ReadError::Truncated {
                    needed: expected.saturating_mul(T::WIDTH),
                    actual: payload.len(),
                });
            }
            if available > expected {
                return Err(ReadError::ElementCount {
                    expected,
                    actual: available,
                });
            }
            (expected, ValueShape::Matrix { rows, cols })
        }
    };

    let mut values = Vec::with_capacity(count);
    for _ in 0..count {
        values.push(reader.read_le::<T>()?);
    }
    Ok(TensorValue::new(shape, T::into_data(values)))
}

/// Decode a packed sequence of length-prefixed UTF-8 strings.
///
/// An empty payload for a shape that declares elements stands for an
/// absent string tensor and decodes to an empty string (scalar) or an empty
/// vector (arrays). A shape with no elements, such as `[3, 0]`, decodes
/// normally and keeps its rows.
pub fn decode_strings(payload: &[u8], strategy: ShapeStrategy) -> Result<TensorValue, ReadError> {
    let mut reader = TensorReader::new(payload);
    if reader.is_empty() && strategy.element_count() > 0 {
        return Ok(empty_strings(strategy));
    }

    let count = strategy.element_count();
    let mut values = Vec::with_capacity(count.min(payload.len() / layout::STRING_LENGTH_PREFIX));
    for index in 0..count {
        values.push(reader.read_string(index)?);
    }
    if reader.remaining() > 0 {
        return Err(ReadError::TrailingBytes {
            trailing: reader.remaining(),
        });
    }

    let shape = match strategy {
        ShapeStrategy::Scalar => ValueShape::Scalar,
        ShapeStrategy::Array1D { .. } => ValueShape::Vector,
        ShapeStrategy::Array2D { rows, cols } => ValueShape::Matrix { rows, cols },
    };
    Ok(TensorValue::new(shape, TensorData::String(values)))
}

fn empty_strings(strategy: ShapeStrategy) -> TensorValue {
    match strategy {
        ShapeStrategy::Scalar => {
            TensorValue::new(ValueShape::Scalar, TensorData::String(vec![String::new()]))
        }
        ShapeStrategy::Array1D { .. } => {
            TensorValue::new(ValueShape::Vector, TensorData::String(Vec::new()))
        }
        ShapeStrategy::Array2D { cols, .. } => TensorValue::new(
            ValueShape::Matrix { rows: 0, cols },
            TensorData::String(Vec::new()),
        ),
    }
}

/// Encode strings as `u32 LE length + UTF-8 bytes`, packed with no padding.
///
/// # Examples
/// ```
/// use tensorbind_core::encode_string_payload;
///
/// let payload = encode_string_payload(["ok", ""]);
/// assert_eq!(payload, vec![2, 0, 0, 0, b'o', b'k', 0, 0, 0, 0]);
/// ```
pub fn encode_string_payload<I, S>(values: I) -> Vec<u8>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut payload = Vec::new();
    for value in values {
        let bytes = value.as_ref().as_bytes();
        payload.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        payload.extend_from_slice(bytes);
    }
    payload
}
