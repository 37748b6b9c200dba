use super::error::ReadError;
use super::layout;

/// Fixed-width primitive that can be read from little-endian bytes.
///
/// `from_le_slice` is only ever called with exactly `WIDTH` bytes; the
/// reader enforces that before handing the slice over.
pub trait LittleEndian: Sized + Copy {
    const WIDTH: usize;

    fn from_le_slice(bytes: &[u8]) -> Self;
}

macro_rules! impl_little_endian {
    ($($ty:ty => $width:expr),* $(,)?) => {
        $(
            impl LittleEndian for $ty {
                const WIDTH: usize = $width;

                fn from_le_slice(bytes: &[u8]) -> Self {
                    let mut buf = [0u8; $width];
                    buf.copy_from_slice(bytes);
                    <$ty>::from_le_bytes(buf)
                }
            }
        )*
    };
}

impl_little_endian! {
    u8 => layout::INT8_WIDTH,
    u16 => layout::INT16_WIDTH,
    u32 => layout::INT32_WIDTH,
    i8 => layout::INT8_WIDTH,
    i16 => layout::INT16_WIDTH,
    i32 => layout::INT32_WIDTH,
    i64 => layout::INT64_WIDTH,
    f32 => layout::FLOAT32_WIDTH,
    f64 => layout::FLOAT64_WIDTH,
}

impl LittleEndian for bool {
    const WIDTH: usize = layout::BOOL_WIDTH;

    fn from_le_slice(bytes: &[u8]) -> Self {
        bytes.iter().any(|b| *b != 0)
    }
}

/// Cursor over one output's raw payload.
pub struct TensorReader<'a> {
    payload: &'a [u8],
    cursor: usize,
}

impl<'a> TensorReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload, cursor: 0 }
    }

    pub fn position(&self) -> usize {
        self.cursor
    }

    pub fn remaining(&self) -> usize {
        self.payload.len() - self.cursor
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Require `len` more bytes past the cursor.
    pub fn require_len(&self, len: usize) -> Result<(), ReadError> {
        let needed = self.cursor.checked_add(len).ok_or(ReadError::Truncated {
            needed: usize::MAX,
            actual: self.payload.len(),
        })?;
        if self.payload.len() < needed {
            return Err(ReadError::Truncated {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    /// Number of whole `width`-byte elements in the payload.
    ///
    /// A remainder means the payload was cut mid-element.
    pub fn element_count(&self, width: usize) -> Result<usize, ReadError> {
        let actual = self.payload.len();
        if actual % width != 0 {
            return Err(ReadError::Misaligned { width, actual });
        }
        Ok(actual / width)
    }

    pub fn read_slice(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        self.require_len(len)?;
        let end = self.cursor + len;
        let bytes = self
            .payload
            .get(self.cursor..end)
            .ok_or(ReadError::Truncated {
                needed: end,
                actual: self.payload.len(),
            })?;
        self.cursor = end;
        Ok(bytes)
    }

    pub fn read_le<T: LittleEndian>(&mut self) -> Result<T, ReadError> {
        let bytes = self.read_slice(T::WIDTH)?;
        Ok(T::from_le_slice(bytes))
    }

    /// Read one `u32 LE length + UTF-8 bytes` element.
    ///
    /// `index` is only used to label a UTF-8 failure.
    pub fn read_string(&mut self, index: usize) -> Result<String, ReadError> {
        let len = self.read_le::<u32>()? as usize;
        let offset = self.cursor;
        let bytes = self.read_slice(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ReadError::InvalidUtf8 { index, offset })
    }
}

#[cfg(test)]
mod tests {
    use super::TensorReader;
    use crate::tensor::error::ReadError;

    #[test]
    fn read_le_advances_cursor() {
        let payload = [0x01, 0x00, 0x00, 0x00, 0xff, 0xff];
        let mut reader = TensorReader::new(&payload);
        assert_eq!(reader.read_le::<i32>().unwrap(), 1);
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.read_le::<i16>().unwrap(), -1);
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn read_le_short_payload() {
        let payload = [0x01, 0x00, 0x00];
        let mut reader = TensorReader::new(&payload);
        let err = reader.read_le::<u32>().unwrap_err();
        assert_eq!(err, ReadError::Truncated { needed: 4, actual: 3 });
    }

    #[test]
    fn read_bool_nonzero_is_true() {
        let payload = [0x00, 0x01, 0x7f];
        let mut reader = TensorReader::new(&payload);
        assert!(!reader.read_le::<bool>().unwrap());
        assert!(reader.read_le::<bool>().unwrap());
        assert!(reader.read_le::<bool>().unwrap());
    }

    #[test]
    fn element_count_rejects_remainder() {
        let payload = [0u8; 10];
        let reader = TensorReader::new(&payload);
        assert_eq!(reader.element_count(2).unwrap(), 5);
        let err = reader.element_count(4).unwrap_err();
        assert_eq!(err, ReadError::Misaligned { width: 4, actual: 10 });
    }

    #[test]
    fn read_string_with_prefix() {
        let payload = [0x02, 0x00, 0x00, 0x00, b'h', b'i', 0x00, 0x00, 0x00, 0x00];
        let mut reader = TensorReader::new(&payload);
        assert_eq!(reader.read_string(0).unwrap(), "hi");
        assert_eq!(reader.read_string(1).unwrap(), "");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn read_string_length_past_end() {
        let payload = [0x05, 0x00, 0x00, 0x00, b'a', b'b'];
        let mut reader = TensorReader::new(&payload);
        let err = reader.read_string(0).unwrap_err();
        assert_eq!(err, ReadError::Truncated { needed: 9, actual: 6 });
    }

    #[test]
    fn read_string_rejects_invalid_utf8() {
        let payload = [0x01, 0x00, 0x00, 0x00, 0xff];
        let mut reader = TensorReader::new(&payload);
        let err = reader.read_string(3).unwrap_err();
        assert_eq!(err, ReadError::InvalidUtf8 { index: 3, offset: 4 });
    }
}
