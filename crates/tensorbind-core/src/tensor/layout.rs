pub const BOOL_WIDTH: usize = 1;
pub const INT8_WIDTH: usize = 1;
pub const INT16_WIDTH: usize = 2;
pub const INT32_WIDTH: usize = 4;
pub const INT64_WIDTH: usize = 8;
pub const FLOAT32_WIDTH: usize = 4;
pub const FLOAT64_WIDTH: usize = 8;

/// Length prefix in front of every encoded string element (u32, little-endian).
pub const STRING_LENGTH_PREFIX: usize = 4;

/// Shape rank of a single value; the one dimension is ignored.
pub const SCALAR_RANK: usize = 1;
/// Shape rank of both array strategies (`[batch, len]` and `[rows, cols]`).
pub const ARRAY_RANK: usize = 2;
/// Leading dimension that selects the one-dimensional strategy.
pub const SINGLE_BATCH: i64 = 1;
/// Largest outer dimension a `Vec<Vec<T>>` can hold. A zero-column shape
/// carries no payload, so this is the only bound on its row count.
pub const MAX_ROWS: usize = isize::MAX as usize / std::mem::size_of::<Vec<u8>>();
