use std::fmt;
use std::str::FromStr;

// DType — scalar element types a dataset can carry
//
// A dataset instance holds exactly one scalar type. Market data and sensor
// logs are usually float; counters and timestamps are integers:
//
//   F32  — compact float, what most sequence models consume
//   F64  — full precision float
//   I32  — small signed counters
//   I64  — timestamps, volumes
//   U32  — unsigned ids / counts

/// Enum of all supported element data types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F32,
    F64,
    I32,
    I64,
    U32,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F32 => 4,
            DType::F64 => 8,
            DType::I32 => 4,
            DType::I64 => 8,
            DType::U32 => 4,
        }
    }

    pub fn is_float(&self) -> bool {
        matches!(self, DType::F32 | DType::F64)
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DType::F32 => "f32",
            DType::F64 => "f64",
            DType::I32 => "i32",
            DType::I64 => "i64",
            DType::U32 => "u32",
        };
        write!(f, "{}", s)
    }
}

// WithDType — bridge between Rust scalar types and the DType enum
//
// Readers are generic over `T: WithDType`: `parse` does the per-cell type
// coercion, `to_f64`/`from_f64` let float normalizers run over any element
// type.

/// Trait implemented by Rust types that can be stored in a record.
pub trait WithDType:
    Copy + Send + Sync + 'static + num_traits::NumCast + FromStr + PartialEq + fmt::Debug
{
    /// The corresponding DType enum variant.
    const DTYPE: DType;

    /// Convert this value to f64.
    fn to_f64(self) -> f64;

    /// Create a value of this type from f64 (saturating for integers).
    fn from_f64(v: f64) -> Self;

    /// Parse one delimited cell. Surrounding whitespace is ignored.
    /// Returns `None` when the cell is not a valid value of this type.
    fn parse(cell: &str) -> Option<Self> {
        cell.trim().parse().ok()
    }

    /// The zero value.
    fn zero() -> Self {
        Self::from_f64(0.0)
    }
}

impl WithDType for f32 {
    const DTYPE: DType = DType::F32;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as f32
    }
}

impl WithDType for f64 {
    const DTYPE: DType = DType::F64;
    fn to_f64(self) -> f64 {
        self
    }
    fn from_f64(v: f64) -> Self {
        v
    }
}

impl WithDType for i32 {
    const DTYPE: DType = DType::I32;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i32
    }
}

impl WithDType for i64 {
    const DTYPE: DType = DType::I64;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as i64
    }
}

impl WithDType for u32 {
    const DTYPE: DType = DType::U32;
    fn to_f64(self) -> f64 {
        self as f64
    }
    fn from_f64(v: f64) -> Self {
        v as u32
    }
}
