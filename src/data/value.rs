//! Tagged value model and the closed set of column data types
//!
//! Every cell of a table is one of five concrete types or null. `Value` is
//! the dynamically-tagged representation used at API boundaries (append,
//! segment access, scan predicates); `SegmentValue` is the static side of
//! the same contract, implemented exactly once per concrete type.

use crate::{Result, StrataError};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// Data type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Int,
    Long,
    Float,
    Double,
    String,
}

impl DataType {
    /// Resolve a schema type name. Exactly five names are recognized.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "int" => Ok(DataType::Int),
            "long" => Ok(DataType::Long),
            "float" => Ok(DataType::Float),
            "double" => Ok(DataType::Double),
            "string" => Ok(DataType::String),
            other => Err(StrataError::UnknownType(other.to_string())),
        }
    }

    /// The schema type name, inverse of [`DataType::from_name`].
    pub fn name(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Long => "long",
            DataType::Float => "float",
            DataType::Double => "double",
            DataType::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single dynamically-typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Data type of the contained value, `None` for null.
    pub fn data_type(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Int(_) => Some(DataType::Int),
            Value::Long(_) => Some(DataType::Long),
            Value::Float(_) => Some(DataType::Float),
            Value::Double(_) => Some(DataType::Double),
            Value::String(_) => Some(DataType::String),
        }
    }
}

/// Ordering is defined pairwise for same-type non-null values. Null and
/// mixed-type pairs are unordered; scans cast their search value to the
/// column type before comparing, so those pairs never reach a hot path.
impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::Long(a), Value::Long(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::Double(a), Value::Double(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Int(v) => write!(f, "{v}"),
            Value::Long(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Double(v) => write!(f, "{v}"),
            Value::String(v) => f.write_str(v),
        }
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

fn cast_error(value: &Value, target: DataType) -> StrataError {
    StrataError::TypeMismatch {
        value: value.to_string(),
        target,
    }
}

/// A concrete Rust type storable in a typed segment.
///
/// The implementors are exactly the five column types; `compare` is a total
/// order (floats fall back to `Ordering::Equal` for unordered pairs, which
/// only NaN can produce).
pub trait SegmentValue: Clone + Default + Send + Sync + 'static {
    const DATA_TYPE: DataType;

    /// Convert a tagged value, attempting lexical conversion where the
    /// variant does not match. Fails with `TypeMismatch` on incompatible
    /// types, on null, and on any lossy numeric conversion.
    fn from_value(value: &Value) -> Result<Self>;

    fn to_value(&self) -> Value;

    fn compare(&self, other: &Self) -> Ordering;
}

impl SegmentValue for i32 {
    const DATA_TYPE: DataType = DataType::Int;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Long(v) => i32::try_from(*v).map_err(|_| cast_error(value, Self::DATA_TYPE)),
            // Float-to-int casts saturate; exactness must be checked in f64,
            // which represents every i32 and f32 value exactly.
            Value::Float(v) => {
                let cast = *v as i32;
                if f64::from(cast) == f64::from(*v) {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::Double(v) => {
                let cast = *v as i32;
                if f64::from(cast) == *v {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::String(v) => v.parse().map_err(|_| cast_error(value, Self::DATA_TYPE)),
            Value::Null => Err(cast_error(value, Self::DATA_TYPE)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Int(*self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl SegmentValue for i64 {
    const DATA_TYPE: DataType = DataType::Long;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(v) => Ok(i64::from(*v)),
            Value::Long(v) => Ok(*v),
            Value::Float(v) => {
                let cast = *v as i64;
                if cast as f64 == f64::from(*v) {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::Double(v) => {
                let cast = *v as i64;
                if cast as f64 == *v {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::String(v) => v.parse().map_err(|_| cast_error(value, Self::DATA_TYPE)),
            Value::Null => Err(cast_error(value, Self::DATA_TYPE)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Long(*self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl SegmentValue for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Int(v) => {
                let cast = *v as f32;
                if f64::from(cast) == f64::from(*v) {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::Long(v) => {
                let cast = *v as f32;
                if f64::from(cast) == *v as f64 {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::Float(v) => Ok(*v),
            Value::Double(v) => {
                let cast = *v as f32;
                if f64::from(cast) == *v {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::String(v) => v.parse().map_err(|_| cast_error(value, Self::DATA_TYPE)),
            Value::Null => Err(cast_error(value, Self::DATA_TYPE)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Float(*self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

impl SegmentValue for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            // Every i32 and f32 is exactly representable as f64.
            Value::Int(v) => Ok(f64::from(*v)),
            Value::Long(v) => {
                let cast = *v as f64;
                if cast as i64 == *v {
                    Ok(cast)
                } else {
                    Err(cast_error(value, Self::DATA_TYPE))
                }
            }
            Value::Float(v) => Ok(f64::from(*v)),
            Value::Double(v) => Ok(*v),
            Value::String(v) => v.parse().map_err(|_| cast_error(value, Self::DATA_TYPE)),
            Value::Null => Err(cast_error(value, Self::DATA_TYPE)),
        }
    }

    fn to_value(&self) -> Value {
        Value::Double(*self)
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.partial_cmp(other).unwrap_or(Ordering::Equal)
    }
}

impl SegmentValue for String {
    const DATA_TYPE: DataType = DataType::String;

    fn from_value(value: &Value) -> Result<Self> {
        match value {
            Value::Null => Err(cast_error(value, Self::DATA_TYPE)),
            other => Ok(other.to_string()),
        }
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn compare(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

/// Run a block generically over the concrete type behind a [`DataType`].
///
/// The block sees `$t` as a type alias for the resolved Rust type, which is
/// how runtime type names parametrize the generic segment operations.
macro_rules! with_data_type {
    ($data_type:expr, |$t:ident| $body:expr) => {
        match $data_type {
            $crate::data::DataType::Int => {
                type $t = i32;
                $body
            }
            $crate::data::DataType::Long => {
                type $t = i64;
                $body
            }
            $crate::data::DataType::Float => {
                type $t = f32;
                $body
            }
            $crate::data::DataType::Double => {
                type $t = f64;
                $body
            }
            $crate::data::DataType::String => {
                type $t = ::std::string::String;
                $body
            }
        }
    };
}

pub(crate) use with_data_type;
