//! Segment sum type and typed dispatch
//!
//! A segment is the columnar storage of one column within one chunk. The
//! concrete representation is one of three variants — uncompressed values,
//! dictionary-compressed values, or a reference view — with the typed
//! variants fanned out over the five column types. Operators narrow a
//! segment to its concrete form by matching, never by downcasting.

use crate::data::{ChunkOffset, DataType, SegmentValue, Value};
use crate::storage::{DictionarySegment, ReferenceSegment, ValueSegment};
use crate::{Result, StrataError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Shared, lockable handle to a segment. Chunks hand these out; append paths
/// take the write side, scans and reference segments the read side.
pub type SharedSegment = Arc<RwLock<Segment>>;

/// Value segment of any column type.
#[derive(Debug, Clone)]
pub enum AnyValueSegment {
    Int(ValueSegment<i32>),
    Long(ValueSegment<i64>),
    Float(ValueSegment<f32>),
    Double(ValueSegment<f64>),
    String(ValueSegment<String>),
}

/// Dictionary segment of any column type.
#[derive(Debug, Clone)]
pub enum AnyDictionarySegment {
    Int(DictionarySegment<i32>),
    Long(DictionarySegment<i64>),
    Float(DictionarySegment<f32>),
    Double(DictionarySegment<f64>),
    String(DictionarySegment<String>),
}

/// Any segment variant.
#[derive(Debug, Clone)]
pub enum Segment {
    Value(AnyValueSegment),
    Dictionary(AnyDictionarySegment),
    Reference(ReferenceSegment),
}

/// Delegate to the typed segment behind each of the five arms.
macro_rules! for_each_typed_segment {
    ($value:expr, $segment:ident => $body:expr) => {
        match $value {
            Self::Int($segment) => $body,
            Self::Long($segment) => $body,
            Self::Float($segment) => $body,
            Self::Double($segment) => $body,
            Self::String($segment) => $body,
        }
    };
}

impl AnyValueSegment {
    pub fn len(&self) -> usize {
        for_each_typed_segment!(self, segment => segment.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn at(&self, chunk_offset: ChunkOffset) -> Result<Value> {
        for_each_typed_segment!(self, segment => segment.at(chunk_offset))
    }

    pub fn is_null(&self, chunk_offset: ChunkOffset) -> Result<bool> {
        for_each_typed_segment!(self, segment => segment.is_null(chunk_offset))
    }

    pub fn is_nullable(&self) -> bool {
        for_each_typed_segment!(self, segment => segment.is_nullable())
    }

    pub fn memory_estimate(&self) -> usize {
        for_each_typed_segment!(self, segment => segment.memory_estimate())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
        }
    }

    pub(crate) fn check_append(&self, value: &Value) -> Result<()> {
        for_each_typed_segment!(self, segment => segment.check_append(value))
    }

    pub(crate) fn append(&mut self, value: &Value) -> Result<()> {
        for_each_typed_segment!(self, segment => segment.append(value))
    }

    /// Build the dictionary-compressed form of this segment.
    pub fn to_dictionary(&self) -> Result<AnyDictionarySegment> {
        Ok(match self {
            Self::Int(segment) => AnyDictionarySegment::Int(DictionarySegment::new(segment)?),
            Self::Long(segment) => AnyDictionarySegment::Long(DictionarySegment::new(segment)?),
            Self::Float(segment) => AnyDictionarySegment::Float(DictionarySegment::new(segment)?),
            Self::Double(segment) => AnyDictionarySegment::Double(DictionarySegment::new(segment)?),
            Self::String(segment) => AnyDictionarySegment::String(DictionarySegment::new(segment)?),
        })
    }
}

impl AnyDictionarySegment {
    pub fn len(&self) -> usize {
        for_each_typed_segment!(self, segment => segment.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn at(&self, chunk_offset: ChunkOffset) -> Result<Value> {
        for_each_typed_segment!(self, segment => segment.at(chunk_offset))
    }

    pub fn memory_estimate(&self) -> usize {
        for_each_typed_segment!(self, segment => segment.memory_estimate())
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Long(_) => DataType::Long,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
        }
    }

    pub fn unique_values_count(&self) -> usize {
        for_each_typed_segment!(self, segment => segment.unique_values_count())
    }
}

impl Segment {
    pub fn len(&self) -> usize {
        match self {
            Segment::Value(segment) => segment.len(),
            Segment::Dictionary(segment) => segment.len(),
            Segment::Reference(segment) => segment.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Tagged value at `chunk_offset`; null rows yield [`Value::Null`].
    pub fn at(&self, chunk_offset: ChunkOffset) -> Result<Value> {
        match self {
            Segment::Value(segment) => segment.at(chunk_offset),
            Segment::Dictionary(segment) => segment.at(chunk_offset),
            Segment::Reference(segment) => segment.at(chunk_offset),
        }
    }

    pub fn memory_estimate(&self) -> usize {
        match self {
            Segment::Value(segment) => segment.memory_estimate(),
            Segment::Dictionary(segment) => segment.memory_estimate(),
            Segment::Reference(segment) => segment.memory_estimate(),
        }
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Segment::Reference(_))
    }

    pub(crate) fn check_append(&self, value: &Value) -> Result<()> {
        match self {
            Segment::Value(segment) => segment.check_append(value),
            _ => Err(StrataError::FrozenSegment),
        }
    }

    pub(crate) fn append(&mut self, value: &Value) -> Result<()> {
        match self {
            Segment::Value(segment) => segment.append(value),
            _ => Err(StrataError::FrozenSegment),
        }
    }
}

/// Construct a shared segment handle.
pub fn shared_segment(segment: Segment) -> SharedSegment {
    Arc::new(RwLock::new(segment))
}

/// Static narrowing between the typed segment structs and the `Any*` sums.
///
/// Implemented exactly once per column type; a mismatch between a column's
/// declared type and a segment's concrete arm surfaces as `None`, which the
/// scan turns into `UnsupportedSegment`.
pub trait SegmentDispatch: SegmentValue {
    fn as_value_segment(segment: &AnyValueSegment) -> Option<&ValueSegment<Self>>;
    fn as_dictionary_segment(segment: &AnyDictionarySegment) -> Option<&DictionarySegment<Self>>;
    fn wrap_value_segment(segment: ValueSegment<Self>) -> AnyValueSegment;
    fn wrap_dictionary_segment(segment: DictionarySegment<Self>) -> AnyDictionarySegment;
}

macro_rules! impl_segment_dispatch {
    ($($variant:ident => $ty:ty),* $(,)?) => {$(
        impl SegmentDispatch for $ty {
            fn as_value_segment(segment: &AnyValueSegment) -> Option<&ValueSegment<Self>> {
                match segment {
                    AnyValueSegment::$variant(segment) => Some(segment),
                    _ => None,
                }
            }

            fn as_dictionary_segment(
                segment: &AnyDictionarySegment,
            ) -> Option<&DictionarySegment<Self>> {
                match segment {
                    AnyDictionarySegment::$variant(segment) => Some(segment),
                    _ => None,
                }
            }

            fn wrap_value_segment(segment: ValueSegment<Self>) -> AnyValueSegment {
                AnyValueSegment::$variant(segment)
            }

            fn wrap_dictionary_segment(segment: DictionarySegment<Self>) -> AnyDictionarySegment {
                AnyDictionarySegment::$variant(segment)
            }
        }
    )*};
}

impl_segment_dispatch!(
    Int => i32,
    Long => i64,
    Float => f32,
    Double => f64,
    String => String,
);

#[cfg(test)]
mod tests {
    use super::*;

    fn int_value_segment(values: &[i32]) -> AnyValueSegment {
        let mut segment = ValueSegment::<i32>::new(false);
        for value in values {
            segment.append(&Value::Int(*value)).unwrap();
        }
        i32::wrap_value_segment(segment)
    }

    #[test]
    fn test_value_segment_protocol() {
        let segment = Segment::Value(int_value_segment(&[7, 8]));
        assert_eq!(segment.len(), 2);
        assert_eq!(segment.at(ChunkOffset(1)).unwrap(), Value::Int(8));
        assert!(!segment.is_reference());
    }

    #[test]
    fn test_append_through_segment() {
        let mut segment = Segment::Value(int_value_segment(&[]));
        segment.check_append(&Value::Int(1)).unwrap();
        segment.append(&Value::Int(1)).unwrap();
        assert_eq!(segment.len(), 1);
    }

    #[test]
    fn test_dictionary_segment_is_frozen() {
        let dictionary = int_value_segment(&[1, 2]).to_dictionary().unwrap();
        let mut segment = Segment::Dictionary(dictionary);
        assert!(matches!(
            segment.check_append(&Value::Int(3)),
            Err(StrataError::FrozenSegment)
        ));
        assert!(matches!(
            segment.append(&Value::Int(3)),
            Err(StrataError::FrozenSegment)
        ));
        assert_eq!(segment.len(), 2);
    }

    #[test]
    fn test_dispatch_narrowing() {
        let any = int_value_segment(&[1]);
        assert!(i32::as_value_segment(&any).is_some());
        assert!(i64::as_value_segment(&any).is_none());
        assert_eq!(any.data_type(), DataType::Int);
    }

    #[test]
    fn test_dictionary_round_trip_through_sum() {
        let any = int_value_segment(&[5, 5, 3]);
        let dictionary = any.to_dictionary().unwrap();
        assert_eq!(dictionary.unique_values_count(), 2);
        for index in 0..3 {
            let offset = ChunkOffset(index);
            assert_eq!(dictionary.at(offset).unwrap(), any.at(offset).unwrap());
        }
    }
}
