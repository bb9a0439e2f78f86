//! Horizontal table partition

use crate::data::{ColumnCount, ColumnId, Value};
use crate::storage::SharedSegment;
use crate::{Result, StrataError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Ordered set of segments sharing one row dimension: segment `i` stores
/// column `i` for every row of the partition.
#[derive(Debug, Default)]
pub struct Chunk {
    segments: RwLock<Vec<SharedSegment>>,
}

impl Chunk {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the next column's segment. The same handle cannot be added
    /// twice.
    pub fn add_segment(&self, segment: SharedSegment) -> Result<()> {
        let mut segments = self.segments.write();
        if segments.iter().any(|existing| Arc::ptr_eq(existing, &segment)) {
            return Err(StrataError::DuplicateSegment);
        }
        segments.push(segment);
        Ok(())
    }

    /// Append one row. Every value is validated against its target segment
    /// before any segment is touched, so a failed append leaves the chunk
    /// unchanged.
    pub fn append(&self, values: &[Value]) -> Result<()> {
        let segments = self.segments.read();
        if values.len() != segments.len() {
            return Err(StrataError::OutOfBounds {
                index: values.len(),
                len: segments.len(),
            });
        }
        for (segment, value) in segments.iter().zip(values) {
            segment.read().check_append(value)?;
        }
        for (segment, value) in segments.iter().zip(values) {
            segment.write().append(value)?;
        }
        Ok(())
    }

    pub fn segment(&self, column_id: ColumnId) -> Result<SharedSegment> {
        let segments = self.segments.read();
        segments
            .get(column_id.as_usize())
            .cloned()
            .ok_or(StrataError::OutOfBounds {
                index: column_id.as_usize(),
                len: segments.len(),
            })
    }

    /// Snapshot of the current segment handles.
    pub(crate) fn segments(&self) -> Vec<SharedSegment> {
        self.segments.read().clone()
    }

    pub fn column_count(&self) -> ColumnCount {
        ColumnCount(self.segments.read().len() as u16)
    }

    /// Row count, taken from the first segment; all segments of a chunk
    /// share one length.
    pub fn len(&self) -> usize {
        let segments = self.segments.read();
        match segments.first() {
            Some(segment) => segment.read().len(),
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ChunkOffset;
    use crate::storage::{shared_segment, Segment, SegmentDispatch, ValueSegment};

    fn int_segment(values: &[i32]) -> SharedSegment {
        let mut segment = ValueSegment::<i32>::new(false);
        for value in values {
            segment.append(&Value::Int(*value)).unwrap();
        }
        shared_segment(Segment::Value(i32::wrap_value_segment(segment)))
    }

    fn string_segment(values: &[&str]) -> SharedSegment {
        let mut segment = ValueSegment::<String>::new(false);
        for value in values {
            segment.append(&Value::from(*value)).unwrap();
        }
        shared_segment(Segment::Value(String::wrap_value_segment(segment)))
    }

    fn nullable_long_segment(values: &[Value]) -> SharedSegment {
        let mut segment = ValueSegment::<i64>::new(true);
        for value in values {
            segment.append(value).unwrap();
        }
        shared_segment(Segment::Value(i64::wrap_value_segment(segment)))
    }

    #[test]
    fn test_add_segment() {
        let chunk = Chunk::new();
        assert_eq!(chunk.len(), 0);
        chunk.add_segment(int_segment(&[4, 6, 3])).unwrap();
        chunk
            .add_segment(string_segment(&["Hello,", "world", "!"]))
            .unwrap();
        assert_eq!(chunk.len(), 3);
        assert_eq!(chunk.column_count(), ColumnCount(2));
    }

    #[test]
    fn test_add_same_segment_twice_fails() {
        let chunk = Chunk::new();
        let segment = int_segment(&[1]);
        chunk.add_segment(segment.clone()).unwrap();
        assert!(matches!(
            chunk.add_segment(segment),
            Err(StrataError::DuplicateSegment)
        ));
    }

    #[test]
    fn test_append_row() {
        let chunk = Chunk::new();
        chunk.add_segment(int_segment(&[4, 6, 3])).unwrap();
        chunk
            .add_segment(string_segment(&["Hello,", "world", "!"]))
            .unwrap();

        chunk.append(&[Value::Int(2), Value::from("two")]).unwrap();
        assert_eq!(chunk.len(), 4);

        let segment = chunk.segment(ColumnId(0)).unwrap();
        assert_eq!(segment.read().at(ChunkOffset(3)).unwrap(), Value::Int(2));
    }

    #[test]
    fn test_append_null_into_nullable_column() {
        let chunk = Chunk::new();
        chunk
            .add_segment(nullable_long_segment(&[
                Value::Long(4),
                Value::Null,
                Value::Long(3),
            ]))
            .unwrap();
        chunk
            .add_segment(string_segment(&["a", "b", "c"]))
            .unwrap();

        chunk.append(&[Value::Null, Value::from("two")]).unwrap();
        assert_eq!(chunk.len(), 4);
    }

    #[test]
    fn test_append_wrong_arity_leaves_chunk_unchanged() {
        let chunk = Chunk::new();
        chunk.add_segment(int_segment(&[4, 6, 3])).unwrap();
        chunk
            .add_segment(string_segment(&["Hello,", "world", "!"]))
            .unwrap();

        assert!(chunk.append(&[]).is_err());
        assert!(chunk
            .append(&[Value::Int(4), Value::from("val"), Value::Int(3)])
            .is_err());
        assert_eq!(chunk.len(), 3);
    }

    #[test]
    fn test_failed_cast_leaves_chunk_unchanged() {
        let chunk = Chunk::new();
        chunk.add_segment(int_segment(&[1])).unwrap();
        chunk.add_segment(int_segment(&[2])).unwrap();

        // The second value cannot be cast; the first column must not grow.
        assert!(matches!(
            chunk.append(&[Value::Int(5), Value::from("not a number")]),
            Err(StrataError::TypeMismatch { .. })
        ));
        assert_eq!(chunk.len(), 1);
    }

    #[test]
    fn test_append_to_dictionary_segment_fails() {
        let mut segment = ValueSegment::<i32>::new(false);
        segment.append(&Value::Int(4)).unwrap();
        let dictionary = i32::wrap_value_segment(segment).to_dictionary().unwrap();

        let chunk = Chunk::new();
        chunk
            .add_segment(shared_segment(Segment::Dictionary(dictionary)))
            .unwrap();
        assert!(matches!(
            chunk.append(&[Value::Int(0)]),
            Err(StrataError::FrozenSegment)
        ));
        assert_eq!(chunk.len(), 1);
    }

    #[test]
    fn test_segment_lookup_bounds() {
        let chunk = Chunk::new();
        chunk.add_segment(int_segment(&[])).unwrap();
        assert!(chunk.segment(ColumnId(0)).is_ok());
        assert!(matches!(
            chunk.segment(ColumnId(1)),
            Err(StrataError::OutOfBounds { index: 1, len: 1 })
        ));
    }

    #[test]
    fn test_append_all_data_types() {
        let chunk = Chunk::new();
        chunk.add_segment(int_segment(&[4, 6, 3])).unwrap();
        chunk
            .add_segment(string_segment(&["Hello,", "world", "!"]))
            .unwrap();
        let mut float_segment = ValueSegment::<f32>::new(false);
        for value in [4.0f32, 6.0, 3.8] {
            float_segment.append(&Value::Float(value)).unwrap();
        }
        chunk
            .add_segment(shared_segment(Segment::Value(f32::wrap_value_segment(
                float_segment,
            ))))
            .unwrap();
        let mut double_segment = ValueSegment::<f64>::new(false);
        for value in [14.4f64, 0.0, 12.8] {
            double_segment.append(&Value::Double(value)).unwrap();
        }
        chunk
            .add_segment(shared_segment(Segment::Value(f64::wrap_value_segment(
                double_segment,
            ))))
            .unwrap();
        chunk
            .add_segment(nullable_long_segment(&[
                Value::Long(4),
                Value::Null,
                Value::Long(3),
            ]))
            .unwrap();
        assert_eq!(chunk.len(), 3);

        chunk
            .append(&[
                Value::Int(4),
                Value::from("4"),
                Value::Float(4.0),
                Value::Double(4.0),
                Value::Long(4),
            ])
            .unwrap();
        assert_eq!(chunk.len(), 4);
    }
}
