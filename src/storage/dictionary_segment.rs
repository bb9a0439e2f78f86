//! Dictionary-compressed column segment

use crate::data::{ChunkOffset, SegmentValue, Value, ValueId, INVALID_VALUE_ID};
use crate::storage::{FixedWidthAttributeVector, ValueSegment};
use crate::{Result, StrataError};
use std::cmp::Ordering;
use std::mem;

/// Sorted dictionary of distinct non-null values plus a narrow attribute
/// vector mapping every row to its dictionary entry.
///
/// The null id is `dictionary.len()` — one past the last valid id. It spends
/// no dictionary slot, keeps `dictionary[id]` a direct index for every
/// non-null id, and is the largest id the attribute vector must fit.
#[derive(Debug, Clone)]
pub struct DictionarySegment<T: SegmentValue> {
    dictionary: Vec<T>,
    attribute_vector: FixedWidthAttributeVector,
}

impl<T: SegmentValue> DictionarySegment<T> {
    /// Compress a value segment. The input's insertion order is irrelevant;
    /// nulls map to the null id.
    pub fn new(segment: &ValueSegment<T>) -> Result<Self> {
        let mut dictionary: Vec<T> = Vec::new();
        for (index, value) in segment.values().iter().enumerate() {
            if !segment.is_null(ChunkOffset(index as u32))? {
                dictionary.push(value.clone());
            }
        }
        dictionary.sort_by(|a, b| a.compare(b));
        dictionary.dedup_by(|a, b| a.compare(b) == Ordering::Equal);

        let null_value_id = ValueId(dictionary.len() as u32);
        let mut value_ids = Vec::with_capacity(segment.len());
        for index in 0..segment.len() {
            let offset = ChunkOffset(index as u32);
            let value_id = match segment.get_typed_value(offset)? {
                None => null_value_id,
                Some(value) => {
                    // The value was inserted above, so the search cannot miss.
                    let position = dictionary
                        .binary_search_by(|entry| entry.compare(&value))
                        .unwrap_or_else(|insertion| insertion);
                    ValueId(position as u32)
                }
            };
            value_ids.push(value_id);
        }

        let attribute_vector = FixedWidthAttributeVector::from_value_ids(&value_ids, null_value_id)?;
        Ok(Self {
            dictionary,
            attribute_vector,
        })
    }

    /// The id all null rows map to: one past the last dictionary entry.
    pub fn null_value_id(&self) -> ValueId {
        ValueId(self.dictionary.len() as u32)
    }

    /// First id whose value is not less than `value`, or
    /// [`INVALID_VALUE_ID`] when `value` is greater than every entry.
    pub fn lower_bound(&self, value: &T) -> ValueId {
        let position = self
            .dictionary
            .partition_point(|entry| entry.compare(value) == Ordering::Less);
        if position == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            ValueId(position as u32)
        }
    }

    /// First id whose value is greater than `value`, or
    /// [`INVALID_VALUE_ID`] when no such entry exists.
    pub fn upper_bound(&self, value: &T) -> ValueId {
        let position = self
            .dictionary
            .partition_point(|entry| entry.compare(value) != Ordering::Greater);
        if position == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            ValueId(position as u32)
        }
    }

    /// Dictionary entry behind a non-null value id.
    pub fn value_of_value_id(&self, value_id: ValueId) -> &T {
        debug_assert!(
            value_id != self.null_value_id(),
            "value id {value_id} is reserved for null rows"
        );
        debug_assert!(
            value_id.as_usize() < self.dictionary.len(),
            "value id {value_id} is out of range"
        );
        &self.dictionary[value_id.as_usize()]
    }

    /// Tagged value at `chunk_offset`; null rows yield [`Value::Null`].
    pub fn at(&self, chunk_offset: ChunkOffset) -> Result<Value> {
        Ok(match self.get_typed_value(chunk_offset)? {
            Some(value) => value.to_value(),
            None => Value::Null,
        })
    }

    /// Typed value at `chunk_offset`, failing when the row is null.
    pub fn get(&self, chunk_offset: ChunkOffset) -> Result<T> {
        self.get_typed_value(chunk_offset)?
            .ok_or(StrataError::NullValueAccess)
    }

    /// Typed value at `chunk_offset`, `None` for null rows.
    pub fn get_typed_value(&self, chunk_offset: ChunkOffset) -> Result<Option<T>> {
        let value_id = self.attribute_vector.get(chunk_offset.as_usize())?;
        if value_id == self.null_value_id() {
            return Ok(None);
        }
        Ok(Some(self.value_of_value_id(value_id).clone()))
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &FixedWidthAttributeVector {
        &self.attribute_vector
    }

    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn len(&self) -> usize {
        self.attribute_vector.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attribute_vector.is_empty()
    }

    pub fn memory_estimate(&self) -> usize {
        self.dictionary.capacity() * mem::size_of::<T>()
            + self.attribute_vector.width() as usize * self.attribute_vector.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int_segment(values: &[i32]) -> ValueSegment<i32> {
        let mut segment = ValueSegment::new(false);
        for value in values {
            segment.append(&Value::Int(*value)).unwrap();
        }
        segment
    }

    #[test]
    fn test_compress_string_segment() {
        let mut segment = ValueSegment::<String>::new(true);
        for name in ["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"] {
            segment.append(&Value::from(name)).unwrap();
        }
        segment.append(&Value::Null).unwrap();

        let dict_segment = DictionarySegment::new(&segment).unwrap();

        assert_eq!(dict_segment.len(), 7);
        assert_eq!(dict_segment.unique_values_count(), 4);
        assert_eq!(
            dict_segment.dictionary(),
            &["Alexander", "Bill", "Hasso", "Steve"]
        );

        // Null row maps to the null id and reads back as null.
        assert_eq!(
            dict_segment.attribute_vector().get(6).unwrap(),
            dict_segment.null_value_id()
        );
        assert_eq!(dict_segment.get_typed_value(ChunkOffset(6)).unwrap(), None);
        assert!(matches!(
            dict_segment.get(ChunkOffset(6)),
            Err(StrataError::NullValueAccess)
        ));
        assert_eq!(dict_segment.at(ChunkOffset(6)).unwrap(), Value::Null);
    }

    #[test]
    fn test_compress_float_segment_dedups_signed_zero() {
        let mut segment = ValueSegment::<f32>::new(false);
        for value in [1.0f32, 1.0, 1.0, 3.1415, 4.1, 0.0, -0.0] {
            segment.append(&Value::Float(value)).unwrap();
        }

        let dict_segment = DictionarySegment::new(&segment).unwrap();
        assert_eq!(dict_segment.len(), 7);
        assert_eq!(dict_segment.unique_values_count(), 4);
        assert_eq!(dict_segment.dictionary(), &[0.0, 1.0, 3.1415, 4.1]);
    }

    #[test]
    fn test_round_trip_matches_source_segment() {
        let mut segment = ValueSegment::<i64>::new(true);
        for value in [
            Value::Long(9),
            Value::Null,
            Value::Long(-3),
            Value::Long(9),
            Value::Long(0),
        ] {
            segment.append(&value).unwrap();
        }

        let dict_segment = DictionarySegment::new(&segment).unwrap();
        for index in 0..segment.len() {
            let offset = ChunkOffset(index as u32);
            assert_eq!(
                dict_segment.at(offset).unwrap(),
                segment.at(offset).unwrap()
            );
        }
    }

    #[test]
    fn test_lower_and_upper_bound() {
        let dict_segment = DictionarySegment::new(&int_segment(&[0, 2, 4, 6, 8, 10])).unwrap();

        assert_eq!(dict_segment.lower_bound(&4), ValueId(2));
        assert_eq!(dict_segment.upper_bound(&4), ValueId(3));

        assert_eq!(dict_segment.lower_bound(&5), ValueId(3));
        assert_eq!(dict_segment.upper_bound(&5), ValueId(3));

        assert_eq!(dict_segment.lower_bound(&15), INVALID_VALUE_ID);
        assert_eq!(dict_segment.upper_bound(&15), INVALID_VALUE_ID);
    }

    #[test]
    fn test_compress_empty_segment() {
        let dict_segment = DictionarySegment::new(&ValueSegment::<String>::new(true)).unwrap();
        assert_eq!(dict_segment.len(), 0);
        assert_eq!(dict_segment.unique_values_count(), 0);
        assert_eq!(dict_segment.memory_estimate(), 0);
        assert_eq!(dict_segment.lower_bound(&"x".to_string()), INVALID_VALUE_ID);
        assert_eq!(dict_segment.upper_bound(&"x".to_string()), INVALID_VALUE_ID);
    }

    #[test]
    fn test_all_null_segment_has_empty_dictionary() {
        let mut segment = ValueSegment::<i32>::new(true);
        for _ in 0..4 {
            segment.append(&Value::Null).unwrap();
        }

        let dict_segment = DictionarySegment::new(&segment).unwrap();
        assert_eq!(dict_segment.len(), 4);
        assert_eq!(dict_segment.unique_values_count(), 0);
        assert_eq!(dict_segment.null_value_id(), ValueId(0));
        for index in 0..4 {
            assert_eq!(
                dict_segment.get_typed_value(ChunkOffset(index)).unwrap(),
                None
            );
        }
    }

    #[test]
    fn test_attribute_vector_width_follows_null_id() {
        // 255 distinct values: null id 255 still fits one byte.
        let narrow: Vec<i32> = (0..255).collect();
        let narrow_dict = DictionarySegment::new(&int_segment(&narrow)).unwrap();
        assert_eq!(narrow_dict.attribute_vector().width(), 1);

        // 256 distinct values: null id 256 forces two bytes.
        let medium: Vec<i32> = (0..256).collect();
        let medium_dict = DictionarySegment::new(&int_segment(&medium)).unwrap();
        assert_eq!(medium_dict.attribute_vector().width(), 2);
    }

    #[test]
    fn test_value_of_value_id() {
        let dict_segment = DictionarySegment::new(&int_segment(&[30, 10, 20])).unwrap();
        assert_eq!(*dict_segment.value_of_value_id(ValueId(0)), 10);
        assert_eq!(*dict_segment.value_of_value_id(ValueId(2)), 30);
    }

    #[test]
    fn test_out_of_bounds_access() {
        let dict_segment = DictionarySegment::new(&int_segment(&[1])).unwrap();
        assert!(matches!(
            dict_segment.at(ChunkOffset(1)),
            Err(StrataError::OutOfBounds { .. })
        ));
        assert!(matches!(
            dict_segment.get_typed_value(ChunkOffset(1)),
            Err(StrataError::OutOfBounds { .. })
        ));
        assert!(matches!(
            dict_segment.get(ChunkOffset(1)),
            Err(StrataError::OutOfBounds { .. })
        ));
    }
}
