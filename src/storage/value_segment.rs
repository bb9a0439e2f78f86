//! Uncompressed typed column segment

use crate::data::{ChunkOffset, SegmentValue, Value};
use crate::{Result, StrataError};
use std::mem;

/// Append-only vector of `T` with an optional parallel null-flag vector.
///
/// Null rows still occupy a default `T` slot so that `values()` and
/// `null_values()` stay index-aligned.
#[derive(Debug, Clone, Default)]
pub struct ValueSegment<T: SegmentValue> {
    values: Vec<T>,
    null_values: Vec<bool>,
    nullable: bool,
}

impl<T: SegmentValue> ValueSegment<T> {
    pub fn new(nullable: bool) -> Self {
        Self {
            values: Vec::new(),
            null_values: Vec::new(),
            nullable,
        }
    }

    /// Check whether `value` could be appended, without mutating anything.
    pub(crate) fn check_append(&self, value: &Value) -> Result<()> {
        if value.is_null() {
            if self.nullable {
                Ok(())
            } else {
                Err(StrataError::NullInNonNullable)
            }
        } else {
            T::from_value(value).map(|_| ())
        }
    }

    /// Append a tagged value, casting it to `T` where the variant differs.
    pub fn append(&mut self, value: &Value) -> Result<()> {
        if value.is_null() {
            if !self.nullable {
                return Err(StrataError::NullInNonNullable);
            }
            self.values.push(T::default());
            self.null_values.push(true);
            return Ok(());
        }
        let typed = T::from_value(value)?;
        self.values.push(typed);
        if self.nullable {
            self.null_values.push(false);
        }
        Ok(())
    }

    fn check_bounds(&self, chunk_offset: ChunkOffset) -> Result<usize> {
        let index = chunk_offset.as_usize();
        if index >= self.values.len() {
            return Err(StrataError::OutOfBounds {
                index,
                len: self.values.len(),
            });
        }
        Ok(index)
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
        let index = self.check_bounds(chunk_offset)?;
        if self.nullable && self.null_values[index] {
            return Ok(None);
        }
        Ok(Some(self.values[index].clone()))
    }

    pub fn is_null(&self, chunk_offset: ChunkOffset) -> Result<bool> {
        let index = self.check_bounds(chunk_offset)?;
        Ok(self.nullable && self.null_values[index])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Raw value slots, including the default slots backing null rows.
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Null flags, index-aligned with `values()`; `None` when the segment is
    /// not nullable.
    pub fn null_values(&self) -> Option<&[bool]> {
        if self.nullable {
            Some(&self.null_values)
        } else {
            None
        }
    }

    pub fn memory_estimate(&self) -> usize {
        self.values.len() * mem::size_of::<T>() + self.null_values.len() * mem::size_of::<bool>()
    }
}
