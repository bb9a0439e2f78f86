//! Reference segment: a logical view onto a base table

use crate::data::{ChunkOffset, ColumnId, PosList, Value};
use crate::storage::{Segment, SegmentDispatch, SharedSegment};
use crate::table::Table;
use crate::{Result, StrataError};
use std::mem;
use std::sync::Arc;

/// A segment that stores no values of its own: every row is a position in a
/// referenced table. The position list is shared across all reference
/// segments of one result chunk.
#[derive(Debug, Clone)]
pub struct ReferenceSegment {
    referenced_table: Arc<Table>,
    referenced_column_id: ColumnId,
    pos_list: Arc<PosList>,
}

impl ReferenceSegment {
    /// The referenced column must hold value or dictionary segments;
    /// reference-of-reference is rejected.
    pub fn new(
        referenced_table: Arc<Table>,
        referenced_column_id: ColumnId,
        pos_list: Arc<PosList>,
    ) -> Self {
        #[cfg(debug_assertions)]
        {
            for chunk_index in 0..referenced_table.chunk_count() {
                let referenced_is_reference = referenced_table
                    .chunk(crate::data::ChunkId(chunk_index as u32))
                    .ok()
                    .and_then(|chunk| chunk.segment(referenced_column_id).ok())
                    .is_some_and(|segment| segment.read().is_reference());
                debug_assert!(
                    !referenced_is_reference,
                    "reference segments must point at value or dictionary segments"
                );
            }
        }
        Self {
            referenced_table,
            referenced_column_id,
            pos_list,
        }
    }

    /// Construct without the constructor validation, to exercise the
    /// recursive-reference failure paths of the accessors.
    #[cfg(test)]
    pub(crate) fn new_unchecked(
        referenced_table: Arc<Table>,
        referenced_column_id: ColumnId,
        pos_list: Arc<PosList>,
    ) -> Self {
        Self {
            referenced_table,
            referenced_column_id,
            pos_list,
        }
    }

    /// Segment and offset behind `chunk_offset`, or `None` for a null row id.
    fn resolve(&self, chunk_offset: ChunkOffset) -> Result<Option<(SharedSegment, ChunkOffset)>> {
        let index = chunk_offset.as_usize();
        if index >= self.pos_list.len() {
            return Err(StrataError::OutOfBounds {
                index,
                len: self.pos_list.len(),
            });
        }
        let row_id = self.pos_list[index];
        if row_id.is_null() {
            return Ok(None);
        }
        let chunk = self.referenced_table.chunk(row_id.chunk_id)?;
        let segment = chunk.segment(self.referenced_column_id)?;
        Ok(Some((segment, row_id.chunk_offset)))
    }

    /// Tagged value of the referenced row; null row ids yield
    /// [`Value::Null`].
    pub fn at(&self, chunk_offset: ChunkOffset) -> Result<Value> {
        match self.resolve(chunk_offset)? {
            None => Ok(Value::Null),
            Some((segment, offset)) => {
                let segment = segment.read();
                if segment.is_reference() {
                    return Err(StrataError::RecursiveReference);
                }
                segment.at(offset)
            }
        }
    }

    /// Typed value of the referenced row, `None` for nulls, dispatching on
    /// the concrete variant of the underlying segment.
    pub fn typed_value_at<T: SegmentDispatch>(
        &self,
        chunk_offset: ChunkOffset,
    ) -> Result<Option<T>> {
        match self.resolve(chunk_offset)? {
            None => Ok(None),
            Some((segment, offset)) => match &*segment.read() {
                Segment::Value(any) => T::as_value_segment(any)
                    .ok_or(StrataError::UnsupportedSegment)?
                    .get_typed_value(offset),
                Segment::Dictionary(any) => T::as_dictionary_segment(any)
                    .ok_or(StrataError::UnsupportedSegment)?
                    .get_typed_value(offset),
                Segment::Reference(_) => Err(StrataError::RecursiveReference),
            },
        }
    }

    pub fn pos_list(&self) -> &Arc<PosList> {
        &self.pos_list
    }

    pub fn referenced_table(&self) -> &Arc<Table> {
        &self.referenced_table
    }

    pub fn referenced_column_id(&self) -> ColumnId {
        self.referenced_column_id
    }

    pub fn len(&self) -> usize {
        self.pos_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pos_list.is_empty()
    }

    /// Only the fixed header counts; the position list is shared with the
    /// sibling segments of the result chunk and must not be double-counted.
    pub fn memory_estimate(&self) -> usize {
        mem::size_of::<Self>()
    }
}
