//! Semantic identifier newtypes
//!
//! Chunk, column, offset, and value ids are distinct integer types so that a
//! chunk offset can never be handed to a dictionary lookup by accident.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a chunk within a table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkId(pub u32);

/// Index of a column within a table or chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnId(pub u16);

/// Row position within a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkOffset(pub u32);

/// Index into a dictionary segment's dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValueId(pub u32);

/// Number of columns in a table or chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ColumnCount(pub u16);

/// Sentinel for "no such chunk".
pub const INVALID_CHUNK_ID: ChunkId = ChunkId(u32::MAX);

/// Sentinel for "no such row within a chunk".
pub const INVALID_CHUNK_OFFSET: ChunkOffset = ChunkOffset(u32::MAX);

/// Sentinel for "no such dictionary entry".
pub const INVALID_VALUE_ID: ValueId = ValueId(u32::MAX);

impl ChunkId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl ColumnId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl ChunkOffset {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl ValueId {
    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ChunkOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ColumnCount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Position of a single row: which chunk, and which offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RowId {
    pub chunk_id: ChunkId,
    pub chunk_offset: ChunkOffset,
}

/// Row id that resolves to a null value instead of a stored row.
pub const NULL_ROW_ID: RowId = RowId {
    chunk_id: INVALID_CHUNK_ID,
    chunk_offset: INVALID_CHUNK_OFFSET,
};

impl RowId {
    pub fn new(chunk_id: ChunkId, chunk_offset: ChunkOffset) -> Self {
        Self {
            chunk_id,
            chunk_offset,
        }
    }

    /// An invalid chunk offset marks the row id as null regardless of the
    /// chunk id, so partially-invalid ids resolve to null as well.
    pub fn is_null(&self) -> bool {
        self.chunk_offset == INVALID_CHUNK_OFFSET
    }
}

/// Ordered list of row positions defining the rows of a result table.
///
/// All reference segments of one result chunk share a single position list
/// behind an `Arc`, so one offset identifies a full row across columns.
pub type PosList = Vec<RowId>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_id_null_detection() {
        assert!(NULL_ROW_ID.is_null());
        assert!(RowId::new(ChunkId(0), INVALID_CHUNK_OFFSET).is_null());
        assert!(!RowId::new(ChunkId(0), ChunkOffset(0)).is_null());
    }

    #[test]
    fn test_row_id_ordering_is_lexicographic() {
        let a = RowId::new(ChunkId(0), ChunkOffset(5));
        let b = RowId::new(ChunkId(1), ChunkOffset(0));
        let c = RowId::new(ChunkId(1), ChunkOffset(3));
        assert!(a < b);
        assert!(b < c);
    }

    #[test]
    fn test_invalid_value_id_is_maximum() {
        assert!(ValueId(0) < INVALID_VALUE_ID);
        assert!(ValueId(u32::MAX - 1) < INVALID_VALUE_ID);
    }
}
