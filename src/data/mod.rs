//! Data model: tagged values, column data types, and identifier newtypes.

mod ids;
mod value;

pub use ids::{
    ChunkId, ChunkOffset, ColumnCount, ColumnId, PosList, RowId, ValueId, INVALID_CHUNK_ID,
    INVALID_CHUNK_OFFSET, INVALID_VALUE_ID, NULL_ROW_ID,
};
pub use value::{DataType, SegmentValue, Value};

pub(crate) use value::with_data_type;
