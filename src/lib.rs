//! Strata Core Storage Engine
//!
//! A columnar, chunk-based, in-memory relational storage core. Tables are
//! horizontally partitioned into chunks of typed column segments; individual
//! chunks can be dictionary-compressed on demand, and the predicate scan
//! operator yields tables of reference segments (logical views) instead of
//! copying data.

pub mod data;
pub mod query;
pub mod storage;
pub mod table;

// Re-export main types
pub use data::{DataType, PosList, RowId, Value};
pub use query::{GetTable, Operator, ScanType, TableScan, TableWrapper};
pub use storage::{Chunk, DictionarySegment, ReferenceSegment, Segment, ValueSegment};
pub use table::{ColumnDefinition, StorageManager, Table};

/// Storage engine error type
#[derive(Debug, thiserror::Error)]
pub enum StrataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("index {index} is out of bounds (length {len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("table already exists: {0}")]
    TableExists(String),

    #[error("column not found: {0}")]
    ColumnNotFound(String),

    #[error("column already exists: {0}")]
    ColumnExists(String),

    #[error("unknown data type: {0}")]
    UnknownType(String),

    #[error("cannot cast {value} to {target}")]
    TypeMismatch { value: String, target: DataType },

    #[error("cannot add a column to a table that already has rows")]
    SchemaFrozen,

    #[error("cannot append a null value to a non-nullable segment")]
    NullInNonNullable,

    #[error("value is null")]
    NullValueAccess,

    #[error("segment was already added to the chunk")]
    DuplicateSegment,

    #[error("cannot append to a dictionary or reference segment")]
    FrozenSegment,

    #[error("segment type is not supported here")]
    UnsupportedSegment,

    #[error("reference segment points at another reference segment")]
    RecursiveReference,

    #[error("value id {value_id} does not fit an attribute vector of {width} byte(s)")]
    AttributeWidthOverflow { value_id: u32, width: u8 },
}

pub type Result<T> = std::result::Result<T, StrataError>;
