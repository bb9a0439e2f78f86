//! Table: schema plus an ordered list of chunks

use crate::data::{
    with_data_type, ChunkId, ChunkOffset, ColumnCount, ColumnId, DataType, SegmentValue, Value,
};
use crate::storage::{shared_segment, Chunk, Segment, SegmentDispatch, SharedSegment, ValueSegment};
use crate::{Result, StrataError};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Name, type, and nullability of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
}

/// Below this row count a chunk is compressed serially; the rayon fan-out
/// across columns only pays off for larger chunks.
const PARALLEL_COMPRESS_MIN_ROWS: usize = 10_000;

/// A table stores rows as horizontally partitioned chunks of column
/// segments. Rows are appended into the most recent chunk; a new chunk is
/// created lazily once the active one has reached the target size.
///
/// Tables are shared behind `Arc` (catalog, operator outputs, reference
/// segments). Interior locks guard the schema and the chunk list; callers
/// must not mutate a table while another operator scans it.
#[derive(Debug)]
pub struct Table {
    columns: RwLock<Vec<ColumnDefinition>>,
    chunks: RwLock<Vec<Arc<Chunk>>>,
    target_chunk_size: ChunkOffset,
}

impl Default for Table {
    fn default() -> Self {
        Self::new(ChunkOffset(0))
    }
}

impl Table {
    /// A target chunk size of 0 disables splitting: the single initial
    /// chunk grows without bound.
    pub fn new(target_chunk_size: ChunkOffset) -> Self {
        Self {
            columns: RwLock::new(Vec::new()),
            chunks: RwLock::new(vec![Arc::new(Chunk::new())]),
            target_chunk_size,
        }
    }

    /// Register a column without materializing a segment. Only valid before
    /// the first row; column names are unique.
    pub fn add_column_definition(&self, name: &str, type_name: &str, nullable: bool) -> Result<()> {
        let data_type = DataType::from_name(type_name)?;
        if self.row_count() > 0 {
            return Err(StrataError::SchemaFrozen);
        }
        let mut columns = self.columns.write();
        if columns.iter().any(|column| column.name == name) {
            return Err(StrataError::ColumnExists(name.to_string()));
        }
        columns.push(ColumnDefinition {
            name: name.to_string(),
            data_type,
            nullable,
        });
        Ok(())
    }

    /// Register a column and materialize its empty value segment in the
    /// existing (necessarily empty) chunks.
    pub fn add_column(&self, name: &str, type_name: &str, nullable: bool) -> Result<()> {
        self.add_column_definition(name, type_name, nullable)?;
        let data_type = DataType::from_name(type_name)?;
        let chunks = self.chunks.read();
        for chunk in chunks.iter() {
            chunk.add_segment(empty_value_segment(data_type, nullable))?;
        }
        Ok(())
    }

    /// Append one row. When the active chunk is full, a fresh chunk
    /// mirroring the schema is created first.
    pub fn append(&self, values: &[Value]) -> Result<()> {
        let columns = self.columns.read().clone();
        if values.len() != columns.len() {
            return Err(StrataError::OutOfBounds {
                index: values.len(),
                len: columns.len(),
            });
        }
        // Validate against the schema up front: a row that cannot land must
        // not leave a freshly created chunk behind.
        for (column, value) in columns.iter().zip(values) {
            if value.is_null() {
                if !column.nullable {
                    return Err(StrataError::NullInNonNullable);
                }
            } else {
                with_data_type!(column.data_type, |T| T::from_value(value).map(|_| ()))?;
            }
        }

        let mut chunks = self.chunks.write();
        let target = self.target_chunk_size.as_usize();
        let active_is_full =
            target > 0 && chunks.last().map_or(true, |chunk| chunk.len() >= target);
        if active_is_full {
            chunks.push(build_chunk(&columns)?);
        }
        let chunk = chunks.last().cloned().ok_or(StrataError::OutOfBounds {
            index: 0,
            len: 0,
        })?;
        chunk.append(values)
    }

    /// Replace the chunk's value segments with dictionary segments.
    ///
    /// A fresh empty chunk is appended before compression starts, so
    /// subsequent appends land in a chunk that is never compressed
    /// concurrently. Readers holding the old chunk keep a consistent view
    /// until their handles drop.
    pub fn compress_chunk(&self, chunk_id: ChunkId) -> Result<()> {
        let segments = {
            let chunks = self.chunks.read();
            let chunk = chunks
                .get(chunk_id.as_usize())
                .ok_or(StrataError::OutOfBounds {
                    index: chunk_id.as_usize(),
                    len: chunks.len(),
                })?;
            chunk.segments()
        };
        // Validate before touching the chunk list: a failed compression
        // leaves the table unchanged.
        for segment in &segments {
            if !matches!(&*segment.read(), Segment::Value(_)) {
                return Err(StrataError::FrozenSegment);
            }
        }

        {
            let columns = self.columns.read().clone();
            let mut chunks = self.chunks.write();
            chunks.push(build_chunk(&columns)?);
        }

        let row_count = segments.first().map_or(0, |segment| segment.read().len());
        let build = |segment: &SharedSegment| -> Result<SharedSegment> {
            match &*segment.read() {
                Segment::Value(any) => {
                    let dictionary = any.to_dictionary()?;
                    log::trace!(
                        "column compressed to {} distinct value(s)",
                        dictionary.unique_values_count()
                    );
                    Ok(shared_segment(Segment::Dictionary(dictionary)))
                }
                _ => Err(StrataError::FrozenSegment),
            }
        };
        let compressed: Vec<SharedSegment> = if row_count >= PARALLEL_COMPRESS_MIN_ROWS {
            segments.par_iter().map(build).collect::<Result<_>>()?
        } else {
            segments.iter().map(build).collect::<Result<_>>()?
        };

        let new_chunk = Chunk::new();
        for segment in compressed {
            new_chunk.add_segment(segment)?;
        }
        self.chunks.write()[chunk_id.as_usize()] = Arc::new(new_chunk);
        log::debug!("chunk {chunk_id} compressed ({row_count} rows)");
        Ok(())
    }

    pub fn row_count(&self) -> usize {
        self.chunks.read().iter().map(|chunk| chunk.len()).sum()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn chunk(&self, chunk_id: ChunkId) -> Result<Arc<Chunk>> {
        let chunks = self.chunks.read();
        chunks
            .get(chunk_id.as_usize())
            .cloned()
            .ok_or(StrataError::OutOfBounds {
                index: chunk_id.as_usize(),
                len: chunks.len(),
            })
    }

    pub fn column_count(&self) -> ColumnCount {
        ColumnCount(self.columns.read().len() as u16)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns
            .read()
            .iter()
            .map(|column| column.name.clone())
            .collect()
    }

    pub fn column_definitions(&self) -> Vec<ColumnDefinition> {
        self.columns.read().clone()
    }

    fn column(&self, column_id: ColumnId) -> Result<ColumnDefinition> {
        let columns = self.columns.read();
        columns
            .get(column_id.as_usize())
            .cloned()
            .ok_or(StrataError::OutOfBounds {
                index: column_id.as_usize(),
                len: columns.len(),
            })
    }

    pub fn column_name(&self, column_id: ColumnId) -> Result<String> {
        Ok(self.column(column_id)?.name)
    }

    pub fn column_type(&self, column_id: ColumnId) -> Result<DataType> {
        Ok(self.column(column_id)?.data_type)
    }

    pub fn column_nullable(&self, column_id: ColumnId) -> Result<bool> {
        Ok(self.column(column_id)?.nullable)
    }

    pub fn column_id_by_name(&self, name: &str) -> Result<ColumnId> {
        self.columns
            .read()
            .iter()
            .position(|column| column.name == name)
            .map(|index| ColumnId(index as u16))
            .ok_or_else(|| StrataError::ColumnNotFound(name.to_string()))
    }

    pub fn target_chunk_size(&self) -> ChunkOffset {
        self.target_chunk_size
    }
}

fn empty_value_segment(data_type: DataType, nullable: bool) -> SharedSegment {
    with_data_type!(data_type, |T| shared_segment(Segment::Value(
        T::wrap_value_segment(ValueSegment::<T>::new(nullable))
    )))
}

fn build_chunk(columns: &[ColumnDefinition]) -> Result<Arc<Chunk>> {
    let chunk = Chunk::new();
    for column in columns {
        chunk.add_segment(empty_value_segment(column.data_type, column.nullable))?;
    }
    Ok(Arc::new(chunk))
}
