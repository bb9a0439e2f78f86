//! Predicate table scan
//!
//! Scans one column of the input operator's table and produces a table of
//! reference segments over a single shared position list. The scan strategy
//! is picked per segment variant: value segments compare typed values,
//! dictionary segments are pruned on the attribute vector alone using
//! binary-search bounds, and reference segments are traversed through to the
//! base table so the output never nests references.

use crate::data::{
    with_data_type, ChunkId, ChunkOffset, ColumnId, PosList, RowId, SegmentValue, Value,
};
use crate::query::{Operator, OperatorResult};
use crate::storage::{
    shared_segment, DictionarySegment, ReferenceSegment, Segment, SegmentDispatch, ValueSegment,
};
use crate::table::Table;
use crate::{Result, StrataError};
use std::cmp::Ordering;
use std::sync::Arc;

/// The six relational comparisons a scan supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScanType {
    Equals,
    NotEquals,
    LessThan,
    LessThanEquals,
    GreaterThan,
    GreaterThanEquals,
}

/// Checks typed values against one search value and scan type.
struct Selector<'a, T> {
    scan_type: ScanType,
    search_value: &'a T,
}

impl<T: SegmentValue> Selector<'_, T> {
    fn selects(&self, other: &T) -> bool {
        let ordering = other.compare(self.search_value);
        match self.scan_type {
            ScanType::Equals => ordering == Ordering::Equal,
            ScanType::NotEquals => ordering != Ordering::Equal,
            ScanType::LessThan => ordering == Ordering::Less,
            ScanType::LessThanEquals => ordering != Ordering::Greater,
            ScanType::GreaterThan => ordering == Ordering::Greater,
            ScanType::GreaterThanEquals => ordering != Ordering::Less,
        }
    }
}

/// Scan operator: filters the input table on `column <op> search_value`.
///
/// The output mirrors the input schema and holds one chunk of reference
/// segments, all sharing one position list. A null search value admits rows
/// only under `NotEquals` (the non-null rows); a null cell never satisfies
/// any comparison.
pub struct TableScan {
    input: Arc<dyn Operator>,
    column_id: ColumnId,
    scan_type: ScanType,
    search_value: Value,
    result: OperatorResult,
}

impl TableScan {
    pub fn new(
        input: Arc<dyn Operator>,
        column_id: ColumnId,
        scan_type: ScanType,
        search_value: Value,
    ) -> Self {
        Self {
            input,
            column_id,
            scan_type,
            search_value,
            result: OperatorResult::new(),
        }
    }

    pub fn column_id(&self) -> ColumnId {
        self.column_id
    }

    pub fn scan_type(&self) -> ScanType {
        self.scan_type
    }

    pub fn search_value(&self) -> &Value {
        &self.search_value
    }

    fn left_input_table(&self) -> Result<Arc<Table>> {
        self.input.execute()
    }

    fn on_execute(&self) -> Result<Arc<Table>> {
        let input_table = self.left_input_table()?;

        let output = Table::default();
        for column in input_table.column_definitions() {
            output.add_column_definition(&column.name, column.data_type.name(), column.nullable)?;
        }

        let mut pos_list = PosList::new();
        let data_type = input_table.column_type(self.column_id)?;
        with_data_type!(data_type, |T| self
            .scan_table::<T>(&input_table, &mut pos_list))?;
        log::debug!(
            "table scan admitted {} of {} row(s)",
            pos_list.len(),
            input_table.row_count()
        );
        let pos_list = Arc::new(pos_list);

        let output_chunk = output.chunk(ChunkId(0))?;
        let input_chunk = input_table.chunk(ChunkId(0))?;
        for index in 0..input_table.column_count().0 {
            let column_id = ColumnId(index);
            // A scan over a view must not stack views: when the input column
            // is itself a reference segment, point the output at its base
            // table instead.
            let (referenced_table, referenced_column_id) = match input_chunk.segment(column_id) {
                Ok(segment) => match &*segment.read() {
                    Segment::Reference(reference) => (
                        reference.referenced_table().clone(),
                        reference.referenced_column_id(),
                    ),
                    _ => (input_table.clone(), column_id),
                },
                Err(_) => (input_table.clone(), column_id),
            };
            output_chunk.add_segment(shared_segment(Segment::Reference(ReferenceSegment::new(
                referenced_table,
                referenced_column_id,
                pos_list.clone(),
            ))))?;
        }
        Ok(Arc::new(output))
    }

    fn scan_table<T: SegmentDispatch>(
        &self,
        table: &Arc<Table>,
        pos_list: &mut PosList,
    ) -> Result<()> {
        let search_value = if self.search_value.is_null() {
            None
        } else {
            Some(T::from_value(&self.search_value)?)
        };

        for chunk_index in 0..table.chunk_count() {
            let chunk_id = ChunkId(chunk_index as u32);
            let chunk = table.chunk(chunk_id)?;
            let segment = chunk.segment(self.column_id)?;
            let segment = segment.read();
            match &*segment {
                Segment::Value(any) => {
                    let typed = T::as_value_segment(any).ok_or(StrataError::UnsupportedSegment)?;
                    self.scan_value_segment(chunk_id, typed, search_value.as_ref(), pos_list)?;
                }
                Segment::Dictionary(any) => {
                    let typed =
                        T::as_dictionary_segment(any).ok_or(StrataError::UnsupportedSegment)?;
                    self.scan_dictionary_segment(chunk_id, typed, search_value.as_ref(), pos_list)?;
                }
                Segment::Reference(reference) => {
                    self.scan_reference_segment::<T>(reference, search_value.as_ref(), pos_list)?;
                }
            }
        }
        Ok(())
    }

    fn scan_value_segment<T: SegmentValue>(
        &self,
        chunk_id: ChunkId,
        segment: &ValueSegment<T>,
        search_value: Option<&T>,
        pos_list: &mut PosList,
    ) -> Result<()> {
        match search_value {
            None => {
                if self.scan_type == ScanType::NotEquals {
                    for index in 0..segment.len() {
                        let offset = ChunkOffset(index as u32);
                        if !segment.is_null(offset)? {
                            pos_list.push(RowId::new(chunk_id, offset));
                        }
                    }
                }
            }
            Some(search_value) => {
                let selector = Selector {
                    scan_type: self.scan_type,
                    search_value,
                };
                for index in 0..segment.len() {
                    let offset = ChunkOffset(index as u32);
                    if let Some(value) = segment.get_typed_value(offset)? {
                        if selector.selects(&value) {
                            pos_list.push(RowId::new(chunk_id, offset));
                        }
                    }
                }
            }
        }
        Ok(())
    }

    /// `lower_bound..upper_bound` is the id range equal to the search value
    /// (empty or a single id, the dictionary being distinct): ids below the
    /// lower bound are strictly less, ids at or above the upper bound
    /// strictly greater. No dictionary value is materialized.
    fn scan_dictionary_segment<T: SegmentValue>(
        &self,
        chunk_id: ChunkId,
        segment: &DictionarySegment<T>,
        search_value: Option<&T>,
        pos_list: &mut PosList,
    ) -> Result<()> {
        let attribute_vector = segment.attribute_vector();
        let null_value_id = segment.null_value_id();
        match search_value {
            None => {
                if self.scan_type == ScanType::NotEquals {
                    for index in 0..segment.len() {
                        if attribute_vector.get(index)? != null_value_id {
                            pos_list.push(RowId::new(chunk_id, ChunkOffset(index as u32)));
                        }
                    }
                }
            }
            Some(search_value) => {
                let lower_bound = segment.lower_bound(search_value);
                let upper_bound = segment.upper_bound(search_value);
                let present = lower_bound != upper_bound;
                for index in 0..segment.len() {
                    let value_id = attribute_vector.get(index)?;
                    if value_id == null_value_id {
                        continue;
                    }
                    let admit = match self.scan_type {
                        ScanType::Equals => present && value_id == lower_bound,
                        ScanType::NotEquals => !present || value_id != lower_bound,
                        ScanType::LessThan => value_id < lower_bound,
                        ScanType::LessThanEquals => value_id < upper_bound,
                        ScanType::GreaterThan => value_id >= upper_bound,
                        ScanType::GreaterThanEquals => value_id >= lower_bound,
                    };
                    if admit {
                        pos_list.push(RowId::new(chunk_id, ChunkOffset(index as u32)));
                    }
                }
            }
        }
        Ok(())
    }

    /// Admitted rows emit the row id from the reference's own position list,
    /// not the position within the reference segment, so the output points
    /// straight at the base table.
    fn scan_reference_segment<T: SegmentDispatch>(
        &self,
        segment: &ReferenceSegment,
        search_value: Option<&T>,
        pos_list: &mut PosList,
    ) -> Result<()> {
        let positions = segment.pos_list();
        match search_value {
            None => {
                if self.scan_type == ScanType::NotEquals {
                    for index in 0..segment.len() {
                        let offset = ChunkOffset(index as u32);
                        if segment.typed_value_at::<T>(offset)?.is_some() {
                            pos_list.push(positions[index]);
                        }
                    }
                }
            }
            Some(search_value) => {
                let selector = Selector {
                    scan_type: self.scan_type,
                    search_value,
                };
                for index in 0..segment.len() {
                    let offset = ChunkOffset(index as u32);
                    if let Some(value) = segment.typed_value_at::<T>(offset)? {
                        if selector.selects(&value) {
                            pos_list.push(positions[index]);
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl Operator for TableScan {
    fn execute(&self) -> Result<Arc<Table>> {
        self.result.get_or_run(|| self.on_execute())
    }

    fn output(&self) -> Option<Arc<Table>> {
        self.result.get()
    }
}
