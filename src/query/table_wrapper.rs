//! Operator that yields a fixed, already materialized table

use crate::query::{Operator, OperatorResult};
use crate::table::Table;
use crate::Result;
use std::sync::Arc;

/// Zero-input operator wrapping an existing table, the standard way to feed
/// a materialized table into an operator pipeline.
pub struct TableWrapper {
    table: Arc<Table>,
    result: OperatorResult,
}

impl TableWrapper {
    pub fn new(table: Arc<Table>) -> Self {
        Self {
            table,
            result: OperatorResult::new(),
        }
    }
}

impl Operator for TableWrapper {
    fn execute(&self) -> Result<Arc<Table>> {
        self.result.get_or_run(|| Ok(self.table.clone()))
    }

    fn output(&self) -> Option<Arc<Table>> {
        self.result.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_the_given_table() {
        let table = Arc::new(Table::default());
        let wrapper = TableWrapper::new(table.clone());
        assert!(Arc::ptr_eq(&wrapper.execute().unwrap(), &table));
    }
}
