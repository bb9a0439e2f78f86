//! Operator that retrieves a table from the catalog by name

use crate::query::{Operator, OperatorResult};
use crate::table::{StorageManager, Table};
use crate::Result;
use std::sync::Arc;

/// Zero-input operator resolving a table name against the global catalog.
pub struct GetTable {
    name: String,
    result: OperatorResult,
}

impl GetTable {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            result: OperatorResult::new(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.name
    }
}

impl Operator for GetTable {
    fn execute(&self) -> Result<Arc<Table>> {
        self.result
            .get_or_run(|| StorageManager::get().get_table(&self.name))
    }

    fn output(&self) -> Option<Arc<Table>> {
        self.result.get()
    }
}
