//! Process-wide table catalog

use crate::table::Table;
use crate::{Result, StrataError};
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

// ============================================================================
// Global StorageManager Singleton
// ============================================================================

static STORAGE_MANAGER: Lazy<StorageManager> = Lazy::new(StorageManager::new);

/// Name → table registry. One instance exists per process, reachable via
/// [`StorageManager::get`]; `reset` exists for test isolation.
pub struct StorageManager {
    tables: RwLock<HashMap<String, Arc<Table>>>,
}

impl StorageManager {
    fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
        }
    }

    /// The global catalog.
    pub fn get() -> &'static StorageManager {
        &STORAGE_MANAGER
    }

    /// Register a table under a unique name.
    pub fn add_table(&self, name: impl Into<String>, table: Arc<Table>) -> Result<()> {
        let name = name.into();
        let mut tables = self.tables.write();
        if tables.contains_key(&name) {
            return Err(StrataError::TableExists(name));
        }
        log::debug!("table '{name}' registered");
        tables.insert(name, table);
        Ok(())
    }

    pub fn drop_table(&self, name: &str) -> Result<()> {
        self.tables
            .write()
            .remove(name)
            .map(|_| log::debug!("table '{name}' dropped"))
            .ok_or_else(|| StrataError::TableNotFound(name.to_string()))
    }

    pub fn get_table(&self, name: &str) -> Result<Arc<Table>> {
        self.tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| StrataError::TableNotFound(name.to_string()))
    }

    pub fn has_table(&self, name: &str) -> bool {
        self.tables.read().contains_key(name)
    }

    /// Registered table names, sorted.
    pub fn table_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tables.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Drop every table.
    pub fn reset(&self) {
        log::debug!("catalog reset");
        self.tables.write().clear();
    }

    /// Write one `(name, #columns, #rows, #chunks)` line per table, sorted
    /// by name so identical catalog state prints identically.
    pub fn print(&self, out: &mut impl Write) -> Result<()> {
        let tables = self.tables.read();
        let mut names: Vec<&String> = tables.keys().collect();
        names.sort();
        for name in names {
            let table = &tables[name];
            writeln!(
                out,
                "({}, {}, {}, {})",
                name,
                table.column_count(),
                table.row_count(),
                table.chunk_count()
            )?;
        }
        Ok(())
    }
}

/// The catalog is process-wide while the test harness runs tests in
/// parallel; every test touching the global instance serializes through
/// this guard.
#[cfg(test)]
pub(crate) fn catalog_test_guard() -> parking_lot::MutexGuard<'static, ()> {
    static LOCK: parking_lot::Mutex<()> = parking_lot::Mutex::new(());
    LOCK.lock()
}
