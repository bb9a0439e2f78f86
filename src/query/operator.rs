//! Operator base: execute-once result memoization

use crate::table::Table;
use crate::Result;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// A query operator with zero, one, or two input operators.
///
/// `execute` runs the operator's logic at most once per instance and caches
/// the produced table; later calls return the cached handle. Inputs are held
/// as `Arc<dyn Operator>`, so a downstream operator pulls its input table by
/// executing the upstream operator (a memoized no-op once run).
pub trait Operator: Send + Sync {
    fn execute(&self) -> Result<Arc<Table>>;

    /// The cached result, if `execute` has succeeded before.
    fn output(&self) -> Option<Arc<Table>>;
}

/// Memoization slot embedded in every operator implementation.
#[derive(Default)]
pub struct OperatorResult {
    table: OnceCell<Arc<Table>>,
}

impl OperatorResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the memoized table, running `run` on the first call.
    pub fn get_or_run(&self, run: impl FnOnce() -> Result<Arc<Table>>) -> Result<Arc<Table>> {
        self.table.get_or_try_init(run).cloned()
    }

    pub fn get(&self) -> Option<Arc<Table>> {
        self.table.get().cloned()
    }
}
