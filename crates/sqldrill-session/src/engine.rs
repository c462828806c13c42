//! Query-engine capability interface.
//!
//! The embedded engine is an external collaborator reached through a small
//! capability trait rather than a concrete type, so any engine exposing
//! prepare/execute/fetch-rows semantics over a loaded dataset can sit behind
//! it. There is no process-wide singleton: the handle is explicitly owned
//! and passed in, with a create -> load -> execute* -> release lifecycle.

use sqldrill_error::Result;
use sqldrill_types::ResultSet;

/// Handle to an embedded query engine.
///
/// Implementations are not required to be safe for concurrent invocation;
/// callers serialize access by holding `&mut self`, which the type system
/// enforces. At most one dataset is active per handle: `load_dataset`
/// replaces (and frees) any previously loaded one to bound memory.
pub trait QueryEngine {
    /// Load a dataset image, replacing any previously loaded dataset.
    fn load_dataset(&mut self, bytes: &[u8]) -> Result<()>;

    /// Execute a single statement against the loaded dataset.
    ///
    /// Fails with [`sqldrill_error::DrillError::Engine`] carrying the
    /// engine-native message on malformed SQL or constraint violation, and
    /// with `DatasetNotLoaded` when no dataset has been loaded. A statement
    /// that produces no rows (DDL, DML) returns an empty result set.
    fn execute(&mut self, sql: &str) -> Result<ResultSet>;

    /// Free engine-held memory for the active dataset, if any.
    fn release(&mut self);
}
