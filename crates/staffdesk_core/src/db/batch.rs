//! Batched execution of one parameterized INSERT over many rows.
//!
//! # Responsibility
//! - Prepare a statement once and re-bind it per row, so multi-row
//!   inserts (contact lists, emergency lists) stay one code path.
//!
//! # Invariants
//! - Rows execute in slice order; the first failing row aborts the rest
//!   and the error propagates to the caller.
//! - No transaction management here. Callers that need all-or-nothing
//!   wrap the call in a guard transaction.

use super::DbResult;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

/// Executes `sql` once per row of `rows`, binding the parameters
/// produced by `to_params`, and returns the total number of rows
/// inserted.
///
/// An empty slice prepares nothing and reports zero.
pub fn insert_all<R, F>(conn: &Connection, sql: &str, rows: &[R], to_params: F) -> DbResult<usize>
where
    F: Fn(&R) -> Vec<Value>,
{
    if rows.is_empty() {
        return Ok(0);
    }
    let mut stmt = conn.prepare(sql)?;
    let mut inserted = 0usize;
    for row in rows {
        inserted += stmt.execute(params_from_iter(to_params(row)))?;
    }
    Ok(inserted)
}
