//! Connection lifecycle guard: transaction ends and quiet release.
//!
//! # Responsibility
//! - Start, commit and roll back connection-scoped transactions.
//! - Release connections on every exit path without letting a release
//!   failure replace the operation outcome.
//!
//! # Invariants
//! - Rolling back when no transaction is open (or the connection is
//!   absent) is a no-op that reports success.
//! - `*_quietly` functions log suppressed failures and never propagate.
//! - Statement handles finalize on drop before their connection closes;
//!   the connection is the one resource with a fallible release.
//!
//! `Connection`'s own `Drop` remains the backstop on panic paths; the
//! functions here add observability to the deliberate release points.

use super::DbResult;
use log::warn;
use rusqlite::Connection;

/// Takes `conn` out of auto-commit mode for a multi-statement sequence.
///
/// The write lock is acquired up front (`BEGIN IMMEDIATE`) so a busy
/// store fails here rather than mid-sequence.
pub fn begin_immediate(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("BEGIN IMMEDIATE;")?;
    Ok(())
}

/// Commits the transaction open on `conn`.
///
/// # Errors
/// Fails when no transaction is open or the store rejects the commit.
pub fn commit(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("COMMIT;")?;
    Ok(())
}

/// Rolls back the transaction open on `conn`.
///
/// A connection with no open transaction reports success without
/// touching the store.
pub fn rollback(conn: &Connection) -> DbResult<()> {
    if conn.is_autocommit() {
        return Ok(());
    }
    conn.execute_batch("ROLLBACK;")?;
    Ok(())
}

/// Closes `conn`, propagating the close failure.
///
/// The rarely-used companion of [`close_quietly`] for callers that need
/// to observe release failures (health probes, tests).
pub fn close(conn: Connection) -> DbResult<()> {
    conn.close().map_err(|(_, err)| err.into())
}

/// Closes `conn`; a close failure is logged and suppressed.
///
/// The default release path. A transaction still open on `conn` is
/// rolled back by the store as part of the close.
pub fn close_quietly(conn: Connection) {
    if let Err((_, err)) = conn.close() {
        warn!("event=store_close module=db status=suppressed error={err}");
    }
}

/// Commits the open transaction, then releases `conn`.
///
/// The commit failure propagates; the release step never does. When the
/// commit fails the store rolls the transaction back on close, so no
/// partial state survives.
pub fn commit_and_close(conn: Connection) -> DbResult<()> {
    let committed = commit(&conn);
    close_quietly(conn);
    committed
}

/// Rolls back the open transaction (no-op when none), then releases
/// `conn`. The rollback failure propagates; the release step never does.
pub fn rollback_and_close(conn: Connection) -> DbResult<()> {
    let rolled_back = rollback(&conn);
    close_quietly(conn);
    rolled_back
}

/// Rolls back and releases `conn`, suppressing every failure.
///
/// An absent connection is a no-op. Used on failure paths where the
/// primary error has already been recorded and nothing the cleanup does
/// may replace it.
pub fn rollback_and_close_quietly(conn: Option<Connection>) {
    let Some(conn) = conn else {
        return;
    };
    if let Err(err) = rollback(&conn) {
        warn!("event=store_rollback module=db status=suppressed error={err}");
    }
    close_quietly(conn);
}

#[cfg(test)]
mod tests {
    use super::{
        begin_immediate, close, close_quietly, commit, commit_and_close, rollback,
        rollback_and_close, rollback_and_close_quietly,
    };
    use crate::db::{open_db, open_db_in_memory};

    fn scratch_table(conn: &rusqlite::Connection) {
        conn.execute_batch("CREATE TABLE scratch (n INTEGER);").unwrap();
    }

    fn scratch_count(conn: &rusqlite::Connection) -> i64 {
        conn.query_row("SELECT COUNT(*) FROM scratch;", [], |row| row.get(0))
            .unwrap()
    }

    #[test]
    fn begin_and_commit_persist_writes() {
        let conn = open_db_in_memory().unwrap();
        scratch_table(&conn);

        begin_immediate(&conn).unwrap();
        assert!(!conn.is_autocommit());
        conn.execute("INSERT INTO scratch (n) VALUES (1);", []).unwrap();
        commit(&conn).unwrap();

        assert!(conn.is_autocommit());
        assert_eq!(scratch_count(&conn), 1);
    }

    #[test]
    fn rollback_discards_writes() {
        let conn = open_db_in_memory().unwrap();
        scratch_table(&conn);

        begin_immediate(&conn).unwrap();
        conn.execute("INSERT INTO scratch (n) VALUES (1);", []).unwrap();
        rollback(&conn).unwrap();

        assert_eq!(scratch_count(&conn), 0);
    }

    #[test]
    fn rollback_without_open_transaction_is_a_no_op() {
        let conn = open_db_in_memory().unwrap();
        assert!(conn.is_autocommit());
        rollback(&conn).unwrap();
        rollback(&conn).unwrap();
    }

    #[test]
    fn rollback_and_close_quietly_accepts_absent_connection() {
        rollback_and_close_quietly(None);
    }

    #[test]
    fn rollback_and_close_quietly_discards_open_transaction() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.db");

        let conn = open_db(&path).unwrap();
        conn.execute_batch("CREATE TABLE scratch (n INTEGER);").unwrap();
        begin_immediate(&conn).unwrap();
        conn.execute("INSERT INTO scratch (n) VALUES (1);", []).unwrap();
        rollback_and_close_quietly(Some(conn));

        let reopened = open_db(&path).unwrap();
        assert_eq!(scratch_count(&reopened), 0);
    }

    #[test]
    fn commit_and_close_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guard.db");

        let conn = open_db(&path).unwrap();
        conn.execute_batch("CREATE TABLE scratch (n INTEGER);").unwrap();
        begin_immediate(&conn).unwrap();
        conn.execute("INSERT INTO scratch (n) VALUES (7);", []).unwrap();
        commit_and_close(conn).unwrap();

        let reopened = open_db(&path).unwrap();
        assert_eq!(scratch_count(&reopened), 1);
    }

    #[test]
    fn commit_and_close_without_transaction_reports_the_commit_failure() {
        let conn = open_db_in_memory().unwrap();
        let err = commit_and_close(conn).unwrap_err();
        assert!(err.to_string().contains("transaction"));
    }

    #[test]
    fn rollback_and_close_without_transaction_succeeds() {
        let conn = open_db_in_memory().unwrap();
        rollback_and_close(conn).unwrap();
    }

    #[test]
    fn close_paths_release_healthy_connections() {
        close(open_db_in_memory().unwrap()).unwrap();
        close_quietly(open_db_in_memory().unwrap());
    }
}
