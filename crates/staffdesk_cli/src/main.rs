//! CLI smoke entry point and composition root.
//!
//! # Responsibility
//! - Construct the store seam and the directory service explicitly, the
//!   way any embedding caller should.
//! - Keep output deterministic for quick local sanity checks.

use log::info;
use staffdesk_core::{default_log_level, init_logging, SqliteStore, StaffDirectory};
use std::path::PathBuf;
use std::process::ExitCode;

const DB_ENV: &str = "STAFFDESK_DB";
const LOG_DIR_ENV: &str = "STAFFDESK_LOG_DIR";
const LOG_LEVEL_ENV: &str = "STAFFDESK_LOG_LEVEL";

fn main() -> ExitCode {
    let db_path = std::env::var(DB_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("staffdesk.db"));
    let log_dir = std::env::var(LOG_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| std::env::temp_dir().join("staffdesk-logs"));
    let log_level =
        std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| default_log_level().to_string());

    if let Err(message) = init_logging(&log_level, &log_dir.to_string_lossy()) {
        eprintln!("staffdesk: logging disabled: {message}");
    }

    info!(
        "event=cli_start module=cli status=ok db={} log_dir={}",
        db_path.display(),
        log_dir.display()
    );

    println!("staffdesk_core version={}", staffdesk_core::core_version());

    let directory = StaffDirectory::new(SqliteStore::new(&db_path));
    match directory.check_store() {
        Some(status) => {
            println!(
                "store=ok path={} sqlite_version={} schema_version={} journal_mode={}",
                db_path.display(),
                status.sqlite_version,
                status.schema_version,
                status.journal_mode
            );
            ExitCode::SUCCESS
        }
        None => {
            eprintln!("store=error path={}", db_path.display());
            ExitCode::FAILURE
        }
    }
}
