//! Staff directory service: the transactional write coordinator and the
//! simple query/command operations around it.
//!
//! # Responsibility
//! - Run every operation on its own short-lived connection from the
//!   store seam, released on every exit path.
//! - Convert repository errors into the public outcome policy: `bool`
//!   for writes, `Option` for reads, details in the log only.
//!
//! # Invariants
//! - A failure after `begin_immediate` always rolls back and releases
//!   before the outcome is returned; no partial registration survives.
//! - A release failure never flips an outcome already computed.

use crate::db::migrations::current_user_version;
use crate::db::{guard, DbResult, StoreAccess};
use crate::model::contact::{Contact, ContactReportQuery, InsuranceWindow};
use crate::model::program::{Program, ProgramQuery};
use crate::model::registration::{RegistrationRecord, StaffRegistration};
use crate::model::staff::{StaffId, StaffKind, StaffName, StaffSummary};
use crate::repo::staff_repo::RepoResult;
use crate::repo::{contact_repo, program_repo, staff_repo};
use chrono::{Local, Months, NaiveDate};
use log::{error, info};
use rusqlite::Connection;

/// Health probe result of [`StaffDirectory::check_store`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStatus {
    pub sqlite_version: String,
    pub schema_version: u32,
    pub journal_mode: String,
}

/// Use-case service over one staff registry store.
///
/// Each operation acquires a fresh connection, so a `StaffDirectory`
/// holds no connection state between calls.
pub struct StaffDirectory<S: StoreAccess> {
    store: S,
}

impl<S: StoreAccess> StaffDirectory<S> {
    /// Creates a service using the provided store access seam.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Registers a new staff member: the member row, its insurance, the
    /// employee-or-volunteer detail and both contact batches commit
    /// together or not at all.
    ///
    /// # Contract
    /// - Returns `true` only after the commit succeeds.
    /// - Any failure rolls back, releases the connection quietly, logs
    ///   a diagnostic notice and returns `false`; the underlying error
    ///   does not cross this boundary.
    pub fn register_staff_member(&self, registration: &StaffRegistration) -> bool {
        let Some(conn) = self.connect_logged("staff_register") else {
            return false;
        };

        if let Err(err) = guard::begin_immediate(&conn) {
            error!(
                "event=staff_register module=service status=error \
                 error_code=begin_failed error={err}"
            );
            guard::close_quietly(conn);
            return false;
        }

        match staff_repo::insert_registration(&conn, registration) {
            Ok(staff_id) => match guard::commit_and_close(conn) {
                Ok(()) => {
                    info!(
                        "event=staff_register module=service status=ok staff_id={staff_id} \
                         contacts={} emergency_contacts={}",
                        registration.contacts.len(),
                        registration.emergency_contacts.len()
                    );
                    true
                }
                Err(err) => {
                    error!(
                        "event=staff_register module=service status=error \
                         error_code=commit_failed error={err}"
                    );
                    false
                }
            },
            Err(err) => {
                error!(
                    "event=staff_register module=service status=error \
                     error_code=insert_failed action=rollback error={err}"
                );
                guard::rollback_and_close_quietly(Some(conn));
                false
            }
        }
    }

    /// Lists programs, optionally only active ones (start date strictly
    /// after today) and optionally filtered by term.
    pub fn list_programs(&self, query: &ProgramQuery) -> Option<Vec<Program>> {
        let conn = self.connect_logged("program_list")?;
        let result = program_repo::list_programs(&conn, query, today());
        finish_read("program_list", conn, result)
    }

    /// Re-points the volunteer identified by `national_id` at another
    /// program. Zero matched rows still reports success; only a store
    /// failure reports `false`.
    pub fn update_volunteer_program(&self, national_id: &str, program_id: &str) -> bool {
        let Some(conn) = self.connect_logged("volunteer_reassign") else {
            return false;
        };

        if let Err(err) = guard::begin_immediate(&conn) {
            error!(
                "event=volunteer_reassign module=service status=error \
                 error_code=begin_failed error={err}"
            );
            guard::close_quietly(conn);
            return false;
        }

        match program_repo::update_volunteer_program(&conn, national_id, program_id) {
            Ok(changed) => match guard::commit_and_close(conn) {
                Ok(()) => {
                    info!(
                        "event=volunteer_reassign module=service status=ok \
                         program_id={program_id} changed={changed}"
                    );
                    true
                }
                Err(err) => {
                    error!(
                        "event=volunteer_reassign module=service status=error \
                         error_code=commit_failed error={err}"
                    );
                    false
                }
            },
            Err(err) => {
                error!(
                    "event=volunteer_reassign module=service status=error \
                     error_code=update_failed action=rollback error={err}"
                );
                guard::rollback_and_close_quietly(Some(conn));
                false
            }
        }
    }

    /// Cancels a program: deletes the member rows of its enrolled
    /// volunteers (dependents cascade), then the program row, in one
    /// transaction. An unknown program id deletes nothing and still
    /// reports success.
    pub fn cancel_program(&self, program_id: &str) -> bool {
        let Some(conn) = self.connect_logged("program_cancel") else {
            return false;
        };

        if let Err(err) = guard::begin_immediate(&conn) {
            error!(
                "event=program_cancel module=service status=error \
                 error_code=begin_failed error={err}"
            );
            guard::close_quietly(conn);
            return false;
        }

        match program_repo::delete_program_and_volunteers(&conn, program_id) {
            Ok((volunteers, programs)) => match guard::commit_and_close(conn) {
                Ok(()) => {
                    info!(
                        "event=program_cancel module=service status=ok \
                         program_id={program_id} volunteers_removed={volunteers} \
                         programs_removed={programs}"
                    );
                    true
                }
                Err(err) => {
                    error!(
                        "event=program_cancel module=service status=error \
                         error_code=commit_failed error={err}"
                    );
                    false
                }
            },
            Err(err) => {
                error!(
                    "event=program_cancel module=service status=error \
                     error_code=delete_failed action=rollback error={err}"
                );
                guard::rollback_and_close_quietly(Some(conn));
                false
            }
        }
    }

    /// Human-readable name of an intervention area. `None` for unknown
    /// codes and for store failures alike.
    pub fn intervention_area(&self, code: &str) -> Option<String> {
        let conn = self.connect_logged("area_lookup")?;
        let result = program_repo::intervention_area(&conn, code);
        finish_read("area_lookup", conn, result).flatten()
    }

    /// Lists staff members registered with the given detail variant.
    pub fn list_staff(&self, kind: StaffKind) -> Option<Vec<StaffSummary>> {
        let conn = self.connect_logged("staff_list")?;
        let result = staff_repo::list_staff(&conn, kind);
        finish_read("staff_list", conn, result)
    }

    /// Contacts of members whose insurance was issued within the query
    /// window, split by emergency annotation and optionally by kind.
    pub fn list_recent_contacts(&self, query: &ContactReportQuery) -> Option<Vec<Contact>> {
        let months = match query.window {
            InsuranceWindow::SixMonths => 6,
            InsuranceWindow::TwelveMonths => 12,
        };
        let Some(issued_since) = today().checked_sub_months(Months::new(months)) else {
            error!("event=contact_report module=service status=error error_code=window_overflow");
            return None;
        };

        let conn = self.connect_logged("contact_report")?;
        let result = contact_repo::list_recent_contacts(&conn, query, issued_since);
        finish_read("contact_report", conn, result)
    }

    /// Volunteers at most 30 calendar years old whose program ended
    /// within the last 3 calendar years.
    pub fn list_recent_young_volunteers(&self) -> Option<Vec<StaffName>> {
        let conn = self.connect_logged("volunteer_report")?;
        let result = staff_repo::list_recent_young_volunteers(&conn, today());
        finish_read("volunteer_report", conn, result)
    }

    /// Reads a committed registration back, contacts in priority order.
    /// `None` for unknown identities and for store failures alike.
    pub fn load_registration(&self, staff_id: StaffId) -> Option<RegistrationRecord> {
        let conn = self.connect_logged("registration_load")?;
        let result = staff_repo::load_registration(&conn, staff_id);
        finish_read("registration_load", conn, result).flatten()
    }

    /// Probes the store and reports its versions and journal mode.
    ///
    /// The one operation that releases through the non-quiet
    /// [`guard::close`]: a close failure here is worth observing and
    /// turns the probe into `None`.
    pub fn check_store(&self) -> Option<StoreStatus> {
        let conn = self.connect_logged("store_check")?;

        match probe_store(&conn) {
            Ok(status) => match guard::close(conn) {
                Ok(()) => {
                    info!(
                        "event=store_check module=service status=ok \
                         sqlite_version={} schema_version={} journal_mode={}",
                        status.sqlite_version, status.schema_version, status.journal_mode
                    );
                    Some(status)
                }
                Err(err) => {
                    error!(
                        "event=store_check module=service status=error \
                         error_code=close_failed error={err}"
                    );
                    None
                }
            },
            Err(err) => {
                error!(
                    "event=store_check module=service status=error \
                     error_code=probe_failed error={err}"
                );
                guard::close_quietly(conn);
                None
            }
        }
    }

    fn connect_logged(&self, event: &str) -> Option<Connection> {
        match self.store.connect() {
            Ok(conn) => Some(conn),
            Err(err) => {
                error!(
                    "event={event} module=service status=error \
                     error_code=store_unavailable error={err}"
                );
                None
            }
        }
    }
}

fn finish_read<T>(event: &str, conn: Connection, result: RepoResult<T>) -> Option<T> {
    guard::close_quietly(conn);
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            error!("event={event} module=service status=error error_code=query_failed error={err}");
            None
        }
    }
}

fn probe_store(conn: &Connection) -> DbResult<StoreStatus> {
    let sqlite_version: String = conn.query_row("SELECT sqlite_version();", [], |row| row.get(0))?;
    let journal_mode: String = conn.query_row("PRAGMA journal_mode;", [], |row| row.get(0))?;
    Ok(StoreStatus {
        sqlite_version,
        schema_version: current_user_version(conn)?,
        journal_mode,
    })
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}
