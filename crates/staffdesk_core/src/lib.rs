//! Core domain logic for StaffDesk.
//! This crate is the single source of truth for the staff registry's
//! business invariants and its transactional write path.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use db::{open_db, open_db_in_memory, DbError, DbResult, SqliteStore, StoreAccess};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::contact::{
    Contact, ContactKind, ContactReportQuery, EmergencyContact, InsuranceWindow,
};
pub use model::program::{Program, ProgramQuery, ProgramTerm};
pub use model::registration::{RegistrationError, RegistrationRecord, StaffRegistration};
pub use model::staff::{
    EmployeeDetail, IdDocumentKind, Insurance, InsuranceTerm, StaffDetail, StaffId, StaffKind,
    StaffMember, StaffName, StaffSummary, VolunteerDetail,
};
pub use repo::staff_repo::{RepoError, RepoResult};
pub use service::directory::{StaffDirectory, StoreStatus};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
