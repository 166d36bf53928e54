//! Staff member domain model.
//!
//! # Responsibility
//! - Define the person record, its insurance, and the mutually exclusive
//!   employee/volunteer detail.
//!
//! # Invariants
//! - `StaffId` is the store-generated rowid, assigned exactly once at
//!   insert time; no record here carries one before insertion.
//! - A registration produces exactly one `StaffDetail` variant.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Store-assigned identity of a staff member.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
/// Dependent records take it as an argument instead of carrying a field
/// that would be meaningless before the parent insert.
pub type StaffId = i64;

/// Identity document presented at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdDocumentKind {
    /// National identity card.
    NationalCard,
    /// Citizen card (chip-based successor of the national card).
    CitizenCard,
    /// Passport.
    Passport,
}

/// Which detail variant a staff member was registered with.
///
/// Used as the discriminant for listings; the registration itself uses
/// [`StaffDetail`] so the choice is carried by the type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffKind {
    Employee,
    Volunteer,
}

/// Insurance policy term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceTerm {
    Permanent,
    Temporary,
}

/// Personal data of a staff member, as supplied by the caller.
///
/// Values arrive already validated by the prompt layer; the core checks
/// structural invariants only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
    /// National ID number; unique across the registry.
    pub national_id: String,
    pub id_document: IdDocumentKind,
    /// Fiscal number is optional for volunteers without one.
    pub fiscal_number: Option<String>,
    pub nationality: String,
    pub address: String,
}

/// Insurance record; exactly one per registration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insurance {
    pub issued_on: NaiveDate,
    pub description: String,
    /// Premium amount, fixed-point with 2 decimals.
    pub premium: Decimal,
    pub term: InsuranceTerm,
    /// Positive number of covered months.
    pub duration: u32,
}

/// Detail row of a paid employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeDetail {
    pub role: String,
    pub salary: Decimal,
}

/// Detail row of a volunteer, referencing an existing program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerDetail {
    pub occupation: String,
    pub language: String,
    /// Key of the program the volunteer enrolls in. The program is
    /// created out of band and only referenced here.
    pub program_id: String,
}

/// The mutually exclusive employee/volunteer dependent record.
///
/// Modeled as a sum type so "exactly one of the two" holds by
/// construction instead of by a runtime null-check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffDetail {
    Employee(EmployeeDetail),
    Volunteer(VolunteerDetail),
}

impl StaffDetail {
    /// Returns the discriminant of this detail variant.
    pub fn kind(&self) -> StaffKind {
        match self {
            Self::Employee(_) => StaffKind::Employee,
            Self::Volunteer(_) => StaffKind::Volunteer,
        }
    }
}

/// Listing row for staff of one kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSummary {
    pub staff_id: StaffId,
    pub first_name: String,
    pub last_name: String,
    pub birth_date: NaiveDate,
}

/// Name-only row used by the recent-volunteers report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffName {
    pub first_name: String,
    pub last_name: String,
}
