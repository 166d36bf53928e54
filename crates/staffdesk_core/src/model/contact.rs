//! Contact and emergency-contact records.
//!
//! # Invariants
//! - `order_no` is caller-assigned, unique per person, and is the
//!   priority ordering of that person's contacts.
//! - An emergency row shares the `order_no` of an existing contact; it
//!   annotates, it does not stand alone.

use serde::{Deserialize, Serialize};

/// Kind of a contact value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Email,
    Phone,
}

/// One contact of a staff member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    /// Caller-assigned priority order, unique per person.
    pub order_no: i64,
    pub value: String,
    pub kind: ContactKind,
}

/// Emergency annotation of an existing contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyContact {
    /// Must match the `order_no` of a contact supplied alongside it.
    pub order_no: i64,
    pub contact_name: String,
    pub kinship: String,
}

/// How far back the contact report looks at insurance issue dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsuranceWindow {
    SixMonths,
    TwelveMonths,
}

/// Query options for the recent-contacts report.
#[derive(Debug, Clone)]
pub struct ContactReportQuery {
    /// When set, only contacts carrying an emergency annotation; when
    /// clear, only contacts without one.
    pub emergency_only: bool,
    pub window: InsuranceWindow,
    /// Restrict to one contact kind, or take both.
    pub kind: Option<ContactKind>,
}
