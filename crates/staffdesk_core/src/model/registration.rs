//! Registration aggregate: everything one staff registration writes.
//!
//! # Responsibility
//! - Bundle the member, insurance, detail variant and contact lists that
//!   commit together.
//! - Check the structural invariants the schema cannot see before the
//!   transaction starts.
//!
//! # Invariants
//! - Contacts are non-empty and their order numbers unique.
//! - Every emergency contact annotates a contact supplied in the same
//!   registration.

use crate::model::contact::{Contact, EmergencyContact};
use crate::model::staff::{Insurance, StaffDetail, StaffId, StaffMember};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Structural violation detected before any statement runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationError {
    /// A registration must supply at least one contact.
    NoContacts,
    /// Two contacts share the same order number.
    DuplicateContactOrder(i64),
    /// An emergency contact references an order number no contact has.
    UnmatchedEmergencyOrder(i64),
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoContacts => write!(f, "registration has no contacts"),
            Self::DuplicateContactOrder(order_no) => {
                write!(f, "duplicate contact order number {order_no}")
            }
            Self::UnmatchedEmergencyOrder(order_no) => {
                write!(f, "emergency contact order number {order_no} matches no contact")
            }
        }
    }
}

impl Error for RegistrationError {}

/// Input of one registration; carries no store identity.
///
/// The employee/volunteer exactly-one invariant is enforced by
/// [`StaffDetail`]; the remaining structural rules live in
/// [`StaffRegistration::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffRegistration {
    pub member: StaffMember,
    pub insurance: Insurance,
    pub detail: StaffDetail,
    pub contacts: Vec<Contact>,
    /// May be empty. Only meaningful for volunteers, but not rejected
    /// for employees.
    pub emergency_contacts: Vec<EmergencyContact>,
}

impl StaffRegistration {
    /// Checks the structural invariants of this registration.
    ///
    /// Formats and value ranges are the prompt layer's concern and are
    /// not re-checked here.
    pub fn validate(&self) -> Result<(), RegistrationError> {
        if self.contacts.is_empty() {
            return Err(RegistrationError::NoContacts);
        }

        let mut orders = HashSet::with_capacity(self.contacts.len());
        for contact in &self.contacts {
            if !orders.insert(contact.order_no) {
                return Err(RegistrationError::DuplicateContactOrder(contact.order_no));
            }
        }

        for emergency in &self.emergency_contacts {
            if !orders.contains(&emergency.order_no) {
                return Err(RegistrationError::UnmatchedEmergencyOrder(emergency.order_no));
            }
        }

        Ok(())
    }
}

/// Read-back of a committed registration.
///
/// Reuses the input value types so a round-trip compares field for
/// field; contacts come back ordered by `order_no` ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationRecord {
    pub staff_id: StaffId,
    pub member: StaffMember,
    pub insurance: Insurance,
    pub detail: StaffDetail,
    pub contacts: Vec<Contact>,
    pub emergency_contacts: Vec<EmergencyContact>,
}
