//! Domain model for the staff registry.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep registration input and read-back shapes sharing the same value
//!   types so round-trips compare field for field.
//!
//! # Invariants
//! - Records never carry a store identity before insertion; `StaffId` is
//!   assigned by the store exactly once and travels as an argument.
//! - The employee/volunteer choice is a sum type; "both" or "neither" is
//!   unrepresentable.

pub mod contact;
pub mod program;
pub mod registration;
pub mod staff;
