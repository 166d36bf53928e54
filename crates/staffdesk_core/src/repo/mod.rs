//! Repository layer: SQL statements over an open connection.
//!
//! # Responsibility
//! - Keep every statement text and row mapping inside this boundary.
//! - Leave transaction control and connection lifecycle to the service
//!   layer; every function here runs on a borrowed `Connection`.
//!
//! # Invariants
//! - Write paths enforce structural validation before the first
//!   statement runs.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod contact_repo;
pub mod program_repo;
pub mod staff_repo;
