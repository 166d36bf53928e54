//! Program records. Programs are created out of band and referenced by
//! volunteer details; this core reads, re-points and cancels them.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Short-term vs long-term program discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgramTerm {
    ShortTerm,
    LongTerm,
}

/// One intervention program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// Caller-assigned key.
    pub program_id: String,
    /// References a seeded intervention area.
    pub area_code: String,
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub min_age: u32,
    pub cost: Decimal,
    pub term: ProgramTerm,
}

/// Query options for listing programs.
#[derive(Debug, Clone, Default)]
pub struct ProgramQuery {
    /// Active means the start date is strictly after today.
    pub active_only: bool,
    pub term: Option<ProgramTerm>,
}
