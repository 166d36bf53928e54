//! Program persistence: listings, enrollment re-pointing, cancellation.
//!
//! # Responsibility
//! - Serve program listings and the intervention-area lookup.
//! - Execute the two-statement cancellation (enrolled volunteers first,
//!   then the program) on the caller's transaction.
//!
//! # Invariants
//! - Programs are created out of band; nothing here inserts one.
//! - Deleting a member row cascades to its detail, insurance and contact
//!   rows at the schema level.

use crate::model::program::{Program, ProgramQuery, ProgramTerm};
use crate::repo::staff_repo::{parse_decimal, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROGRAM_SELECT_SQL: &str = "SELECT
    program_id,
    area_code,
    name,
    start_date,
    end_date,
    min_age,
    cost,
    term
FROM programs";

/// Lists programs; active means the start date is strictly after
/// `today`.
pub fn list_programs(
    conn: &Connection,
    query: &ProgramQuery,
    today: NaiveDate,
) -> RepoResult<Vec<Program>> {
    let mut sql = format!("{PROGRAM_SELECT_SQL} WHERE 1 = 1");
    let mut bind_values: Vec<Value> = Vec::new();

    if query.active_only {
        sql.push_str(" AND start_date > ?");
        bind_values.push(Value::Text(today.to_string()));
    }

    if let Some(term) = query.term {
        sql.push_str(" AND term = ?");
        bind_values.push(Value::Text(program_term_to_db(term).to_string()));
    }

    sql.push_str(" ORDER BY start_date ASC, program_id ASC;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut programs = Vec::new();

    while let Some(row) = rows.next()? {
        programs.push(parse_program_row(row)?);
    }

    Ok(programs)
}

/// Human-readable name of an intervention area, `None` for an unknown
/// code.
pub fn intervention_area(conn: &Connection, code: &str) -> RepoResult<Option<String>> {
    let mut stmt = conn.prepare("SELECT name FROM intervention_areas WHERE code = ?1;")?;
    let mut rows = stmt.query(params![code])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(row.get("name")?));
    }
    Ok(None)
}

/// Re-points the volunteer identified by `national_id` at another
/// program. Returns the number of detail rows changed; zero means no
/// volunteer carries that national ID.
pub fn update_volunteer_program(
    conn: &Connection,
    national_id: &str,
    program_id: &str,
) -> RepoResult<usize> {
    let changed = conn.execute(
        "UPDATE volunteer_details
         SET program_id = ?1
         WHERE staff_id IN (SELECT staff_id FROM staff_members WHERE national_id = ?2);",
        params![program_id, national_id],
    )?;
    Ok(changed)
}

/// Deletes the member rows of every volunteer enrolled in `program_id`
/// (their dependent rows cascade), then the program row, in that order.
/// Returns (volunteers removed, program rows removed).
pub fn delete_program_and_volunteers(
    conn: &Connection,
    program_id: &str,
) -> RepoResult<(usize, usize)> {
    let volunteers = conn.execute(
        "DELETE FROM staff_members
         WHERE staff_id IN (SELECT staff_id FROM volunteer_details WHERE program_id = ?1);",
        params![program_id],
    )?;
    let programs = conn.execute(
        "DELETE FROM programs WHERE program_id = ?1;",
        params![program_id],
    )?;
    Ok((volunteers, programs))
}

fn parse_program_row(row: &Row<'_>) -> RepoResult<Program> {
    let cost_text: String = row.get("cost")?;
    let term_text: String = row.get("term")?;
    let term = parse_program_term(&term_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid program term `{term_text}` in programs.term"))
    })?;

    Ok(Program {
        program_id: row.get("program_id")?,
        area_code: row.get("area_code")?,
        name: row.get("name")?,
        start_date: row.get("start_date")?,
        end_date: row.get("end_date")?,
        min_age: row.get("min_age")?,
        cost: parse_decimal(&cost_text, "programs.cost")?,
        term,
    })
}

fn program_term_to_db(term: ProgramTerm) -> &'static str {
    match term {
        ProgramTerm::ShortTerm => "short_term",
        ProgramTerm::LongTerm => "long_term",
    }
}

fn parse_program_term(value: &str) -> Option<ProgramTerm> {
    match value {
        "short_term" => Some(ProgramTerm::ShortTerm),
        "long_term" => Some(ProgramTerm::LongTerm),
        _ => None,
    }
}
