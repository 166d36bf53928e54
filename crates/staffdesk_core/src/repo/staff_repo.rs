//! Staff member persistence: the registration write path and its reads.
//!
//! # Responsibility
//! - Execute the ordered insert sequence of one registration on the
//!   caller's transaction.
//! - Read committed registrations back, field for field.
//!
//! # Invariants
//! - The member insert runs first; its generated identity is an argument
//!   to every dependent insert, never a field stamped afterwards.
//! - Zero affected rows or an unusable generated identity aborts
//!   explicitly instead of silently continuing.

use crate::db::DbError;
use crate::model::registration::{RegistrationError, RegistrationRecord, StaffRegistration};
use crate::model::staff::{
    EmployeeDetail, IdDocumentKind, Insurance, InsuranceTerm, StaffDetail, StaffId, StaffKind,
    StaffMember, StaffName, StaffSummary, VolunteerDetail,
};
use crate::repo::contact_repo;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use rusqlite::{params, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MEMBER_SELECT_SQL: &str = "SELECT
    first_name,
    last_name,
    birth_date,
    national_id,
    id_document,
    fiscal_number,
    nationality,
    address
FROM staff_members";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by the staff, contact and program modules.
#[derive(Debug)]
pub enum RepoError {
    Validation(RegistrationError),
    Db(DbError),
    /// An insert reported zero affected rows.
    NothingInserted { table: &'static str },
    /// The store returned no usable generated identity after the member
    /// insert.
    MissingIdentity,
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NothingInserted { table } => {
                write!(f, "insert into {table} affected no rows")
            }
            Self::MissingIdentity => {
                write!(f, "no generated identity returned for the member insert")
            }
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::NothingInserted { .. } => None,
            Self::MissingIdentity => None,
            Self::InvalidData(_) => None,
        }
    }
}

impl From<RegistrationError> for RepoError {
    fn from(value: RegistrationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Runs the full insert sequence of one registration on the caller's
/// open transaction and returns the generated identity.
///
/// Order: member first (everything depends on its identity), then
/// insurance, then the detail variant, then the two contact batches.
/// Any error leaves the transaction open for the caller to roll back.
pub fn insert_registration(
    conn: &Connection,
    registration: &StaffRegistration,
) -> RepoResult<StaffId> {
    registration.validate()?;

    let member = &registration.member;
    let affected = conn.execute(
        "INSERT INTO staff_members (
            first_name,
            last_name,
            birth_date,
            national_id,
            id_document,
            fiscal_number,
            nationality,
            address
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8);",
        params![
            member.first_name.as_str(),
            member.last_name.as_str(),
            member.birth_date,
            member.national_id.as_str(),
            id_document_to_db(member.id_document),
            member.fiscal_number.as_deref(),
            member.nationality.as_str(),
            member.address.as_str(),
        ],
    )?;
    if affected == 0 {
        return Err(RepoError::NothingInserted {
            table: "staff_members",
        });
    }

    let staff_id = conn.last_insert_rowid();
    if staff_id == 0 {
        return Err(RepoError::MissingIdentity);
    }

    insert_insurance(conn, staff_id, &registration.insurance)?;

    match &registration.detail {
        StaffDetail::Employee(detail) => insert_employee_detail(conn, staff_id, detail)?,
        StaffDetail::Volunteer(detail) => insert_volunteer_detail(conn, staff_id, detail)?,
    }

    contact_repo::insert_contacts(conn, staff_id, &registration.contacts)?;
    contact_repo::insert_emergency_contacts(conn, staff_id, &registration.emergency_contacts)?;

    Ok(staff_id)
}

/// Reads a committed registration back, contacts ordered by `order_no`
/// ascending. `None` when no member has this identity.
pub fn load_registration(
    conn: &Connection,
    staff_id: StaffId,
) -> RepoResult<Option<RegistrationRecord>> {
    let Some(member) = load_member(conn, staff_id)? else {
        return Ok(None);
    };

    Ok(Some(RegistrationRecord {
        staff_id,
        member,
        insurance: load_insurance(conn, staff_id)?,
        detail: load_detail(conn, staff_id)?,
        contacts: contact_repo::contacts_for(conn, staff_id)?,
        emergency_contacts: contact_repo::emergency_for(conn, staff_id)?,
    }))
}

/// Lists staff members registered with the given detail variant.
pub fn list_staff(conn: &Connection, kind: StaffKind) -> RepoResult<Vec<StaffSummary>> {
    let table = detail_table(kind);
    let mut stmt = conn.prepare(&format!(
        "SELECT staff_id, first_name, last_name, birth_date
         FROM staff_members
         WHERE staff_id IN (SELECT staff_id FROM {table})
         ORDER BY staff_id;"
    ))?;

    let mut rows = stmt.query([])?;
    let mut summaries = Vec::new();
    while let Some(row) = rows.next()? {
        summaries.push(StaffSummary {
            staff_id: row.get("staff_id")?,
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            birth_date: row.get("birth_date")?,
        });
    }

    Ok(summaries)
}

/// Volunteers at most 30 calendar years old whose program ended within
/// the last 3 calendar years, as of `today`.
///
/// Both bounds use year arithmetic, not full dates: a program that
/// ended any day of `year(today) - 2` counts, and the age check
/// compares birth year only.
pub fn list_recent_young_volunteers(
    conn: &Connection,
    today: NaiveDate,
) -> RepoResult<Vec<StaffName>> {
    let mut stmt = conn.prepare(
        "SELECT first_name, last_name
         FROM staff_members
         WHERE staff_id IN (
             SELECT staff_id FROM volunteer_details
             WHERE program_id IN (
                 SELECT program_id FROM programs
                 WHERE end_date < ?1
                   AND CAST(strftime('%Y', end_date) AS INTEGER) > ?2 - 3
             )
         )
           AND ?2 - CAST(strftime('%Y', birth_date) AS INTEGER) <= 30
         ORDER BY staff_id;",
    )?;

    let mut rows = stmt.query(params![today, today.year()])?;
    let mut names = Vec::new();
    while let Some(row) = rows.next()? {
        names.push(StaffName {
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
        });
    }

    Ok(names)
}

/// Parses a TEXT money column.
pub fn parse_decimal(value: &str, column: &'static str) -> RepoResult<Decimal> {
    Decimal::from_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid decimal value `{value}` in {column}")))
}

fn insert_insurance(conn: &Connection, staff_id: StaffId, insurance: &Insurance) -> RepoResult<()> {
    let affected = conn.execute(
        "INSERT INTO insurance_policies (
            staff_id,
            issued_on,
            description,
            premium,
            term,
            duration
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
        params![
            staff_id,
            insurance.issued_on,
            insurance.description.as_str(),
            insurance.premium.to_string(),
            insurance_term_to_db(insurance.term),
            insurance.duration,
        ],
    )?;
    if affected == 0 {
        return Err(RepoError::NothingInserted {
            table: "insurance_policies",
        });
    }
    Ok(())
}

fn insert_employee_detail(
    conn: &Connection,
    staff_id: StaffId,
    detail: &EmployeeDetail,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO employee_details (staff_id, role, salary) VALUES (?1, ?2, ?3);",
        params![staff_id, detail.role.as_str(), detail.salary.to_string()],
    )?;
    Ok(())
}

fn insert_volunteer_detail(
    conn: &Connection,
    staff_id: StaffId,
    detail: &VolunteerDetail,
) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO volunteer_details (staff_id, occupation, language, program_id)
         VALUES (?1, ?2, ?3, ?4);",
        params![
            staff_id,
            detail.occupation.as_str(),
            detail.language.as_str(),
            detail.program_id.as_str(),
        ],
    )?;
    Ok(())
}

fn load_member(conn: &Connection, staff_id: StaffId) -> RepoResult<Option<StaffMember>> {
    let mut stmt = conn.prepare(&format!("{MEMBER_SELECT_SQL} WHERE staff_id = ?1;"))?;
    let mut rows = stmt.query(params![staff_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_member_row(row)?));
    }
    Ok(None)
}

fn load_insurance(conn: &Connection, staff_id: StaffId) -> RepoResult<Insurance> {
    let mut stmt = conn.prepare(
        "SELECT issued_on, description, premium, term, duration
         FROM insurance_policies
         WHERE staff_id = ?1;",
    )?;
    let mut rows = stmt.query(params![staff_id])?;
    let Some(row) = rows.next()? else {
        return Err(RepoError::InvalidData(format!(
            "staff member {staff_id} has no insurance row"
        )));
    };

    let premium_text: String = row.get("premium")?;
    let term_text: String = row.get("term")?;
    let term = parse_insurance_term(&term_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid insurance term `{term_text}` in insurance_policies.term"
        ))
    })?;

    Ok(Insurance {
        issued_on: row.get("issued_on")?,
        description: row.get("description")?,
        premium: parse_decimal(&premium_text, "insurance_policies.premium")?,
        term,
        duration: row.get("duration")?,
    })
}

fn load_detail(conn: &Connection, staff_id: StaffId) -> RepoResult<StaffDetail> {
    let employee = load_employee_detail(conn, staff_id)?;
    let volunteer = load_volunteer_detail(conn, staff_id)?;

    match (employee, volunteer) {
        (Some(detail), None) => Ok(StaffDetail::Employee(detail)),
        (None, Some(detail)) => Ok(StaffDetail::Volunteer(detail)),
        (Some(_), Some(_)) => Err(RepoError::InvalidData(format!(
            "staff member {staff_id} has both detail rows"
        ))),
        (None, None) => Err(RepoError::InvalidData(format!(
            "staff member {staff_id} has no detail row"
        ))),
    }
}

fn load_employee_detail(conn: &Connection, staff_id: StaffId) -> RepoResult<Option<EmployeeDetail>> {
    let mut stmt =
        conn.prepare("SELECT role, salary FROM employee_details WHERE staff_id = ?1;")?;
    let mut rows = stmt.query(params![staff_id])?;
    if let Some(row) = rows.next()? {
        let salary_text: String = row.get("salary")?;
        return Ok(Some(EmployeeDetail {
            role: row.get("role")?,
            salary: parse_decimal(&salary_text, "employee_details.salary")?,
        }));
    }
    Ok(None)
}

fn load_volunteer_detail(
    conn: &Connection,
    staff_id: StaffId,
) -> RepoResult<Option<VolunteerDetail>> {
    let mut stmt = conn.prepare(
        "SELECT occupation, language, program_id FROM volunteer_details WHERE staff_id = ?1;",
    )?;
    let mut rows = stmt.query(params![staff_id])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(VolunteerDetail {
            occupation: row.get("occupation")?,
            language: row.get("language")?,
            program_id: row.get("program_id")?,
        }));
    }
    Ok(None)
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<StaffMember> {
    let id_document_text: String = row.get("id_document")?;
    let id_document = parse_id_document(&id_document_text).ok_or_else(|| {
        RepoError::InvalidData(format!(
            "invalid id document kind `{id_document_text}` in staff_members.id_document"
        ))
    })?;

    Ok(StaffMember {
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        birth_date: row.get("birth_date")?,
        national_id: row.get("national_id")?,
        id_document,
        fiscal_number: row.get("fiscal_number")?,
        nationality: row.get("nationality")?,
        address: row.get("address")?,
    })
}

fn detail_table(kind: StaffKind) -> &'static str {
    match kind {
        StaffKind::Employee => "employee_details",
        StaffKind::Volunteer => "volunteer_details",
    }
}

fn id_document_to_db(kind: IdDocumentKind) -> &'static str {
    match kind {
        IdDocumentKind::NationalCard => "national_card",
        IdDocumentKind::CitizenCard => "citizen_card",
        IdDocumentKind::Passport => "passport",
    }
}

fn parse_id_document(value: &str) -> Option<IdDocumentKind> {
    match value {
        "national_card" => Some(IdDocumentKind::NationalCard),
        "citizen_card" => Some(IdDocumentKind::CitizenCard),
        "passport" => Some(IdDocumentKind::Passport),
        _ => None,
    }
}

fn insurance_term_to_db(term: InsuranceTerm) -> &'static str {
    match term {
        InsuranceTerm::Permanent => "permanent",
        InsuranceTerm::Temporary => "temporary",
    }
}

fn parse_insurance_term(value: &str) -> Option<InsuranceTerm> {
    match value {
        "permanent" => Some(InsuranceTerm::Permanent),
        "temporary" => Some(InsuranceTerm::Temporary),
        _ => None,
    }
}
