//! Contact and emergency-contact persistence.
//!
//! # Responsibility
//! - Batch-insert the two contact lists of a registration, one prepared
//!   statement per entity type.
//! - Read contacts back in priority order and serve the recent-contacts
//!   report.
//!
//! # Invariants
//! - Reads order by `order_no` ascending.
//! - Batch inserts run on the caller's transaction; a failing row aborts
//!   the set.

use crate::db::batch::insert_all;
use crate::model::contact::{Contact, ContactKind, ContactReportQuery, EmergencyContact};
use crate::model::staff::StaffId;
use crate::repo::staff_repo::{RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Batch-inserts all contacts of one member; returns the rows inserted.
pub fn insert_contacts(
    conn: &Connection,
    staff_id: StaffId,
    contacts: &[Contact],
) -> RepoResult<usize> {
    let inserted = insert_all(
        conn,
        "INSERT INTO contacts (staff_id, order_no, value, kind) VALUES (?1, ?2, ?3, ?4);",
        contacts,
        |contact| {
            vec![
                Value::Integer(staff_id),
                Value::Integer(contact.order_no),
                Value::Text(contact.value.clone()),
                Value::Text(contact_kind_to_db(contact.kind).to_string()),
            ]
        },
    )?;
    Ok(inserted)
}

/// Batch-inserts the emergency annotations; returns the rows inserted.
///
/// Each row references a contact of the same member by `order_no`; the
/// composite foreign key rejects annotations of absent contacts.
pub fn insert_emergency_contacts(
    conn: &Connection,
    staff_id: StaffId,
    contacts: &[EmergencyContact],
) -> RepoResult<usize> {
    let inserted = insert_all(
        conn,
        "INSERT INTO emergency_contacts (staff_id, order_no, contact_name, kinship)
         VALUES (?1, ?2, ?3, ?4);",
        contacts,
        |contact| {
            vec![
                Value::Integer(staff_id),
                Value::Integer(contact.order_no),
                Value::Text(contact.contact_name.clone()),
                Value::Text(contact.kinship.clone()),
            ]
        },
    )?;
    Ok(inserted)
}

/// Contacts of one member, priority order.
pub fn contacts_for(conn: &Connection, staff_id: StaffId) -> RepoResult<Vec<Contact>> {
    let mut stmt = conn.prepare(
        "SELECT order_no, value, kind
         FROM contacts
         WHERE staff_id = ?1
         ORDER BY order_no ASC;",
    )?;

    let mut rows = stmt.query(params![staff_id])?;
    let mut contacts = Vec::new();
    while let Some(row) = rows.next()? {
        contacts.push(parse_contact_row(row)?);
    }

    Ok(contacts)
}

/// Emergency annotations of one member, priority order.
pub fn emergency_for(conn: &Connection, staff_id: StaffId) -> RepoResult<Vec<EmergencyContact>> {
    let mut stmt = conn.prepare(
        "SELECT order_no, contact_name, kinship
         FROM emergency_contacts
         WHERE staff_id = ?1
         ORDER BY order_no ASC;",
    )?;

    let mut rows = stmt.query(params![staff_id])?;
    let mut contacts = Vec::new();
    while let Some(row) = rows.next()? {
        contacts.push(EmergencyContact {
            order_no: row.get("order_no")?,
            contact_name: row.get("contact_name")?,
            kinship: row.get("kinship")?,
        });
    }

    Ok(contacts)
}

/// Contacts of members whose insurance was issued on or after
/// `issued_since`, split by emergency annotation and optionally by kind.
pub fn list_recent_contacts(
    conn: &Connection,
    query: &ContactReportQuery,
    issued_since: NaiveDate,
) -> RepoResult<Vec<Contact>> {
    let emergency_predicate = if query.emergency_only {
        "EXISTS"
    } else {
        "NOT EXISTS"
    };
    let mut sql = format!(
        "SELECT c.order_no, c.value, c.kind
         FROM contacts c
         WHERE {emergency_predicate} (
             SELECT 1 FROM emergency_contacts e
             WHERE e.staff_id = c.staff_id AND e.order_no = c.order_no
         )
           AND EXISTS (
             SELECT 1 FROM insurance_policies i
             WHERE i.staff_id = c.staff_id AND i.issued_on >= ?
         )"
    );
    let mut bind_values: Vec<Value> = vec![Value::Text(issued_since.to_string())];

    if let Some(kind) = query.kind {
        sql.push_str(" AND c.kind = ?");
        bind_values.push(Value::Text(contact_kind_to_db(kind).to_string()));
    }

    sql.push_str(" ORDER BY c.staff_id ASC, c.order_no ASC;");

    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query(params_from_iter(bind_values))?;
    let mut contacts = Vec::new();

    while let Some(row) = rows.next()? {
        contacts.push(parse_contact_row(row)?);
    }

    Ok(contacts)
}

fn parse_contact_row(row: &Row<'_>) -> RepoResult<Contact> {
    let kind_text: String = row.get("kind")?;
    let kind = parse_contact_kind(&kind_text).ok_or_else(|| {
        RepoError::InvalidData(format!("invalid contact kind `{kind_text}` in contacts.kind"))
    })?;

    Ok(Contact {
        order_no: row.get("order_no")?,
        value: row.get("value")?,
        kind,
    })
}

fn contact_kind_to_db(kind: ContactKind) -> &'static str {
    match kind {
        ContactKind::Email => "email",
        ContactKind::Phone => "phone",
    }
}

fn parse_contact_kind(value: &str) -> Option<ContactKind> {
    match value {
        "email" => Some(ContactKind::Email),
        "phone" => Some(ContactKind::Phone),
        _ => None,
    }
}
