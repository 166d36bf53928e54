use chrono::NaiveDate;
use rust_decimal::Decimal;
use rusqlite::Connection;
use staffdesk_core::db::open_db;
use staffdesk_core::{
    Contact, ContactKind, EmergencyContact, EmployeeDetail, IdDocumentKind, Insurance,
    InsuranceTerm, SqliteStore, StaffDetail, StaffDirectory, StaffMember, StaffRegistration,
    VolunteerDetail,
};
use std::path::PathBuf;
use tempfile::TempDir;

#[test]
fn register_employee_commits_all_rows() {
    let (_dir, directory, path) = temp_directory();

    assert!(directory.register_staff_member(&employee_registration("11111111")));

    let conn = open_db(&path).unwrap();
    assert_eq!(count(&conn, "staff_members"), 1);
    assert_eq!(count(&conn, "insurance_policies"), 1);
    assert_eq!(count(&conn, "employee_details"), 1);
    assert_eq!(count(&conn, "volunteer_details"), 0);
    assert_eq!(count(&conn, "contacts"), 2);
    assert_eq!(count(&conn, "emergency_contacts"), 0);

    let staff_id = staff_id_of(&conn, "11111111");
    assert_eq!(dependent_ids(&conn, "insurance_policies"), vec![staff_id]);
    assert_eq!(dependent_ids(&conn, "employee_details"), vec![staff_id]);
    assert_eq!(dependent_ids(&conn, "contacts"), vec![staff_id]);
}

#[test]
fn register_volunteer_with_emergency_contacts_commits_batches() {
    let (_dir, directory, path) = temp_directory();
    seed_program(&path, "P-100");

    let registration = StaffRegistration {
        member: sample_member("22222222"),
        insurance: sample_insurance(date(2026, 2, 14)),
        detail: volunteer_detail("P-100"),
        contacts: vec![
            contact(1, "v1@example.org", ContactKind::Email),
            contact(2, "912000010", ContactKind::Phone),
            contact(3, "912000011", ContactKind::Phone),
            contact(4, "v2@example.org", ContactKind::Email),
            contact(5, "912000012", ContactKind::Phone),
        ],
        emergency_contacts: vec![
            emergency(2, "Rui Costa", "brother"),
            emergency(3, "Marta Costa", "mother"),
            emergency(5, "Joao Costa", "father"),
        ],
    };
    assert!(directory.register_staff_member(&registration));

    let conn = open_db(&path).unwrap();
    assert_eq!(count(&conn, "contacts"), 5);
    assert_eq!(count(&conn, "emergency_contacts"), 3);
    assert_eq!(count(&conn, "volunteer_details"), 1);
    assert_eq!(count(&conn, "employee_details"), 0);

    let staff_id = staff_id_of(&conn, "22222222");
    assert_eq!(dependent_ids(&conn, "contacts"), vec![staff_id]);
    assert_eq!(dependent_ids(&conn, "emergency_contacts"), vec![staff_id]);
}

#[test]
fn registered_data_reads_back_field_for_field() {
    let (_dir, directory, path) = temp_directory();
    seed_program(&path, "P-200");

    // Contacts supplied out of priority order on purpose.
    let registration = StaffRegistration {
        member: sample_member("33333333"),
        insurance: sample_insurance(date(2025, 11, 30)),
        detail: volunteer_detail("P-200"),
        contacts: vec![
            contact(3, "912000021", ContactKind::Phone),
            contact(1, "back@example.org", ContactKind::Email),
            contact(2, "912000020", ContactKind::Phone),
        ],
        emergency_contacts: vec![emergency(3, "Ines Rocha", "sister"), emergency(1, "Pedro Rocha", "father")],
    };
    assert!(directory.register_staff_member(&registration));

    let conn = open_db(&path).unwrap();
    let staff_id = staff_id_of(&conn, "33333333");
    drop(conn);

    let record = directory.load_registration(staff_id).unwrap();
    assert_eq!(record.staff_id, staff_id);
    assert_eq!(record.member, registration.member);
    assert_eq!(record.insurance, registration.insurance);
    assert_eq!(record.detail, registration.detail);

    let read_orders: Vec<i64> = record.contacts.iter().map(|c| c.order_no).collect();
    assert_eq!(read_orders, vec![1, 2, 3]);
    assert_eq!(record.contacts[0], contact(1, "back@example.org", ContactKind::Email));
    assert_eq!(record.contacts[1], contact(2, "912000020", ContactKind::Phone));
    assert_eq!(record.contacts[2], contact(3, "912000021", ContactKind::Phone));

    let emergency_orders: Vec<i64> = record.emergency_contacts.iter().map(|c| c.order_no).collect();
    assert_eq!(emergency_orders, vec![1, 3]);
}

#[test]
fn volunteer_referencing_missing_program_rolls_back_everything() {
    let (_dir, directory, path) = temp_directory();

    let registration = StaffRegistration {
        member: sample_member("44444444"),
        insurance: sample_insurance(date(2026, 1, 10)),
        detail: volunteer_detail("P-404"),
        contacts: vec![contact(1, "gone@example.org", ContactKind::Email)],
        emergency_contacts: Vec::new(),
    };
    // The member and insurance inserts succeed before the detail insert
    // hits the missing program; nothing of that may survive.
    assert!(!directory.register_staff_member(&registration));

    let conn = open_db(&path).unwrap();
    assert_eq!(count(&conn, "staff_members"), 0);
    assert_eq!(count(&conn, "insurance_policies"), 0);
    assert_eq!(count(&conn, "volunteer_details"), 0);
    assert_eq!(count(&conn, "contacts"), 0);
}

#[test]
fn duplicate_national_id_rolls_back_second_registration() {
    let (_dir, directory, path) = temp_directory();

    assert!(directory.register_staff_member(&employee_registration("55555555")));

    let mut second = employee_registration("55555555");
    second.member.first_name = "Clara".to_string();
    second.contacts = vec![contact(1, "clara@example.org", ContactKind::Email)];
    assert!(!directory.register_staff_member(&second));

    let conn = open_db(&path).unwrap();
    assert_eq!(count(&conn, "staff_members"), 1);
    assert_eq!(count(&conn, "insurance_policies"), 1);
    assert_eq!(count(&conn, "employee_details"), 1);
    assert_eq!(count(&conn, "contacts"), 2);

    let staff_id = staff_id_of(&conn, "55555555");
    drop(conn);
    let record = directory.load_registration(staff_id).unwrap();
    assert_eq!(record.member.first_name, "Ana");
}

#[test]
fn structural_violations_commit_nothing() {
    let (_dir, directory, path) = temp_directory();

    let mut no_contacts = employee_registration("66666666");
    no_contacts.contacts.clear();
    assert!(!directory.register_staff_member(&no_contacts));

    let mut duplicate_order = employee_registration("66666666");
    duplicate_order.contacts = vec![
        contact(1, "a@example.org", ContactKind::Email),
        contact(1, "b@example.org", ContactKind::Email),
    ];
    assert!(!directory.register_staff_member(&duplicate_order));

    let mut unmatched_emergency = employee_registration("66666666");
    unmatched_emergency.emergency_contacts = vec![emergency(9, "Nuno Dias", "uncle")];
    assert!(!directory.register_staff_member(&unmatched_emergency));

    let conn = open_db(&path).unwrap();
    assert_eq!(count(&conn, "staff_members"), 0);
    assert_eq!(count(&conn, "contacts"), 0);
    assert_eq!(count(&conn, "emergency_contacts"), 0);
}

#[test]
fn load_registration_for_unknown_identity_is_none() {
    let (_dir, directory, _path) = temp_directory();
    assert!(directory.load_registration(4242).is_none());
}

#[test]
fn operations_report_failure_when_store_cannot_open() {
    let dir = tempfile::tempdir().unwrap();
    let unreachable = dir.path().join("missing-subdir").join("staffdesk.db");
    let directory = StaffDirectory::new(SqliteStore::new(unreachable));

    assert!(!directory.register_staff_member(&employee_registration("77777777")));
    assert!(directory.list_programs(&Default::default()).is_none());
    assert!(directory.check_store().is_none());
}

fn temp_directory() -> (TempDir, StaffDirectory<SqliteStore>, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("staffdesk.db");
    let directory = StaffDirectory::new(SqliteStore::new(&path));
    (dir, directory, path)
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn sample_member(national_id: &str) -> StaffMember {
    StaffMember {
        first_name: "Ana".to_string(),
        last_name: "Moreira".to_string(),
        birth_date: date(1994, 5, 17),
        national_id: national_id.to_string(),
        id_document: IdDocumentKind::CitizenCard,
        fiscal_number: Some("254117893".to_string()),
        nationality: "Portuguese".to_string(),
        address: "Rua das Flores 12, Porto".to_string(),
    }
}

fn sample_insurance(issued_on: NaiveDate) -> Insurance {
    Insurance {
        issued_on,
        description: "Accident coverage".to_string(),
        premium: Decimal::new(4950, 2),
        term: InsuranceTerm::Temporary,
        duration: 12,
    }
}

fn employee_registration(national_id: &str) -> StaffRegistration {
    StaffRegistration {
        member: sample_member(national_id),
        insurance: sample_insurance(date(2026, 3, 1)),
        detail: StaffDetail::Employee(EmployeeDetail {
            role: "Coordinator".to_string(),
            salary: Decimal::new(185000, 2),
        }),
        contacts: vec![
            contact(1, "ana@example.org", ContactKind::Email),
            contact(2, "912000001", ContactKind::Phone),
        ],
        emergency_contacts: Vec::new(),
    }
}

fn volunteer_detail(program_id: &str) -> StaffDetail {
    StaffDetail::Volunteer(VolunteerDetail {
        occupation: "Student".to_string(),
        language: "Portuguese".to_string(),
        program_id: program_id.to_string(),
    })
}

fn contact(order_no: i64, value: &str, kind: ContactKind) -> Contact {
    Contact {
        order_no,
        value: value.to_string(),
        kind,
    }
}

fn emergency(order_no: i64, contact_name: &str, kinship: &str) -> EmergencyContact {
    EmergencyContact {
        order_no,
        contact_name: contact_name.to_string(),
        kinship: kinship.to_string(),
    }
}

fn seed_program(path: &PathBuf, program_id: &str) {
    let conn = open_db(path).unwrap();
    conn.execute(
        "INSERT INTO programs (program_id, area_code, name, start_date, end_date, min_age, cost, term)
         VALUES (?1, 'ED', 'Literacy outreach', '2026-09-01', '2027-06-30', 16, '250.00', 'short_term');",
        [program_id],
    )
    .unwrap();
}

fn staff_id_of(conn: &Connection, national_id: &str) -> i64 {
    conn.query_row(
        "SELECT staff_id FROM staff_members WHERE national_id = ?1;",
        [national_id],
        |row| row.get(0),
    )
    .unwrap()
}

fn count(conn: &Connection, table: &str) -> i64 {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
        row.get(0)
    })
    .unwrap()
}

fn dependent_ids(conn: &Connection, table: &str) -> Vec<i64> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT DISTINCT staff_id FROM {table} ORDER BY staff_id;"
        ))
        .unwrap();
    let ids = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<i64>, _>>()
        .unwrap();
    ids
}
