use workforce_core::db::migrations::latest_version;
use workforce_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "departments");
    assert_table_exists(&conn, "jobs");
    assert_table_exists(&conn, "employees");
}

#[test]
fn employees_reference_departments_and_jobs() {
    let conn = open_db_in_memory().unwrap();
    let mut stmt = conn
        .prepare("SELECT \"table\", \"from\" FROM pragma_foreign_key_list('employees') ORDER BY \"from\";")
        .unwrap();
    let references: Vec<(String, String)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert_eq!(
        references,
        vec![
            ("departments".to_string(), "department_id".to_string()),
            ("jobs".to_string(), "job_id".to_string()),
        ]
    );
}

#[test]
fn file_database_keeps_committed_rows_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workforce.db");

    let conn = open_db(&path).unwrap();
    conn.execute("INSERT INTO jobs (id, title) VALUES (1, 'Engineer');", [])
        .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    let title: String = conn
        .query_row("SELECT title FROM jobs WHERE id = 1;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(title, "Engineer");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("workforce.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "employees");
}

#[test]
fn strict_tables_reject_mistyped_and_blank_values() {
    let conn = open_db_in_memory().unwrap();

    assert!(conn
        .execute("INSERT INTO departments (id, name) VALUES ('one', 'Ops');", [])
        .is_err());
    assert!(conn
        .execute("INSERT INTO departments (id, name) VALUES (1, '   ');", [])
        .is_err());
    assert!(conn
        .execute("INSERT INTO employees (id, name, job_id) VALUES (1, 'Ada', 9);", [])
        .is_err());
    conn.execute("INSERT INTO employees (id, name) VALUES (1, 'Ada');", [])
        .unwrap();
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
