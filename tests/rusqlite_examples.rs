use employee_catalog::employees::{
    self, all_employees, employees_table, load_fixture, manager_cycles,
    orphaned_manager_references, verify_integrity, Employee,
};
use employee_catalog::{CatalogError, Result};
use rusqlite::{params, Connection, OptionalExtension};
use tempfile::NamedTempFile;

// Helper function to create an in-memory database for testing
fn create_test_db() -> Result<Connection> {
    let mut conn = Connection::open_in_memory()?;
    initialize_schema(&conn, true)?;
    load_fixture(&mut conn)?;
    Ok(conn)
}

// Helper function to create a temporary file-based database
fn create_temp_db() -> Result<(Connection, NamedTempFile)> {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap();
    let mut conn = Connection::open(path)?;
    initialize_schema(&conn, true)?;
    load_fixture(&mut conn)?;
    Ok((conn, temp_file))
}

fn initialize_schema(conn: &Connection, foreign_keys: bool) -> Result<()> {
    let pragma = if foreign_keys { "ON" } else { "OFF" };
    conn.execute_batch(&format!("PRAGMA foreign_keys = {pragma};"))?;
    conn.execute_batch(&employees_table().create_sql())?;
    Ok(())
}

fn insert_employee(conn: &Connection, id: i64, manager_id: Option<i64>) -> Result<usize> {
    Employee {
        employee_id: id,
        employee_name: format!("Employee {id}"),
        department: Some("IT".to_string()),
        salary: Some(40000.0),
        hire_date: None,
        manager_id,
    }
    .to_create_operation()
    .execute(conn)
}

#[tokio::test]
async fn test_fixture_rows() {
    test_fixture_rows_impl().unwrap();
}

fn test_fixture_rows_impl() -> Result<()> {
    let conn = create_test_db()?;

    let count: i64 = conn.query_row("SELECT COUNT(*) FROM employees", [], |row| row.get(0))?;
    assert_eq!(count, 5);

    for id in 1..=5 {
        let occurrences: i64 = conn.query_row(
            "SELECT COUNT(*) FROM employees WHERE employee_id = ?",
            [id],
            |row| row.get(0),
        )?;
        assert_eq!(occurrences, 1, "employee {id} should appear once");
    }

    let missing: Option<String> = conn
        .query_row(
            "SELECT employee_name FROM employees WHERE employee_id = ?",
            [6],
            |row| row.get(0),
        )
        .optional()?;
    assert!(missing.is_none());
    Ok(())
}

#[tokio::test]
async fn test_typed_read_matches_fixture() {
    test_typed_read_matches_fixture_impl().unwrap();
}

fn test_typed_read_matches_fixture_impl() -> Result<()> {
    let conn = create_test_db()?;
    let rows = all_employees(&conn)?;
    assert_eq!(rows, employees::fixture());

    let john = &rows[0];
    assert_eq!(john.employee_name, "John Smith");
    assert_eq!(john.salary, Some(60000.0));
    assert_eq!(
        john.hire_date.map(|d| d.to_string()),
        Some("2020-01-15".to_string())
    );
    assert_eq!(john.manager_id, None);
    Ok(())
}

#[tokio::test]
async fn test_fixture_load_is_idempotent() {
    test_fixture_load_is_idempotent_impl().unwrap();
}

fn test_fixture_load_is_idempotent_impl() -> Result<()> {
    let mut conn = create_test_db()?;
    let before = all_employees(&conn)?;
    assert_eq!(load_fixture(&mut conn)?, 5);
    assert_eq!(load_fixture(&mut conn)?, 5);
    assert_eq!(all_employees(&conn)?, before);
    Ok(())
}

#[tokio::test]
async fn test_manager_references_resolve() {
    test_manager_references_resolve_impl().unwrap();
}

fn test_manager_references_resolve_impl() -> Result<()> {
    let conn = create_test_db()?;
    assert!(orphaned_manager_references(&conn)?.is_empty());
    assert!(manager_cycles(&conn)?.is_empty());
    verify_integrity(&conn)?;

    let dangling: i64 = conn.query_row(
        "SELECT COUNT(*) FROM employees e
         WHERE e.manager_id IS NOT NULL
           AND NOT EXISTS (SELECT 1 FROM employees m WHERE m.employee_id = e.manager_id)",
        [],
        |row| row.get(0),
    )?;
    assert_eq!(dangling, 0);
    Ok(())
}

#[test]
fn test_dangling_manager_rejected_with_foreign_keys() {
    let conn = create_test_db().unwrap();
    let err = insert_employee(&conn, 6, Some(99)).unwrap_err();
    assert!(matches!(err, CatalogError::Sqlite(_)), "unexpected error: {err}");

    insert_employee(&conn, 6, Some(4)).unwrap();
    assert!(orphaned_manager_references(&conn).unwrap().is_empty());
}

#[test]
fn test_dangling_manager_detected_without_foreign_keys() {
    let mut conn = Connection::open_in_memory().unwrap();
    initialize_schema(&conn, false).unwrap();
    load_fixture(&mut conn).unwrap();

    insert_employee(&conn, 6, Some(99)).unwrap();
    assert_eq!(orphaned_manager_references(&conn).unwrap(), vec![6]);
    let err = verify_integrity(&conn).unwrap_err();
    assert!(matches!(err, CatalogError::IntegrityViolation(_)));
}

#[test]
fn test_manager_cycle_detected() {
    let conn = create_test_db().unwrap();
    // 1 -> 5 -> 2 -> 1
    conn.execute(
        "UPDATE employees SET manager_id = ? WHERE employee_id = ?",
        params![5, 1],
    )
    .unwrap();
    assert_eq!(manager_cycles(&conn).unwrap(), vec![1, 2, 5]);
    assert!(matches!(
        verify_integrity(&conn),
        Err(CatalogError::IntegrityViolation(_))
    ));
}

#[tokio::test]
async fn test_file_backed_database() {
    test_file_backed_database_impl().unwrap();
}

fn test_file_backed_database_impl() -> Result<()> {
    let (conn, temp_file) = create_temp_db()?;
    drop(conn);

    let conn = Connection::open(temp_file.path())?;
    let rows = all_employees(&conn)?;
    assert_eq!(rows.len(), 5);
    assert_eq!(rows[3].employee_name, "Sarah Williams");
    Ok(())
}
