//! The `employees` table: schema, the five seed rows, and integrity checks
//! over the manager relation.

use chrono::NaiveDate;
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::error::{CatalogError, Result};
use crate::sqlite::{
    ColumnDefinition, CreateOperation, DataType, ForeignKey, IndexDefinition, TableDefinition,
};

pub const TABLE_NAME: &str = "employees";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Employee {
    pub employee_id: i64,
    pub employee_name: String,
    pub department: Option<String>,
    pub salary: Option<f64>,
    pub hire_date: Option<NaiveDate>,
    pub manager_id: Option<i64>,
}

impl Employee {
    pub fn to_create_operation(&self) -> CreateOperation {
        CreateOperation::new(TABLE_NAME)
            .with_value("employee_id", self.employee_id)
            .with_value("employee_name", self.employee_name.as_str())
            .with_value("department", self.department.clone())
            .with_value("salary", self.salary)
            .with_value("hire_date", self.hire_date)
            .with_value("manager_id", self.manager_id)
    }
}

/// Table definition including the manager foreign key and the indexes the
/// catalog installs.
pub fn employees_table() -> TableDefinition {
    TableDefinition {
        name: TABLE_NAME.to_string(),
        columns: vec![
            ColumnDefinition::new("employee_id", DataType::Integer).not_null(),
            ColumnDefinition::new("employee_name", DataType::Varchar(100)).not_null(),
            ColumnDefinition::new("department", DataType::Varchar(50)),
            ColumnDefinition::new(
                "salary",
                DataType::Decimal {
                    precision: 10,
                    scale: 2,
                },
            ),
            ColumnDefinition::new("hire_date", DataType::Date),
            ColumnDefinition::new("manager_id", DataType::Integer),
        ],
        primary_key: vec!["employee_id".to_string()],
        foreign_keys: vec![ForeignKey {
            column: "manager_id".to_string(),
            foreign_table: TABLE_NAME.to_string(),
            foreign_column: "employee_id".to_string(),
        }],
        indexes: vec![
            IndexDefinition::new("idx_employees_department", &["department"]),
            IndexDefinition::new("idx_employees_hire_date", &["hire_date"]),
            IndexDefinition::new("idx_employees_manager_id", &["manager_id"]),
            IndexDefinition::new("idx_employees_salary", &["salary"]),
            IndexDefinition::new("idx_employees_department_salary", &["department", "salary"]),
        ],
    }
}

fn seed(
    employee_id: i64,
    employee_name: &str,
    department: &str,
    salary: f64,
    hire_date: (i32, u32, u32),
    manager_id: Option<i64>,
) -> Employee {
    let (y, m, d) = hire_date;
    Employee {
        employee_id,
        employee_name: employee_name.to_string(),
        department: Some(department.to_string()),
        salary: Some(salary),
        hire_date: NaiveDate::from_ymd_opt(y, m, d),
        manager_id,
    }
}

/// Seed rows, ordered so every manager precedes its reports.
pub fn fixture() -> Vec<Employee> {
    vec![
        seed(1, "John Smith", "IT", 60000.00, (2020, 1, 15), None),
        seed(2, "Jane Doe", "HR", 55000.00, (2019, 3, 20), Some(1)),
        seed(3, "Mike Johnson", "Finance", 70000.00, (2018, 6, 10), Some(1)),
        seed(4, "Sarah Williams", "IT", 65000.00, (2021, 2, 28), Some(1)),
        seed(5, "David Brown", "HR", 50000.00, (2022, 7, 5), Some(2)),
    ]
}

/// Replace the table contents with the fixture in a single transaction.
/// Returns the number of inserted rows.
pub fn load_fixture(conn: &mut Connection) -> Result<usize> {
    let tx = conn.transaction()?;
    tx.execute(&format!("DELETE FROM {TABLE_NAME}"), [])?;
    let mut inserted = 0;
    for employee in fixture() {
        inserted += employee.to_create_operation().execute(&tx)?;
    }
    tx.commit()?;
    tracing::info!(rows = inserted, "employee fixture loaded");
    Ok(inserted)
}

pub fn all_employees(conn: &Connection) -> Result<Vec<Employee>> {
    let mut stmt = conn.prepare(
        "SELECT employee_id, employee_name, department, salary, hire_date, manager_id
         FROM employees ORDER BY employee_id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(Employee {
            employee_id: row.get(0)?,
            employee_name: row.get(1)?,
            department: row.get(2)?,
            salary: row.get(3)?,
            hire_date: row.get(4)?,
            manager_id: row.get(5)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

/// Employees whose `manager_id` names a row that does not exist.
pub fn orphaned_manager_references(conn: &Connection) -> Result<Vec<i64>> {
    let mut stmt = conn.prepare(
        "SELECT e.employee_id
         FROM employees e
         LEFT JOIN employees m ON e.manager_id = m.employee_id
         WHERE e.manager_id IS NOT NULL AND m.employee_id IS NULL
         ORDER BY e.employee_id",
    )?;
    let ids = stmt.query_map([], |row| row.get(0))?;
    Ok(ids.collect::<rusqlite::Result<Vec<i64>>>()?)
}

/// Employees that reach themselves by following `manager_id`. The walk is
/// bounded by the row count, so it terminates on any data.
pub fn manager_cycles(conn: &Connection) -> Result<Vec<i64>> {
    let total: i64 = conn.query_row(&format!("SELECT COUNT(*) FROM {TABLE_NAME}"), [], |row| {
        row.get(0)
    })?;
    let mut stmt = conn.prepare(
        "WITH RECURSIVE walk(start_id, current_id, steps) AS (
             SELECT employee_id, manager_id, 1 FROM employees WHERE manager_id IS NOT NULL
             UNION ALL
             SELECT w.start_id, e.manager_id, w.steps + 1
             FROM walk w
             JOIN employees e ON e.employee_id = w.current_id
             WHERE e.manager_id IS NOT NULL
               AND w.current_id <> w.start_id
               AND w.steps <= ?1
         )
         SELECT DISTINCT start_id FROM walk WHERE current_id = start_id ORDER BY start_id",
    )?;
    let ids = stmt.query_map(params![total], |row| row.get(0))?;
    Ok(ids.collect::<rusqlite::Result<Vec<i64>>>()?)
}

/// Fails when the manager relation is not a forest of existing rows.
pub fn verify_integrity(conn: &Connection) -> Result<()> {
    let orphans = orphaned_manager_references(conn)?;
    if !orphans.is_empty() {
        return Err(CatalogError::IntegrityViolation(format!(
            "employees {orphans:?} reference missing managers"
        )));
    }
    let cycles = manager_cycles(conn)?;
    if !cycles.is_empty() {
        return Err(CatalogError::IntegrityViolation(format!(
            "employees {cycles:?} are their own indirect managers"
        )));
    }
    Ok(())
}
