//! Named SQL statements over the `employees` table, grouped by technique.
//!
//! Entries are independent of each other apart from the query entries that
//! read from views, which need the matching view definition installed first.
//! Definitions are re-runnable: views are dropped and recreated, indexes use
//! `IF NOT EXISTS`.

use std::{fmt, str::FromStr};

use rusqlite::Connection;

use crate::employees;
use crate::error::{CatalogError, Result};
use crate::sqlite::{query_result_set, ResultSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Technique {
    FilterSort,
    Aggregation,
    Join,
    Subquery,
    AggregateFunction,
    View,
    Index,
    Cte,
    Window,
}

impl Technique {
    pub const ALL: [Technique; 9] = [
        Technique::FilterSort,
        Technique::Aggregation,
        Technique::Join,
        Technique::Subquery,
        Technique::AggregateFunction,
        Technique::View,
        Technique::Index,
        Technique::Cte,
        Technique::Window,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Technique::FilterSort => "filter-sort",
            Technique::Aggregation => "aggregation",
            Technique::Join => "join",
            Technique::Subquery => "subquery",
            Technique::AggregateFunction => "aggregate-function",
            Technique::View => "view",
            Technique::Index => "index",
            Technique::Cte => "cte",
            Technique::Window => "window",
        }
    }
}

impl fmt::Display for Technique {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Technique {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Technique::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown technique '{s}'"))
    }
}

/// Definitions change the schema (views, indexes); queries only read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementKind {
    Definition,
    Query,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry {
    pub name: String,
    pub technique: Technique,
    pub kind: StatementKind,
    pub description: &'static str,
    pub sql: String,
}

impl CatalogEntry {
    fn query(
        name: &str,
        technique: Technique,
        description: &'static str,
        sql: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            technique,
            kind: StatementKind::Query,
            description,
            sql: sql.trim().to_string(),
        }
    }

    fn view(name: &str, description: &'static str, select: &str) -> Self {
        Self {
            name: name.to_string(),
            technique: Technique::View,
            kind: StatementKind::Definition,
            description,
            sql: format!(
                "DROP VIEW IF EXISTS {name};\nCREATE VIEW {name} AS\n{};",
                select.trim()
            ),
        }
    }

    /// Run the entry. Definitions return an empty result set.
    pub fn execute(&self, conn: &Connection) -> Result<ResultSet> {
        tracing::debug!(entry = %self.name, technique = %self.technique, "executing catalog entry");
        match self.kind {
            StatementKind::Definition => {
                conn.execute_batch(&self.sql)?;
                Ok(ResultSet::default())
            }
            StatementKind::Query => query_result_set(conn, &self.sql, []),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn standard() -> Self {
        let mut entries = Vec::new();
        entries.extend(filter_sort());
        entries.extend(aggregation());
        entries.extend(joins());
        entries.extend(subqueries());
        entries.extend(aggregate_functions());
        entries.extend(views());
        entries.extend(indexes());
        entries.extend(ctes());
        entries.extend(windows());
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, name: &str) -> Result<&CatalogEntry> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| CatalogError::UnknownEntry(name.to_string()))
    }

    pub fn by_technique(&self, technique: Technique) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(move |e| e.technique == technique)
    }

    pub fn definitions(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries
            .iter()
            .filter(|e| e.kind == StatementKind::Definition)
    }

    pub fn queries(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter().filter(|e| e.kind == StatementKind::Query)
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn filter_sort() -> Vec<CatalogEntry> {
    use Technique::FilterSort;
    vec![
        CatalogEntry::query(
            "it_employees_by_salary",
            FilterSort,
            "IT employees, highest salary first",
            "SELECT employee_id, employee_name, salary
             FROM employees
             WHERE department = 'IT'
             ORDER BY salary DESC",
        ),
        CatalogEntry::query(
            "salary_between",
            FilterSort,
            "Employees earning between 55000 and 65000 inclusive",
            "SELECT employee_id, employee_name, department, salary
             FROM employees
             WHERE salary BETWEEN 55000 AND 65000
             ORDER BY salary ASC, employee_id ASC",
        ),
        CatalogEntry::query(
            "hired_between",
            FilterSort,
            "Employees hired from 2019 through 2021",
            "SELECT employee_id, employee_name, hire_date
             FROM employees
             WHERE hire_date BETWEEN '2019-01-01' AND '2021-12-31'
             ORDER BY hire_date ASC",
        ),
    ]
}

fn aggregation() -> Vec<CatalogEntry> {
    use Technique::Aggregation;
    vec![
        CatalogEntry::query(
            "department_average_salary",
            Aggregation,
            "Head count and average salary per department",
            "SELECT department,
                    COUNT(*) AS employee_count,
                    ROUND(AVG(salary), 2) AS avg_salary
             FROM employees
             GROUP BY department
             ORDER BY department",
        ),
        CatalogEntry::query(
            "hires_per_year_and_department",
            Aggregation,
            "Hires grouped by hire year and department",
            "SELECT strftime('%Y', hire_date) AS hire_year,
                    department,
                    COUNT(*) AS hires
             FROM employees
             GROUP BY hire_year, department
             ORDER BY hire_year, department",
        ),
        CatalogEntry::query(
            "departments_above_55000",
            Aggregation,
            "Departments whose average salary exceeds 55000",
            "SELECT department, ROUND(AVG(salary), 2) AS avg_salary
             FROM employees
             GROUP BY department
             HAVING AVG(salary) > 55000
             ORDER BY avg_salary DESC",
        ),
    ]
}

fn joins() -> Vec<CatalogEntry> {
    use Technique::Join;
    vec![
        CatalogEntry::query(
            "employees_with_managers",
            Join,
            "Employees that have a manager, with the manager's name",
            "SELECT e.employee_id, e.employee_name AS employee, m.employee_name AS manager
             FROM employees e
             INNER JOIN employees m ON e.manager_id = m.employee_id
             ORDER BY e.employee_id",
        ),
        CatalogEntry::query(
            "employees_with_optional_manager",
            Join,
            "Every employee, manager name NULL for roots",
            "SELECT e.employee_id, e.employee_name AS employee, m.employee_name AS manager
             FROM employees e
             LEFT JOIN employees m ON e.manager_id = m.employee_id
             ORDER BY e.employee_id",
        ),
        CatalogEntry::query(
            "managers_with_reports",
            Join,
            "Every employee as a potential manager, with reports NULL-filled",
            "SELECT m.employee_id AS manager_id, m.employee_name AS manager,
                    e.employee_name AS report
             FROM employees e
             RIGHT JOIN employees m ON e.manager_id = m.employee_id
             ORDER BY m.employee_id, e.employee_id",
        ),
        CatalogEntry::query(
            "same_department_colleagues",
            Join,
            "Pairs of distinct employees sharing a department",
            "SELECT e1.employee_id, e1.employee_name AS employee,
                    e2.employee_id AS colleague_id, e2.employee_name AS colleague,
                    e1.department
             FROM employees e1
             JOIN employees e2
               ON e1.department = e2.department
              AND e1.employee_id <> e2.employee_id
             ORDER BY e1.employee_id, e2.employee_id",
        ),
    ]
}

fn subqueries() -> Vec<CatalogEntry> {
    use Technique::Subquery;
    vec![
        CatalogEntry::query(
            "above_average_salary",
            Subquery,
            "Employees earning more than the company average",
            "SELECT employee_id, employee_name, salary
             FROM employees
             WHERE salary > (SELECT AVG(salary) FROM employees)
             ORDER BY salary DESC",
        ),
        CatalogEntry::query(
            "highest_paid_per_department",
            Subquery,
            "Top earner of each department via a correlated MAX",
            "SELECT e1.department, e1.employee_id, e1.employee_name, e1.salary
             FROM employees e1
             WHERE e1.salary = (
                 SELECT MAX(e2.salary) FROM employees e2
                 WHERE e2.department = e1.department
             )
             ORDER BY e1.department",
        ),
        CatalogEntry::query(
            "lowest_paid_per_department",
            Subquery,
            "Lowest earner of each department via a correlated MIN",
            "SELECT e1.department, e1.employee_id, e1.employee_name, e1.salary
             FROM employees e1
             WHERE e1.salary = (
                 SELECT MIN(e2.salary) FROM employees e2
                 WHERE e2.department = e1.department
             )
             ORDER BY e1.department",
        ),
        CatalogEntry::query(
            "employees_in_multi_person_departments",
            Subquery,
            "Employees of departments with more than one member",
            "SELECT employee_id, employee_name, department
             FROM employees
             WHERE department IN (
                 SELECT department FROM employees
                 GROUP BY department
                 HAVING COUNT(*) > 1
             )
             ORDER BY department, employee_id",
        ),
    ]
}

fn aggregate_functions() -> Vec<CatalogEntry> {
    use Technique::AggregateFunction;
    vec![
        CatalogEntry::query(
            "salary_statistics",
            AggregateFunction,
            "Company-wide COUNT, SUM, AVG, MIN and MAX of salary",
            "SELECT COUNT(*) AS employee_count,
                    SUM(salary) AS total_salary,
                    ROUND(AVG(salary), 2) AS avg_salary,
                    MIN(salary) AS min_salary,
                    MAX(salary) AS max_salary
             FROM employees",
        ),
        CatalogEntry::query(
            "department_salary_statistics",
            AggregateFunction,
            "Salary aggregates per department",
            "SELECT department,
                    COUNT(*) AS employee_count,
                    SUM(salary) AS total_salary,
                    ROUND(AVG(salary), 2) AS avg_salary,
                    MIN(salary) AS min_salary,
                    MAX(salary) AS max_salary
             FROM employees
             GROUP BY department
             ORDER BY department",
        ),
        CatalogEntry::query(
            "salary_extremes",
            AggregateFunction,
            "Highest and lowest earners combined with UNION",
            "SELECT 'highest' AS label, employee_name, salary
             FROM employees
             WHERE salary = (SELECT MAX(salary) FROM employees)
             UNION
             SELECT 'lowest' AS label, employee_name, salary
             FROM employees
             WHERE salary = (SELECT MIN(salary) FROM employees)
             ORDER BY salary DESC",
        ),
    ]
}

fn views() -> Vec<CatalogEntry> {
    use Technique::View;
    vec![
        CatalogEntry::view(
            "employee_hierarchy",
            "View pairing each employee with its manager",
            "SELECT e.employee_id, e.employee_name, e.department,
                    m.employee_id AS manager_id, m.employee_name AS manager_name
             FROM employees e
             LEFT JOIN employees m ON e.manager_id = m.employee_id",
        ),
        CatalogEntry::view(
            "department_summary",
            "View of per-department salary aggregates",
            "SELECT department,
                    COUNT(*) AS employee_count,
                    ROUND(AVG(salary), 2) AS avg_salary,
                    MIN(salary) AS min_salary,
                    MAX(salary) AS max_salary,
                    SUM(salary) AS total_salary
             FROM employees
             GROUP BY department",
        ),
        CatalogEntry::view(
            "salary_ranges",
            "View bucketing salaries into Low, Medium and High (Unknown when missing)",
            "SELECT employee_id, employee_name, salary,
                    CASE
                        WHEN salary IS NULL THEN 'Unknown'
                        WHEN salary < 55000 THEN 'Low'
                        WHEN salary < 65000 THEN 'Medium'
                        ELSE 'High'
                    END AS salary_range
             FROM employees",
        ),
        CatalogEntry::query(
            "employee_hierarchy_listing",
            View,
            "Read the employee_hierarchy view",
            "SELECT * FROM employee_hierarchy ORDER BY employee_id",
        ),
        CatalogEntry::query(
            "department_summary_listing",
            View,
            "Read the department_summary view",
            "SELECT * FROM department_summary ORDER BY department",
        ),
        CatalogEntry::query(
            "salary_ranges_listing",
            View,
            "Read the salary_ranges view",
            "SELECT * FROM salary_ranges ORDER BY salary DESC, employee_id",
        ),
    ]
}

fn indexes() -> Vec<CatalogEntry> {
    let table = employees::employees_table();
    table
        .indexes
        .iter()
        .map(|index| CatalogEntry {
            name: index.name.clone(),
            technique: Technique::Index,
            kind: StatementKind::Definition,
            description: "Access-path index; never changes results",
            sql: format!("{};", index.create_sql(&table.name)),
        })
        .collect()
}

fn ctes() -> Vec<CatalogEntry> {
    use Technique::Cte;
    vec![
        CatalogEntry::query(
            "department_stats_cte",
            Cte,
            "Each employee against the department average from a CTE",
            "WITH dept_stats AS (
                 SELECT department, COUNT(*) AS employee_count, AVG(salary) AS avg_salary
                 FROM employees
                 GROUP BY department
             )
             SELECT e.employee_id, e.employee_name, e.department, e.salary,
                    d.employee_count,
                    ROUND(d.avg_salary, 2) AS dept_avg_salary,
                    ROUND(e.salary - d.avg_salary, 2) AS diff_from_avg
             FROM employees e
             JOIN dept_stats d ON e.department = d.department
             ORDER BY e.department, e.salary DESC",
        ),
        CatalogEntry::query(
            "top_earner_per_department",
            Cte,
            "Rank salaries within each department and keep rank 1",
            "WITH ranked AS (
                 SELECT employee_id, employee_name, department, salary,
                        RANK() OVER (PARTITION BY department ORDER BY salary DESC) AS salary_rank
                 FROM employees
                 WHERE department IS NOT NULL AND salary IS NOT NULL
             )
             SELECT department, employee_id, employee_name, salary
             FROM ranked
             WHERE salary_rank = 1
             ORDER BY department",
        ),
        CatalogEntry::query(
            "reporting_chain",
            Cte,
            "Recursive walk of the manager forest with depth and path",
            "WITH RECURSIVE chain(employee_id, employee_name, manager_id, depth, path) AS (
                 SELECT employee_id, employee_name, manager_id, 0, employee_name
                 FROM employees
                 WHERE manager_id IS NULL
                 UNION ALL
                 SELECT e.employee_id, e.employee_name, e.manager_id, c.depth + 1,
                        c.path || ' > ' || e.employee_name
                 FROM employees e
                 JOIN chain c ON e.manager_id = c.employee_id
                 WHERE c.depth < 32
             )
             SELECT employee_id, employee_name, manager_id, depth, path
             FROM chain
             ORDER BY depth, employee_id",
        ),
    ]
}

fn windows() -> Vec<CatalogEntry> {
    use Technique::Window;
    vec![
        CatalogEntry::query(
            "salary_rank_in_department",
            Window,
            "RANK and PERCENT_RANK of salary inside each department",
            "SELECT employee_id, employee_name, department, salary,
                    RANK() OVER (PARTITION BY department ORDER BY salary DESC) AS salary_rank,
                    ROUND(PERCENT_RANK() OVER (PARTITION BY department ORDER BY salary), 4)
                        AS percent_rank
             FROM employees
             ORDER BY department, salary_rank, employee_id",
        ),
        CatalogEntry::query(
            "next_salary_in_department",
            Window,
            "Next higher salary in the department, 0 past the end",
            "SELECT employee_id, employee_name, department, salary,
                    LEAD(salary, 1, 0) OVER (PARTITION BY department ORDER BY salary)
                        AS next_salary
             FROM employees
             ORDER BY department, salary",
        ),
    ]
}
