use async_trait::async_trait;
use chrono::NaiveDate;
use futures::lock::{Mutex, MutexGuard};
use rusqlite::types::{ToSqlOutput, Value as SqlValue, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde::Serialize;
use std::{collections::HashMap, fmt, sync::Arc};

use crate::catalog::{Catalog, CatalogEntry, StatementKind, Technique};
use crate::employees::{self, Employee};
use crate::error::{CatalogError, Result};

/// Path that makes the service open a private in-memory database.
pub const IN_MEMORY: &str = ":memory:";

/// Core value types for SQLite operations
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
    Boolean(bool),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Numeric view of the value. NUMERIC affinity stores whole decimals as
    /// integers, so both numeric variants are accepted.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Real(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Boolean(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Real(r) => write!(f, "{r}"),
            Value::Text(s) => f.write_str(s),
            Value::Blob(bytes) => {
                f.write_str("x'")?;
                for b in bytes {
                    write!(f, "{b:02x}")?;
                }
                f.write_str("'")
            }
            Value::Boolean(b) => write!(f, "{b}"),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Real(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Blob(v)
    }
}

impl From<NaiveDate> for Value {
    fn from(v: NaiveDate) -> Self {
        Value::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl From<ValueRef<'_>> for Value {
    fn from(v: ValueRef<'_>) -> Self {
        match v {
            ValueRef::Null => Value::Null,
            ValueRef::Integer(i) => Value::Integer(i),
            ValueRef::Real(r) => Value::Real(r),
            ValueRef::Text(t) => Value::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Value::Blob(b.to_vec()),
        }
    }
}

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Owned(SqlValue::Null),
            Value::Integer(i) => ToSqlOutput::Owned(SqlValue::Integer(*i)),
            Value::Real(r) => ToSqlOutput::Owned(SqlValue::Real(*r)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            Value::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
            Value::Boolean(b) => ToSqlOutput::Owned(SqlValue::Integer(i64::from(*b))),
        })
    }
}

/// Parameter bindings for SQL queries
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Params {
    pub values: HashMap<String, Value>,
}

impl Params {
    /// Create a new Params object
    pub fn new() -> Self {
        Self::default()
    }
    /// Add a named value. The `:` prefix is optional.
    pub fn with_value(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(name.to_string(), value.into());
        self
    }

    fn bindings(&self) -> Vec<(String, &Value)> {
        self.values
            .iter()
            .map(|(name, value)| {
                let name = if name.starts_with([':', '@', '$']) {
                    name.clone()
                } else {
                    format!(":{name}")
                };
                (name, value)
            })
            .collect()
    }
}

/// SQL Query with typed parameters
#[derive(Debug, Clone, PartialEq)]
pub struct SqlQuery {
    pub statement: String,
    pub params: Params,
}

impl SqlQuery {
    pub fn new(statement: &str) -> Self {
        Self {
            statement: statement.to_string(),
            params: Params::new(),
        }
    }
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }
}

/// Rows returned by a statement, cells in column order.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell at `row` in the named column.
    pub fn value(&self, row: usize, column: &str) -> Option<&Value> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Every cell of the named column, top to bottom.
    pub fn column(&self, name: &str) -> Option<Vec<&Value>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| &row[idx]).collect())
    }

    pub fn to_maps(&self) -> Vec<HashMap<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Run a query on a plain connection and collect every row.
pub fn query_result_set<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> Result<ResultSet> {
    let mut stmt = conn.prepare(sql)?;
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut rows = stmt.query(params)?;
    let mut result = ResultSet {
        columns,
        rows: Vec::new(),
    };
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for i in 0..width {
            cells.push(Value::from(row.get_ref(i)?));
        }
        result.rows.push(cells);
    }
    Ok(result)
}

/// Run a [`SqlQuery`], binding its named parameters.
pub fn run_sql_query(conn: &Connection, query: &SqlQuery) -> Result<ResultSet> {
    let bindings = query.params.bindings();
    let named: Vec<(&str, &dyn ToSql)> = bindings
        .iter()
        .map(|(name, value)| (name.as_str(), *value as &dyn ToSql))
        .collect();
    query_result_set(conn, &query.statement, named.as_slice())
}

/// Quote an identifier for SQLite.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Query operators for building advanced queries
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOperator {
    Equal(Value),
    NotEqual(Value),
    GreaterThan(Value),
    GreaterThanOrEqual(Value),
    LessThan(Value),
    LessThanOrEqual(Value),
    Like(String),
    In(Vec<Value>),
    Between(Value, Value),
    IsNull,
    IsNotNull,
}

impl QueryOperator {
    fn render(&self, column: &str, params: &mut Vec<Value>) -> String {
        let bind = |value: &Value, params: &mut Vec<Value>| {
            params.push(value.clone());
            format!("?{}", params.len())
        };
        let column = quote_ident(column);
        match self {
            QueryOperator::Equal(v) => format!("{column} = {}", bind(v, params)),
            QueryOperator::NotEqual(v) => format!("{column} <> {}", bind(v, params)),
            QueryOperator::GreaterThan(v) => format!("{column} > {}", bind(v, params)),
            QueryOperator::GreaterThanOrEqual(v) => format!("{column} >= {}", bind(v, params)),
            QueryOperator::LessThan(v) => format!("{column} < {}", bind(v, params)),
            QueryOperator::LessThanOrEqual(v) => format!("{column} <= {}", bind(v, params)),
            QueryOperator::Like(pattern) => {
                format!("{column} LIKE {}", bind(&Value::Text(pattern.clone()), params))
            }
            // An empty IN list matches nothing.
            QueryOperator::In(values) if values.is_empty() => "1 = 0".to_string(),
            QueryOperator::In(values) => {
                let slots: Vec<String> = values.iter().map(|v| bind(v, params)).collect();
                format!("{column} IN ({})", slots.join(", "))
            }
            QueryOperator::Between(low, high) => {
                let low = bind(low, params);
                let high = bind(high, params);
                format!("{column} BETWEEN {low} AND {high}")
            }
            QueryOperator::IsNull => format!("{column} IS NULL"),
            QueryOperator::IsNotNull => format!("{column} IS NOT NULL"),
        }
    }
}

/// Query builder for composable, immutable queries. Conditions are ANDed in
/// insertion order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Query {
    pub conditions: Vec<(String, QueryOperator)>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_condition(mut self, field: &str, op: QueryOperator) -> Self {
        self.conditions.push((field.to_string(), op));
        self
    }
}

/// A statement rendered with positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedSql {
    pub sql: String,
    pub params: Vec<Value>,
}

/// CRUD operation types. The dataset is load-once, so only inserts and reads
/// are modelled.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateOperation {
    pub table: String,
    pub data: Vec<(String, Value)>,
}

impl CreateOperation {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            data: Vec::new(),
        }
    }

    pub fn with_value(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.data.push((column.to_string(), value.into()));
        self
    }

    pub fn render(&self) -> Result<RenderedSql> {
        if self.data.is_empty() {
            return Err(CatalogError::Unsupported(format!(
                "insert into {} without columns",
                self.table
            )));
        }
        let columns: Vec<String> = self.data.iter().map(|(c, _)| quote_ident(c)).collect();
        let slots: Vec<String> = (1..=self.data.len()).map(|i| format!("?{i}")).collect();
        Ok(RenderedSql {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(&self.table),
                columns.join(", "),
                slots.join(", ")
            ),
            params: self.data.iter().map(|(_, v)| v.clone()).collect(),
        })
    }

    /// Insert the row, returning the number of rows changed.
    pub fn execute(&self, conn: &Connection) -> Result<usize> {
        let rendered = self.render()?;
        Ok(conn.execute(&rendered.sql, params_from_iter(rendered.params.iter()))?)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReadOperation {
    pub table: String,
    pub query: Query,
    pub fields: Option<Vec<String>>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub order_by: Option<Vec<(String, bool)>>, // (field, is_ascending)
}

impl ReadOperation {
    pub fn new(table: &str) -> Self {
        Self {
            table: table.to_string(),
            query: Query::new(),
            fields: None,
            limit: None,
            offset: None,
            order_by: None,
        }
    }

    pub fn with_query(mut self, query: Query) -> Self {
        self.query = query;
        self
    }

    pub fn with_fields(mut self, fields: &[&str]) -> Self {
        self.fields = Some(fields.iter().map(|f| f.to_string()).collect());
        self
    }

    pub fn order_by(mut self, field: &str, ascending: bool) -> Self {
        self.order_by
            .get_or_insert_with(Vec::new)
            .push((field.to_string(), ascending));
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn render(&self) -> RenderedSql {
        let mut params = Vec::new();
        let fields = match &self.fields {
            Some(fields) if !fields.is_empty() => fields
                .iter()
                .map(|f| quote_ident(f))
                .collect::<Vec<_>>()
                .join(", "),
            _ => "*".to_string(),
        };
        let mut sql = format!("SELECT {fields} FROM {}", quote_ident(&self.table));
        if !self.query.conditions.is_empty() {
            let predicates: Vec<String> = self
                .query
                .conditions
                .iter()
                .map(|(column, op)| op.render(column, &mut params))
                .collect();
            sql.push_str(" WHERE ");
            sql.push_str(&predicates.join(" AND "));
        }
        if let Some(order) = self.order_by.as_ref().filter(|o| !o.is_empty()) {
            let terms: Vec<String> = order
                .iter()
                .map(|(field, asc)| {
                    format!("{} {}", quote_ident(field), if *asc { "ASC" } else { "DESC" })
                })
                .collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => sql.push_str(&format!(" LIMIT {limit} OFFSET {offset}")),
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {limit}")),
            // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {offset}")),
            (None, None) => {}
        }
        RenderedSql { sql, params }
    }

    pub fn execute(&self, conn: &Connection) -> Result<ResultSet> {
        let rendered = self.render();
        query_result_set(conn, &rendered.sql, params_from_iter(rendered.params.iter()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum CrudOperation {
    Create(CreateOperation),
    Read(ReadOperation),
}

/// Schema definition for the SQLite database
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    pub tables: Vec<TableDefinition>,
}

impl Schema {
    pub fn new() -> Self {
        Self { tables: Vec::new() }
    }
    pub fn add_table(mut self, table: TableDefinition) -> Self {
        self.tables.push(table);
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableDefinition {
    pub name: String,
    pub columns: Vec<ColumnDefinition>,
    pub primary_key: Vec<String>,
    pub foreign_keys: Vec<ForeignKey>,
    pub indexes: Vec<IndexDefinition>,
}

impl TableDefinition {
    /// `CREATE TABLE IF NOT EXISTS` statement for the table, constraints
    /// included. Indexes are rendered separately.
    pub fn create_sql(&self) -> String {
        let mut parts: Vec<String> = self.columns.iter().map(ColumnDefinition::render).collect();
        if !self.primary_key.is_empty() {
            let cols: Vec<String> = self.primary_key.iter().map(|c| quote_ident(c)).collect();
            parts.push(format!("PRIMARY KEY ({})", cols.join(", ")));
        }
        for fk in &self.foreign_keys {
            parts.push(fk.render());
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n    {}\n)",
            quote_ident(&self.name),
            parts.join(",\n    ")
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefinition {
    pub name: String,
    pub data_type: DataType,
    pub not_null: bool,
}

impl ColumnDefinition {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_string(),
            data_type,
            not_null: false,
        }
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    fn render(&self) -> String {
        let mut sql = format!("{} {}", quote_ident(&self.name), self.data_type.sql());
        if self.not_null {
            sql.push_str(" NOT NULL");
        }
        sql
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum DataType {
    Integer,
    Varchar(u32),
    Decimal { precision: u8, scale: u8 },
    Date,
}

impl DataType {
    pub fn sql(&self) -> String {
        match self {
            DataType::Integer => "INTEGER".to_string(),
            DataType::Varchar(len) => format!("VARCHAR({len})"),
            DataType::Decimal { precision, scale } => format!("DECIMAL({precision},{scale})"),
            DataType::Date => "DATE".to_string(),
        }
    }
}

/// Table-level foreign key. SQLite applies NO ACTION on update and delete.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeignKey {
    pub column: String,
    pub foreign_table: String,
    pub foreign_column: String,
}

impl ForeignKey {
    fn render(&self) -> String {
        format!(
            "FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_ident(&self.column),
            quote_ident(&self.foreign_table),
            quote_ident(&self.foreign_column)
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDefinition {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }

    pub fn create_sql(&self, table: &str) -> String {
        let cols: Vec<String> = self.columns.iter().map(|c| quote_ident(c)).collect();
        format!(
            "CREATE INDEX IF NOT EXISTS {} ON {} ({})",
            quote_ident(&self.name),
            quote_ident(table),
            cols.join(", ")
        )
    }
}

/// SQLite Service configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SqliteConfig {
    /// Path to the SQLite database file, or [`IN_MEMORY`]
    pub db_path: String,
    /// Schema definition for the database
    pub schema: Schema,
    /// Turn on `PRAGMA foreign_keys` for the connection
    pub enforce_foreign_keys: bool,
    /// Install index definitions along with views
    pub create_indexes: bool,
}

impl SqliteConfig {
    /// Create a new SQLite config with path and schema
    pub fn new(db_path: impl Into<String>, schema: Schema) -> Self {
        Self {
            db_path: db_path.into(),
            schema,
            enforce_foreign_keys: true,
            create_indexes: true,
        }
    }

    /// Config for the employees schema.
    pub fn employees(db_path: impl Into<String>) -> Self {
        Self::new(db_path, Schema::new().add_table(employees::employees_table()))
    }

    pub fn with_foreign_keys(mut self, enforce: bool) -> Self {
        self.enforce_foreign_keys = enforce;
        self
    }

    pub fn with_indexes(mut self, create: bool) -> Self {
        self.create_indexes = create;
        self
    }
}

/// Start/stop hooks shared by long-lived services.
#[async_trait]
pub trait ServiceLifecycle {
    fn name(&self) -> &str;
    async fn start(&mut self) -> Result<()>;
    async fn stop(&mut self) -> Result<()>;
}

pub struct SqliteService {
    config: SqliteConfig,
    connection: Option<Arc<Mutex<Connection>>>,
}

impl SqliteService {
    /// Create a new SQLite service with the given config
    pub fn new(config: SqliteConfig) -> Self {
        Self {
            config,
            connection: None,
        }
    }

    pub fn path(&self) -> &str {
        &self.config.db_path
    }

    pub fn is_started(&self) -> bool {
        self.connection.is_some()
    }

    async fn connection(&self) -> Result<MutexGuard<'_, Connection>> {
        let connection = self.connection.as_ref().ok_or(CatalogError::NotStarted)?;
        Ok(connection.lock().await)
    }

    fn open(&self) -> Result<Connection> {
        let conn = if self.config.db_path == IN_MEMORY {
            Connection::open_in_memory()?
        } else {
            Connection::open(&self.config.db_path)?
        };
        let pragma = if self.config.enforce_foreign_keys {
            "PRAGMA foreign_keys = ON;"
        } else {
            "PRAGMA foreign_keys = OFF;"
        };
        conn.execute_batch(pragma)?;
        Ok(conn)
    }

    fn initialize_schema(&self, conn: &Connection) -> Result<()> {
        for table in &self.config.schema.tables {
            tracing::debug!(table = %table.name, "creating table");
            conn.execute_batch(&table.create_sql())?;
        }
        Ok(())
    }

    pub async fn execute_sql(&self, query: SqlQuery) -> Result<ResultSet> {
        let conn = self.connection().await?;
        tracing::debug!(statement = %query.statement, "executing sql");
        run_sql_query(&conn, &query)
    }

    pub async fn execute_batch(&self, sql: &str) -> Result<()> {
        let conn = self.connection().await?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Perform a CRUD operation (type-safe API). Inserts report the change
    /// count as a single `rows_affected` cell.
    pub async fn execute_crud(&self, op: CrudOperation) -> Result<ResultSet> {
        let conn = self.connection().await?;
        match op {
            CrudOperation::Create(create) => {
                let changed = create.execute(&conn)?;
                Ok(ResultSet {
                    columns: vec!["rows_affected".to_string()],
                    rows: vec![vec![Value::Integer(changed as i64)]],
                })
            }
            CrudOperation::Read(read) => read.execute(&conn),
        }
    }

    /// Reset the employees table to the fixture rows.
    pub async fn load_fixture(&self) -> Result<usize> {
        let mut conn = self.connection().await?;
        employees::load_fixture(&mut conn)
    }

    pub async fn employees(&self) -> Result<Vec<Employee>> {
        let conn = self.connection().await?;
        employees::all_employees(&conn)
    }

    /// Install the catalog's views and, unless disabled, its indexes.
    pub async fn install_definitions(&self, catalog: &Catalog) -> Result<usize> {
        let conn = self.connection().await?;
        let mut installed = 0;
        for entry in catalog.definitions() {
            if entry.technique == Technique::Index && !self.config.create_indexes {
                tracing::debug!(entry = %entry.name, "skipping index");
                continue;
            }
            entry.execute(&conn)?;
            installed += 1;
        }
        tracing::info!(installed, "catalog definitions installed");
        Ok(installed)
    }

    pub async fn run_entry(&self, entry: &CatalogEntry) -> Result<ResultSet> {
        let conn = self.connection().await?;
        let result = entry.execute(&conn)?;
        if entry.kind == StatementKind::Query {
            tracing::debug!(entry = %entry.name, rows = result.len(), "catalog query finished");
        }
        Ok(result)
    }
}

#[async_trait]
impl ServiceLifecycle for SqliteService {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn start(&mut self) -> Result<()> {
        tracing::info!(db_path = %self.path(), "starting sqlite service");
        let connection = self.open()?;
        self.initialize_schema(&connection)?;
        self.connection = Some(Arc::new(Mutex::new(connection)));
        Ok(())
    }

    async fn stop(&mut self) -> Result<()> {
        self.connection = None;
        tracing::info!(db_path = %self.path(), "sqlite service stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn read_operation_renders_conditions_in_order() {
        let read = ReadOperation::new("employees")
            .with_fields(&["employee_id", "salary"])
            .with_query(
                Query::new()
                    .with_condition("department", QueryOperator::Equal("IT".into()))
                    .with_condition(
                        "salary",
                        QueryOperator::Between(55000.into(), 65000.into()),
                    ),
            )
            .order_by("salary", false)
            .with_offset(1);
        let rendered = read.render();
        assert_eq!(
            rendered.sql,
            "SELECT \"employee_id\", \"salary\" FROM \"employees\" \
             WHERE \"department\" = ?1 AND \"salary\" BETWEEN ?2 AND ?3 \
             ORDER BY \"salary\" DESC LIMIT -1 OFFSET 1"
        );
        assert_eq!(
            rendered.params,
            vec![Value::Text("IT".into()), Value::Integer(55000), Value::Integer(65000)]
        );
    }

    #[test]
    fn empty_in_list_matches_nothing() {
        let read = ReadOperation::new("employees")
            .with_query(Query::new().with_condition("employee_id", QueryOperator::In(vec![])));
        assert_eq!(read.render().sql, "SELECT * FROM \"employees\" WHERE 1 = 0");
    }

    #[test]
    fn create_without_columns_is_rejected() {
        let err = CreateOperation::new("employees").render().unwrap_err();
        assert!(matches!(err, CatalogError::Unsupported(_)));
    }

    #[test]
    fn employees_table_renders_and_applies() {
        let table = employees::employees_table();
        assert_eq!(
            table.create_sql(),
            "CREATE TABLE IF NOT EXISTS \"employees\" (\n    \
             \"employee_id\" INTEGER NOT NULL,\n    \
             \"employee_name\" VARCHAR(100) NOT NULL,\n    \
             \"department\" VARCHAR(50),\n    \
             \"salary\" DECIMAL(10,2),\n    \
             \"hire_date\" DATE,\n    \
             \"manager_id\" INTEGER,\n    \
             PRIMARY KEY (\"employee_id\"),\n    \
             FOREIGN KEY (\"manager_id\") REFERENCES \"employees\" (\"employee_id\")\n)"
        );
        assert_eq!(
            table.indexes[4].create_sql(&table.name),
            "CREATE INDEX IF NOT EXISTS \"idx_employees_department_salary\" \
             ON \"employees\" (\"department\", \"salary\")"
        );

        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&table.create_sql()).unwrap();
        for index in &table.indexes {
            conn.execute_batch(&index.create_sql(&table.name)).unwrap();
        }
        let err = conn
            .execute("INSERT INTO employees (employee_id) VALUES (1)", [])
            .unwrap_err();
        assert!(err.to_string().contains("NOT NULL"));
    }

    #[test]
    fn quote_ident_escapes_quotes() {
        assert_eq!(quote_ident("odd\"name"), "\"odd\"\"name\"");
    }

    #[test]
    fn option_values_map_to_null() {
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some(3_i64)), Value::Integer(3));
        let date = NaiveDate::from_ymd_opt(2020, 1, 15).unwrap();
        assert_eq!(Value::from(date), Value::Text("2020-01-15".into()));
    }
}
