use employee_catalog::sqlite::{
    CreateOperation, CrudOperation, Params, Query, QueryOperator, ReadOperation, SqlQuery,
};
use employee_catalog::{
    Catalog, CatalogError, ResultSet, ServiceLifecycle, SqliteConfig, SqliteService, Value,
};
use tempfile::NamedTempFile;

async fn started_service(config: SqliteConfig) -> SqliteService {
    let mut service = SqliteService::new(config);
    service.start().await.unwrap();
    service.load_fixture().await.unwrap();
    service
}

fn names(result: &ResultSet) -> Vec<String> {
    result
        .column("employee_name")
        .unwrap()
        .into_iter()
        .map(|v| v.to_string())
        .collect()
}

#[tokio::test]
async fn test_operations_require_start() {
    let service = SqliteService::new(SqliteConfig::employees(":memory:"));
    assert!(!service.is_started());
    let err = service
        .execute_sql(SqlQuery::new("SELECT 1"))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::NotStarted));
}

#[tokio::test]
async fn test_lifecycle() {
    let mut service = started_service(SqliteConfig::employees(":memory:")).await;
    assert_eq!(service.name(), "sqlite");
    assert!(service.is_started());
    assert_eq!(service.employees().await.unwrap().len(), 5);

    service.stop().await.unwrap();
    assert!(matches!(
        service.employees().await,
        Err(CatalogError::NotStarted)
    ));
}

#[tokio::test]
async fn test_execute_sql_binds_named_params() {
    let service = started_service(SqliteConfig::employees(":memory:")).await;
    let query = SqlQuery::new(
        "SELECT employee_name FROM employees
         WHERE department = :department AND salary >= :min_salary
         ORDER BY salary DESC",
    )
    .with_params(
        Params::new()
            .with_value("department", "IT")
            .with_value(":min_salary", 60000),
    );
    let result = service.execute_sql(query).await.unwrap();
    assert_eq!(names(&result), vec!["Sarah Williams", "John Smith"]);
}

#[tokio::test]
async fn test_read_operations() {
    let service = started_service(SqliteConfig::employees(":memory:")).await;

    let roots = ReadOperation::new("employees")
        .with_fields(&["employee_id", "employee_name"])
        .with_query(Query::new().with_condition("manager_id", QueryOperator::IsNull));
    let result = service
        .execute_crud(CrudOperation::Read(roots))
        .await
        .unwrap();
    assert_eq!(result.columns, vec!["employee_id", "employee_name"]);
    assert_eq!(result.rows, vec![vec![Value::Integer(1), Value::Text("John Smith".into())]]);

    let hr_and_finance = ReadOperation::new("employees")
        .with_query(
            Query::new()
                .with_condition(
                    "department",
                    QueryOperator::In(vec!["HR".into(), "Finance".into()]),
                )
                .with_condition("salary", QueryOperator::GreaterThan(50000.into())),
        )
        .order_by("salary", false);
    let result = service
        .execute_crud(CrudOperation::Read(hr_and_finance))
        .await
        .unwrap();
    assert_eq!(names(&result), vec!["Mike Johnson", "Jane Doe"]);

    let paged = ReadOperation::new("employees")
        .with_fields(&["employee_name"])
        .with_query(Query::new().with_condition("employee_name", QueryOperator::Like("%o%".into())))
        .order_by("employee_id", true)
        .with_limit(2)
        .with_offset(1);
    let result = service
        .execute_crud(CrudOperation::Read(paged))
        .await
        .unwrap();
    assert_eq!(names(&result), vec!["Jane Doe", "Mike Johnson"]);
}

#[tokio::test]
async fn test_create_operation_respects_foreign_key() {
    let service = started_service(SqliteConfig::employees(":memory:")).await;

    let valid = CreateOperation::new("employees")
        .with_value("employee_id", 6)
        .with_value("employee_name", "Nina Patel")
        .with_value("department", "Finance")
        .with_value("manager_id", 3);
    let result = service
        .execute_crud(CrudOperation::Create(valid))
        .await
        .unwrap();
    assert_eq!(result.value(0, "rows_affected"), Some(&Value::Integer(1)));

    let dangling = CreateOperation::new("employees")
        .with_value("employee_id", 7)
        .with_value("employee_name", "Omar Haddad")
        .with_value("manager_id", 42);
    let err = service
        .execute_crud(CrudOperation::Create(dangling))
        .await
        .unwrap_err();
    assert!(matches!(err, CatalogError::Sqlite(_)));
}

#[tokio::test]
async fn test_unchecked_foreign_keys() {
    let config = SqliteConfig::employees(":memory:").with_foreign_keys(false);
    let service = started_service(config).await;
    let dangling = CreateOperation::new("employees")
        .with_value("employee_id", 7)
        .with_value("employee_name", "Omar Haddad")
        .with_value("manager_id", 42);
    service
        .execute_crud(CrudOperation::Create(dangling))
        .await
        .unwrap();
    assert_eq!(service.employees().await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_install_definitions_honours_index_setting() {
    let catalog = Catalog::standard();

    let with_indexes = started_service(SqliteConfig::employees(":memory:")).await;
    assert_eq!(with_indexes.install_definitions(&catalog).await.unwrap(), 8);

    let without = started_service(SqliteConfig::employees(":memory:").with_indexes(false)).await;
    assert_eq!(without.install_definitions(&catalog).await.unwrap(), 3);

    let count_indexes = SqlQuery::new(
        "SELECT COUNT(*) AS n FROM sqlite_master WHERE type = 'index' AND name LIKE 'idx_%'",
    );
    let result = without.execute_sql(count_indexes).await.unwrap();
    assert_eq!(result.value(0, "n"), Some(&Value::Integer(0)));

    let entry = catalog.get("top_earner_per_department").unwrap();
    assert_eq!(
        with_indexes.run_entry(entry).await.unwrap(),
        without.run_entry(entry).await.unwrap()
    );
}

#[tokio::test]
async fn test_file_backed_service_persists_rows() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path().to_str().unwrap().to_string();

    let mut first = started_service(SqliteConfig::employees(path.clone())).await;
    first
        .execute_batch("UPDATE employees SET salary = 61000 WHERE employee_id = 1")
        .await
        .unwrap();
    first.stop().await.unwrap();

    let mut second = SqliteService::new(SqliteConfig::employees(path));
    second.start().await.unwrap();
    let employees = second.employees().await.unwrap();
    assert_eq!(employees.len(), 5);
    assert_eq!(employees[0].salary, Some(61000.0));

    // Reloading restores the fixture.
    second.load_fixture().await.unwrap();
    assert_eq!(second.employees().await.unwrap()[0].salary, Some(60000.0));
    second.stop().await.unwrap();
}
