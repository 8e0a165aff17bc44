//! SQLite-backed employee schema and a catalog of relational query techniques.
//!
//! # Intention
//!
//! - Define the `employees` table and load its fixed five-row fixture.
//! - Keep a named catalog of SQL statements (filtering, aggregation, joins,
//!   subqueries, views, indexes, CTEs, window functions) that run against it.
//! - Execute statements through a small SQLite service and return results as
//!   engine-neutral [`sqlite::ResultSet`]s.
//!
//! # Architectural Boundaries
//!
//! - SQLite does all query evaluation; nothing here plans or optimizes queries.
//! - The dataset is load-once: there are no update or delete paths.

pub mod app;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod employees;
pub mod error;
pub mod output;
pub mod sqlite;

pub use catalog::{Catalog, CatalogEntry, StatementKind, Technique};
pub use config::CatalogConfig;
pub use employees::Employee;
pub use error::{CatalogError, Result};
pub use sqlite::{ResultSet, ServiceLifecycle, SqliteConfig, SqliteService, Value};
