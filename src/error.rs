use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(#[from] toml::de::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("sqlite service has not been started")]
    NotStarted,
    #[error("unknown catalog entry: {0}")]
    UnknownEntry(String),
    #[error("unsupported operation: {0}")]
    Unsupported(String),
    #[error("integrity violation: {0}")]
    IntegrityViolation(String),
}
