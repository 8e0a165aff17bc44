use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::catalog::Technique;
use crate::config::CatalogConfig;
use crate::error::Result;

/// Employee catalog - run the employee query catalog against SQLite
#[derive(Parser, Debug)]
#[command(name = "employee-catalog")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Database file (defaults to an in-memory database)
    #[arg(long, global = true, env = "EMPLOYEE_CATALOG_DB")]
    pub db: Option<String>,

    /// Path to a TOML config file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Skip the catalog indexes
    #[arg(long, global = true)]
    pub no_indexes: bool,

    /// Leave the manager_id foreign key unchecked
    #[arg(long, global = true)]
    pub no_foreign_keys: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List catalog entries
    List {
        /// Only entries of this technique
        #[arg(short, long)]
        technique: Option<Technique>,
    },

    /// Load the fixture and print the result of catalog entries
    Run {
        /// Entry names, in the order to run them (default: every query)
        names: Vec<String>,

        /// Only entries of this technique
        #[arg(short, long)]
        technique: Option<Technique>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Print the SQL text of an entry
    Show {
        /// Entry name
        name: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Format {
    Text,
    Json,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<CatalogConfig> {
        let mut config = match &self.config {
            Some(path) => CatalogConfig::load(path)?,
            None => CatalogConfig::default(),
        };
        if let Some(db) = &self.db {
            config.db_path = db.clone();
        }
        if self.no_indexes {
            config.create_indexes = false;
        }
        if self.no_foreign_keys {
            config.enforce_foreign_keys = false;
        }
        Ok(config)
    }
}
