use serde::Serialize;

use crate::catalog::{Catalog, CatalogEntry, Technique};
use crate::cli::{Commands, Format};
use crate::config::CatalogConfig;
use crate::error::Result;
use crate::output::format_table;
use crate::sqlite::{ResultSet, ServiceLifecycle, SqliteService};

#[derive(Serialize)]
struct EntryOutput<'a> {
    name: &'a str,
    technique: &'static str,
    result: ResultSet,
}

/// Execute a command and return what it prints.
pub async fn run(command: &Commands, config: &CatalogConfig) -> Result<String> {
    let catalog = Catalog::standard();
    match command {
        Commands::List { technique } => Ok(list(&catalog, *technique)),
        Commands::Show { name } => Ok(format!("{}\n", catalog.get(name)?.sql)),
        Commands::Run {
            names,
            technique,
            format,
        } => {
            let selected = select(&catalog, names, *technique)?;
            run_entries(&catalog, &selected, config, *format).await
        }
    }
}

fn list(catalog: &Catalog, technique: Option<Technique>) -> String {
    let mut out = String::new();
    for entry in catalog
        .entries()
        .iter()
        .filter(|e| technique.map_or(true, |t| e.technique == t))
    {
        out.push_str(&format!(
            "{:<40} {:<20} {}\n",
            entry.name, entry.technique, entry.description
        ));
    }
    out
}

fn select<'a>(
    catalog: &'a Catalog,
    names: &[String],
    technique: Option<Technique>,
) -> Result<Vec<&'a CatalogEntry>> {
    if !names.is_empty() {
        return names.iter().map(|name| catalog.get(name)).collect();
    }
    Ok(match technique {
        Some(t) => catalog.by_technique(t).collect(),
        None => catalog.queries().collect(),
    })
}

async fn run_entries(
    catalog: &Catalog,
    entries: &[&CatalogEntry],
    config: &CatalogConfig,
    format: Format,
) -> Result<String> {
    let mut service = SqliteService::new(config.sqlite_config());
    service.start().await?;
    service.load_fixture().await?;
    service.install_definitions(catalog).await?;

    let mut outputs = Vec::with_capacity(entries.len());
    for entry in entries {
        let result = service.run_entry(entry).await?;
        outputs.push(EntryOutput {
            name: &entry.name,
            technique: entry.technique.as_str(),
            result,
        });
    }
    service.stop().await?;

    match format {
        Format::Json => Ok(format!("{}\n", serde_json::to_string_pretty(&outputs)?)),
        Format::Text => {
            let mut out = String::new();
            for output in &outputs {
                out.push_str(&format!("-- {} ({})\n", output.name, output.technique));
                out.push_str(&format_table(&output.result));
                out.push('\n');
            }
            Ok(out)
        }
    }
}

