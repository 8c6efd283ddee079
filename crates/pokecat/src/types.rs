use crate::catalog::Catalog;
use crate::client::DataSource;
use crate::list::type_badge;
use crate::prelude::{eprintln, println, *};
use colored::Colorize;
use pokecat_core::colors::{type_color, type_text_color};
use serde::Serialize;

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct TypesOptions {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// One selectable type with its display colors.
#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TypeEntry {
    pub name: String,
    pub color: &'static str,
    pub text_color: &'static str,
}

pub async fn run<S: DataSource + 'static>(
    options: TypesOptions,
    catalog: &Catalog<S>,
    global: crate::Global,
) -> Result<()> {
    if global.verbose {
        eprintln!("Fetching type names...");
    }

    let entries = types_data(catalog).await?;

    if options.json {
        let json = serde_json::to_string_pretty(&entries)
            .map_err(|e| eyre!("JSON serialization failed: {}", e))?;
        println!("{}", json);
    } else {
        build_types_table(&entries).printstd();
        println!(
            "\n{}: {}",
            "To filter by type".green(),
            "pokecat list --type <type>".cyan()
        );
    }

    Ok(())
}

/// Type names in server order, decorated with their palette colors.
pub async fn types_data<S: DataSource + 'static>(catalog: &Catalog<S>) -> Result<Vec<TypeEntry>> {
    let names = catalog
        .category_names()
        .await
        .map_err(|e| eyre!("Failed to load type names: {}", e))?;

    Ok(type_entries(&names))
}

pub fn type_entries(names: &[String]) -> Vec<TypeEntry> {
    names
        .iter()
        .map(|name| TypeEntry {
            name: name.clone(),
            color: type_color(name),
            text_color: type_text_color(name),
        })
        .collect()
}

pub fn build_types_table(entries: &[TypeEntry]) -> prettytable::Table {
    let mut table = new_table();
    table.add_row(prettytable::row![
        "Type".bold().cyan(),
        "Color".bold().cyan(),
        "List".bold().cyan()
    ]);

    for entry in entries {
        table.add_row(prettytable::row![
            type_badge(&entry.name),
            entry.color,
            f!("pokecat list --type {}", entry.name)
        ]);
    }

    table
}
