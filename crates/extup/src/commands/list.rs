//! List command

use anyhow::{Context, Result};
use camino::Utf8Path;
use tabled::{settings::Style, Table, Tabled};

use super::common::UpdateContext;
use crate::cli::ListArgs;
use crate::output;

#[derive(Tabled, serde::Serialize)]
struct InstalledRow {
    name: String,
    version: String,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    install_type: String,
    source: String,
}

/// List installed extensions
pub fn run(args: ListArgs, config_path: Option<&Utf8Path>) -> Result<()> {
    let ctx = UpdateContext::load(config_path)?;
    let installed = ctx.installed()?;

    let rows: Vec<InstalledRow> = installed
        .iter()
        .map(|ext| InstalledRow {
            name: ext.name.clone(),
            version: ext.version.clone(),
            install_type: ext
                .install_type()
                .map_or_else(|| "unknown".to_string(), |t| t.to_string()),
            source: ext
                .install_metadata
                .as_ref()
                .map(|m| match &m.git_ref {
                    Some(git_ref) => format!("{}#{}", m.source, git_ref),
                    None => m.source.clone(),
                })
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    if args.json {
        let json = serde_json::to_string_pretty(&rows).context("Failed to serialize to JSON")?;
        println!("{}", json);
        return Ok(());
    }

    if rows.is_empty() {
        output::warning(&format!(
            "No extensions installed in {}",
            ctx.config.extensions_dir
        ));
        return Ok(());
    }

    let mut table = Table::new(&rows);
    table.with(Style::sharp());
    println!("{}", table);
    output::info(&format!("{} extension(s) installed", rows.len()));

    Ok(())
}
