//! Implementation of the `graft list` command.

use std::path::PathBuf;

use serde::Serialize;

use graft_adapters::{ModuleLoader, module_loader::MANIFEST_FILE};

use crate::{
    cli::{ListArgs, ListFormat},
    commands::absolute,
    config::AppConfig,
    error::CliResult,
    output::OutputManager,
};

#[derive(Debug, Serialize)]
struct ModuleListing {
    slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    manifest: PathBuf,
}

pub fn execute(args: ListArgs, config: AppConfig, output: OutputManager) -> CliResult<()> {
    let dir = args
        .dir
        .or(config.templates.root)
        .unwrap_or_else(|| PathBuf::from("."));
    let dir = absolute(&dir)?;

    let modules = ModuleLoader::new(&dir).discover()?;
    let listings: Vec<ModuleListing> = modules
        .iter()
        .map(|m| ModuleListing {
            slug: m.slug().to_string(),
            description: m.description().map(str::to_string),
            manifest: m.folder().join(MANIFEST_FILE),
        })
        .collect();

    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Table => {
            if listings.is_empty() {
                output.info(&format!("No modules found under {}", dir.display()))?;
                return Ok(());
            }
            output.header(&format!("Modules in {}:", dir.display()))?;
            let width = listings.iter().map(|l| l.slug.len()).max().unwrap_or(0);
            for listing in &listings {
                output.print(&format!(
                    "  {:<width$}  {}  ({})",
                    listing.slug,
                    listing.description.as_deref().unwrap_or("-"),
                    listing.manifest.display(),
                ))?;
            }
        }
        ListFormat::Json => {
            // Bypasses quiet mode: JSON must stay parseable in pipes.
            output.json(&listings)?;
        }
        ListFormat::List => {
            for listing in &listings {
                println!("{}", listing.slug);
            }
        }
    }

    Ok(())
}
