//! Implementation of the `graft history` command.

use chrono::Local;
use tracing::instrument;

use graft_adapters::{FileModuleHistory, LocalFilesystem};

use crate::{
    cli::{HistoryArgs, ListFormat},
    commands::absolute,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(project = %args.project.display()))]
pub fn execute(args: HistoryArgs, output: OutputManager) -> CliResult<()> {
    let root = absolute(&args.project)?;
    if !root.is_dir() {
        return Err(CliError::ProjectNotFound { path: root });
    }

    let entries = FileModuleHistory::new(LocalFilesystem::new()).entries(&root)?;

    let format = if output.is_json() {
        ListFormat::Json
    } else {
        args.format
    };

    match format {
        ListFormat::Json => output.json(&entries)?,
        ListFormat::List => {
            for entry in &entries {
                println!("{}", entry.module);
            }
        }
        ListFormat::Table => {
            if entries.is_empty() {
                output.info(&format!("No modules applied to {} yet", root.display()))?;
                return Ok(());
            }
            output.header(&format!("Applied to {}:", root.display()))?;
            for entry in &entries {
                output.print(&format!(
                    "  {}  {}",
                    entry
                        .applied_at
                        .with_timezone(&Local)
                        .format("%Y-%m-%d %H:%M:%S"),
                    entry.module,
                ))?;
            }
        }
    }

    Ok(())
}
