//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "graft",
    bin_name = "graft",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Apply reusable modules to an existing project",
    long_about = "Graft applies declarative modules to a project: it places \
                  files, edits existing files at anchors, and merges \
                  dependencies, properties and manifest entries.",
    after_help = "EXAMPLES:\n\
        \x20 graft apply modules/init/module.toml --project ./shop\n\
        \x20 graft apply modules/mysql/module.toml --project ./shop --catalog versions.toml\n\
        \x20 graft check modules/mysql/module.toml\n\
        \x20 graft list --dir modules\n\
        \x20 graft completions bash > /usr/share/bash-completion/completions/graft",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply modules to a project.
    #[command(
        visible_alias = "a",
        about = "Apply modules to a project",
        after_help = "EXAMPLES:\n\
            \x20 graft apply modules/init/module.toml --project ./shop --yes\n\
            \x20 graft apply init.toml mysql.toml --project ./shop --set baseName=shop\n\
            \x20 graft apply modules/mysql/module.toml --project ./shop --dry-run"
    )]
    Apply(ApplyArgs),

    /// Build modules without applying them.
    #[command(
        about = "Validate module manifests",
        after_help = "EXAMPLES:\n\
            \x20 graft check modules/mysql/module.toml\n\
            \x20 graft check modules/*/module.toml"
    )]
    Check(CheckArgs),

    /// List modules found under a directory.
    #[command(
        visible_alias = "ls",
        about = "List available modules",
        after_help = "EXAMPLES:\n\
            \x20 graft list\n\
            \x20 graft list --dir ./modules --format json"
    )]
    List(ListArgs),

    /// Show the modules already applied to a project.
    #[command(
        about = "Show applied modules",
        after_help = "EXAMPLES:\n\
            \x20 graft history --project ./shop"
    )]
    History(HistoryArgs),

    /// Initialise a Graft configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 graft init           # platform config location\n\
            \x20 graft init --local   # .graft.toml in CWD"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 graft completions bash > ~/.local/share/bash-completion/completions/graft\n\
            \x20 graft completions zsh  > ~/.zfunc/_graft\n\
            \x20 graft completions fish > ~/.config/fish/completions/graft.fish"
    )]
    Completions(CompletionsArgs),

    /// Inspect the Graft configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 graft config get project.base_name\n\
            \x20 graft config list\n\
            \x20 graft config path"
    )]
    Config(ConfigCommands),
}

// ── apply ─────────────────────────────────────────────────────────────────────

/// Arguments for `graft apply`.
#[derive(Debug, Args)]
pub struct ApplyArgs {
    /// Module manifests, applied in the order given.
    #[arg(value_name = "MODULE.toml", required = true, help = "Module manifests to apply")]
    pub modules: Vec<PathBuf>,

    /// Root of the project to modify.
    #[arg(
        short = 'p',
        long = "project",
        value_name = "DIR",
        help = "Project directory"
    )]
    pub project: PathBuf,

    /// Version catalog overriding `[catalog] path`.
    #[arg(long = "catalog", value_name = "FILE", help = "Version catalog TOML")]
    pub catalog: Option<PathBuf>,

    /// Template root overriding `[templates] root`.
    ///
    /// Without one, each module reads its templates next to its manifest.
    #[arg(long = "templates", value_name = "DIR", help = "Template root directory")]
    pub templates: Option<PathBuf>,

    /// Extra project context entries.
    #[arg(
        short = 's',
        long = "set",
        value_name = "KEY=VALUE",
        value_parser = parse_key_value,
        help = "Set a project context entry (repeatable)"
    )]
    pub set: Vec<(String, String)>,

    /// Describe the modules without writing anything.
    #[arg(long = "dry-run", help = "Show what would be applied without applying")]
    pub dry_run: bool,

    /// Skip the confirmation prompt.
    #[arg(short = 'y', long = "yes", help = "Skip confirmation and apply immediately")]
    pub yes: bool,
}

/// Parse a `KEY=VALUE` pair.
fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

// ── check ─────────────────────────────────────────────────────────────────────

/// Arguments for `graft check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Module manifests to validate.
    #[arg(value_name = "MODULE.toml", required = true)]
    pub modules: Vec<PathBuf>,
}

// ── list ──────────────────────────────────────────────────────────────────────

/// Arguments for `graft list`.
#[derive(Debug, Args)]
pub struct ListArgs {
    /// Directory to search, defaulting to `[templates] root` or the CWD.
    #[arg(short = 'd', long = "dir", value_name = "DIR", help = "Modules directory")]
    pub dir: Option<PathBuf>,

    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `list` and `history` commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One name per line.
    List,
    /// JSON array.
    Json,
}

// ── history ───────────────────────────────────────────────────────────────────

/// Arguments for `graft history`.
#[derive(Debug, Args)]
pub struct HistoryArgs {
    /// Project whose history to show.
    #[arg(
        short = 'p',
        long = "project",
        value_name = "DIR",
        default_value = ".",
        help = "Project directory"
    )]
    pub project: PathBuf,

    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `graft init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Write to `.graft.toml` in the current directory.
    #[arg(
        long = "local",
        help = "Create local configuration in current directory"
    )]
    pub local: bool,

    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `graft completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `graft config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `project.base_name`.
        key: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
