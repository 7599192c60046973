//! Clap derive structures for the `sitehub` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// sitehub -- keep a durable registry of sites, maintainers and tags
#[derive(Debug, Parser)]
#[command(
    name = "sitehub",
    version,
    about = "Manage a registry of sites from the command line",
    long_about = "Maintain a local registry of external sites: their URLs, maintainers,\n\
        tags, check-in and benefit pages, and optional API credentials.\n\n\
        Every change is written to a single JSON document with an atomic\n\
        write-then-rename, so the file on disk is always complete.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Site document to operate on (overrides config)
    #[arg(long, short = 'f', env = "SITEHUB_DATA_FILE", global = true)]
    pub data_file: Option<PathBuf>,

    /// Config file to read instead of the platform default
    #[arg(long, env = "SITEHUB_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format [default: from config, else table]
    #[arg(long, short = 'o', env = "SITEHUB_OUTPUT", global = true)]
    pub output: Option<OutputFormat>,

    /// When to use color output [default: from config, else auto]
    #[arg(long, global = true)]
    pub color: Option<ColorMode>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,
}

impl GlobalOpts {
    pub fn output_format(&self) -> OutputFormat {
        self.output.clone().unwrap_or(OutputFormat::Table)
    }

    pub fn color_mode(&self) -> ColorMode {
        self.color.clone().unwrap_or(ColorMode::Auto)
    }
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SiteTypeArg {
    /// Site exposes a new-api compatible console
    NewApi,
    /// Anything else
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum ImportModeArg {
    /// Update sites whose id matches, append the rest
    #[default]
    Upsert,
    /// Replace every site with the imported set
    Replace,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage registered sites
    #[command(alias = "s")]
    Sites(SitesArgs),

    /// List every tag in use, sorted
    Tags,

    /// Merge or replace sites from a JSON document
    Import(ImportArgs),

    /// Write the whole registry as a JSON document
    Export(ExportArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  SITES
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct SitesArgs {
    #[command(subcommand)]
    pub command: SitesCommand,
}

#[derive(Debug, Subcommand)]
pub enum SitesCommand {
    /// List sites, optionally filtered
    #[command(alias = "ls")]
    List(SiteListArgs),

    /// Show one site
    Get {
        /// Site ID
        id: String,
    },

    /// Register a new site
    #[command(alias = "add")]
    Create(SiteCreateArgs),

    /// Change selected fields of a site
    #[command(alias = "edit")]
    Update(SiteUpdateArgs),

    /// Remove a site
    #[command(alias = "rm")]
    Delete {
        /// Site ID
        id: String,
    },
}

/// Filters compose with AND; omitted filters match everything.
#[derive(Debug, Args)]
pub struct SiteListArgs {
    /// Case-insensitive text matched against name, URL and maintainer names
    #[arg(long, short = 'Q')]
    pub query: Option<String>,

    /// Only sites whose check-in flag equals this value
    #[arg(long, value_name = "BOOL")]
    pub checkin: Option<bool>,

    /// Only sites whose benefit flag equals this value
    #[arg(long, value_name = "BOOL")]
    pub benefit: Option<bool>,

    /// Only sites carrying this tag
    #[arg(long, short = 't')]
    pub tag: Option<String>,
}

#[derive(Debug, Args)]
pub struct SiteCreateArgs {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Absolute base URL
    #[arg(long)]
    pub url: String,

    /// Site type
    #[arg(long = "type", value_enum)]
    pub site_type: Option<SiteTypeArg>,

    /// API key (new-api sites)
    #[arg(long)]
    pub api_key: Option<String>,

    /// API user id (new-api sites)
    #[arg(long)]
    pub api_user_id: Option<String>,

    /// Site offers a daily check-in
    #[arg(long)]
    pub checkin: bool,

    /// Site offers a benefit page
    #[arg(long)]
    pub benefit: bool,

    /// Explicit check-in page
    #[arg(long)]
    pub checkin_url: Option<String>,

    /// Explicit benefit page
    #[arg(long)]
    pub benefit_url: Option<String>,

    /// Tag (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,

    /// Free-form notes
    #[arg(long)]
    pub notes: Option<String>,

    /// Maintainer as NAME or NAME=CONTACT_URL (repeatable)
    #[arg(long = "maintainer", short = 'm', value_name = "NAME[=CONTACT_URL]")]
    pub maintainers: Vec<String>,
}

/// Only the options given are changed.
#[derive(Debug, Args)]
pub struct SiteUpdateArgs {
    /// Site ID
    pub id: String,

    /// New display name
    #[arg(long)]
    pub name: Option<String>,

    /// New base URL
    #[arg(long)]
    pub url: Option<String>,

    /// Site type
    #[arg(long = "type", value_enum)]
    pub site_type: Option<SiteTypeArg>,

    /// API key
    #[arg(long, conflicts_with = "clear_credentials")]
    pub api_key: Option<String>,

    /// API user id
    #[arg(long, conflicts_with = "clear_credentials")]
    pub api_user_id: Option<String>,

    /// Remove the stored API key and user id
    #[arg(long)]
    pub clear_credentials: bool,

    /// Check-in flag
    #[arg(long, value_name = "BOOL")]
    pub checkin: Option<bool>,

    /// Benefit flag
    #[arg(long, value_name = "BOOL")]
    pub benefit: Option<bool>,

    /// Check-in page (empty string clears it)
    #[arg(long)]
    pub checkin_url: Option<String>,

    /// Benefit page (empty string clears it)
    #[arg(long)]
    pub benefit_url: Option<String>,

    /// Replace the tag list (repeatable)
    #[arg(long = "tag", short = 't', conflicts_with = "clear_tags")]
    pub tags: Vec<String>,

    /// Remove every tag
    #[arg(long)]
    pub clear_tags: bool,

    /// Notes (empty string clears them)
    #[arg(long)]
    pub notes: Option<String>,

    /// Replace the maintainer list, NAME or NAME=CONTACT_URL (repeatable)
    #[arg(
        long = "maintainer",
        short = 'm',
        value_name = "NAME[=CONTACT_URL]",
        conflicts_with = "clear_maintainers"
    )]
    pub maintainers: Vec<String>,

    /// Remove every maintainer
    #[arg(long)]
    pub clear_maintainers: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  IMPORT / EXPORT
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// JSON file with a top-level "sites" array, or "-" for stdin
    pub file: String,

    /// Merge strategy
    #[arg(long, value_enum, default_value_t = ImportModeArg::Upsert)]
    pub mode: ImportModeArg,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    /// Write to this file instead of stdout
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Keep API keys and user ids in the output
    #[arg(long)]
    pub include_credentials: bool,
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  CONFIG
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display current resolved configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a configuration value
    Set {
        /// Config key (e.g., "defaults.output", "export.include_credentials")
        key: String,

        /// Value to set
        value: String,
    },
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
//  COMPLETIONS
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
