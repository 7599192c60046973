//! CLI configuration: thin wrapper around `sitehub_config`.
//!
//! Adds the `GlobalOpts` layer on top of file + environment values:
//! flags win over everything the config crate resolves.

use std::path::PathBuf;

use clap::ValueEnum;

use crate::cli::{ColorMode, GlobalOpts, OutputFormat};
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use sitehub_config::{Config, load_config_from, load_file_config, save_config_to, set_value};

// ── CLI-specific helpers ────────────────────────────────────────────

/// `--config` / `SITEHUB_CONFIG`, else the platform location.
pub fn config_path(global: &GlobalOpts) -> PathBuf {
    global
        .config
        .clone()
        .unwrap_or_else(sitehub_config::config_path)
}

pub fn load(global: &GlobalOpts) -> Result<Config, CliError> {
    Ok(load_config_from(&config_path(global))?)
}

/// Backing document path: flag > env > config file > platform default.
pub fn data_file(global: &GlobalOpts, cfg: &Config) -> PathBuf {
    global
        .data_file
        .clone()
        .unwrap_or_else(|| cfg.data_file_path())
}

/// Fill unset `--output` / `--color` from the config defaults.
pub fn apply_defaults(global: &mut GlobalOpts, cfg: &Config) -> Result<(), CliError> {
    if global.output.is_none() {
        global.output = Some(parse_choice::<OutputFormat>(
            "defaults.output",
            &cfg.defaults.output,
        )?);
    }
    if global.color.is_none() {
        global.color = Some(parse_choice::<ColorMode>("defaults.color", &cfg.defaults.color)?);
    }
    Ok(())
}

fn parse_choice<T: ValueEnum>(field: &str, value: &str) -> Result<T, CliError> {
    T::from_str(value, true).map_err(|reason| CliError::Validation {
        field: field.into(),
        reason,
    })
}
