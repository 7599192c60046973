//! Shared configuration for the sitehub CLI.
//!
//! A small TOML file layered under `SITEHUB_*` environment variables.
//! Its main job is deciding where the site document lives; the CLI
//! applies its own flag overrides on top.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Output formats accepted in `defaults.output`.
pub const OUTPUT_FORMATS: &[&str] = &["table", "json", "json-compact", "yaml", "plain"];

/// Color modes accepted in `defaults.color`.
pub const COLOR_MODES: &[&str] = &["auto", "always", "never"];

/// Keys understood by [`set_value`].
pub const KEYS: &[&str] = &[
    "data_file",
    "defaults.output",
    "defaults.color",
    "export.include_credentials",
];

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Backing site document. Unset means the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_file: Option<PathBuf>,

    #[serde(default)]
    pub defaults: Defaults,

    #[serde(default)]
    pub export: ExportSettings,
}

impl Config {
    /// The configured data file, or the platform default.
    pub fn data_file_path(&self) -> PathBuf {
        self.data_file.clone().unwrap_or_else(default_data_file)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ExportSettings {
    /// Keep `api_key` / `api_user_id` in exported documents.
    #[serde(default)]
    pub include_credentials: bool,
}

// ── Paths ───────────────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "sitehub", "sitehub")
}

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    project_dirs().map_or_else(
        || dirs_fallback().join("config.toml"),
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("sitehub");
    p
}

/// Default location of the site document.
pub fn default_data_file() -> PathBuf {
    project_dirs().map_or_else(
        || PathBuf::from("data").join("sites.json"),
        |dirs| dirs.data_dir().join("sites.json"),
    )
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load defaults, then `path` (if present), then `SITEHUB_*` variables.
///
/// Nested keys use a double underscore: `SITEHUB_DEFAULTS__OUTPUT=json`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("SITEHUB_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Defaults plus `path` only, without the environment layer.
///
/// Used when editing the file, so env overrides are not written back.
pub fn load_file_config(path: &Path) -> Result<Config, ConfigError> {
    let config: Config = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(cfg, &path)?;
    Ok(path)
}

pub fn save_config_to(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Editing ─────────────────────────────────────────────────────────

/// Set a single dotted key from its textual value.
pub fn set_value(cfg: &mut Config, key: &str, value: &str) -> Result<(), ConfigError> {
    match key {
        "data_file" => {
            let value = value.trim();
            cfg.data_file = (!value.is_empty()).then(|| PathBuf::from(value));
        }
        "defaults.output" => cfg.defaults.output = one_of(key, value, OUTPUT_FORMATS)?,
        "defaults.color" => cfg.defaults.color = one_of(key, value, COLOR_MODES)?,
        "export.include_credentials" => {
            cfg.export.include_credentials =
                value.trim().parse().map_err(|_| ConfigError::Validation {
                    field: key.into(),
                    reason: format!("expected 'true' or 'false', got '{value}'"),
                })?;
        }
        other => {
            return Err(ConfigError::Validation {
                field: "key".into(),
                reason: format!("unknown key '{other}', expected one of: {}", KEYS.join(", ")),
            });
        }
    }
    Ok(())
}

fn one_of(field: &str, value: &str, allowed: &[&str]) -> Result<String, ConfigError> {
    let value = value.trim();
    if allowed.contains(&value) {
        Ok(value.to_owned())
    } else {
        Err(ConfigError::Validation {
            field: field.into(),
            reason: format!("expected one of {}, got '{value}'", allowed.join(", ")),
        })
    }
}
