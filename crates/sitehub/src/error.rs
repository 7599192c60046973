//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use sitehub_config::ConfigError;
use sitehub_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const NOT_FOUND: i32 = 4;
    pub const CORRUPT: i32 = 6;
    pub const IO: i32 = 7;
}

#[derive(Debug, Error, Diagnostic)]
#[allow(unused_assignments)]
pub enum CliError {
    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(sitehub::not_found),
        help("Run: sitehub {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(sitehub::validation))]
    Validation { field: String, reason: String },

    #[error("Invalid import format: {reason}")]
    #[diagnostic(
        code(sitehub::invalid_import),
        help("The import file must be a JSON object with a top-level \"sites\" array.")
    )]
    InvalidImport { reason: String },

    // ── Storage ──────────────────────────────────────────────────────

    #[error("Site document {path} could not be parsed")]
    #[diagnostic(
        code(sitehub::store_corrupt),
        help(
            "The file exists but is not a valid site document. Repair it by hand, or\n\
             move it aside and re-import a previous export with: sitehub import <FILE>"
        )
    )]
    CorruptStore {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Could not read or write {path}")]
    #[diagnostic(
        code(sitehub::storage),
        help("Check that the directory exists, is writable, and the disk is not full.")
    )]
    Storage {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("The document store stopped unexpectedly")]
    #[diagnostic(code(sitehub::store_closed))]
    StoreClosed,

    // ── Configuration ────────────────────────────────────────────────

    #[error(transparent)]
    #[diagnostic(
        code(sitehub::config),
        help("Inspect the file with: sitehub config show")
    )]
    Config(Box<figment::Error>),

    #[error("Failed to write configuration: {0}")]
    #[diagnostic(code(sitehub::config_write))]
    ConfigWrite(#[from] toml::ser::Error),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(sitehub::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(sitehub::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),

    #[error("Failed to render YAML: {0}")]
    #[diagnostic(code(sitehub::yaml))]
    Yaml(#[from] serde_yaml::Error),
}

impl From<figment::Error> for CliError {
    fn from(err: figment::Error) -> Self {
        Self::Config(Box::new(err))
    }
}

impl CliError {
    pub fn site_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: "site".into(),
            identifier: id.into(),
            list_command: "sites list".into(),
        }
    }

    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. }
            | Self::InvalidImport { .. }
            | Self::NonInteractiveRequiresYes { .. }
            | Self::Json(_) => exit_code::USAGE,
            Self::CorruptStore { .. } => exit_code::CORRUPT,
            Self::Storage { .. } | Self::Io(_) => exit_code::IO,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation { field, message } => Self::Validation {
                field,
                reason: message,
            },
            CoreError::InvalidImport { message } => Self::InvalidImport { reason: message },
            CoreError::NotFound { id } => Self::site_not_found(id),
            CoreError::Corrupt { path, source } => Self::CorruptStore {
                path: path.display().to_string(),
                source,
            },
            CoreError::Io { path, source } => Self::Storage {
                path: path.display().to_string(),
                source,
            },
            CoreError::Serialize(e) => Self::Json(e),
            CoreError::StoreClosed => Self::StoreClosed,
        }
    }
}

// ── ConfigError → CliError mapping ───────────────────────────────────

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            ConfigError::Serialization(e) => Self::ConfigWrite(e),
            ConfigError::Figment(e) => Self::Config(e),
            ConfigError::Io(e) => Self::Io(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_map_to_exit_codes() {
        let validation: CliError = CoreError::Validation {
            field: "url".into(),
            message: "url is required".into(),
        }
        .into();
        assert_eq!(validation.exit_code(), exit_code::USAGE);
        assert_eq!(validation.to_string(), "Invalid value for url: url is required");

        let missing: CliError = CoreError::NotFound { id: "site_x".into() }.into();
        assert_eq!(missing.exit_code(), exit_code::NOT_FOUND);

        let io: CliError = CoreError::Io {
            path: "/tmp/x".into(),
            source: std::io::Error::other("disk full"),
        }
        .into();
        assert_eq!(io.exit_code(), exit_code::IO);

        assert_eq!(CliError::from(CoreError::StoreClosed).exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn corrupt_store_help_covers_wrong_shape() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: CliError = CoreError::Corrupt {
            path: "/data/sites.json".into(),
            source,
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::CORRUPT);
        let help = err.help().unwrap().to_string();
        assert!(help.contains("not a valid site document"), "{help}");
    }

    #[test]
    fn config_validation_is_a_usage_error() {
        let err: CliError = ConfigError::Validation {
            field: "defaults.output".into(),
            reason: "bad".into(),
        }
        .into();
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
