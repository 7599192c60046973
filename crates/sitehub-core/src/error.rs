// ── Core error types ──
//
// Every store failure lands in one of these variants. Callers classify
// them through `kind()` / `code()` instead of matching on I/O details.

use std::path::PathBuf;

use strum::Display;
use thiserror::Error;

/// Coarse classification shared by every consumer of the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// Bad caller input. Nothing was mutated.
    ClientInput,
    /// The addressed record does not exist.
    NotFound,
    /// The backing file cannot be used; startup must abort.
    Fatal,
    /// Disk I/O failed while reading or persisting.
    Io,
    /// The writer task is gone.
    Unavailable,
}

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Client input ─────────────────────────────────────────────────
    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("Invalid import format: {message}")]
    InvalidImport { message: String },

    #[error("Site not found: {id}")]
    NotFound { id: String },

    // ── Storage ──────────────────────────────────────────────────────
    #[error("Backing file {} is not a valid document", path.display())]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("I/O error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    // ── Lifecycle ────────────────────────────────────────────────────
    #[error("Document store is closed")]
    StoreClosed,
}

impl CoreError {
    pub(crate) fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::InvalidImport { .. } => ErrorKind::ClientInput,
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Corrupt { .. } => ErrorKind::Fatal,
            Self::Io { .. } | Self::Serialize(_) => ErrorKind::Io,
            Self::StoreClosed => ErrorKind::Unavailable,
        }
    }

    /// Stable machine-readable code, identical to the HTTP layer's codes.
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ClientInput => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Fatal => "STORE_CORRUPT",
            ErrorKind::Io => "INTERNAL_ERROR",
            ErrorKind::Unavailable => "UNAVAILABLE",
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::ClientInput | ErrorKind::NotFound)
    }
}
