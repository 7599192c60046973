//! Shared helpers for command handlers.

use std::io::{IsTerminal, Read};
use std::path::Path;

use serde_json::Value;
use sitehub_core::{ImportMode, MaintainerInput, SiteType};

use crate::cli::{ImportModeArg, SiteTypeArg};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal to ask on, refuses instead of blocking.
pub fn confirm(message: &str, yes_flag: bool, action: &str) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Read and parse JSON from a file path, or from stdin when `source` is `-`.
pub fn read_json_input(source: &str) -> Result<Value, CliError> {
    let contents = if source == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(Path::new(source))?
    };
    serde_json::from_str(&contents).map_err(|e| CliError::Validation {
        field: "file".into(),
        reason: format!("invalid JSON: {e}"),
    })
}

/// Parse `NAME` or `NAME=CONTACT_URL`.
pub fn parse_maintainer(arg: &str) -> MaintainerInput {
    let (name, contact_url) = match arg.split_once('=') {
        Some((name, url)) => (name, Some(url.trim().to_owned())),
        None => (arg, None),
    };
    MaintainerInput {
        id: None,
        name: name.trim().to_owned(),
        contact_url,
    }
}

pub fn parse_maintainers(args: &[String]) -> Vec<MaintainerInput> {
    args.iter().map(|s| parse_maintainer(s)).collect()
}

impl From<SiteTypeArg> for SiteType {
    fn from(arg: SiteTypeArg) -> Self {
        match arg {
            SiteTypeArg::NewApi => Self::NewApi,
            SiteTypeArg::Other => Self::Other,
        }
    }
}

impl From<ImportModeArg> for ImportMode {
    fn from(arg: ImportModeArg) -> Self {
        match arg {
            ImportModeArg::Upsert => Self::Upsert,
            ImportModeArg::Replace => Self::Replace,
        }
    }
}
