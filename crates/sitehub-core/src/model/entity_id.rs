// ── Core identity types ──
//
// Every persisted record is addressed by an opaque string identifier of
// the form `{prefix}_{16 hex chars}`. Identifiers supplied by an import
// are kept verbatim, so consumers must never parse the structure.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix used for generated site identifiers.
pub const SITE_PREFIX: &str = "site";

/// Prefix used for generated maintainer identifiers.
pub const MAINTAINER_PREFIX: &str = "mnt";

const RANDOM_HEX_LEN: usize = 16;

// ── EntityId ────────────────────────────────────────────────────────

/// Canonical identifier for a site or maintainer.
///
/// Immutable once assigned. Generated identifiers carry 64 random bits
/// under a fixed prefix; imported identifiers are arbitrary non-empty text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Generate a fresh random identifier under `prefix`.
    pub fn generate(prefix: &str) -> Self {
        let hex = Uuid::new_v4().simple().to_string();
        let random = hex.get(..RANDOM_HEX_LEN).unwrap_or(&hex);
        Self(format!("{prefix}_{random}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq<str> for EntityId {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for EntityId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}
