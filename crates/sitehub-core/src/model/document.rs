// ── Root document ──
//
// The single persisted structure: schema marker, last-mutation stamp,
// and the ordered site list. Insertion order is the canonical order.

use std::collections::BTreeSet;

use serde::{Deserialize, Deserializer, Serialize};

use super::entity_id::EntityId;
use super::null_default;
use super::site::Site;
use super::timestamp::Timestamp;

/// Schema marker written into every document.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootDocument {
    #[serde(default = "schema_version", deserialize_with = "null_version")]
    pub version: u32,
    #[serde(default, deserialize_with = "null_default")]
    pub updated_at: Timestamp,
    #[serde(default, deserialize_with = "null_default")]
    pub sites: Vec<Site>,
}

fn schema_version() -> u32 {
    SCHEMA_VERSION
}

fn null_version<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    Option::<u32>::deserialize(deserializer).map(|v| v.unwrap_or(SCHEMA_VERSION))
}

impl RootDocument {
    /// Empty document stamped with the current time.
    pub fn new() -> Self {
        Self {
            version: SCHEMA_VERSION,
            updated_at: Timestamp::now(),
            sites: Vec::new(),
        }
    }

    pub fn site(&self, id: &str) -> Option<&Site> {
        self.sites.iter().find(|s| s.id == id)
    }

    pub(crate) fn position(&self, id: &str) -> Option<usize> {
        self.sites.iter().position(|s| s.id == id)
    }

    pub(crate) fn contains(&self, id: &EntityId) -> bool {
        self.sites.iter().any(|s| &s.id == id)
    }

    /// Sorted, de-duplicated tags across every site.
    pub fn tags(&self) -> Vec<String> {
        self.sites
            .iter()
            .flat_map(|s| s.tags.iter())
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_owned)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Identifiers that occur more than once, in first-seen order.
    pub fn duplicate_ids(&self) -> Vec<EntityId> {
        let mut seen = BTreeSet::new();
        let mut dupes = Vec::new();
        for site in &self.sites {
            if !seen.insert(&site.id) && !dupes.contains(&site.id) {
                dupes.push(site.id.clone());
            }
        }
        dupes
    }

    /// Strip credentials from every site.
    pub fn redact_credentials(&mut self) {
        for site in &mut self.sites {
            site.redact_credentials();
        }
    }
}

impl Default for RootDocument {
    fn default() -> Self {
        Self::new()
    }
}
