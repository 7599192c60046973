// ── Domain model ──
//
// Canonical persisted types. Everything handed out by the store is an
// owned clone of these, never a reference into store memory.

pub mod document;
pub mod entity_id;
pub mod site;
pub mod timestamp;

use serde::{Deserialize, Deserializer};

pub use document::{RootDocument, SCHEMA_VERSION};
pub use entity_id::{EntityId, MAINTAINER_PREFIX, SITE_PREFIX};
pub use site::{Maintainer, Site, SiteType};
pub use timestamp::Timestamp;

/// Read an explicit `null` the same way as an absent field.
///
/// Pair with `#[serde(default)]` so hand-edited documents with `null`
/// placeholders still load.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
