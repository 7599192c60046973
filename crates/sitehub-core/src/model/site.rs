// ── Site domain types ──

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use super::entity_id::EntityId;
use super::null_default;
use super::timestamp::Timestamp;

/// Path appended to a site URL when check-in is enabled without an
/// explicit `checkin_url`.
const DEFAULT_CHECKIN_PATH: &str = "/console/personal";

/// Which kind of upstream a site is.
///
/// Only `new-api` sites carry meaningful credentials.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum SiteType {
    NewApi,
    #[default]
    Other,
}

/// A named contact owned by a site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Maintainer {
    pub id: EntityId,
    pub name: String,
    #[serde(default, deserialize_with = "null_default")]
    pub contact_url: String,
}

/// A registered external site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: EntityId,
    pub name: String,
    pub url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub site_type: SiteType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_user_id: Option<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub is_checkin: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub is_benefit: bool,
    #[serde(default, deserialize_with = "null_default")]
    pub checkin_url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub benefit_url: String,
    #[serde(default, deserialize_with = "null_default")]
    pub tags: Vec<String>,
    #[serde(default, deserialize_with = "null_default")]
    pub notes: String,
    #[serde(default, deserialize_with = "null_default")]
    pub maintainers: Vec<Maintainer>,
    #[serde(default, deserialize_with = "null_default")]
    pub created_at: Timestamp,
    #[serde(default, deserialize_with = "null_default")]
    pub updated_at: Timestamp,
}

impl Site {
    /// Whether upstream balance / check-in calls can be made for this site.
    pub fn has_credentials(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        self.site_type == SiteType::NewApi && filled(&self.api_key) && filled(&self.api_user_id)
    }

    /// Where a user goes to check in, if check-in is enabled.
    pub fn checkin_link(&self) -> Option<String> {
        if !self.is_checkin {
            return None;
        }
        let explicit = self.checkin_url.trim();
        if explicit.is_empty() {
            Some(format!(
                "{}{DEFAULT_CHECKIN_PATH}",
                self.url.trim_end_matches('/')
            ))
        } else {
            Some(explicit.to_owned())
        }
    }

    /// Where a user claims benefits, if enabled and configured.
    pub fn benefit_link(&self) -> Option<&str> {
        let explicit = self.benefit_url.trim();
        (self.is_benefit && !explicit.is_empty()).then_some(explicit)
    }

    /// Drop credential fields, e.g. before handing a record outside the host.
    pub fn redact_credentials(&mut self) {
        self.api_key = None;
        self.api_user_id = None;
    }

    /// Case-insensitive substring match on name, URL, or any maintainer name.
    ///
    /// `needle` must already be lowercased.
    pub(crate) fn matches_text(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
            || self.url.to_lowercase().contains(needle)
            || self
                .maintainers
                .iter()
                .any(|m| m.name.to_lowercase().contains(needle))
    }
}
