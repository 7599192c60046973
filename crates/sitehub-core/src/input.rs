// ── Typed input for store mutations ──
//
// Callers hand the store loosely-shaped input (`SiteInput`, `SitePatch`).
// Validation turns it into normalized drafts before anything is queued,
// so the writer task only ever sees data it can apply without failing.

use std::collections::HashSet;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use url::Url;

use crate::error::CoreError;
use crate::model::{EntityId, MAINTAINER_PREFIX, Maintainer, Site, SiteType, Timestamp};

// ── Site input (create / import) ───────────────────────────────────

/// A full site record as supplied on create or inside an import batch.
///
/// Every field is optional at the type level; `name` and `url` are
/// enforced by [`SiteInput::validate`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_type: Option<SiteType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_checkin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_benefit: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checkin_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benefit_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Raw maintainer list; anything that is not an array normalizes to empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Value>,
    /// RFC 3339 text; empty means "stamp it now".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

impl SiteInput {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            url: Some(url.into()),
            ..Self::default()
        }
    }

    pub fn with_maintainers(mut self, maintainers: &[MaintainerInput]) -> Self {
        self.maintainers = serde_json::to_value(maintainers).ok();
        self
    }

    /// Check required fields and normalize everything else.
    ///
    /// `field_prefix` is prepended to field names in errors, e.g. `sites[3].`.
    pub fn validate(self, field_prefix: &str) -> Result<SiteDraft, CoreError> {
        let field = |name: &str| format!("{field_prefix}{name}");

        let name = required_text(&field("name"), self.name.as_deref(), "name is required")?;
        let url = required_url(&field("url"), self.url.as_deref(), "url is required")?;
        let created_at = self
            .created_at
            .as_deref()
            .map(str::trim)
            .filter(|raw| !raw.is_empty())
            .map(|raw| {
                raw.parse::<Timestamp>().map_err(|e| {
                    CoreError::validation(
                        field("created_at"),
                        format!("created_at must be an RFC 3339 timestamp ({e})"),
                    )
                })
            })
            .transpose()?;

        Ok(SiteDraft {
            id: self
                .id
                .filter(|id| !id.trim().is_empty())
                .map(EntityId::from),
            created_at,
            name,
            url,
            rest: SiteChanges {
                site_type: self.site_type,
                api_key: self.api_key.map(|k| optional_text(Some(&k))),
                api_user_id: self.api_user_id.map(|u| optional_text(Some(&u))),
                is_checkin: self.is_checkin,
                is_benefit: self.is_benefit,
                checkin_url: self.checkin_url.map(|u| trimmed(Some(&u))),
                benefit_url: self.benefit_url.map(|u| trimmed(Some(&u))),
                tags: self.tags.map(normalize_tags),
                notes: self.notes.map(|n| trimmed(Some(&n))),
                maintainers: self.maintainers.as_ref().map(normalize_maintainers),
                ..SiteChanges::default()
            },
        })
    }
}

// ── Maintainer input ───────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaintainerInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_url: Option<String>,
}

/// Keep only entries with a non-empty `name`; fill in ids; trim text.
///
/// Non-array input yields an empty list. A blank or repeated id is
/// replaced with a fresh one so ids stay unique within the list.
pub fn normalize_maintainers(raw: &Value) -> Vec<Maintainer> {
    let Some(entries) = raw.as_array() else {
        return Vec::new();
    };

    let mut seen: HashSet<EntityId> = HashSet::new();
    let mut maintainers = Vec::with_capacity(entries.len());
    for entry in entries {
        let Some(name) = entry.get("name").and_then(Value::as_str).map(str::trim) else {
            continue;
        };
        if name.is_empty() {
            continue;
        }

        let supplied = entry
            .get("id")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(EntityId::from)
            .filter(|id| !seen.contains(id));
        let id = supplied.unwrap_or_else(|| loop {
            let fresh = EntityId::generate(MAINTAINER_PREFIX);
            if !seen.contains(&fresh) {
                break fresh;
            }
        });
        seen.insert(id.clone());

        let contact_url = entry
            .get("contact_url")
            .and_then(Value::as_str)
            .map(str::trim)
            .unwrap_or_default()
            .to_owned();
        maintainers.push(Maintainer {
            id,
            name: name.to_owned(),
            contact_url,
        });
    }
    maintainers
}

// ── Site patch (partial update) ────────────────────────────────────

/// A partial update. Only fields present in the patch are validated and
/// applied; explicit `null` clears nullable fields and is rejected for
/// `name` / `url`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SitePatch {
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub site_type: Option<SiteType>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub api_key: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub api_user_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_checkin: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_benefit: Option<bool>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub checkin_url: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub benefit_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub notes: Option<Option<String>>,
    #[serde(deserialize_with = "present", skip_serializing_if = "Option::is_none")]
    pub maintainers: Option<Value>,
}

impl SitePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.url.is_none()
            && self.site_type.is_none()
            && self.api_key.is_none()
            && self.api_user_id.is_none()
            && self.is_checkin.is_none()
            && self.is_benefit.is_none()
            && self.checkin_url.is_none()
            && self.benefit_url.is_none()
            && self.tags.is_none()
            && self.notes.is_none()
            && self.maintainers.is_none()
    }

    pub fn validate(self) -> Result<SiteChanges, CoreError> {
        let name = self
            .name
            .map(|n| required_text("name", n.as_deref(), "name cannot be empty"))
            .transpose()?;
        let url = self
            .url
            .map(|u| required_url("url", u.as_deref(), "url cannot be empty"))
            .transpose()?;

        Ok(SiteChanges {
            name,
            url,
            site_type: self.site_type,
            api_key: self.api_key.map(|k| optional_text(k.as_deref())),
            api_user_id: self.api_user_id.map(|u| optional_text(u.as_deref())),
            is_checkin: self.is_checkin,
            is_benefit: self.is_benefit,
            checkin_url: self.checkin_url.map(|u| trimmed(u.as_deref())),
            benefit_url: self.benefit_url.map(|u| trimmed(u.as_deref())),
            tags: self.tags.map(normalize_tags),
            notes: self.notes.map(|n| trimmed(n.as_deref())),
            maintainers: self.maintainers.as_ref().map(normalize_maintainers),
        })
    }
}

/// Distinguish an explicit `null` (`Some(None)`) from an absent field (`None`).
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

// ── Validated forms ────────────────────────────────────────────────

/// Normalized field changes; `None` means "leave untouched".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SiteChanges {
    pub(crate) name: Option<String>,
    pub(crate) url: Option<String>,
    pub(crate) site_type: Option<SiteType>,
    pub(crate) api_key: Option<Option<String>>,
    pub(crate) api_user_id: Option<Option<String>>,
    pub(crate) is_checkin: Option<bool>,
    pub(crate) is_benefit: Option<bool>,
    pub(crate) checkin_url: Option<String>,
    pub(crate) benefit_url: Option<String>,
    pub(crate) tags: Option<Vec<String>>,
    pub(crate) notes: Option<String>,
    pub(crate) maintainers: Option<Vec<Maintainer>>,
}

impl SiteChanges {
    pub(crate) fn apply_to(self, site: &mut Site) {
        if let Some(name) = self.name {
            site.name = name;
        }
        if let Some(url) = self.url {
            site.url = url;
        }
        if let Some(site_type) = self.site_type {
            site.site_type = site_type;
        }
        if let Some(api_key) = self.api_key {
            site.api_key = api_key;
        }
        if let Some(api_user_id) = self.api_user_id {
            site.api_user_id = api_user_id;
        }
        if let Some(is_checkin) = self.is_checkin {
            site.is_checkin = is_checkin;
        }
        if let Some(is_benefit) = self.is_benefit {
            site.is_benefit = is_benefit;
        }
        if let Some(checkin_url) = self.checkin_url {
            site.checkin_url = checkin_url;
        }
        if let Some(benefit_url) = self.benefit_url {
            site.benefit_url = benefit_url;
        }
        if let Some(tags) = self.tags {
            site.tags = tags;
        }
        if let Some(notes) = self.notes {
            site.notes = notes;
        }
        if let Some(maintainers) = self.maintainers {
            site.maintainers = maintainers;
        }
    }
}

/// A validated full record, ready to become (or overwrite) a `Site`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteDraft {
    pub(crate) id: Option<EntityId>,
    pub(crate) created_at: Option<Timestamp>,
    pub(crate) name: String,
    pub(crate) url: String,
    pub(crate) rest: SiteChanges,
}

impl SiteDraft {
    pub fn id(&self) -> Option<&EntityId> {
        self.id.as_ref()
    }

    /// Materialize a new site. A supplied `created_at` is kept.
    pub(crate) fn into_site(self, id: EntityId, now: Timestamp) -> Site {
        let mut site = Site {
            id,
            name: self.name,
            url: self.url,
            site_type: SiteType::default(),
            api_key: None,
            api_user_id: None,
            is_checkin: false,
            is_benefit: false,
            checkin_url: String::new(),
            benefit_url: String::new(),
            tags: Vec::new(),
            notes: String::new(),
            maintainers: Vec::new(),
            created_at: self.created_at.unwrap_or(now),
            updated_at: now,
        };
        self.rest.apply_to(&mut site);
        site
    }

    /// Overwrite an existing site in place, keeping its id and `created_at`.
    pub(crate) fn merge_into(self, site: &mut Site, now: Timestamp) {
        site.name = self.name;
        site.url = self.url;
        self.rest.apply_to(site);
        site.updated_at = now.max(site.updated_at);
    }
}

// ── Field helpers ──────────────────────────────────────────────────

fn required_text(field: &str, value: Option<&str>, missing: &str) -> Result<String, CoreError> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v.to_owned()),
        _ => Err(CoreError::validation(field, missing)),
    }
}

fn required_url(field: &str, value: Option<&str>, missing: &str) -> Result<String, CoreError> {
    let url = required_text(field, value, missing)?;
    Url::parse(&url).map_err(|_| CoreError::validation(field, "url must be a valid URL"))?;
    Ok(url)
}

fn trimmed(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_owned()
}

fn optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_owned)
}

fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    tags.into_iter()
        .map(|t| t.trim().to_owned())
        .filter(|t| !t.is_empty())
        .collect()
}
