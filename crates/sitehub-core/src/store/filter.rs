// ── List filters ──
//
// All present constraints must hold (AND). An absent or empty constraint
// matches everything.

use serde::{Deserialize, Serialize};

use crate::model::Site;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteFilter {
    /// Case-insensitive substring of name, URL, or a maintainer name.
    pub q: Option<String>,
    pub is_checkin: Option<bool>,
    pub is_benefit: Option<bool>,
    /// Exact (trimmed) tag.
    pub tag: Option<String>,
}

impl SiteFilter {
    pub fn text(mut self, q: impl Into<String>) -> Self {
        self.q = Some(q.into());
        self
    }

    pub fn checkin(mut self, is_checkin: bool) -> Self {
        self.is_checkin = Some(is_checkin);
        self
    }

    pub fn benefit(mut self, is_benefit: bool) -> Self {
        self.is_benefit = Some(is_benefit);
        self
    }

    pub fn tagged(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn matches(&self, site: &Site) -> bool {
        if let Some(needle) = non_empty(self.q.as_deref()) {
            if !site.matches_text(&needle.to_lowercase()) {
                return false;
            }
        }
        if self.is_checkin.is_some_and(|want| site.is_checkin != want) {
            return false;
        }
        if self.is_benefit.is_some_and(|want| site.is_benefit != want) {
            return false;
        }
        if let Some(tag) = non_empty(self.tag.as_deref()) {
            if !site.tags.iter().any(|t| t.trim() == tag) {
                return false;
            }
        }
        true
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::input::SiteInput;
    use crate::model::{EntityId, Timestamp};
    use serde_json::json;

    fn site(name: &str, url: &str, checkin: bool, maintainer: &str) -> Site {
        SiteInput {
            is_checkin: Some(checkin),
            tags: Some(vec!["relay".into()]),
            maintainers: Some(json!([{ "name": maintainer }])),
            ..SiteInput::new(name, url)
        }
        .validate("")
        .unwrap()
        .into_site(EntityId::generate("site"), Timestamp::now())
    }

    #[test]
    fn default_filter_matches_everything() {
        assert!(SiteFilter::default().matches(&site("A", "https://a.io", false, "x")));
    }

    #[test]
    fn text_and_flag_compose_with_and() {
        let filter = SiteFilter::default().text("CLOUD").checkin(true);

        assert!(filter.matches(&site("Cloud One", "https://a.io", true, "x")));
        assert!(filter.matches(&site("A", "https://mycloud.io", true, "x")));
        assert!(filter.matches(&site("A", "https://a.io", true, "Cloudy Ops")));
        assert!(!filter.matches(&site("Cloud One", "https://a.io", false, "x")));
        assert!(!filter.matches(&site("Other", "https://a.io", true, "x")));
    }

    #[test]
    fn blank_text_imposes_no_constraint() {
        let filter = SiteFilter::default().text("   ");
        assert!(filter.matches(&site("A", "https://a.io", false, "x")));
    }

    #[test]
    fn tag_filter_is_exact() {
        let s = site("A", "https://a.io", false, "x");
        assert!(SiteFilter::default().tagged(" relay ").matches(&s));
        assert!(!SiteFilter::default().tagged("rel").matches(&s));
    }

    #[test]
    fn benefit_false_matches_only_non_benefit_sites() {
        let s = site("A", "https://a.io", false, "x");
        assert!(SiteFilter::default().benefit(false).matches(&s));
        assert!(!SiteFilter::default().benefit(true).matches(&s));
    }
}
