// ── Bulk import ──
//
// Payload parsing and whole-batch validation. Nothing here touches the
// store: a batch is either fully validated or rejected before queueing.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::CoreError;
use crate::input::{SiteDraft, SiteInput};

/// How an import batch is merged into the store.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ImportMode {
    /// Update records whose id matches, append the rest.
    #[default]
    Upsert,
    /// Substitute the whole site list with the batch.
    Replace,
}

/// Outcome counts of an import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub mode: ImportMode,
    pub imported_sites: usize,
    pub created_sites: usize,
    pub updated_sites: usize,
    pub replaced: bool,
}

/// A fully validated import batch.
#[derive(Debug, Clone)]
pub struct ImportBatch {
    pub(crate) mode: ImportMode,
    pub(crate) drafts: Vec<SiteDraft>,
}

impl ImportBatch {
    /// Parse and validate a `{ "sites": [...] }` payload.
    ///
    /// Fails on the first invalid record; the error names its index.
    pub fn parse(payload: &Value, mode: ImportMode) -> Result<Self, CoreError> {
        let records = payload
            .get("sites")
            .and_then(Value::as_array)
            .ok_or_else(|| CoreError::InvalidImport {
                message: "sites array required".into(),
            })?;

        let drafts = records
            .iter()
            .enumerate()
            .map(|(i, raw)| {
                let prefix = format!("sites[{i}].");
                let input: SiteInput = serde_json::from_value(raw.clone()).map_err(|e| {
                    CoreError::validation(format!("sites[{i}]"), e.to_string())
                })?;
                input.validate(&prefix)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_drafts(drafts, mode)
    }

    /// Build a batch from already-validated drafts.
    pub fn from_drafts(drafts: Vec<SiteDraft>, mode: ImportMode) -> Result<Self, CoreError> {
        if mode == ImportMode::Replace {
            let mut seen = HashSet::new();
            for (i, draft) in drafts.iter().enumerate() {
                if let Some(id) = draft.id() {
                    if !seen.insert(id.clone()) {
                        return Err(CoreError::validation(
                            format!("sites[{i}].id"),
                            format!("duplicate id '{id}' in replace import"),
                        ));
                    }
                }
            }
        }
        Ok(Self { mode, drafts })
    }

    pub fn mode(&self) -> ImportMode {
        self.mode
    }

    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn mode_parses_lowercase() {
        assert_eq!("replace".parse::<ImportMode>().unwrap(), ImportMode::Replace);
        assert_eq!(ImportMode::default(), ImportMode::Upsert);
        assert_eq!(ImportMode::Upsert.to_string(), "upsert");
    }

    #[test]
    fn missing_sites_array_is_rejected() {
        for payload in [json!({}), json!({ "sites": {} }), json!([]), Value::Null] {
            let err = ImportBatch::parse(&payload, ImportMode::Upsert).unwrap_err();
            assert!(matches!(err, CoreError::InvalidImport { .. }), "{payload}");
        }
    }

    #[test]
    fn invalid_record_names_its_index() {
        let payload = json!({ "sites": [
            { "name": "A", "url": "https://a.io" },
            { "name": "B", "url": "not a url" }
        ]});
        let err = ImportBatch::parse(&payload, ImportMode::Upsert).unwrap_err();
        assert_eq!(err.to_string(), "sites[1].url: url must be a valid URL");
    }

    #[test]
    fn wrongly_typed_record_is_a_validation_error() {
        let payload = json!({ "sites": [{ "name": 5, "url": "https://a.io" }] });
        let err = ImportBatch::parse(&payload, ImportMode::Upsert).unwrap_err();
        assert!(matches!(err, CoreError::Validation { ref field, .. } if field == "sites[0]"));
    }

    #[test]
    fn created_at_empty_is_absent_and_garbage_names_the_field() {
        let payload = json!({ "sites": [{ "name": "A", "url": "https://a.io", "created_at": "" }] });
        let batch = ImportBatch::parse(&payload, ImportMode::Upsert).unwrap();
        assert_eq!(batch.drafts[0].created_at, None);

        let payload = json!({ "sites": [
            { "name": "A", "url": "https://a.io" },
            { "name": "B", "url": "https://b.io", "created_at": "soon" }
        ]});
        let err = ImportBatch::parse(&payload, ImportMode::Upsert).unwrap_err();
        assert!(err.to_string().starts_with("sites[1].created_at: "), "{err}");
    }

    #[test]
    fn replace_rejects_repeated_ids() {
        let payload = json!({ "sites": [
            { "id": "site_1", "name": "A", "url": "https://a.io" },
            { "id": "site_1", "name": "B", "url": "https://b.io" }
        ]});
        assert!(ImportBatch::parse(&payload, ImportMode::Replace).is_err());
        assert_eq!(
            ImportBatch::parse(&payload, ImportMode::Upsert).unwrap().len(),
            2
        );
    }

    #[test]
    fn report_serializes_with_flat_counts() {
        let report = ImportReport {
            mode: ImportMode::Replace,
            imported_sites: 2,
            created_sites: 2,
            updated_sites: 0,
            replaced: true,
        };
        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "mode": "replace",
                "imported_sites": 2,
                "created_sites": 2,
                "updated_sites": 0,
                "replaced": true
            })
        );
    }
}
