// ── Mutations ──
//
// Every write to the document flows through a `Mutation` sent to the
// writer task. `apply` runs against a private copy of the document, so a
// mutation that fails (or whose persistence fails) leaves no trace.

use std::collections::HashSet;

use tokio::sync::oneshot;

use crate::error::CoreError;
use crate::import::{ImportBatch, ImportMode, ImportReport};
use crate::input::{SiteDraft, SitePatch};
use crate::model::{EntityId, RootDocument, SITE_PREFIX, Site, Timestamp};

/// A mutation envelope sent through the write queue.
pub(crate) struct MutationEnvelope {
    pub mutation: Mutation,
    pub response_tx: oneshot::Sender<Result<MutationOutcome, CoreError>>,
}

#[derive(Debug)]
pub(crate) enum Mutation {
    Create(SiteDraft),
    Update { id: String, patch: SitePatch },
    Delete { id: String },
    Import(ImportBatch),
}

#[derive(Debug)]
pub(crate) enum MutationOutcome {
    Created(Site),
    Updated(Option<Site>),
    Deleted(bool),
    Imported(ImportReport),
}

/// Result of applying a mutation to the working copy.
pub(crate) struct Applied {
    pub outcome: MutationOutcome,
    /// `false` when the document was left untouched (e.g. unknown id).
    pub changed: bool,
}

impl Mutation {
    pub(crate) fn label(&self) -> &'static str {
        match self {
            Self::Create(_) => "create",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
            Self::Import(batch) => match batch.mode() {
                ImportMode::Upsert => "import-upsert",
                ImportMode::Replace => "import-replace",
            },
        }
    }

    /// Apply to `doc`, stamping touched records with `now`.
    pub(crate) fn apply(self, doc: &mut RootDocument, now: Timestamp) -> Result<Applied, CoreError> {
        match self {
            Self::Create(draft) => {
                let id = fresh_id(|id| doc.contains(id));
                let site = draft.into_site(id, now);
                doc.sites.push(site.clone());
                Ok(changed(MutationOutcome::Created(site)))
            }

            Self::Update { id, patch } => {
                let Some(index) = doc.position(&id) else {
                    return Ok(unchanged(MutationOutcome::Updated(None)));
                };
                let changes = patch.validate()?;
                let site = &mut doc.sites[index];
                changes.apply_to(site);
                site.updated_at = now.max(site.updated_at);
                Ok(changed(MutationOutcome::Updated(Some(site.clone()))))
            }

            Self::Delete { id } => match doc.position(&id) {
                Some(index) => {
                    doc.sites.remove(index);
                    Ok(changed(MutationOutcome::Deleted(true)))
                }
                None => Ok(unchanged(MutationOutcome::Deleted(false))),
            },

            Self::Import(batch) => {
                let report = match batch.mode {
                    ImportMode::Replace => replace_all(doc, batch.drafts, now),
                    ImportMode::Upsert => upsert_all(doc, batch.drafts, now),
                };
                Ok(changed(MutationOutcome::Imported(report)))
            }
        }
    }
}

fn changed(outcome: MutationOutcome) -> Applied {
    Applied {
        outcome,
        changed: true,
    }
}

fn unchanged(outcome: MutationOutcome) -> Applied {
    Applied {
        outcome,
        changed: false,
    }
}

/// Generate a site id for which `taken` is false.
fn fresh_id(taken: impl Fn(&EntityId) -> bool) -> EntityId {
    loop {
        let id = EntityId::generate(SITE_PREFIX);
        if !taken(&id) {
            return id;
        }
    }
}

fn replace_all(doc: &mut RootDocument, drafts: Vec<SiteDraft>, now: Timestamp) -> ImportReport {
    let mut used: HashSet<EntityId> = drafts.iter().filter_map(|d| d.id().cloned()).collect();

    let mut sites = Vec::with_capacity(drafts.len());
    for mut draft in drafts {
        let id = draft
            .id
            .take()
            .unwrap_or_else(|| fresh_id(|id| used.contains(id)));
        used.insert(id.clone());
        sites.push(draft.into_site(id, now));
    }

    let count = sites.len();
    doc.sites = sites;
    ImportReport {
        mode: ImportMode::Replace,
        imported_sites: count,
        created_sites: count,
        updated_sites: 0,
        replaced: true,
    }
}

fn upsert_all(doc: &mut RootDocument, drafts: Vec<SiteDraft>, now: Timestamp) -> ImportReport {
    let mut created = 0;
    let mut updated = 0;

    for mut draft in drafts {
        let existing = draft.id().and_then(|id| doc.position(id.as_str()));
        if let Some(index) = existing {
            draft.merge_into(&mut doc.sites[index], now);
            updated += 1;
        } else {
            let id = draft
                .id
                .take()
                .unwrap_or_else(|| fresh_id(|id| doc.contains(id)));
            doc.sites.push(draft.into_site(id, now));
            created += 1;
        }
    }

    ImportReport {
        mode: ImportMode::Upsert,
        imported_sites: created + updated,
        created_sites: created,
        updated_sites: updated,
        replaced: false,
    }
}
