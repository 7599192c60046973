// ── Document store ──
//
// One writer task owns the root document. Mutations reach it through an
// unbounded FIFO channel and are applied one at a time: mutate a private
// copy, persist it, then publish it. Readers only ever see published
// snapshots, so a mutation is visible exactly when it is durable.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info, warn};

use super::filter::SiteFilter;
use super::mutation::{Mutation, MutationEnvelope, MutationOutcome};
use super::persist;
use crate::error::CoreError;
use crate::import::{ImportBatch, ImportMode, ImportReport};
use crate::input::{SiteInput, SitePatch};
use crate::model::{RootDocument, Site, Timestamp};

/// Handle to an open site document.
///
/// Cheaply cloneable; every clone talks to the same writer task. The
/// writer stops once the last handle is dropped.
#[derive(Clone)]
pub struct DocumentStore {
    inner: Arc<StoreInner>,
}

struct StoreInner {
    path: PathBuf,
    snapshot: watch::Receiver<Arc<RootDocument>>,
    mutation_tx: mpsc::UnboundedSender<MutationEnvelope>,
}

impl DocumentStore {
    /// Open (or initialize) the document at `path` and start the writer.
    ///
    /// Missing parent directories are created. A missing file becomes a
    /// fresh, persisted document. A file that exists but does not parse is
    /// [`CoreError::Corrupt`] and the store does not start.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| CoreError::io(parent, e))?;
        }
        persist::discard_stale_temp(&path).await;

        let doc = match persist::load(&path).await? {
            Some(doc) => {
                let dupes = doc.duplicate_ids();
                if !dupes.is_empty() {
                    warn!(path = %path.display(), ids = ?dupes, "document contains duplicate site ids");
                }
                info!(path = %path.display(), sites = doc.sites.len(), "opened site document");
                doc
            }
            None => {
                let doc = RootDocument::new();
                persist::persist(&path, &doc).await?;
                info!(path = %path.display(), "created new site document");
                doc
            }
        };

        let doc = Arc::new(doc);
        let (snapshot_tx, snapshot) = watch::channel(Arc::clone(&doc));
        let (mutation_tx, mutation_rx) = mpsc::unbounded_channel();
        tokio::spawn(writer_task(path.clone(), doc, mutation_rx, snapshot_tx));

        Ok(Self {
            inner: Arc::new(StoreInner {
                path,
                snapshot,
                mutation_tx,
            }),
        })
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// The last committed document. Shared and immutable.
    pub fn snapshot(&self) -> Arc<RootDocument> {
        Arc::clone(&self.inner.snapshot.borrow())
    }

    /// Sites matching every constraint in `filter`, in document order.
    pub fn list_sites(&self, filter: &SiteFilter) -> Vec<Site> {
        self.snapshot()
            .sites
            .iter()
            .filter(|site| filter.matches(site))
            .cloned()
            .collect()
    }

    pub fn get_site(&self, id: &str) -> Option<Site> {
        self.snapshot().site(id).cloned()
    }

    /// Sorted, de-duplicated tags across all sites.
    pub fn list_tags(&self) -> Vec<String> {
        self.snapshot().tags()
    }

    /// An independent copy of the whole document.
    pub fn export_data(&self) -> RootDocument {
        self.snapshot().as_ref().clone()
    }

    /// Observe committed documents. Rolled-back mutations are never sent.
    pub fn subscribe(&self) -> watch::Receiver<Arc<RootDocument>> {
        self.inner.snapshot.clone()
    }

    // ── Writes ───────────────────────────────────────────────────────

    /// Validate `input` and append it as a new site with a fresh id.
    ///
    /// A caller-supplied `id` is ignored.
    pub async fn create_site(&self, input: SiteInput) -> Result<Site, CoreError> {
        let draft = input.validate("")?;
        match self.submit(Mutation::Create(draft)).await? {
            MutationOutcome::Created(site) => Ok(site),
            other => unreachable!("create answered with {other:?}"),
        }
    }

    /// Apply a partial update. `Ok(None)` when no site has `id`.
    pub async fn update_site(&self, id: &str, patch: SitePatch) -> Result<Option<Site>, CoreError> {
        let mutation = Mutation::Update {
            id: id.to_owned(),
            patch,
        };
        match self.submit(mutation).await? {
            MutationOutcome::Updated(site) => Ok(site),
            other => unreachable!("update answered with {other:?}"),
        }
    }

    /// Remove a site. `Ok(false)` when no site has `id`.
    pub async fn delete_site(&self, id: &str) -> Result<bool, CoreError> {
        let mutation = Mutation::Delete { id: id.to_owned() };
        match self.submit(mutation).await? {
            MutationOutcome::Deleted(found) => Ok(found),
            other => unreachable!("delete answered with {other:?}"),
        }
    }

    /// Parse, validate and apply a `{ "sites": [...] }` payload.
    ///
    /// The whole batch is validated before anything is queued.
    pub async fn import_data(&self, payload: &Value, mode: ImportMode) -> Result<ImportReport, CoreError> {
        let batch = ImportBatch::parse(payload, mode)?;
        self.import_batch(batch).await
    }

    pub async fn import_batch(&self, batch: ImportBatch) -> Result<ImportReport, CoreError> {
        match self.submit(Mutation::Import(batch)).await? {
            MutationOutcome::Imported(report) => Ok(report),
            other => unreachable!("import answered with {other:?}"),
        }
    }

    /// Queue a mutation and wait until it is committed or rejected.
    async fn submit(&self, mutation: Mutation) -> Result<MutationOutcome, CoreError> {
        let (tx, rx) = oneshot::channel();
        self.inner
            .mutation_tx
            .send(MutationEnvelope {
                mutation,
                response_tx: tx,
            })
            .map_err(|_| CoreError::StoreClosed)?;

        rx.await.map_err(|_| CoreError::StoreClosed)?
    }
}

// ── Writer task ──────────────────────────────────────────────────────

/// Apply queued mutations in arrival order. Each one is fully persisted
/// (or rolled back) before the next is taken off the queue.
async fn writer_task(
    path: PathBuf,
    mut current: Arc<RootDocument>,
    mut rx: mpsc::UnboundedReceiver<MutationEnvelope>,
    published: watch::Sender<Arc<RootDocument>>,
) {
    while let Some(envelope) = rx.recv().await {
        let label = envelope.mutation.label();
        let started = Instant::now();

        let result = match commit(&path, &current, envelope.mutation).await {
            Ok((Some(next), outcome)) => {
                current = next;
                published.send_replace(Arc::clone(&current));
                debug!(
                    mutation = label,
                    sites = current.sites.len(),
                    elapsed_ms = started.elapsed().as_millis(),
                    "mutation committed"
                );
                Ok(outcome)
            }
            Ok((None, outcome)) => {
                debug!(mutation = label, "mutation left document unchanged");
                Ok(outcome)
            }
            Err(e) if e.is_client_error() => {
                debug!(mutation = label, error = %e, "mutation rejected");
                Err(e)
            }
            Err(e) => {
                warn!(mutation = label, error = %e, "mutation rolled back");
                Err(e)
            }
        };

        // The caller may have given up waiting; the commit stands either way.
        let _ = envelope.response_tx.send(result);
    }

    debug!(path = %path.display(), "writer task stopped");
}

/// Apply `mutation` to a copy of `current` and persist the copy.
///
/// Returns the new document when something changed. On any error the copy
/// is dropped and `current` stays the state of record.
async fn commit(
    path: &Path,
    current: &RootDocument,
    mutation: Mutation,
) -> Result<(Option<Arc<RootDocument>>, MutationOutcome), CoreError> {
    let mut working = current.clone();
    let now = Timestamp::now_after(current.updated_at);

    let applied = mutation.apply(&mut working, now)?;
    if !applied.changed {
        return Ok((None, applied.outcome));
    }

    working.updated_at = now;
    persist::persist(path, &working).await?;
    Ok((Some(Arc::new(working)), applied.outcome))
}
