// ── Durable persistence ──
//
// Write-then-rename: the full document goes to a sibling `.tmp` file,
// is synced to stable storage, then renamed over the backing path. A
// reader of the backing path sees either the old or the new document.

use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::model::RootDocument;

/// Sibling temporary path used during writes (`sites.json` -> `sites.json.tmp`).
pub(crate) fn temp_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".tmp");
    PathBuf::from(name)
}

pub(crate) fn encode(doc: &RootDocument) -> Result<Vec<u8>, CoreError> {
    Ok(serde_json::to_vec_pretty(doc)?)
}

/// Blocking atomic write of pre-encoded bytes.
pub(crate) fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CoreError> {
    let tmp = temp_path(path);

    let mut file = File::create(&tmp).map_err(|e| CoreError::io(&tmp, e))?;
    file.write_all(bytes).map_err(|e| CoreError::io(&tmp, e))?;
    file.sync_all().map_err(|e| CoreError::io(&tmp, e))?;
    drop(file);

    fs::rename(&tmp, path).map_err(|e| CoreError::io(path, e))?;
    sync_parent_dir(path);
    Ok(())
}

/// Make the rename itself durable. Not every filesystem can sync a
/// directory handle, so failure here is logged and ignored.
#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = File::open(parent).and_then(|dir| dir.sync_all()) {
            debug!(error = %e, dir = %parent.display(), "directory sync skipped");
        }
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

/// Serialize and atomically persist `doc` without blocking the runtime.
pub(crate) async fn persist(path: &Path, doc: &RootDocument) -> Result<(), CoreError> {
    let bytes = encode(doc)?;
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || write_atomic(&target, &bytes))
        .await
        .map_err(|e| CoreError::io(path, std::io::Error::other(e)))?
}

/// Read the backing file. `Ok(None)` when it does not exist.
///
/// A document without a `sites` array is recovered with an empty list,
/// and `null` in a defaultable field reads as its default. Text that is
/// not JSON, or a site missing `id` / `name` / `url`, is `Corrupt`.
pub(crate) async fn load(path: &Path) -> Result<Option<RootDocument>, CoreError> {
    let raw = match tokio::fs::read(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(CoreError::io(path, e)),
    };

    let corrupt = |source| CoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    };

    let mut value: Value = serde_json::from_slice(&raw).map_err(corrupt)?;
    if let Some(root) = value.as_object_mut() {
        if !root.get("sites").is_some_and(Value::is_array) {
            warn!(path = %path.display(), "document has no sites array, starting empty");
            root.insert("sites".into(), Value::Array(Vec::new()));
        }
    }
    serde_json::from_value(value).map(Some).map_err(corrupt)
}

/// Remove a temporary file left behind by an interrupted write.
pub(crate) async fn discard_stale_temp(path: &Path) {
    let tmp = temp_path(path);
    match tokio::fs::remove_file(&tmp).await {
        Ok(()) => warn!(path = %tmp.display(), "removed stale temporary file"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %tmp.display(), error = %e, "could not remove stale temporary file"),
    }
}
