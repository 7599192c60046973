// sitehub-core: Durable site registry document and its single-writer store.
//
// Callers open a `DocumentStore` on a backing file and talk to it through
// typed inputs (`SiteInput`, `SitePatch`, import payloads). Reads come from
// the last committed snapshot; writes are queued, applied in order, and
// acknowledged only once they are on disk.

pub mod error;
pub mod import;
pub mod input;
pub mod model;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use error::{CoreError, ErrorKind};
pub use import::{ImportBatch, ImportMode, ImportReport};
pub use input::{MaintainerInput, SiteDraft, SiteInput, SitePatch};
pub use store::{DocumentStore, SiteFilter};

pub use model::{
    EntityId, Maintainer, RootDocument, SCHEMA_VERSION, Site, SiteType, Timestamp,
};
