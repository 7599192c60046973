// ── Document store ──
//
// Owns the root document, serializes every mutation through a single
// writer task and persists each committed state with write-then-rename.

mod document_store;
mod filter;
mod mutation;
mod persist;

pub use document_store::DocumentStore;
pub use filter::SiteFilter;
