//! The storage contract (§6) consumed by the core, plus a SQLite reference
//! implementation and an in-memory fake used by the crate's own unit tests
//! and by the orchestrators' tests in isolation from any real database.

mod memory;
pub mod migrations;
mod sqlite;

pub use memory::InMemoryBackend;
pub use sqlite::Storage;

use crate::error::Result;
use crate::model::{AuditEntry, ConflictEntry, MemoryRecord, RecordId};

/// Read/candidate-search half of the contract. Implementations take `&self`
/// so the whole backend can be shared behind `Arc` (§5's reference mapping).
pub trait StorageBackend: Send + Sync {
    fn fetch_by_id(&self, id: &RecordId) -> Result<Option<MemoryRecord>>;

    /// Top-`k` nearest neighbours by cosine similarity. When
    /// `exclude_archived` is set, archived records (§4.6) are omitted.
    fn nearest(
        &self,
        embedding: &[f32],
        k: usize,
        exclude_archived: bool,
    ) -> Result<Vec<(MemoryRecord, f32)>>;

    /// Runs `f` inside a single write transaction; either every call inside
    /// `f` commits or none do (§5 ordering guarantees, §7 `StoreConflict`).
    fn transaction(&self, f: &mut dyn FnMut(&dyn StorageTxn) -> Result<()>) -> Result<()>;

    /// Fixed embedding dimensionality for this store, or `None` if no record
    /// has been written yet (dimensionality is pinned by the first insert).
    fn dimensions(&self) -> Option<usize>;
}

/// Write half of the contract, scoped to the lifetime of one transaction.
///
/// `fetch_by_id`/`nearest` are mirrored here (not just on [`StorageBackend`])
/// so the save pipeline can re-run the PE gate against the exclusive writer
/// lock rather than against a snapshot taken before it: §5's "exactly one
/// record" guarantee for two concurrent identical saves depends on the
/// second caller's duplicate check happening after the first caller's
/// insert has committed, which only holds if both checks go through the
/// same in-transaction read path.
pub trait StorageTxn {
    fn fetch_by_id(&self, id: &RecordId) -> Result<Option<MemoryRecord>>;
    fn nearest(&self, embedding: &[f32], k: usize, exclude_archived: bool) -> Result<Vec<(MemoryRecord, f32)>>;
    fn insert(&self, record: &MemoryRecord) -> Result<()>;
    fn update(&self, record: &MemoryRecord) -> Result<()>;
    fn append_audit(&self, entry: &AuditEntry) -> Result<()>;
    fn append_conflict(&self, entry: &ConflictEntry) -> Result<()>;
}
