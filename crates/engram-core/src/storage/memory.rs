//! An in-process fake store, used by this crate's own unit tests and by the
//! orchestrators' tests in isolation from a real database. Not grounded on
//! any one adapted-codebase file (it has no in-memory fake of its own);
//! justified directly by the storage contract's testability requirement.

use std::sync::Mutex;

use chrono::Utc;

use super::{StorageBackend, StorageTxn};
use crate::error::{CoreError, Result};
use crate::model::{AuditEntry, ConflictEntry, MemoryRecord, RecordId};
use crate::tier::{is_archived, lifecycle_state};

#[derive(Default)]
struct Tables {
    records: Vec<MemoryRecord>,
    audit: Vec<AuditEntry>,
    conflicts: Vec<ConflictEntry>,
}

pub struct InMemoryBackend {
    tables: Mutex<Tables>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(Tables::default()),
        }
    }

    /// Snapshot of every audit entry written so far, newest last. Used by
    /// orchestrator tests to assert a save produced exactly one audit row.
    pub fn audit_log(&self) -> Vec<AuditEntry> {
        self.tables.lock().unwrap().audit.clone()
    }

    pub fn conflict_log(&self) -> Vec<ConflictEntry> {
        self.tables.lock().unwrap().conflicts.clone()
    }
}

impl Default for InMemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageBackend for InMemoryBackend {
    fn fetch_by_id(&self, id: &RecordId) -> Result<Option<MemoryRecord>> {
        let tables = self.tables.lock().unwrap();
        Ok(tables.records.iter().find(|r| &r.id == id).cloned())
    }

    fn nearest(
        &self,
        embedding: &[f32],
        k: usize,
        exclude_archived: bool,
    ) -> Result<Vec<(MemoryRecord, f32)>> {
        let tables = self.tables.lock().unwrap();
        Ok(nearest_in(&tables, embedding, k, exclude_archived))
    }

    fn transaction(&self, f: &mut dyn FnMut(&dyn StorageTxn) -> Result<()>) -> Result<()> {
        // The lock is held for the whole closure, not re-acquired per call,
        // so a save's re-run-the-gate-inside-the-transaction check (§4.4,
        // §5) actually excludes concurrent callers the way the SQLite
        // backend's writer mutex does.
        let guard = self.tables.lock().unwrap();
        let txn = InMemoryTxn {
            tables: std::cell::RefCell::new(guard),
        };
        f(&txn)
    }

    fn dimensions(&self) -> Option<usize> {
        self.tables.lock().unwrap().records.first().map(|r| r.embedding.len())
    }
}

fn nearest_in(tables: &Tables, embedding: &[f32], k: usize, exclude_archived: bool) -> Vec<(MemoryRecord, f32)> {
    let now = Utc::now();
    let mut scored: Vec<(MemoryRecord, f32)> = tables
        .records
        .iter()
        .filter(|r| !exclude_archived || !is_archived(lifecycle_state(r, now)))
        .map(|r| (r.clone(), crate::similarity::cosine_similarity(embedding, &r.embedding)))
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.0.last_review.cmp(&a.0.last_review))
    });
    scored.truncate(k);
    scored
}

struct InMemoryTxn<'a> {
    tables: std::cell::RefCell<std::sync::MutexGuard<'a, Tables>>,
}

impl StorageTxn for InMemoryTxn<'_> {
    fn fetch_by_id(&self, id: &RecordId) -> Result<Option<MemoryRecord>> {
        Ok(self.tables.borrow().records.iter().find(|r| &r.id == id).cloned())
    }

    fn nearest(&self, embedding: &[f32], k: usize, exclude_archived: bool) -> Result<Vec<(MemoryRecord, f32)>> {
        Ok(nearest_in(&self.tables.borrow(), embedding, k, exclude_archived))
    }

    fn insert(&self, record: &MemoryRecord) -> Result<()> {
        self.tables.borrow_mut().records.push(record.clone());
        Ok(())
    }

    fn update(&self, record: &MemoryRecord) -> Result<()> {
        let mut tables = self.tables.borrow_mut();
        match tables.records.iter_mut().find(|r| r.id == record.id) {
            Some(slot) => {
                *slot = record.clone();
                Ok(())
            }
            None => Err(CoreError::NotFound(record.id.0.to_string())),
        }
    }

    fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        self.tables.borrow_mut().audit.push(entry.clone());
        Ok(())
    }

    fn append_conflict(&self, entry: &ConflictEntry) -> Result<()> {
        self.tables.borrow_mut().conflicts.push(entry.clone());
        Ok(())
    }
}
