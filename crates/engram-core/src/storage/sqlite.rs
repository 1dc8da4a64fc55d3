//! SQLite reference implementation of [`StorageBackend`]/[`StorageTxn`].
//! Grounded on the adapted codebase's reader/writer `Mutex<Connection>`
//! split and PRAGMA tuning (§10.5): one connection dedicated to writes so a
//! long-running reader scan never blocks a save, both opened against the
//! same file with WAL enabled.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};

use super::migrations::apply_migrations;
use super::{StorageBackend, StorageTxn};
use crate::error::{CoreError, Result};
use crate::model::{AuditEntry, ConflictEntry, Decision, MemoryRecord, MemoryType, RecordId};
use crate::tier::{is_archived, lifecycle_state};

/// Transaction commit is retried this many times on `SQLITE_BUSY`/`LOCKED`
/// before the caller sees [`CoreError::StoreConflict`] (§5, §7).
const MAX_RETRIES: u32 = 3;

fn configure_connection(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = 5000;
         PRAGMA cache_size = -16000;
         PRAGMA mmap_size = 268435456;",
    )?;
    Ok(())
}

/// Resolves the default database path under the platform's data directory
/// (`~/.local/share/engram/engram.sqlite3` on Linux), mirroring the adapted
/// codebase's `directories::ProjectDirs`-based layout.
pub fn default_db_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("dev", "engram", "engram")
        .ok_or_else(|| CoreError::ConfigInvalid("could not resolve a home directory".into()))?;
    Ok(dirs.data_dir().join("engram.sqlite3"))
}

#[cfg(unix)]
fn harden_permissions(dir: &Path, db_path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
    if db_path.exists() {
        std::fs::set_permissions(db_path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn harden_permissions(_dir: &Path, _db_path: &Path) -> Result<()> {
    Ok(())
}

fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(embedding.len() * 4);
    for v in embedding {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

fn row_to_record(row: &Row) -> rusqlite::Result<MemoryRecord> {
    let id: String = row.get("id")?;
    let memory_type: String = row.get("memory_type")?;
    let created_at: String = row.get("created_at")?;
    let last_review: String = row.get("last_review")?;
    let embedding_blob: Vec<u8> = row.get("embedding")?;
    Ok(MemoryRecord {
        id: id.parse().map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "id".into(), rusqlite::types::Type::Text)
        })?,
        content: row.get("content")?,
        embedding: blob_to_embedding(&embedding_blob),
        memory_type: MemoryType::parse_name(&memory_type).unwrap_or_default(),
        created_at: parse_rfc3339(&created_at)?,
        last_review: parse_rfc3339(&last_review)?,
        stability: row.get("stability")?,
        difficulty: row.get("difficulty")?,
        review_count: row.get::<_, i64>("review_count")? as u64,
        access_count: row.get::<_, i64>("access_count")? as u64,
        importance: row.get("importance")?,
    })
}

fn parse_rfc3339(s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::InvalidColumnType(0, e.to_string(), rusqlite::types::Type::Text))
}

/// Shared nearest-neighbour scan, usable against either connection
/// (`StorageBackend::nearest`) or an in-flight `Transaction` (`SqliteTxn::nearest`),
/// since `rusqlite::Transaction` derefs to `Connection`.
fn nearest_in_conn(
    conn: &Connection,
    embedding: &[f32],
    k: usize,
    exclude_archived: bool,
) -> Result<Vec<(MemoryRecord, f32)>> {
    let mut stmt = conn.prepare("SELECT * FROM memory_records")?;
    let now = Utc::now();
    let mut scored: Vec<(MemoryRecord, f32)> = stmt
        .query_map([], row_to_record)?
        .filter_map(|r| r.ok())
        .filter(|record| !exclude_archived || !is_archived(lifecycle_state(record, now)))
        .map(|record| {
            let sim = crate::similarity::cosine_similarity(embedding, &record.embedding);
            (record, sim)
        })
        .collect();
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.0.last_review.cmp(&a.0.last_review))
    });
    scored.truncate(k);
    Ok(scored)
}

fn fetch_by_id_in_conn(conn: &Connection, id: &RecordId) -> Result<Option<MemoryRecord>> {
    conn.query_row(
        "SELECT * FROM memory_records WHERE id = ?1",
        [id.0.to_string()],
        row_to_record,
    )
    .optional()
    .map_err(CoreError::from)
}

/// SQLite-backed storage. `writer` and `reader` are separate connections so
/// a `nearest` scan never contends with an in-flight `transaction` (§5).
pub struct Storage {
    writer: Mutex<Connection>,
    reader: Mutex<Connection>,
}

impl Storage {
    /// Opens (creating if absent) the database at `path`, or the default
    /// platform data directory when `path` is `None`.
    pub fn open(path: Option<PathBuf>) -> Result<Self> {
        let db_path = match path {
            Some(p) => p,
            None => default_db_path()?,
        };
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
            harden_permissions(parent, &db_path)?;
        }
        let mut writer = Connection::open(&db_path)?;
        configure_connection(&writer)?;
        apply_migrations(&mut writer)?;
        harden_permissions(db_path.parent().unwrap_or(Path::new(".")), &db_path)?;

        let reader = Connection::open(&db_path)?;
        configure_connection(&reader)?;

        Ok(Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        })
    }

    /// In-memory SQLite database, used by this crate's own integration
    /// tests to exercise the real schema/SQL without touching disk. Both
    /// handles share one named in-memory database via SQLite's shared-cache
    /// mode, since plain `:memory:` connections are each their own database.
    pub fn open_in_memory() -> Result<Self> {
        let id: u32 = rand::random();
        let uri = format!("file:engram-test-{id}?mode=memory&cache=shared");
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_SHARED_CACHE;

        let mut writer = Connection::open_with_flags(&uri, flags)?;
        configure_connection(&writer)?;
        apply_migrations(&mut writer)?;

        let reader = Connection::open_with_flags(&uri, flags)?;
        configure_connection(&reader)?;

        Ok(Self {
            writer: Mutex::new(writer),
            reader: Mutex::new(reader),
        })
    }
}

impl StorageBackend for Storage {
    fn fetch_by_id(&self, id: &RecordId) -> Result<Option<MemoryRecord>> {
        let conn = self.reader.lock().map_err(|_| poison_err())?;
        fetch_by_id_in_conn(&conn, id)
    }

    fn nearest(
        &self,
        embedding: &[f32],
        k: usize,
        exclude_archived: bool,
    ) -> Result<Vec<(MemoryRecord, f32)>> {
        let conn = self.reader.lock().map_err(|_| poison_err())?;
        nearest_in_conn(&conn, embedding, k, exclude_archived)
    }

    fn transaction(&self, f: &mut dyn FnMut(&dyn StorageTxn) -> Result<()>) -> Result<()> {
        let conn = self.writer.lock().map_err(|_| poison_err())?;
        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let tx = conn.unchecked_transaction()?;
            let txn = SqliteTxn { tx: &tx };
            match f(&txn) {
                Ok(()) => {
                    tx.commit()?;
                    return Ok(());
                }
                Err(err) if is_retryable(&err) && attempt < MAX_RETRIES => {
                    drop(tx);
                    thread::sleep(jittered_backoff(attempt));
                }
                Err(err) => {
                    return Err(CoreError::StoreConflict {
                        attempts: attempt,
                        source: Box::new(err),
                    });
                }
            }
        }
    }

    fn dimensions(&self) -> Option<usize> {
        let conn = self.reader.lock().ok()?;
        let blob: Option<Vec<u8>> = conn
            .query_row("SELECT embedding FROM memory_records LIMIT 1", [], |r| r.get(0))
            .optional()
            .ok()
            .flatten();
        blob.map(|b| b.len() / 4)
    }
}

fn is_retryable(err: &CoreError) -> bool {
    matches!(
        err,
        CoreError::Database(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::DatabaseBusy || e.code == rusqlite::ErrorCode::DatabaseLocked
    )
}

/// Backoff of `attempt * 20ms` plus up to 20ms of jitter, keeping retries
/// cheap relative to the 5s `busy_timeout` already configured above.
fn jittered_backoff(attempt: u32) -> Duration {
    let base_ms = attempt as u64 * 20;
    let jitter_ms = (rand::random::<u8>() % 20) as u64;
    Duration::from_millis(base_ms + jitter_ms)
}

fn poison_err() -> CoreError {
    CoreError::Database(rusqlite::Error::SqliteFailure(
        rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_MISUSE),
        Some("connection mutex poisoned".into()),
    ))
}

struct SqliteTxn<'a> {
    tx: &'a rusqlite::Transaction<'a>,
}

impl StorageTxn for SqliteTxn<'_> {
    fn fetch_by_id(&self, id: &RecordId) -> Result<Option<MemoryRecord>> {
        fetch_by_id_in_conn(self.tx, id)
    }

    fn nearest(&self, embedding: &[f32], k: usize, exclude_archived: bool) -> Result<Vec<(MemoryRecord, f32)>> {
        nearest_in_conn(self.tx, embedding, k, exclude_archived)
    }

    fn insert(&self, record: &MemoryRecord) -> Result<()> {
        self.tx.execute(
            "INSERT INTO memory_records
               (id, content, embedding, memory_type, created_at, last_review,
                stability, difficulty, review_count, access_count, importance)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
                record.id.0.to_string(),
                record.content,
                embedding_to_blob(&record.embedding),
                record.memory_type.as_str(),
                record.created_at.to_rfc3339(),
                record.last_review.to_rfc3339(),
                record.stability,
                record.difficulty,
                record.review_count as i64,
                record.access_count as i64,
                record.importance,
            ],
        )?;
        Ok(())
    }

    fn update(&self, record: &MemoryRecord) -> Result<()> {
        let changed = self.tx.execute(
            "UPDATE memory_records SET
               content = ?2, embedding = ?3, memory_type = ?4, last_review = ?5,
               stability = ?6, difficulty = ?7, review_count = ?8,
               access_count = ?9, importance = ?10
             WHERE id = ?1",
            rusqlite::params![
                record.id.0.to_string(),
                record.content,
                embedding_to_blob(&record.embedding),
                record.memory_type.as_str(),
                record.last_review.to_rfc3339(),
                record.stability,
                record.difficulty,
                record.review_count as i64,
                record.access_count as i64,
                record.importance,
            ],
        )?;
        if changed == 0 {
            return Err(CoreError::NotFound(record.id.0.to_string()));
        }
        Ok(())
    }

    fn append_audit(&self, entry: &AuditEntry) -> Result<()> {
        self.tx.execute(
            "INSERT INTO memory_audit
               (id, new_content_hash, matched_id, decision, similarity, reason, degraded, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                entry.id.0.to_string(),
                entry.new_content_hash,
                entry.matched_id.as_ref().map(|id| id.0.to_string()),
                decision_str(entry.decision),
                entry.similarity,
                entry.reason,
                entry.degraded as i64,
                entry.timestamp.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn append_conflict(&self, entry: &ConflictEntry) -> Result<()> {
        self.tx.execute(
            "INSERT INTO memory_conflicts
               (id, memory_a, memory_b, similarity, contradiction, detected_at, resolved)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                entry.id.0.to_string(),
                entry.memory_a_id.0.to_string(),
                entry.memory_b_id.0.to_string(),
                entry.similarity,
                entry.contradiction_score,
                entry.detected_at.to_rfc3339(),
                entry.resolved as i64,
            ],
        )?;
        Ok(())
    }
}

fn decision_str(d: Decision) -> &'static str {
    match d {
        Decision::Create => "CREATE",
        Decision::Reinforce => "REINFORCE",
        Decision::Merge => "MERGE",
        Decision::RejectAsDuplicate => "REJECT",
    }
}
