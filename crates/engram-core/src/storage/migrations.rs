//! Versioned, append-only schema migrations, applied in order against a
//! `schema_version` table. Mirrors the adapted codebase's `MIGRATIONS: &[Migration]`
//! const-array idiom (§10.5) rather than an external migration-runner crate.

use rusqlite::Connection;

use crate::error::{CoreError, Result};

pub struct Migration {
    pub version: u32,
    pub description: &'static str,
    pub up: &'static str,
}

const MIGRATION_V1_UP: &str = r#"
CREATE TABLE IF NOT EXISTS memory_records (
    id              TEXT PRIMARY KEY,
    content         TEXT NOT NULL,
    embedding       BLOB NOT NULL,
    memory_type     TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    last_review     TEXT NOT NULL,
    stability       REAL NOT NULL,
    difficulty      REAL NOT NULL,
    review_count    INTEGER NOT NULL DEFAULT 0,
    access_count    INTEGER NOT NULL DEFAULT 0,
    importance      REAL NOT NULL DEFAULT 0.5
);

CREATE TABLE IF NOT EXISTS memory_audit (
    id                TEXT PRIMARY KEY,
    new_content_hash  TEXT NOT NULL,
    matched_id        TEXT,
    decision          TEXT NOT NULL,
    similarity        REAL NOT NULL,
    reason            TEXT NOT NULL,
    degraded          INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS memory_conflicts (
    id                  TEXT PRIMARY KEY,
    memory_a            TEXT NOT NULL,
    memory_b            TEXT NOT NULL,
    similarity          REAL NOT NULL,
    contradiction       REAL NOT NULL,
    detected_at         TEXT NOT NULL,
    resolved            INTEGER NOT NULL DEFAULT 0
);
"#;

const MIGRATION_V2_UP: &str = r#"
CREATE INDEX IF NOT EXISTS idx_memory_records_last_review ON memory_records(last_review);
CREATE INDEX IF NOT EXISTS idx_memory_records_memory_type ON memory_records(memory_type);
CREATE INDEX IF NOT EXISTS idx_memory_audit_matched_id ON memory_audit(matched_id);
"#;

pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        description: "create memory_records, memory_audit, memory_conflicts",
        up: MIGRATION_V1_UP,
    },
    Migration {
        version: 2,
        description: "index last_review, memory_type, audit matched_id",
        up: MIGRATION_V2_UP,
    },
];

fn current_version(conn: &Connection) -> Result<u32> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);",
    )?;
    let count: u32 = conn.query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))?;
    if count == 0 {
        conn.execute("INSERT INTO schema_version (version) VALUES (0)", [])?;
        return Ok(0);
    }
    conn.query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .map_err(CoreError::from)
}

/// Applies every migration with `version > current`, in ascending order,
/// each inside its own transaction, bumping `schema_version` as it goes.
/// Idempotent: re-running against an up-to-date database is a no-op.
pub fn apply_migrations(conn: &mut Connection) -> Result<()> {
    let mut version = current_version(conn)?;
    for migration in MIGRATIONS {
        if migration.version <= version {
            continue;
        }
        let tx = conn.transaction()?;
        tx.execute_batch(migration.up).map_err(|e| {
            CoreError::Migration(format!(
                "migration v{} ({}) failed: {e}",
                migration.version, migration.description
            ))
        })?;
        tx.execute("UPDATE schema_version SET version = ?1", [migration.version])?;
        tx.commit()?;
        version = migration.version;
    }
    Ok(())
}
