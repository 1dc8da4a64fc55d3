//! Core data model: memory records, audit entries, conflict entries, and the
//! small enums shared across the scheduler, gate, scorer, and tier modules.

mod memory_type;
mod record;
mod rating;

pub use memory_type::MemoryType;
pub use rating::Rating;
pub use record::{AuditEntry, ConflictEntry, Decision, LifecycleState, MemoryRecord};

/// Opaque record identifier. A thin wrapper over a UUID so callers can't
/// accidentally pass an arbitrary string where an id is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RecordId(pub uuid::Uuid);

impl RecordId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for RecordId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for RecordId {
    type Err = uuid::Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(uuid::Uuid::parse_str(s)?))
    }
}
