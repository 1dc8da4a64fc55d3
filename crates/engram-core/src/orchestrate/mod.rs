//! The two orchestrators (§4.7): free functions over `&dyn StorageBackend`
//! and `&dyn EmbeddingProvider` rather than methods on a stateful engine
//! struct, so §4.1–§4.6 stay callable and testable without any store at all
//! (the "callable without a store" redesign note, §9).

mod save;
mod search;

pub use save::{save, SaveOutcome};
pub use search::{search, SearchResult};

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// `u64` content fingerprint used for audit rows, mirroring the adapted
/// codebase's `content_hash: Option<u64>` idiom rather than pulling in a
/// cryptographic hash crate for a non-adversarial integrity tag.
pub(crate) fn content_hash(content: &str) -> String {
    let mut hasher = DefaultHasher::new();
    content.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}
