//! Save orchestration (§4.7): classify → embed → (PE gate → persist/reinforce
//! → audit) inside one transaction. The gate runs against the transaction's
//! own read path so it sees any record a concurrent save has just committed.

use chrono::{DateTime, Utc};

use super::content_hash;
use crate::classifier::{classify, ClassifyInput};
use crate::embeddings::EmbeddingProvider;
use crate::error::{CoreError, Result};
use crate::fsrs;
use crate::gate::{self, CandidateMemory, GateDecision};
use crate::model::{AuditEntry, Decision, MemoryRecord, Rating, RecordId};
use crate::storage::{StorageBackend, StorageTxn};

/// Everything `save` returns to the caller: which record the gate settled
/// on, what it decided, and whether the index was degraded at the time.
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub record_id: RecordId,
    pub decision: Decision,
    pub similarity: f32,
    pub degraded: bool,
}

/// Runs the full save pipeline for one piece of new content. `input.content`
/// drives both classification and embedding; `importance` seeds a brand-new
/// record's importance when the decision is CREATE.
pub fn save(
    storage: &dyn StorageBackend,
    embedder: &dyn EmbeddingProvider,
    input: &ClassifyInput,
    importance: Option<f64>,
    timeout_ms: u64,
    now: DateTime<Utc>,
) -> Result<SaveOutcome> {
    let classification = classify(input);
    let embedding = embedder.embed(input.content, timeout_ms)?;

    if let Some(expected) = storage.dimensions() {
        if expected != embedding.len() {
            return Err(CoreError::DimensionMismatch {
                expected,
                actual: embedding.len(),
            });
        }
    }

    let hash = content_hash(input.content);

    // The candidate fetch and gate decision run *inside* the transaction, re-read
    // against the exclusive writer lock rather than a pre-transaction snapshot.
    // Two concurrent identical saves would otherwise both read "no candidates"
    // and both CREATE; re-running the gate here against the same lock that
    // serialises `insert`/`update` is what makes §5's "exactly one record"
    // guarantee hold for concurrent saves of semantically identical content.
    let mut outcome = None;
    storage.transaction(&mut |txn| {
        let (candidates, index_available) = match txn.nearest(&embedding, gate::CANDIDATE_K, true) {
            Ok(hits) => (
                hits.into_iter()
                    .map(|(record, _)| CandidateMemory {
                        id: record.id,
                        content: record.content,
                        embedding: record.embedding,
                        last_review: record.last_review,
                    })
                    .collect::<Vec<_>>(),
                true,
            ),
            Err(err) => {
                tracing::warn!(error = %err, "similarity index unavailable, falling through to CREATE");
                (Vec::new(), false)
            }
        };

        let decision = gate::evaluate(input.content, &embedding, &candidates, index_available, now);
        tracing::debug!(
            decision = %decision.decision,
            similarity = decision.similarity,
            matched_id = ?decision.matched_id,
            degraded = decision.degraded,
            reason = %decision.reason,
            "PE gate decision"
        );

        let record_id = apply_decision(
            txn,
            &decision,
            input.content,
            &embedding,
            classification.memory_type,
            importance,
            now,
        )?;

        let audit = AuditEntry {
            id: RecordId::new(),
            new_content_hash: hash.clone(),
            matched_id: decision.matched_id.clone(),
            decision: decision.decision,
            similarity: decision.similarity,
            reason: decision.reason.clone(),
            timestamp: now,
            degraded: decision.degraded,
        };
        txn.append_audit(&audit)?;

        if let Some(mut conflict) = decision.conflict.clone() {
            conflict.memory_b_id = record_id;
            txn.append_conflict(&conflict)?;
        }

        outcome = Some(SaveOutcome {
            record_id,
            decision: decision.decision,
            similarity: decision.similarity,
            degraded: decision.degraded,
        });
        Ok(())
    })?;

    Ok(outcome.expect("transaction always sets an outcome on success"))
}

/// Executes the store-side effect of a gate decision inside the active
/// transaction, returning the id of the record the outcome is keyed to (the
/// new record for CREATE, the matched one for REINFORCE/MERGE/REJECT).
fn apply_decision(
    txn: &dyn StorageTxn,
    decision: &GateDecision,
    content: &str,
    embedding: &[f32],
    memory_type: crate::model::MemoryType,
    importance: Option<f64>,
    now: DateTime<Utc>,
) -> Result<RecordId> {
    match decision.decision {
        Decision::Create => {
            let record = MemoryRecord::new(content, embedding.to_vec(), memory_type, importance, now);
            txn.insert(&record)?;
            Ok(record.id)
        }
        // Per §4.4: a rejected duplicate still reinforces the matched record.
        Decision::Reinforce | Decision::RejectAsDuplicate => reinforce(txn, decision, Rating::Good, now),
        // MERGE candidacy: the gate does not fabricate merged content (§4.4);
        // the reference orchestrator reinforces the matched record with a
        // softer grade and returns its id, leaving any actual content merge
        // to the caller (see DESIGN.md Open Questions).
        Decision::Merge => reinforce(txn, decision, Rating::Hard, now),
    }
}

fn reinforce(txn: &dyn StorageTxn, decision: &GateDecision, grade: Rating, now: DateTime<Utc>) -> Result<RecordId> {
    let matched_id = decision
        .matched_id
        .clone()
        .expect("REINFORCE/MERGE/REJECT always carry a matched_id");
    let mut record = txn
        .fetch_by_id(&matched_id)?
        .ok_or_else(|| CoreError::NotFound(matched_id.0.to_string()))?;

    let r_now = fsrs::retrievability(record.days_since_review(now), record.stability);
    let (stability, difficulty) = fsrs::update(record.stability, record.difficulty, record.memory_type, grade, r_now);
    record.stability = stability;
    record.difficulty = difficulty;
    record.review_count += 1;
    record.access_count += 1;
    record.last_review = now;

    txn.update(&record)?;
    Ok(record.id)
}
