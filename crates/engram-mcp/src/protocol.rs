//! Line-delimited JSON request/response types and the dispatcher that wires
//! them to `engram_core::orchestrate`. One request per line on stdin, one
//! response per line on stdout — no framing, no JSON-RPC envelope.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use engram_core::classifier::ClassifyInput;
use engram_core::embeddings::EmbeddingProvider;
use engram_core::model::{Decision, MemoryRecord};
use engram_core::orchestrate;
use engram_core::scorer::ScoreWeights;
use engram_core::storage::StorageBackend;

const DEFAULT_EMBED_TIMEOUT_MS: u64 = 5_000;
const DEFAULT_SEARCH_LIMIT: usize = 10;

/// Incoming requests. `deny_unknown_fields` so a typo'd field name surfaces
/// as an explicit protocol error instead of silently using defaults.
#[derive(Debug, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case", deny_unknown_fields)]
pub enum Request {
    Save {
        content: String,
        #[serde(default)]
        title: String,
        #[serde(default)]
        file_path: Option<String>,
        #[serde(default)]
        trigger_phrases: Vec<String>,
        #[serde(default)]
        importance: Option<f64>,
    },
    Search {
        query: String,
        #[serde(default)]
        limit: Option<usize>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveResponseBody {
    pub record_id: String,
    pub decision: Decision,
    pub similarity: f32,
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub record: MemoryRecord,
    pub score: f64,
    pub similarity: f32,
    pub lifecycle: String,
}

#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response {
    Ok {
        result: ResponseBody,
    },
    Error {
        error: String,
        #[serde(skip)]
        exit_code: i32,
    },
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Save(SaveResponseBody),
    Search(Vec<SearchHit>),
}

impl Response {
    pub fn error(message: impl Into<String>, exit_code: i32) -> Self {
        Response::Error {
            error: message.into(),
            exit_code,
        }
    }

    /// Exit code the process should carry if this is the last response
    /// written before stdin closes. `Ok` responses never change it, except
    /// for a save that the gate rejected as a duplicate (exit 2, §6).
    pub fn exit_code_for_last_error(&self) -> Option<i32> {
        match self {
            Response::Error { exit_code, .. } => Some(*exit_code),
            Response::Ok {
                result: ResponseBody::Save(body),
            } if body.decision == Decision::RejectAsDuplicate => Some(2),
            Response::Ok { .. } => Some(0),
        }
    }
}

pub fn handle_request(
    storage: &dyn StorageBackend,
    embedder: &dyn EmbeddingProvider,
    request: Request,
) -> Response {
    match request {
        Request::Save {
            content,
            title,
            file_path,
            trigger_phrases,
            importance,
        } => handle_save(storage, embedder, &content, &title, file_path.as_deref(), &trigger_phrases, importance),
        Request::Search { query, limit } => {
            handle_search(storage, embedder, &query, limit.unwrap_or(DEFAULT_SEARCH_LIMIT))
        }
    }
}

fn handle_save(
    storage: &dyn StorageBackend,
    embedder: &dyn EmbeddingProvider,
    content: &str,
    title: &str,
    file_path: Option<&str>,
    trigger_phrases: &[String],
    importance: Option<f64>,
) -> Response {
    let input = ClassifyInput {
        file_path,
        content,
        title,
        trigger_phrases,
    };

    match orchestrate::save(storage, embedder, &input, importance, DEFAULT_EMBED_TIMEOUT_MS, Utc::now()) {
        Ok(outcome) => Response::Ok {
            result: ResponseBody::Save(SaveResponseBody {
                record_id: outcome.record_id.0.to_string(),
                decision: outcome.decision,
                similarity: outcome.similarity,
                degraded: outcome.degraded,
            }),
        },
        Err(e) => Response::error(e.to_string(), e.exit_code()),
    }
}

fn handle_search(
    storage: &dyn StorageBackend,
    embedder: &dyn EmbeddingProvider,
    query: &str,
    limit: usize,
) -> Response {
    let weights = ScoreWeights::default();
    match orchestrate::search(storage, embedder, query, limit, &weights, DEFAULT_EMBED_TIMEOUT_MS, Utc::now()) {
        Ok(results) => {
            let hits = results
                .into_iter()
                .map(|r| SearchHit {
                    record: r.record,
                    score: r.score,
                    similarity: r.similarity,
                    lifecycle: r.lifecycle.to_string(),
                })
                .collect();
            Response::Ok {
                result: ResponseBody::Search(hits),
            }
        }
        Err(e) => Response::error(e.to_string(), e.exit_code()),
    }
}
