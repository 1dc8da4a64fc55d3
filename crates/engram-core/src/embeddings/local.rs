//! Local ONNX embeddings via `fastembed`, feature-gated behind `embeddings`.
//! Grounded on the adapted codebase's lazy, process-wide model
//! initialisation pattern (`OnceLock`-guarded `get_model()`), but the cache
//! directory is an explicit constructor argument rather than read from
//! `std::env` here — the core must never read process environment directly
//! (§9); the CLI binary resolves `FASTEMBED_CACHE_PATH` and passes it down.

use std::path::PathBuf;
use std::sync::mpsc;
use std::sync::{Mutex, OnceLock};
use std::thread;
use std::time::Duration;

use fastembed::{EmbeddingModel, InitOptions, TextEmbedding};

use super::EmbeddingProvider;
use crate::error::{CoreError, Result};

pub const EMBEDDING_DIMENSIONS: usize = 256;

struct ModelHandle {
    model: Mutex<TextEmbedding>,
}

static MODEL: OnceLock<std::result::Result<ModelHandle, String>> = OnceLock::new();

fn get_model(cache_dir: Option<&PathBuf>) -> std::result::Result<&'static ModelHandle, String> {
    MODEL
        .get_or_init(|| {
            let mut options = InitOptions::new(EmbeddingModel::NomicEmbedTextV15);
            if let Some(dir) = cache_dir {
                options = options.with_cache_dir(dir.clone());
            }
            TextEmbedding::try_new(options)
                .map(|model| ModelHandle {
                    model: Mutex::new(model),
                })
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map_err(|e| e.clone())
}

/// Local embedding provider. `cache_dir` is resolved once by the caller
/// (the CLI binary) and threaded through, never read here.
pub struct FastEmbedProvider {
    cache_dir: Option<PathBuf>,
}

impl FastEmbedProvider {
    pub fn new(cache_dir: Option<PathBuf>) -> Self {
        Self { cache_dir }
    }

    /// Forces model initialisation eagerly, so the caller can log a
    /// descriptive warning at startup rather than on first use.
    pub fn warm_up(&self) -> Result<()> {
        get_model(self.cache_dir.as_ref())
            .map(|_| ())
            .map_err(CoreError::EmbeddingUnavailable)
    }
}

impl EmbeddingProvider for FastEmbedProvider {
    /// Runs the blocking model call on a watchdog thread so `timeout_ms`
    /// (§7) is an enforced deadline rather than a pass-through: a slow or
    /// hung model surfaces as `EmbeddingUnavailable` instead of blocking the
    /// caller indefinitely. There's no `tokio` in this workspace, so
    /// `recv_timeout` on a channel is the synchronous equivalent.
    fn embed(&self, text: &str, timeout_ms: u64) -> Result<Vec<f32>> {
        let handle = get_model(self.cache_dir.as_ref()).map_err(CoreError::EmbeddingUnavailable)?;
        let text = text.to_string();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let result = (|| {
                let mut model = handle
                    .model
                    .lock()
                    .map_err(|_| CoreError::EmbeddingUnavailable("embedding model mutex poisoned".into()))?;
                let embeddings = model
                    .embed(vec![text], None)
                    .map_err(|e| CoreError::EmbeddingUnavailable(e.to_string()))?;
                embeddings
                    .into_iter()
                    .next()
                    .ok_or_else(|| CoreError::EmbeddingUnavailable("empty embedding batch returned".into()))
            })();
            // The receiver may already be gone if we timed out first; that's fine.
            let _ = tx.send(result);
        });

        match rx.recv_timeout(Duration::from_millis(timeout_ms)) {
            Ok(result) => result,
            Err(mpsc::RecvTimeoutError::Timeout) => Err(CoreError::EmbeddingUnavailable(format!(
                "embedding call exceeded {timeout_ms}ms deadline"
            ))),
            Err(mpsc::RecvTimeoutError::Disconnected) => Err(CoreError::EmbeddingUnavailable(
                "embedding worker thread dropped without a result".into(),
            )),
        }
    }

    fn dimensions(&self) -> usize {
        EMBEDDING_DIMENSIONS
    }
}
