//! Asynchronous model loading.
//!
//! Vosk model loads read hundreds of megabytes and can stall a thread for
//! seconds.  [`EngineLoader`] runs the load on the blocking thread pool and
//! rejects overlapping loads instead of queueing them, so a caller spamming
//! "load" gets an immediate [`SttError::LoadInProgress`] rather than a pile
//! of redundant work.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::stt::engine::{EngineParams, SttError, VoskEngine};

/// Loads a [`VoskEngine`] off the async runtime, one load at a time.
///
/// Clones share the same in-progress flag.
///
/// # Examples
///
/// ```no_run
/// use vosk_voice::stt::{EngineLoader, EngineParams};
///
/// # async fn run() -> Result<(), vosk_voice::stt::SttError> {
/// let loader = EngineLoader::new();
/// let engine = loader
///     .load("/opt/models/vosk-model-small-en-us-0.15", EngineParams::default())
///     .await?;
/// # let _ = engine;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct EngineLoader {
    in_progress: Arc<AtomicBool>,
}

impl EngineLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a load is currently running.
    pub fn is_loading(&self) -> bool {
        self.in_progress.load(Ordering::SeqCst)
    }

    /// Load the model at `model_path` on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// - [`SttError::LoadInProgress`] — another load is still running.
    /// - [`SttError::ModelNotFound`] — `model_path` is not a directory.
    /// - Any error from [`VoskEngine::load`].
    pub async fn load(
        &self,
        model_path: impl Into<PathBuf>,
        params: EngineParams,
    ) -> Result<VoskEngine, SttError> {
        let path: PathBuf = model_path.into();

        if self
            .in_progress
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            log::warn!("model load requested while another load is running");
            return Err(SttError::LoadInProgress);
        }
        let _release = ReleaseOnDrop(Arc::clone(&self.in_progress));

        // Cheap check before committing a blocking-pool thread.
        if !path.is_dir() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        log::info!("loading vosk model from {}", path.display());
        match tokio::task::spawn_blocking(move || VoskEngine::load(&path, params)).await {
            Ok(result) => result,
            Err(e) => Err(SttError::LoadTask(e.to_string())),
        }
    }
}

/// Clears the in-progress flag when the load finishes, succeed or fail.
struct ReleaseOnDrop(Arc<AtomicBool>);

impl Drop for ReleaseOnDrop {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}
