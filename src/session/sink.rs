//! The seam between capture and recognition.
//!
//! A [`VoiceSink`] consumes 16 kHz mono PCM and drives a recognizer —
//! either the in-process [`VoskEngine`] ([`LocalSink`]) or a remote server
//! over WebSocket ([`RemoteSink`]).  The capture side never knows which.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::audio::{i16_to_pcm_bytes, CaptureError};
use crate::remote::{RemoteError, RemoteRecognizer};
use crate::stt::{RecognitionEvent, SttError, VoskEngine};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Stt(#[from] SttError),

    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("recognizer task failed: {0}")]
    Task(String),
}

/// Recognition backend fed by a capture session.
///
/// `feed` takes recognizer-format PCM (16 kHz mono `i16`); implementations
/// emit whatever events the audio produces on their own channel.
#[async_trait]
pub trait VoiceSink: Send + Sync {
    async fn feed(&self, samples: &[i16]) -> Result<(), SessionError>;

    /// Finalize the current utterance and emit its transcript.
    async fn request_final(&self) -> Result<(), SessionError>;

    /// Discard the in-flight utterance.
    async fn reset(&self) -> Result<(), SessionError>;
}

// ---------------------------------------------------------------------------
// LocalSink
// ---------------------------------------------------------------------------

/// Feeds a shared [`VoskEngine`], running recognizer calls on the blocking
/// thread pool and forwarding events to an mpsc consumer.
pub struct LocalSink {
    engine: Arc<Mutex<VoskEngine>>,
    events: mpsc::Sender<RecognitionEvent>,
}

impl LocalSink {
    /// Wrap `engine`; resulting [`RecognitionEvent`]s arrive on the returned
    /// receiver.
    pub fn new(engine: VoskEngine) -> (Self, mpsc::Receiver<RecognitionEvent>) {
        let (events, rx) = mpsc::channel(64);
        (
            Self {
                engine: Arc::new(Mutex::new(engine)),
                events,
            },
            rx,
        )
    }

    fn lock_engine(engine: &Mutex<VoskEngine>) -> MutexGuard<'_, VoskEngine> {
        match engine.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    async fn run_on_engine<F>(&self, op: F) -> Result<(), SessionError>
    where
        F: FnOnce(&mut VoskEngine) -> Result<Option<RecognitionEvent>, SttError> + Send + 'static,
    {
        let engine = Arc::clone(&self.engine);
        let event = tokio::task::spawn_blocking(move || {
            let mut engine = Self::lock_engine(&engine);
            op(&mut engine)
        })
        .await
        .map_err(|e| SessionError::Task(e.to_string()))??;

        if let Some(event) = event {
            if self.events.send(event).await.is_err() {
                log::debug!("recognition event receiver dropped");
            }
        }
        Ok(())
    }
}

#[async_trait]
impl VoiceSink for LocalSink {
    async fn feed(&self, samples: &[i16]) -> Result<(), SessionError> {
        let samples = samples.to_vec();
        self.run_on_engine(move |engine| engine.accept(&samples)).await
    }

    async fn request_final(&self) -> Result<(), SessionError> {
        self.run_on_engine(|engine| {
            engine.request_final();
            Ok(engine.take_final())
        })
        .await
    }

    async fn reset(&self) -> Result<(), SessionError> {
        self.run_on_engine(|engine| {
            engine.reset();
            Ok(None)
        })
        .await
    }
}

// ---------------------------------------------------------------------------
// RemoteSink
// ---------------------------------------------------------------------------

/// Streams PCM to a [`RemoteRecognizer`] as binary frames.
///
/// Recognition events arrive on the receiver returned by
/// [`RemoteRecognizer::connect`], not through this sink.
pub struct RemoteSink {
    client: Arc<RemoteRecognizer>,
    packet_size: usize,
}

impl RemoteSink {
    pub fn new(client: Arc<RemoteRecognizer>, packet_size: usize) -> Self {
        Self {
            client,
            packet_size,
        }
    }
}

#[async_trait]
impl VoiceSink for RemoteSink {
    async fn feed(&self, samples: &[i16]) -> Result<(), SessionError> {
        let bytes = i16_to_pcm_bytes(samples);
        if bytes.is_empty() {
            return Ok(());
        }
        // Live capture chunks can be shorter than one configured packet.
        let packet_size = self.packet_size.min(bytes.len());
        self.client.send_voice_data(&bytes, packet_size).await?;
        Ok(())
    }

    async fn request_final(&self) -> Result<(), SessionError> {
        self.client.request_final_result().await?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), SessionError> {
        self.client.reset_recognizer().await?;
        Ok(())
    }
}
