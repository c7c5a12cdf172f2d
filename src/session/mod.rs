//! Capture sessions — wiring a [`VoiceRecorder`] to a [`VoiceSink`].
//!
//! A session owns the capture-active lifecycle: `start` begins recording
//! (and, when stream-while-recording is on, pumps converted chunks to the
//! sink as they arrive), `stop` returns the recorded samples and flushes
//! them through the sink for a final transcript.

pub mod recorder;
pub mod sink;

pub use recorder::VoiceRecorder;
pub use sink::{LocalSink, RemoteSink, SessionError, VoiceSink};

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::AudioConfig;

/// A recording session bound to one recognition backend.
pub struct CaptureSession {
    recorder: VoiceRecorder,
    sink: Arc<dyn VoiceSink>,
    stream_while_recording: bool,
    pump: Option<tokio::task::JoinHandle<()>>,
}

impl CaptureSession {
    pub fn new(config: &AudioConfig, sink: Arc<dyn VoiceSink>) -> Self {
        Self {
            recorder: VoiceRecorder::new(config),
            sink,
            stream_while_recording: config.stream_while_recording,
            pump: None,
        }
    }

    /// Begin capturing.  Returns `Ok(false)` when a capture is already
    /// running.
    pub fn start(&mut self) -> Result<bool, SessionError> {
        if self.recorder.is_capturing() {
            return Ok(false);
        }

        if self.stream_while_recording {
            let (tx, rx) = mpsc::channel(64);
            self.recorder.set_live_sender(Some(tx));
            self.pump = Some(tokio::spawn(pump_samples(rx, Arc::clone(&self.sink))));
        }

        match self.recorder.begin_capture() {
            Ok(started) => Ok(started),
            Err(e) => {
                // Capture never came up; leave no pump behind.
                self.recorder.set_live_sender(None);
                if let Some(pump) = self.pump.take() {
                    pump.abort();
                }
                Err(e.into())
            }
        }
    }

    /// Stop capturing, flush the recording through the sink, and return the
    /// recorded samples.
    ///
    /// When the session streamed live, the audio has already been fed and
    /// only the final result is requested; otherwise the whole recording is
    /// fed first.
    pub async fn stop(&mut self) -> Result<Vec<i16>, SessionError> {
        if !self.recorder.is_capturing() {
            return Ok(Vec::new());
        }

        let (samples, _count) = self.recorder.finish_capture();

        // Dropping the live sender ends the pump once it drains.
        self.recorder.set_live_sender(None);
        if let Some(pump) = self.pump.take() {
            let _ = pump.await;
        }

        flush_to_sink(self.sink.as_ref(), &samples, self.stream_while_recording).await?;
        Ok(samples)
    }

    /// Discard the in-flight utterance on the recognition backend.
    pub async fn reset(&self) -> Result<(), SessionError> {
        self.sink.reset().await
    }

    pub fn is_capturing(&self) -> bool {
        self.recorder.is_capturing()
    }

    /// Seconds of audio buffered in the current capture.
    pub fn recorded_secs(&self) -> f32 {
        self.recorder.recorded_secs()
    }
}

/// Forward live chunks to the sink until the channel closes.
async fn pump_samples(mut rx: mpsc::Receiver<Vec<i16>>, sink: Arc<dyn VoiceSink>) {
    while let Some(samples) = rx.recv().await {
        if let Err(e) = sink.feed(&samples).await {
            log::error!("failed to stream chunk to recognizer: {e}");
        }
    }
}

/// End-of-capture flush: feed the recording unless it was already streamed
/// live, then request the final transcript.
async fn flush_to_sink(
    sink: &dyn VoiceSink,
    samples: &[i16],
    already_streamed: bool,
) -> Result<(), SessionError> {
    if !already_streamed && !samples.is_empty() {
        sink.feed(samples).await?;
    }
    sink.request_final().await
}
