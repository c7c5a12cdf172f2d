//! Capture-side state of a session: the active flag and the recorded-sample
//! buffer.
//!
//! The cpal stream and its bridge thread are created lazily on the first
//! [`VoiceRecorder::begin_capture`], so constructing a recorder on a machine
//! without a microphone costs nothing and fails only when capture is
//! actually requested.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};

use crate::audio::{
    AudioCapture, AudioChunk, CaptureError, RecordingBuffer, StreamHandle,
    RECOGNIZER_SAMPLE_RATE,
};
use crate::config::AudioConfig;

/// State shared with the bridge thread.
struct RecorderShared {
    buffer: Mutex<RecordingBuffer<i16>>,
    active: AtomicBool,
    /// When set, converted chunks are also forwarded live to a session.
    live_tx: Mutex<Option<tokio::sync::mpsc::Sender<Vec<i16>>>>,
}

/// Records microphone audio into a bounded buffer, optionally forwarding
/// each converted chunk to a live consumer.
///
/// The buffer is capped at the configured maximum recording length; older
/// audio is discarded once the cap is reached.
pub struct VoiceRecorder {
    input_device: Option<String>,
    shared: Arc<RecorderShared>,
    stream: Option<StreamHandle>,
    bridge: Option<std::thread::JoinHandle<()>>,
}

impl VoiceRecorder {
    pub fn new(config: &AudioConfig) -> Self {
        let capacity = buffer_capacity(config.max_recording_secs);
        Self {
            input_device: config.input_device.clone(),
            shared: Arc::new(RecorderShared {
                buffer: Mutex::new(RecordingBuffer::new(capacity)),
                active: AtomicBool::new(false),
                live_tx: Mutex::new(None),
            }),
            stream: None,
            bridge: None,
        }
    }

    /// Install or remove the live chunk consumer.
    pub fn set_live_sender(&self, tx: Option<tokio::sync::mpsc::Sender<Vec<i16>>>) {
        *lock(&self.shared.live_tx) = tx;
    }

    /// Start capturing.  Returns `Ok(false)` when capture is already active;
    /// otherwise clears the buffer, brings up the device stream if needed,
    /// and returns `Ok(true)`.
    pub fn begin_capture(&mut self) -> Result<bool, CaptureError> {
        if self.shared.active.load(Ordering::SeqCst) {
            log::warn!("capture already active");
            return Ok(false);
        }

        lock(&self.shared.buffer).clear();

        if self.stream.is_none() {
            let capture = AudioCapture::from_device_name(self.input_device.as_deref())?;
            let (tx, rx) = mpsc::channel::<AudioChunk>();
            self.stream = Some(capture.start(tx)?);

            let shared = Arc::clone(&self.shared);
            self.bridge = Some(std::thread::spawn(move || {
                // Ends when the stream (and with it the sender) is dropped.
                while let Ok(chunk) = rx.recv() {
                    handle_chunk(&shared, chunk);
                }
            }));
        }

        self.shared.active.store(true, Ordering::SeqCst);
        log::info!("voice capture started");
        Ok(true)
    }

    /// Stop capturing and return the recorded samples plus their count.
    ///
    /// The device stream stays up; subsequent chunks are ignored until the
    /// next [`begin_capture`](Self::begin_capture).
    pub fn finish_capture(&mut self) -> (Vec<i16>, usize) {
        self.shared.active.store(false, Ordering::SeqCst);
        let samples = lock(&self.shared.buffer).take();
        let count = samples.len();
        log::info!("voice capture stopped ({count} samples)");
        (samples, count)
    }

    pub fn is_capturing(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Seconds of audio currently buffered.
    pub fn recorded_secs(&self) -> f32 {
        lock(&self.shared.buffer).duration_secs(RECOGNIZER_SAMPLE_RATE)
    }
}

impl Drop for VoiceRecorder {
    fn drop(&mut self) {
        // Dropping the stream drops the chunk sender, ending the bridge.
        self.stream = None;
        if let Some(bridge) = self.bridge.take() {
            let _ = bridge.join();
        }
    }
}

/// Buffer capacity in samples for a maximum recording length in seconds.
fn buffer_capacity(max_recording_secs: f32) -> usize {
    let samples = (max_recording_secs * RECOGNIZER_SAMPLE_RATE as f32) as usize;
    samples.max(1)
}

/// Per-chunk work: convert to recognizer PCM, append to the buffer, and
/// forward to the live consumer when one is installed.
fn handle_chunk(shared: &RecorderShared, chunk: AudioChunk) {
    if !shared.active.load(Ordering::SeqCst) {
        return;
    }

    let pcm = chunk.to_recognizer_pcm();
    lock(&shared.buffer).extend(&pcm);

    if let Some(tx) = lock(&shared.live_tx).as_ref() {
        if tx.blocking_send(pcm).is_err() {
            log::debug!("live chunk consumer dropped");
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shared(capacity: usize) -> Arc<RecorderShared> {
        Arc::new(RecorderShared {
            buffer: Mutex::new(RecordingBuffer::new(capacity)),
            active: AtomicBool::new(true),
            live_tx: Mutex::new(None),
        })
    }

    fn chunk(samples: Vec<f32>) -> AudioChunk {
        AudioChunk {
            samples,
            sample_rate: 16_000,
            channels: 1,
        }
    }

    #[test]
    fn capacity_scales_with_recording_length() {
        assert_eq!(buffer_capacity(1.0), 16_000);
        assert_eq!(buffer_capacity(60.0), 960_000);
        // Degenerate config still yields a usable buffer.
        assert_eq!(buffer_capacity(0.0), 1);
    }

    #[test]
    fn chunks_accumulate_while_active() {
        let shared = shared(1024);
        handle_chunk(&shared, chunk(vec![0.0; 8]));
        handle_chunk(&shared, chunk(vec![0.0; 8]));
        assert_eq!(lock(&shared.buffer).len(), 16);
    }

    #[test]
    fn chunks_are_dropped_while_inactive() {
        let shared = shared(1024);
        shared.active.store(false, Ordering::SeqCst);
        handle_chunk(&shared, chunk(vec![0.0; 8]));
        assert!(lock(&shared.buffer).is_empty());
    }

    #[test]
    fn live_consumer_receives_converted_chunks() {
        let shared = shared(1024);
        let (tx, mut rx) = tokio::sync::mpsc::channel(4);
        *lock(&shared.live_tx) = Some(tx);

        handle_chunk(&shared, chunk(vec![1.0, -1.0]));

        let pcm = rx.try_recv().unwrap();
        assert_eq!(pcm, vec![i16::MAX, -i16::MAX]);
        // Buffered as well as forwarded.
        assert_eq!(lock(&shared.buffer).len(), 2);
    }

    #[test]
    fn dropped_live_consumer_does_not_stop_buffering() {
        let shared = shared(1024);
        let (tx, rx) = tokio::sync::mpsc::channel(4);
        *lock(&shared.live_tx) = Some(tx);
        drop(rx);

        handle_chunk(&shared, chunk(vec![0.0; 4]));
        assert_eq!(lock(&shared.buffer).len(), 4);
    }

    #[test]
    fn recorder_starts_idle() {
        let recorder = VoiceRecorder::new(&AudioConfig::default());
        assert!(!recorder.is_capturing());
        assert_eq!(recorder.recorded_secs(), 0.0);
    }
}
