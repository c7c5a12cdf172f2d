//! Local Vosk recognizer.
//!
//! [`VoskEngine`] owns a `vosk::Model` plus a `vosk::Recognizer` and turns
//! PCM chunks into [`RecognitionEvent`]s.  Feed audio incrementally with
//! [`VoskEngine::accept`] (live capture) or all at once with
//! [`VoskEngine::feed_chunked`] (a finished recording split into packets).
//!
//! Construct via [`VoskEngine::load`], or [`crate::stt::EngineLoader`] to
//! keep the potentially large model load off the calling thread.

use std::path::Path;

use thiserror::Error;
use vosk::{CompleteResult, DecodingState, Model, Recognizer};

use crate::stt::event::RecognitionEvent;

// ---------------------------------------------------------------------------
// SttError
// ---------------------------------------------------------------------------

/// All errors that can arise from the local recognizer.
#[derive(Debug, Clone, Error)]
pub enum SttError {
    /// The model directory does not exist at the given path.
    #[error("model not found: {0}")]
    ModelNotFound(String),

    /// Vosk failed to load the model directory.
    #[error("failed to load Vosk model from {0}")]
    ModelLoad(String),

    /// Vosk failed to create a recognizer for the loaded model.
    #[error("failed to create Vosk recognizer at {0} Hz")]
    RecognizerInit(u32),

    /// Another model load is already running (see
    /// [`crate::stt::EngineLoader`]).
    #[error("model load already in progress")]
    LoadInProgress,

    /// The background load task failed to complete.
    #[error("model load task failed: {0}")]
    LoadTask(String),

    /// The recognizer rejected a waveform chunk.
    #[error("recognizer rejected waveform: {0}")]
    Waveform(String),

    /// The supplied buffer is smaller than one packet.
    #[error("voice chunk too small: {len} bytes for packet size {packet_size}")]
    ChunkTooSmall { len: usize, packet_size: usize },

    /// A packet size of zero was requested.
    #[error("packet size must be greater than zero")]
    InvalidPacketSize,
}

// ---------------------------------------------------------------------------
// EngineParams
// ---------------------------------------------------------------------------

/// Recognizer creation parameters.
#[derive(Debug, Clone, Copy)]
pub struct EngineParams {
    /// PCM sample rate the recognizer is created for, in Hz.
    pub sample_rate: u32,
    /// Number of alternative transcripts; `0` keeps single-best results.
    pub max_alternatives: u16,
    /// Include word-level timing in results.
    pub words: bool,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            sample_rate: crate::audio::RECOGNIZER_SAMPLE_RATE,
            max_alternatives: 0,
            words: false,
        }
    }
}

impl From<&crate::config::RecognizerConfig> for EngineParams {
    fn from(cfg: &crate::config::RecognizerConfig) -> Self {
        Self {
            sample_rate: crate::audio::RECOGNIZER_SAMPLE_RATE,
            max_alternatives: cfg.max_alternatives,
            words: cfg.words,
        }
    }
}

// ---------------------------------------------------------------------------
// VoskEngine
// ---------------------------------------------------------------------------

/// Local speech recognizer backed by a Vosk model.
///
/// The engine is `Send` but not `Sync`; share it across tasks behind a
/// `Mutex` and run [`accept`](Self::accept) on the blocking thread pool when
/// called from async code.
pub struct VoskEngine {
    // Recognizer keeps a pointer into the model; the model must stay alive
    // for as long as the recognizer does.
    _model: Model,
    recognizer: Recognizer,
    /// When set, the next accept/flush emits the final result instead of
    /// decoding more audio.
    want_final: bool,
}

impl std::fmt::Debug for VoskEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoskEngine")
            .field("want_final", &self.want_final)
            .finish_non_exhaustive()
    }
}

impl VoskEngine {
    /// Load a model directory and create a recognizer for it.
    ///
    /// This is a blocking call that can take seconds for large models — use
    /// [`crate::stt::EngineLoader`] from async code.
    ///
    /// # Errors
    ///
    /// - [`SttError::ModelNotFound`] — `model_path` is not a directory.
    /// - [`SttError::ModelLoad`] — Vosk rejected the model data.
    /// - [`SttError::RecognizerInit`] — recognizer creation failed.
    pub fn load(model_path: impl AsRef<Path>, params: EngineParams) -> Result<Self, SttError> {
        let path = model_path.as_ref();

        if !path.is_dir() {
            return Err(SttError::ModelNotFound(path.display().to_string()));
        }

        let path_str = path
            .to_str()
            .ok_or_else(|| SttError::ModelNotFound(path.display().to_string()))?;

        let model =
            Model::new(path_str).ok_or_else(|| SttError::ModelLoad(path_str.to_string()))?;

        let mut recognizer = Recognizer::new(&model, params.sample_rate as f32)
            .ok_or(SttError::RecognizerInit(params.sample_rate))?;
        recognizer.set_max_alternatives(params.max_alternatives);
        recognizer.set_words(params.words);

        log::info!("vosk model loaded: {path_str}");

        Ok(Self {
            _model: model,
            recognizer,
            want_final: false,
        })
    }

    /// Feed one PCM chunk and return the resulting event, if any.
    ///
    /// When a final result is pending (see
    /// [`request_final`](Self::request_final)) the chunk is not decoded; the
    /// final result is emitted instead.  Otherwise a finalized utterance
    /// yields [`RecognitionEvent::Final`] and anything else the current
    /// partial hypothesis.
    pub fn accept(&mut self, samples: &[i16]) -> Result<Option<RecognitionEvent>, SttError> {
        if self.want_final {
            self.want_final = false;
            return Ok(Some(self.final_event()));
        }

        let state = self
            .recognizer
            .accept_waveform(samples)
            .map_err(|e| SttError::Waveform(e.to_string()))?;

        match state {
            DecodingState::Finalized => {
                let text = complete_text(self.recognizer.result());
                Ok(Some(RecognitionEvent::Final(text)))
            }
            DecodingState::Running => {
                let partial = self.recognizer.partial_result().partial.to_string();
                Ok(Some(RecognitionEvent::Partial(partial)))
            }
            DecodingState::Failed => {
                log::debug!("vosk decoding failed for this chunk");
                Ok(None)
            }
        }
    }

    /// Split `pcm` (little-endian PCM16 bytes) into `packet_size` packets
    /// plus a remainder, feed each through the recognizer, then flush the
    /// final result.
    ///
    /// Larger packet sizes finish faster.  Returns every event the audio
    /// produced, ending with the final transcript.
    ///
    /// # Errors
    ///
    /// - [`SttError::InvalidPacketSize`] — `packet_size == 0`.
    /// - [`SttError::ChunkTooSmall`] — `pcm.len() < packet_size`.
    pub fn feed_chunked(
        &mut self,
        pcm: &[u8],
        packet_size: usize,
    ) -> Result<Vec<RecognitionEvent>, SttError> {
        validate_chunk(pcm.len(), packet_size)?;

        let mut events = Vec::new();
        for (start, end) in packet_spans(pcm.len(), packet_size) {
            let samples = crate::audio::pcm_bytes_to_i16(&pcm[start..end]);
            if let Some(event) = self.accept(&samples)? {
                events.push(event);
            }
        }

        self.request_final();
        if let Some(event) = self.take_final() {
            events.push(event);
        }

        Ok(events)
    }

    /// Ask for the final result; it is emitted by the next
    /// [`accept`](Self::accept) or [`take_final`](Self::take_final) call.
    pub fn request_final(&mut self) {
        self.want_final = true;
    }

    /// Flush a pending final result, if one was requested.
    pub fn take_final(&mut self) -> Option<RecognitionEvent> {
        if !self.want_final {
            return None;
        }
        self.want_final = false;
        Some(self.final_event())
    }

    /// Reset the recognizer, discarding the in-flight utterance.
    pub fn reset(&mut self) {
        self.want_final = false;
        self.recognizer.reset();
    }

    fn final_event(&mut self) -> RecognitionEvent {
        let text = complete_text(self.recognizer.final_result());
        RecognitionEvent::Final(text)
    }
}

/// Extract the transcript from a complete (non-partial) Vosk result.
fn complete_text(result: CompleteResult<'_>) -> String {
    result
        .single()
        .map(|r| r.text.to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Chunk splitting
// ---------------------------------------------------------------------------

/// Check that a byte buffer of `len` can be packetized at `packet_size`.
fn validate_chunk(len: usize, packet_size: usize) -> Result<(), SttError> {
    if packet_size == 0 {
        return Err(SttError::InvalidPacketSize);
    }
    if len < packet_size {
        return Err(SttError::ChunkTooSmall { len, packet_size });
    }
    Ok(())
}

/// Byte spans covering `len` bytes: whole `packet_size` packets first, then
/// the remainder (if any) as a final shorter span.
pub(crate) fn packet_spans(len: usize, packet_size: usize) -> Vec<(usize, usize)> {
    let mut spans = Vec::with_capacity(len / packet_size + 1);
    let mut offset = 0;
    while offset + packet_size <= len {
        spans.push((offset, offset + packet_size));
        offset += packet_size;
    }
    if offset < len {
        spans.push((offset, len));
    }
    spans
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Engine construction needs libvosk and a real model directory, so unit
    // tests cover the pure pieces: packet math and load-path validation.

    // ---- packet_spans ------------------------------------------------------

    #[test]
    fn exact_multiple_has_no_remainder() {
        assert_eq!(packet_spans(8, 4), vec![(0, 4), (4, 8)]);
    }

    #[test]
    fn remainder_becomes_a_final_short_span() {
        assert_eq!(packet_spans(10, 4), vec![(0, 4), (4, 8), (8, 10)]);
    }

    #[test]
    fn single_packet_when_len_equals_packet_size() {
        assert_eq!(packet_spans(4, 4), vec![(0, 4)]);
    }

    #[test]
    fn spans_cover_every_byte_exactly_once() {
        for (len, packet) in [(1, 1), (7, 3), (4096, 4096), (10_000, 4_096)] {
            let spans = packet_spans(len, packet);
            let mut expected_start = 0;
            for &(start, end) in &spans {
                assert_eq!(start, expected_start);
                assert!(end > start);
                expected_start = end;
            }
            assert_eq!(expected_start, len);
        }
    }

    // ---- validate_chunk ----------------------------------------------------

    #[test]
    fn zero_packet_size_is_rejected() {
        let err = validate_chunk(4_096, 0).unwrap_err();
        assert!(matches!(err, SttError::InvalidPacketSize));
    }

    #[test]
    fn chunk_smaller_than_one_packet_is_rejected() {
        let err = validate_chunk(100, 4_096).unwrap_err();
        assert!(matches!(
            err,
            SttError::ChunkTooSmall {
                len: 100,
                packet_size: 4_096,
            }
        ));
    }

    #[test]
    fn chunk_of_at_least_one_packet_is_accepted() {
        assert!(validate_chunk(4_096, 4_096).is_ok());
        assert!(validate_chunk(10_000, 4_096).is_ok());
    }

    // ---- load validation ---------------------------------------------------

    #[test]
    fn load_missing_model_dir_errors_before_touching_vosk() {
        let err = VoskEngine::load("/nonexistent/model-dir", EngineParams::default())
            .unwrap_err();
        assert!(matches!(err, SttError::ModelNotFound(_)));
        assert!(err.to_string().contains("/nonexistent/model-dir"));
    }

    // ---- EngineParams ------------------------------------------------------

    #[test]
    fn default_params_match_recognizer_contract() {
        let params = EngineParams::default();
        assert_eq!(params.sample_rate, 16_000);
        assert_eq!(params.max_alternatives, 0);
        assert!(!params.words);
    }

    #[test]
    fn params_from_recognizer_config() {
        let cfg = crate::config::RecognizerConfig {
            model: "m".into(),
            max_alternatives: 3,
            words: true,
        };
        let params = EngineParams::from(&cfg);
        assert_eq!(params.max_alternatives, 3);
        assert!(params.words);
        assert_eq!(params.sample_rate, 16_000);
    }
}
