//! Audio path — microphone capture → format conversion → recording buffer,
//! plus WAV encode/decode for imported and exported sound.
//!
//! ```text
//! Microphone → cpal callback → AudioChunk (mpsc) → to_recognizer_pcm()
//!           → RecordingBuffer<i16> → recognizer / WebSocket
//!
//! WAV bytes → decompress_to_mono_pcm → recognizer
//! recorded PCM → pcm_to_wav → playable WAV
//! ```

pub mod buffer;
pub mod capture;
pub mod resample;
pub mod wav;

pub use buffer::RecordingBuffer;
pub use capture::{AudioCapture, AudioChunk, CaptureError, StreamHandle};
pub use resample::{
    f32_to_i16, i16_to_pcm_bytes, mix_to_mono, pcm_bytes_to_i16, resample_to_16k,
    RECOGNIZER_SAMPLE_RATE,
};
pub use wav::{
    decompress_to_mono_pcm, pcm_to_wav, stereo_wav_to_mono, wav_sample_rate, WavError,
    WAV_HEADER_LEN,
};
