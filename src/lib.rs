//! Speech-to-text and voice-capture toolkit built on Vosk.
//!
//! Wraps three external systems behind one API:
//!
//! - a local Vosk recognizer ([`stt`]) with an async model loader,
//! - platform voice capture via cpal ([`audio`], [`session`]),
//! - a WebSocket client for a remote Vosk recognition server ([`remote`]),
//!   plus helpers for running the server process itself.
//!
//! A [`session::CaptureSession`] ties capture to either backend through the
//! [`session::VoiceSink`] seam; recognition results arrive as
//! [`stt::RecognitionEvent`]s (partial hypotheses while decoding runs, final
//! transcripts per utterance).
//!
//! Utility corners: WAV stereo-to-mono downmixing and PCM/WAV marshalling
//! ([`audio::wav`]) and normalized edit-distance transcript comparison
//! ([`text`]).

pub mod audio;
pub mod config;
pub mod remote;
pub mod session;
pub mod stt;
pub mod text;
