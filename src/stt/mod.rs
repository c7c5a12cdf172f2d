//! Speech-to-text — the local Vosk recognizer, its async loader, and the
//! event type both the local and remote paths emit.

pub mod engine;
pub mod event;
pub mod loader;

pub use engine::{EngineParams, SttError, VoskEngine};
pub use event::{decode_result, RecognitionEvent};
pub use loader::EngineLoader;
