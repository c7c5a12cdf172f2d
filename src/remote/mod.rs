//! Remote recognition — WebSocket client for a Vosk server plus helpers for
//! running the server process itself.

pub mod client;
pub mod server;

pub use client::{
    RemoteError, RemoteEvent, RemoteRecognizer, FINAL_RESULT_REQUEST, RESET_RECOGNIZER,
};
pub use server::{build_server_args, executable_dir, ServerError, ServerProcess};
