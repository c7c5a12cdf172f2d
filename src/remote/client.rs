//! WebSocket client for a remote Vosk recognition server.
//!
//! The server speaks a minimal protocol: the client streams binary PCM16
//! frames, the server answers with the same JSON results the local
//! recognizer produces (`{"partial": …}` / `{"text": …}`), and two control
//! text messages drive the server-side recognizer: [`FINAL_RESULT_REQUEST`]
//! and [`RESET_RECOGNIZER`].
//!
//! [`RemoteRecognizer::connect`] returns a handle plus an event receiver; a
//! background task reads server frames, decodes them, caches the latest
//! partial/final transcript on the handle, and forwards [`RemoteEvent`]s to
//! the receiver.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

use crate::stt::engine::packet_spans;
use crate::stt::{decode_result, RecognitionEvent};

/// Control message asking the server to finalize the current utterance.
pub const FINAL_RESULT_REQUEST: &str = "__final_result_request__";
/// Control message asking the server to reset its recognizer.
pub const RESET_RECOGNIZER: &str = "__reset_recognizer__";

/// Close code 1006: the peer went away without a close handshake.
const ABNORMAL_CLOSE: u16 = 1006;

// ---------------------------------------------------------------------------
// Events & errors
// ---------------------------------------------------------------------------

/// Connection lifecycle and recognition events from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    /// The WebSocket handshake completed.
    Connected,
    /// An in-progress transcript for the current utterance.
    Partial(String),
    /// A finalized transcript.
    Final(String),
    /// The connection failed mid-stream.
    ConnectionError(String),
    /// The connection ended.  `clean` is true when the server performed a
    /// proper close handshake.
    Closed {
        code: u16,
        reason: String,
        clean: bool,
    },
}

#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("failed to connect to {url}: {source}")]
    Connect {
        url: String,
        #[source]
        source: tokio_tungstenite::tungstenite::Error,
    },

    #[error("not connected to a recognition server")]
    NotConnected,

    #[error("failed to send to recognition server: {0}")]
    Send(tokio_tungstenite::tungstenite::Error),

    #[error("packet size must be greater than zero")]
    InvalidPacketSize,

    #[error("voice chunk too small: {len} bytes for packet size {packet_size}")]
    ChunkTooSmall { len: usize, packet_size: usize },
}

// ---------------------------------------------------------------------------
// RemoteRecognizer
// ---------------------------------------------------------------------------

type WsWriter = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

/// State shared between the handle and the reader task.
#[derive(Debug, Default)]
struct Shared {
    connected: AtomicBool,
    partial: Mutex<String>,
    final_text: Mutex<String>,
}

/// Handle to a live connection with a remote recognition server.
///
/// Dropping the handle aborts the reader task; call
/// [`close`](Self::close) first for a clean shutdown.
pub struct RemoteRecognizer {
    shared: Arc<Shared>,
    writer: tokio::sync::Mutex<WsWriter>,
    reader: tokio::task::JoinHandle<()>,
}

impl RemoteRecognizer {
    /// Connect to `ws://{address}:{port}/`.
    ///
    /// `localhost` (any case) is normalized to `127.0.0.1` before dialing,
    /// matching how the recognition server binds.  On success the returned
    /// receiver has already been sent [`RemoteEvent::Connected`].
    pub async fn connect(
        address: &str,
        port: u16,
    ) -> Result<(Self, mpsc::Receiver<RemoteEvent>), RemoteError> {
        let host = if address.eq_ignore_ascii_case("localhost") {
            "127.0.0.1"
        } else {
            address
        };
        let url = format!("ws://{host}:{port}/");

        log::info!("connecting to recognition server at {url}");
        let (stream, _response) = connect_async(url.as_str())
            .await
            .map_err(|source| RemoteError::Connect {
                url: url.clone(),
                source,
            })?;
        let (writer, reader) = stream.split();

        let shared = Arc::new(Shared {
            connected: AtomicBool::new(true),
            ..Shared::default()
        });
        let (event_tx, event_rx) = mpsc::channel(64);

        // The receiver is empty and held by the caller, so this cannot fail.
        let _ = event_tx.send(RemoteEvent::Connected).await;

        let reader_task = tokio::spawn(read_loop(reader, Arc::clone(&shared), event_tx));

        Ok((
            Self {
                shared,
                writer: tokio::sync::Mutex::new(writer),
                reader: reader_task,
            },
            event_rx,
        ))
    }

    /// Whether the connection is still up.
    pub fn is_connected(&self) -> bool {
        self.shared.connected.load(Ordering::SeqCst)
    }

    /// Stream a recorded PCM16 byte buffer as binary frames of
    /// `packet_size` bytes, with the remainder as a final shorter frame.
    ///
    /// # Errors
    ///
    /// - [`RemoteError::NotConnected`] — the connection is down.
    /// - [`RemoteError::InvalidPacketSize`] — `packet_size == 0`.
    /// - [`RemoteError::ChunkTooSmall`] — `chunk.len() < packet_size`.
    /// - [`RemoteError::Send`] — the socket rejected a frame.
    pub async fn send_voice_data(
        &self,
        chunk: &[u8],
        packet_size: usize,
    ) -> Result<(), RemoteError> {
        if !self.is_connected() {
            return Err(RemoteError::NotConnected);
        }
        if packet_size == 0 {
            return Err(RemoteError::InvalidPacketSize);
        }
        if chunk.len() < packet_size {
            return Err(RemoteError::ChunkTooSmall {
                len: chunk.len(),
                packet_size,
            });
        }

        let mut writer = self.writer.lock().await;
        for (start, end) in packet_spans(chunk.len(), packet_size) {
            writer
                .send(Message::Binary(chunk[start..end].to_vec()))
                .await
                .map_err(RemoteError::Send)?;
        }
        Ok(())
    }

    /// Ask the server to finalize the current utterance; the transcript
    /// arrives as a [`RemoteEvent::Final`].
    pub async fn request_final_result(&self) -> Result<(), RemoteError> {
        self.send_control(FINAL_RESULT_REQUEST).await
    }

    /// Ask the server to reset its recognizer state.
    pub async fn reset_recognizer(&self) -> Result<(), RemoteError> {
        self.send_control(RESET_RECOGNIZER).await
    }

    async fn send_control(&self, message: &str) -> Result<(), RemoteError> {
        if !self.is_connected() {
            return Err(RemoteError::NotConnected);
        }
        self.writer
            .lock()
            .await
            .send(Message::Text(message.to_string()))
            .await
            .map_err(RemoteError::Send)
    }

    /// Latest partial transcript received from the server.
    pub fn partial_result(&self) -> String {
        lock_text(&self.shared.partial).clone()
    }

    /// Latest final transcript received from the server.
    pub fn final_result(&self) -> String {
        lock_text(&self.shared.final_text).clone()
    }

    pub fn reset_partial_result(&self) {
        lock_text(&self.shared.partial).clear();
    }

    pub fn reset_final_result(&self) {
        lock_text(&self.shared.final_text).clear();
    }

    /// Close the connection with a normal (1000) close frame.
    ///
    /// Returns `Ok` without sending anything when already disconnected.
    pub async fn close(&self) -> Result<(), RemoteError> {
        if !self.shared.connected.swap(false, Ordering::SeqCst) {
            return Ok(());
        }
        self.writer
            .lock()
            .await
            .send(Message::Close(Some(CloseFrame {
                code: CloseCode::Normal,
                reason: "session closed".into(),
            })))
            .await
            .map_err(RemoteError::Send)
    }
}

impl Drop for RemoteRecognizer {
    fn drop(&mut self) {
        self.reader.abort();
    }
}

impl std::fmt::Debug for RemoteRecognizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteRecognizer")
            .field("connected", &self.is_connected())
            .finish_non_exhaustive()
    }
}

fn lock_text(text: &Mutex<String>) -> std::sync::MutexGuard<'_, String> {
    // The only panics possible while holding these locks are in tests.
    match text.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

// ---------------------------------------------------------------------------
// Reader task
// ---------------------------------------------------------------------------

async fn read_loop(
    mut reader: futures_util::stream::SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>,
    shared: Arc<Shared>,
    event_tx: mpsc::Sender<RemoteEvent>,
) {
    loop {
        let event = match reader.next().await {
            Some(Ok(Message::Text(text))) => match decode_result(&text) {
                Some(RecognitionEvent::Partial(partial)) => {
                    *lock_text(&shared.partial) = partial.clone();
                    Some(RemoteEvent::Partial(partial))
                }
                Some(RecognitionEvent::Final(text)) => {
                    *lock_text(&shared.final_text) = text.clone();
                    Some(RemoteEvent::Final(text))
                }
                None => {
                    log::debug!("unrecognized server message: {text}");
                    None
                }
            },
            Some(Ok(Message::Close(frame))) => {
                shared.connected.store(false, Ordering::SeqCst);
                let (code, reason) = match frame {
                    Some(frame) => (u16::from(frame.code), frame.reason.into_owned()),
                    None => (1000, String::new()),
                };
                log::info!("recognition server closed the connection ({code}: {reason})");
                let _ = event_tx
                    .send(RemoteEvent::Closed {
                        code,
                        reason,
                        clean: true,
                    })
                    .await;
                return;
            }
            Some(Ok(_)) => None,
            Some(Err(e)) => {
                shared.connected.store(false, Ordering::SeqCst);
                log::error!("recognition server connection error: {e}");
                let _ = event_tx.send(RemoteEvent::ConnectionError(e.to_string())).await;
                return;
            }
            None => {
                shared.connected.store(false, Ordering::SeqCst);
                log::warn!("recognition server dropped the connection");
                let _ = event_tx
                    .send(RemoteEvent::Closed {
                        code: ABNORMAL_CLOSE,
                        reason: "connection reset".to_string(),
                        clean: false,
                    })
                    .await;
                return;
            }
        };

        if let Some(event) = event {
            if event_tx.send(event).await.is_err() {
                // Consumer is gone; keep draining so caches stay current.
                log::debug!("remote event receiver dropped");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
