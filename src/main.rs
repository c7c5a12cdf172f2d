//! Dictation demo.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Load the Vosk model via [`EngineLoader`] (off the main task).
//! 4. Wire a [`CaptureSession`] to a [`LocalSink`] over the engine.
//! 5. Start capturing and print partial/final transcripts until Ctrl-C.

use std::sync::Arc;

use vosk_voice::{
    config::{AppConfig, AppPaths},
    session::{CaptureSession, LocalSink, VoiceSink},
    stt::{EngineLoader, EngineParams, RecognitionEvent},
};

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run().await {
        log::error!("{e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let paths = AppPaths::new();
    let config = AppConfig::load()?;

    let model_path = config.recognizer.model_path(&paths);
    log::info!("using model {}", model_path.display());

    let loader = EngineLoader::new();
    let engine = loader
        .load(&model_path, EngineParams::from(&config.recognizer))
        .await?;

    let (sink, mut events) = LocalSink::new(engine);
    let mut session = CaptureSession::new(&config.audio, Arc::new(sink) as Arc<dyn VoiceSink>);

    session.start()?;
    println!("listening — press Ctrl-C to stop");

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(RecognitionEvent::Partial(text)) if !text.is_empty() => {
                    print!("\r… {text}");
                    let _ = std::io::Write::flush(&mut std::io::stdout());
                }
                Some(RecognitionEvent::Final(text)) if !text.is_empty() => {
                    println!("\r→ {text}");
                }
                Some(_) => {}
                None => break,
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                break;
            }
        }
    }

    let samples = session.stop().await?;
    log::info!("session ended ({:.1} s recorded)", samples.len() as f32 / 16_000.0);

    // Drain the transcript the stop flush produced.
    while let Ok(event) = events.try_recv() {
        if let RecognitionEvent::Final(text) = event {
            if !text.is_empty() {
                println!("→ {text}");
            }
        }
    }

    Ok(())
}
