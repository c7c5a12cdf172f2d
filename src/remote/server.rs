//! Launching and stopping a recognition-server process.
//!
//! The server is a separate executable taking its parameters on the command
//! line.  [`build_server_args`] turns a [`ServerConfig`] into that command
//! line, validating the model directory first, and [`ServerProcess`] owns
//! the spawned child.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use thiserror::Error;

use crate::config::ServerConfig;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("model directory not found: {0}")]
    ModelDirMissing(String),

    #[error("model directory is empty: {0}")]
    ModelDirEmpty(String),

    #[error("failed to read model directory {path}: {source}")]
    ModelDirRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to spawn recognition server {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to stop recognition server: {0}")]
    Kill(#[source] std::io::Error),

    #[error("failed to locate the current executable: {0}")]
    ExecutablePath(#[source] std::io::Error),
}

/// Build the recognition server's command line from `config`.
///
/// # Errors
///
/// The configured model directory must exist and contain at least one
/// entry; otherwise the server would start and immediately fail.
pub fn build_server_args(config: &ServerConfig) -> Result<Vec<String>, ServerError> {
    let model_path = config.model_path.as_path();
    check_model_dir(model_path)?;

    Ok(vec![
        "--address".to_string(),
        config.address.clone(),
        "--port".to_string(),
        config.port.to_string(),
        "--threads".to_string(),
        config.threads.to_string(),
        "--sample-rate".to_string(),
        config.sample_rate.to_string(),
        "--show-words".to_string(),
        if config.show_words { "1" } else { "0" }.to_string(),
        "--model-path".to_string(),
        model_path.display().to_string(),
    ])
}

fn check_model_dir(path: &Path) -> Result<(), ServerError> {
    if !path.is_dir() {
        return Err(ServerError::ModelDirMissing(path.display().to_string()));
    }
    let mut entries = path.read_dir().map_err(|source| ServerError::ModelDirRead {
        path: path.display().to_string(),
        source,
    })?;
    if entries.next().is_none() {
        return Err(ServerError::ModelDirEmpty(path.display().to_string()));
    }
    Ok(())
}

/// Directory containing the running executable, where the server binary is
/// expected to live by default.
pub fn executable_dir() -> Result<PathBuf, ServerError> {
    let exe = std::env::current_exe().map_err(ServerError::ExecutablePath)?;
    let dir = exe.parent().unwrap_or_else(|| Path::new("."));
    Ok(dir.to_path_buf())
}

/// A spawned recognition-server child process.
///
/// The child is killed when the handle is dropped; call
/// [`stop`](Self::stop) to kill and reap it explicitly.
#[derive(Debug)]
pub struct ServerProcess {
    child: Child,
}

impl ServerProcess {
    /// Spawn `program` with the command line for `config`.
    pub fn spawn(program: impl AsRef<Path>, config: &ServerConfig) -> Result<Self, ServerError> {
        let program = program.as_ref();
        let args = build_server_args(config)?;

        log::info!(
            "starting recognition server: {} {}",
            program.display(),
            args.join(" ")
        );
        let child = Command::new(program)
            .args(&args)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|source| ServerError::Spawn {
                program: program.display().to_string(),
                source,
            })?;

        Ok(Self { child })
    }

    /// OS process id of the server.
    pub fn pid(&self) -> u32 {
        self.child.id()
    }

    /// Kill the server and reap it.
    pub fn stop(&mut self) -> Result<(), ServerError> {
        self.child.kill().map_err(ServerError::Kill)?;
        let status = self.child.wait().map_err(ServerError::Kill)?;
        log::info!("recognition server stopped ({status})");
        Ok(())
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        // Already-exited children make kill() fail; nothing to do then.
        if self.child.kill().is_ok() {
            let _ = self.child.wait();
        }
    }
}
