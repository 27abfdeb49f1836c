//! Error types for the cowbot-render crate.

use thiserror::Error;

/// Every way a single renderer invocation can fail.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The renderer binary is not present at the configured path.
    #[error("renderer not installed at {path}")]
    NotInstalled { path: String },

    /// The process could not be spawned (missing, not executable, …).
    #[error("failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// A stdio pipe was not available after spawning.
    #[error("renderer {0} pipe unavailable")]
    Pipe(&'static str),

    /// Writing the payload failed, usually because the renderer exited early.
    #[error("failed to write payload: {0}")]
    Write(#[source] std::io::Error),

    /// Reading renderer output or waiting for exit failed.
    #[error("I/O error while collecting output: {0}")]
    Io(#[source] std::io::Error),

    /// The renderer did not exit before the deadline and was killed.
    #[error("renderer timed out after {ms}ms")]
    Timeout { ms: u64 },

    /// The renderer exited with a non-zero status.
    #[error("renderer exited with status {code}: {stderr}")]
    Exited { code: i32, stderr: String },

    /// The renderer was terminated by a signal.
    #[error("renderer killed by signal: {stderr}")]
    Killed { stderr: String },
}

impl RenderError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            RenderError::NotInstalled { .. } => "not_installed",
            RenderError::Launch { .. } => "launch_failed",
            RenderError::Pipe(_) => "pipe_unavailable",
            RenderError::Write(_) => "write_failed",
            RenderError::Io(_) => "io",
            RenderError::Timeout { .. } => "timeout",
            RenderError::Exited { .. } => "exited",
            RenderError::Killed { .. } => "killed",
        }
    }
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, RenderError>;
