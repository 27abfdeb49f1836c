//! `ProcessRenderer`: spawns the external renderer once per request and
//! races its exit against a hard deadline.
//!
//! One invocation moves through
//! `Idle → Spawned → InputWritten → WaitingForExit → {Completed | TimedOut | LaunchFailed}`.
//! Every path except a clean `Completed` goes through [`reap`] before the
//! error is reported, so no child is left running or unwaited.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tracing::{debug, warn};

use crate::{
    error::{RenderError, Result},
    types::{RenderRequest, Rendered},
};

/// Turns a payload into rendered text.
///
/// The command pipeline only depends on this trait so that the process
/// boundary can be replaced in tests.
#[async_trait]
pub trait Renderer: Send + Sync {
    async fn render(&self, request: &RenderRequest) -> Result<Rendered>;
}

/// Renderer backed by an external executable (normally `cowsay`).
#[derive(Debug, Clone)]
pub struct ProcessRenderer {
    program: PathBuf,
}

impl ProcessRenderer {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Check that the configured binary exists as a regular file.
    pub fn ensure_installed(&self) -> Result<()> {
        if self.program.is_file() {
            Ok(())
        } else {
            Err(RenderError::NotInstalled {
                path: self.program.display().to_string(),
            })
        }
    }
}

#[async_trait]
impl Renderer for ProcessRenderer {
    async fn render(&self, request: &RenderRequest) -> Result<Rendered> {
        let started = Instant::now();

        // Payload goes in on stdin only; it never touches the argument vector.
        let mut child = Command::new(&self.program)
            .args(request.flags.args())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RenderError::Launch {
                program: self.program.display().to_string(),
                source,
            })?;

        debug!(
            request_id = %request.id,
            pid = ?child.id(),
            flags = %request.flags,
            "renderer spawned"
        );

        let outcome = {
            let exchange = exchange(&mut child, request.payload.as_bytes());
            tokio::time::timeout(request.timeout, exchange).await
        };

        match outcome {
            Ok(Ok(exchanged)) => {
                let elapsed = started.elapsed();
                debug!(
                    request_id = %request.id,
                    status = %exchanged.status,
                    elapsed_ms = elapsed.as_millis() as u64,
                    "renderer exited"
                );
                exchanged.into_rendered(elapsed)
            }

            // Pipe or wait failure: the child may still be alive.
            Ok(Err(e)) => {
                reap(&mut child, request).await;
                Err(e)
            }

            // Deadline expired. Whatever output was read so far is discarded.
            Err(_elapsed) => {
                reap(&mut child, request).await;
                Err(RenderError::Timeout {
                    ms: request.timeout.as_millis() as u64,
                })
            }
        }
    }
}

/// Raw results of one stdin/stdout exchange with a child that has exited.
struct Exchanged {
    status: ExitStatus,
    stdout: Vec<u8>,
    stderr: Vec<u8>,
    written: std::io::Result<()>,
}

impl Exchanged {
    fn into_rendered(self, elapsed: std::time::Duration) -> Result<Rendered> {
        if !self.status.success() {
            let stderr = strip_text(&self.stderr).trim().to_string();
            return Err(match self.status.code() {
                Some(code) => RenderError::Exited { code, stderr },
                None => RenderError::Killed { stderr },
            });
        }

        self.written.map_err(RenderError::Write)?;

        // Relayed as produced apart from trailing whitespace.
        let text = String::from_utf8_lossy(&self.stdout)
            .trim_end()
            .to_string();
        Ok(Rendered { text, elapsed })
    }
}

/// Feed the payload, drain stdout and stderr, then wait for exit.
///
/// Writing and reading run concurrently so a renderer that echoes large input
/// cannot deadlock on a full pipe.
async fn exchange(child: &mut Child, payload: &[u8]) -> Result<Exchanged> {
    let mut stdin = child.stdin.take().ok_or(RenderError::Pipe("stdin"))?;
    let mut stdout = child.stdout.take().ok_or(RenderError::Pipe("stdout"))?;
    let mut stderr = child.stderr.take().ok_or(RenderError::Pipe("stderr"))?;

    // stdin is moved in and dropped at the end of the block, which closes it
    // and signals end-of-input to the renderer.
    let write = async move {
        stdin.write_all(payload).await?;
        stdin.shutdown().await
    };
    let read_out = async {
        let mut buf = Vec::new();
        stdout.read_to_end(&mut buf).await.map(|_| buf)
    };
    let read_err = async {
        let mut buf = Vec::new();
        stderr.read_to_end(&mut buf).await.map(|_| buf)
    };

    let (written, stdout, stderr) = tokio::join!(write, read_out, read_err);
    let stdout = stdout.map_err(RenderError::Io)?;
    // stderr is diagnostic only; a read failure there loses detail, not output.
    let stderr = stderr.unwrap_or_default();

    let status = child.wait().await.map_err(RenderError::Io)?;

    Ok(Exchanged {
        status,
        stdout,
        stderr,
        written,
    })
}

/// Kill the child if it is still running and wait for it so the process
/// table entry is released.
async fn reap(child: &mut Child, request: &RenderRequest) {
    if let Err(e) = child.start_kill() {
        // InvalidInput means the child already exited; anything else is odd.
        if e.kind() != std::io::ErrorKind::InvalidInput {
            warn!(request_id = %request.id, error = %e, "failed to kill renderer");
        }
    }
    match child.wait().await {
        Ok(status) => debug!(request_id = %request.id, %status, "renderer reaped"),
        Err(e) => warn!(request_id = %request.id, error = %e, "failed to reap renderer"),
    }
}

/// Strip ANSI escape codes from diagnostic output before it reaches the logs.
fn strip_text(raw: &[u8]) -> String {
    let clean = strip_ansi_escapes::strip(raw);
    String::from_utf8_lossy(&clean).into_owned()
}
