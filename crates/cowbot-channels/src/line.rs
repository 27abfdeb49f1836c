//! Line-oriented channel adapter.
//!
//! Each newline-terminated input line becomes one channel message; each
//! outgoing message is written back followed by a newline. [`ConsoleChannel`]
//! binds the adapter to the process's stdin and stdout.

use std::sync::Mutex as StdMutex;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::codec::{FramedRead, FramedWrite, LinesCodec, LinesCodecError};
use tracing::{debug, info, warn};

use cowbot_core::config::ConsoleConfig;
use cowbot_core::{IncomingMessage, OutgoingMessage};

use crate::{channel::Channel, error::ChannelError, types::ChannelStatus};

/// Sender identity stamped on lines read from the console.
const CONSOLE_SENDER: &str = "operator";

/// Channel adapter over any async byte reader/writer pair.
pub struct LineChannel<R, W> {
    name: String,
    channel: String,
    sender: String,
    max_line_bytes: usize,
    // Only touched through `&mut self`; the mutexes keep the adapter `Sync`
    // without requiring `R: Sync` or `W: Sync`.
    reader: StdMutex<Option<R>>,
    pending_writer: StdMutex<Option<W>>,
    writer: Mutex<Option<FramedWrite<W, LinesCodec>>>,
    pump: Option<JoinHandle<()>>,
    status: ChannelStatus,
}

/// The console adapter: stdin in, stdout out.
pub type ConsoleChannel = LineChannel<tokio::io::Stdin, tokio::io::Stdout>;

impl ConsoleChannel {
    pub fn console(config: &ConsoleConfig) -> Self {
        LineChannel::new(
            "console",
            tokio::io::stdin(),
            tokio::io::stdout(),
            &config.channel,
            config.max_line_bytes,
        )
        .with_sender(CONSOLE_SENDER)
    }
}

impl<R, W> LineChannel<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    pub fn new(
        name: impl Into<String>,
        reader: R,
        writer: W,
        channel: impl Into<String>,
        max_line_bytes: usize,
    ) -> Self {
        Self {
            name: name.into(),
            channel: channel.into(),
            sender: CONSOLE_SENDER.to_string(),
            max_line_bytes,
            reader: StdMutex::new(Some(reader)),
            pending_writer: StdMutex::new(Some(writer)),
            writer: Mutex::new(None),
            pump: None,
            status: ChannelStatus::Disconnected,
        }
    }

    /// Identity reported as the sender of every incoming line.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = sender.into();
        self
    }
}

#[async_trait]
impl<R, W> Channel for LineChannel<R, W>
where
    R: AsyncRead + Unpin + Send + 'static,
    W: AsyncWrite + Unpin + Send + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn connect(&mut self, inbox: mpsc::Sender<IncomingMessage>) -> Result<(), ChannelError> {
        let reader = self.reader.get_mut().expect("line reader slot poisoned").take();
        let writer = self
            .pending_writer
            .get_mut()
            .expect("line writer slot poisoned")
            .take();
        let (Some(reader), Some(writer)) = (reader, writer) else {
            return Err(ChannelError::ConnectionFailed(format!(
                "{} streams already consumed",
                self.name
            )));
        };

        *self.writer.get_mut() = Some(FramedWrite::new(writer, LinesCodec::new()));

        let mut lines = FramedRead::new(reader, LinesCodec::new_with_max_length(self.max_line_bytes));
        let name = self.name.clone();
        let channel = self.channel.clone();
        let sender = self.sender.clone();

        self.pump = Some(tokio::spawn(async move {
            while let Some(frame) = lines.next().await {
                match frame {
                    Ok(line) => {
                        let msg = IncomingMessage::in_channel(&channel, &sender, line);
                        if inbox.send(msg).await.is_err() {
                            debug!(channel = %name, "inbox closed, stopping input");
                            return;
                        }
                    }
                    Err(LinesCodecError::MaxLineLengthExceeded) => {
                        warn!(channel = %name, "discarding over-long input line");
                    }
                    Err(LinesCodecError::Io(e)) => {
                        warn!(channel = %name, error = %e, "input read failed");
                        return;
                    }
                }
            }
            info!(channel = %name, "input closed");
        }));

        self.status = ChannelStatus::Connected;
        info!(channel = %self.name, target = %self.channel, "channel connected");
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<(), ChannelError> {
        if let Some(pump) = self.pump.take() {
            pump.abort();
            if let Err(e) = pump.await {
                if !e.is_cancelled() {
                    warn!(channel = %self.name, error = %e, "input task ended abnormally");
                }
            }
        }

        let result = match self.writer.get_mut().take() {
            Some(mut framed) => SinkExt::<String>::close(&mut framed)
                .await
                .map_err(|e| ChannelError::SendFailed(e.to_string())),
            None => Ok(()),
        };

        if self.status == ChannelStatus::Connected {
            info!(channel = %self.name, "channel disconnected");
        }
        self.status = ChannelStatus::Disconnected;
        result
    }

    async fn send(&self, msg: &OutgoingMessage) -> Result<(), ChannelError> {
        let mut guard = self.writer.lock().await;
        let framed = guard.as_mut().ok_or(ChannelError::NotConnected)?;
        debug!(channel = %self.name, target = %msg.target, bytes = msg.content.len(), "sending");
        framed
            .send(msg.content.as_str())
            .await
            .map_err(|e| ChannelError::SendFailed(e.to_string()))
    }

    fn status(&self) -> ChannelStatus {
        self.status.clone()
    }
}
