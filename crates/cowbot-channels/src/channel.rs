use async_trait::async_trait;
use tokio::sync::mpsc;

use cowbot_core::{IncomingMessage, OutgoingMessage};

use crate::{error::ChannelError, types::ChannelStatus};

/// Boundary to the chat-protocol client.
///
/// Implementations must be `Send + Sync` so the bot loop can send replies
/// from its own task while the main flow keeps ownership for shutdown.
#[async_trait]
pub trait Channel: Send + Sync {
    /// Stable lowercase identifier for this channel (e.g. `"console"`).
    fn name(&self) -> &str;

    /// Establish the connection and start delivering incoming messages into
    /// `inbox`.
    ///
    /// Implementations should transition their internal state to
    /// [`ChannelStatus::Connected`] on success.
    async fn connect(&mut self, inbox: mpsc::Sender<IncomingMessage>) -> Result<(), ChannelError>;

    /// Gracefully close the connection and release its resources.
    ///
    /// Calling this on a channel that is already disconnected is a no-op.
    async fn disconnect(&mut self) -> Result<(), ChannelError>;

    /// Deliver a single outgoing message.
    ///
    /// This is intentionally `&self` (shared reference) so that a connected
    /// adapter can send concurrently without a mutable borrow.
    async fn send(&self, msg: &OutgoingMessage) -> Result<(), ChannelError>;

    /// Return the current runtime status without blocking.
    fn status(&self) -> ChannelStatus;
}
