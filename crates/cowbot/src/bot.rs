//! Bot message loop: inbox → handler set → channel.

use std::sync::Arc;

use tokio::sync::{mpsc, RwLock};
use tracing::{debug, error, info, warn};

use cowbot_channels::Channel;
use cowbot_commands::HandlerSet;
use cowbot_core::IncomingMessage;

use crate::shutdown::ShutdownSignal;

/// Shared handle to the connected channel. The loop only reads; the main
/// flow takes the write lock once the loop has stopped, to disconnect.
pub type SharedChannel = Arc<RwLock<Box<dyn Channel>>>;

/// Process incoming messages one at a time until shutdown fires or the
/// inbox closes.
///
/// Each message is dispatched on its own task so a panicking handler only
/// loses that message. A dispatch still running when shutdown fires is
/// aborted, which drops (and kills) any renderer process it owns.
pub async fn run_message_loop(
    channel: SharedChannel,
    handlers: Arc<HandlerSet>,
    mut inbox: mpsc::Receiver<IncomingMessage>,
    shutdown: ShutdownSignal,
) {
    info!(handlers = ?handlers.names(), "message loop started");

    loop {
        let msg = tokio::select! {
            biased;
            _ = shutdown.fired() => break,
            msg = inbox.recv() => match msg {
                Some(msg) => msg,
                None => {
                    info!("inbox closed, no further input");
                    break;
                }
            },
        };

        let sender = msg.sender.clone();
        let set = Arc::clone(&handlers);
        let mut dispatch = tokio::spawn(async move { set.dispatch(&msg).await });

        let outgoing = tokio::select! {
            joined = &mut dispatch => match joined {
                Ok(outgoing) => outgoing,
                Err(e) if e.is_panic() => {
                    error!(sender = %sender, "message handler panicked, message dropped");
                    continue;
                }
                Err(e) => {
                    warn!(sender = %sender, error = %e, "message dispatch aborted");
                    continue;
                }
            },
            _ = shutdown.fired() => {
                dispatch.abort();
                debug!(sender = %sender, "in-flight message abandoned for shutdown");
                break;
            }
        };

        let chan = channel.read().await;
        for out in &outgoing {
            if let Err(e) = chan.send(out).await {
                warn!(channel = %chan.name(), target = %out.target, error = %e, "failed to send reply");
            }
        }
    }

    info!("message loop stopped");
}
