//! Message handler collection.
//!
//! Every incoming message is offered to each registered handler in order.
//! [`HandlerSet::dispatch`] is the boundary where handler failures are
//! logged and dropped; nothing a handler returns can reach the channel
//! client as an error.

use std::collections::HashSet;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use cowbot_core::{CowbotError, IncomingMessage, OutgoingMessage};
use cowbot_render::{RenderError, RenderId};

/// Errors a handler may report for a single message.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("render {request_id} failed: {source}")]
    Render {
        request_id: RenderId,
        #[source]
        source: RenderError,
    },

    #[error("{0}")]
    Internal(String),
}

impl HandlerError {
    /// Short label used as a structured log field.
    pub fn kind(&self) -> &'static str {
        match self {
            HandlerError::Render { source, .. } => source.kind(),
            HandlerError::Internal(_) => "internal",
        }
    }
}

/// A plugin-style reaction to incoming messages.
#[async_trait]
pub trait MessageHandler: Send + Sync {
    /// Stable identifier, unique within a [`HandlerSet`].
    fn name(&self) -> &str;

    /// React to one message. `Ok(None)` means "not for me" or "nothing to send".
    async fn handle(&self, msg: &IncomingMessage) -> Result<Option<OutgoingMessage>, HandlerError>;
}

/// Ordered collection of handlers.
#[derive(Default)]
pub struct HandlerSet {
    handlers: Vec<Box<dyn MessageHandler>>,
}

impl HandlerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Box<dyn MessageHandler>) {
        debug!(handler = %handler.name(), "registering message handler");
        self.handlers.push(handler);
    }

    pub fn with(mut self, handler: Box<dyn MessageHandler>) -> Self {
        self.register(handler);
        self
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    /// Startup check: at least one handler, no duplicate names.
    pub fn validate(&self) -> cowbot_core::Result<()> {
        if self.handlers.is_empty() {
            return Err(CowbotError::InvalidHandlers(
                "no message handlers registered".to_string(),
            ));
        }
        let mut seen = HashSet::new();
        for name in self.names() {
            if !seen.insert(name) {
                return Err(CowbotError::InvalidHandlers(format!(
                    "duplicate handler name `{name}`"
                )));
            }
        }
        Ok(())
    }

    /// Offer `msg` to every handler and collect what they want to send.
    ///
    /// Handler errors are logged with full detail and otherwise ignored.
    pub async fn dispatch(&self, msg: &IncomingMessage) -> Vec<OutgoingMessage> {
        let mut outgoing = Vec::new();
        for handler in &self.handlers {
            match handler.handle(msg).await {
                Ok(Some(out)) => outgoing.push(out),
                Ok(None) => {}
                Err(e) => warn!(
                    handler = %handler.name(),
                    sender = %msg.sender,
                    kind = e.kind(),
                    error = %e,
                    "message handler failed"
                ),
            }
        }
        outgoing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo(&'static str);

    #[async_trait]
    impl MessageHandler for Echo {
        fn name(&self) -> &str {
            self.0
        }

        async fn handle(
            &self,
            msg: &IncomingMessage,
        ) -> Result<Option<OutgoingMessage>, HandlerError> {
            Ok(Some(OutgoingMessage {
                target: msg.reply_target().to_string(),
                content: format!("{}: {}", self.0, msg.text),
            }))
        }
    }

    struct Failing;

    #[async_trait]
    impl MessageHandler for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        async fn handle(
            &self,
            _msg: &IncomingMessage,
        ) -> Result<Option<OutgoingMessage>, HandlerError> {
            Err(HandlerError::Internal("boom".to_string()))
        }
    }

    #[test]
    fn empty_set_fails_validation() {
        let err = HandlerSet::new().validate().unwrap_err();
        assert_eq!(err.code(), "INVALID_HANDLERS");
    }

    #[test]
    fn duplicate_names_fail_validation() {
        let set = HandlerSet::new()
            .with(Box::new(Echo("echo")))
            .with(Box::new(Echo("echo")));
        assert!(set.validate().is_err());
    }

    #[test]
    fn distinct_names_pass_validation() {
        let set = HandlerSet::new()
            .with(Box::new(Echo("a")))
            .with(Box::new(Failing));
        assert!(set.validate().is_ok());
        assert_eq!(set.names(), vec!["a", "failing"]);
        assert_eq!(set.len(), 2);
    }

    #[tokio::test]
    async fn failing_handler_does_not_stop_the_others() {
        let set = HandlerSet::new()
            .with(Box::new(Failing))
            .with(Box::new(Echo("echo")));

        let msg = IncomingMessage::in_channel("#testcow", "alice", "hi");
        let out = set.dispatch(&msg).await;

        assert_eq!(
            out,
            vec![OutgoingMessage {
                target: "#testcow".to_string(),
                content: "echo: hi".to_string(),
            }]
        );
    }

    #[test]
    fn render_error_kind_is_forwarded() {
        let e = HandlerError::Render {
            request_id: RenderId::new(),
            source: RenderError::Timeout { ms: 15_000 },
        };
        assert_eq!(e.kind(), "timeout");
        assert!(e.to_string().contains("timed out after 15000ms"));
    }
}
