//! The trigger → renderer pipeline as a [`MessageHandler`].

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::{debug, info};

use cowbot_core::{IncomingMessage, OutgoingMessage, ResponseScope};
use cowbot_render::{RenderRequest, Renderer};

use crate::handler::{HandlerError, MessageHandler};
use crate::matcher::parse_command;
use crate::trigger::resolve_flags;

/// Answers trigger commands with renderer output.
///
/// Messages outside the configured [`ResponseScope`] are ignored, as are
/// triggers arriving within `cooldown` of the last accepted one.
pub struct RenderHandler {
    renderer: Arc<dyn Renderer>,
    scope: ResponseScope,
    cooldown: Duration,
    timeout: Option<Duration>,
    last_accepted: Mutex<Option<Instant>>,
}

impl RenderHandler {
    pub fn new(renderer: Arc<dyn Renderer>) -> Self {
        Self {
            renderer,
            scope: ResponseScope::default(),
            cooldown: Duration::ZERO,
            timeout: None,
            last_accepted: Mutex::new(None),
        }
    }

    pub fn with_scope(mut self, scope: ResponseScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_cooldown(mut self, cooldown: Duration) -> Self {
        self.cooldown = cooldown;
        self
    }

    /// Override the per-request deadline (defaults to the renderer's 15 s).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Claim the cooldown window. Returns false while a previous trigger is
    /// still cooling down.
    fn try_accept(&self) -> bool {
        let mut last = self.last_accepted.lock().expect("cooldown state poisoned");
        let now = Instant::now();
        if let Some(prev) = *last {
            if now.duration_since(prev) < self.cooldown {
                return false;
            }
        }
        *last = Some(now);
        true
    }
}

#[async_trait]
impl MessageHandler for RenderHandler {
    fn name(&self) -> &str {
        "render"
    }

    async fn handle(&self, msg: &IncomingMessage) -> Result<Option<OutgoingMessage>, HandlerError> {
        if !self.scope.accepts(&msg.source) {
            return Ok(None);
        }

        let Some(parsed) = parse_command(&msg.text) else {
            debug!(sender = %msg.sender, "no trigger in message");
            return Ok(None);
        };

        if !self.try_accept() {
            debug!(
                sender = %msg.sender,
                trigger = ?parsed.command,
                cooldown_secs = self.cooldown.as_secs(),
                "trigger ignored during cooldown"
            );
            return Ok(None);
        }

        let mut request = RenderRequest::new(resolve_flags(parsed.command), parsed.payload);
        if let Some(timeout) = self.timeout {
            request = request.with_timeout(timeout);
        }

        info!(
            request_id = %request.id,
            sender = %msg.sender,
            trigger = ?parsed.command,
            flags = %request.flags,
            "rendering trigger command"
        );

        let rendered = self
            .renderer
            .render(&request)
            .await
            .map_err(|source| HandlerError::Render {
                request_id: request.id.clone(),
                source,
            })?;

        if rendered.is_blank() {
            debug!(request_id = %request.id, "renderer produced no output, nothing to send");
            return Ok(None);
        }

        debug!(
            request_id = %request.id,
            elapsed_ms = rendered.elapsed.as_millis() as u64,
            "render complete"
        );

        Ok(Some(OutgoingMessage {
            target: msg.reply_target().to_string(),
            content: rendered.text,
        }))
    }
}
