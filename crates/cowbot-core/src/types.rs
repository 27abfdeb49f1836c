use serde::{Deserialize, Serialize};

/// Where an incoming message was posted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "name")]
pub enum MessageSource {
    /// Posted to a shared channel (e.g. `#testcow`).
    Channel(String),

    /// Sent directly to the bot.
    Private,
}

/// A message received from the channel client.
///
/// Read-only for the command pipeline; produced by the channel adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingMessage {
    pub source: MessageSource,

    /// Platform-native identity of the sender (nick, user ID, …).
    pub sender: String,

    /// Raw, untrusted text content.
    pub text: String,

    /// RFC-3339 timestamp of when the adapter received the message.
    pub received_at: String,
}

impl IncomingMessage {
    pub fn in_channel(
        channel: impl Into<String>,
        sender: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source: MessageSource::Channel(channel.into()),
            sender: sender.into(),
            text: text.into(),
            received_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn private(sender: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            source: MessageSource::Private,
            sender: sender.into(),
            text: text.into(),
            received_at: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Where a reply to this message should go: the channel it was posted in,
    /// or the sender for private messages.
    pub fn reply_target(&self) -> &str {
        match &self.source {
            MessageSource::Channel(name) => name,
            MessageSource::Private => &self.sender,
        }
    }
}

/// A message to be delivered through the channel client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    /// Channel name or nick to deliver to.
    pub target: String,

    /// Content to deliver. May span several lines.
    pub content: String,
}

/// Which message sources a handler responds to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseScope {
    /// Only messages posted to a channel.
    #[default]
    Channel,

    /// Only private messages.
    Private,

    /// Channel and private messages alike.
    Both,
}

impl ResponseScope {
    pub fn accepts(self, source: &MessageSource) -> bool {
        matches!(
            (self, source),
            (ResponseScope::Both, _)
                | (ResponseScope::Channel, MessageSource::Channel(_))
                | (ResponseScope::Private, MessageSource::Private)
        )
    }
}
