/// Runtime connection state of a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelStatus {
    /// Fully connected and ready to send/receive.
    Connected,

    /// Cleanly disconnected (not an error condition).
    Disconnected,
}
