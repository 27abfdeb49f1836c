pub mod channel;
pub mod error;
pub mod line;
pub mod types;

pub use channel::Channel;
pub use error::ChannelError;
pub use line::{ConsoleChannel, LineChannel};
pub use types::ChannelStatus;
