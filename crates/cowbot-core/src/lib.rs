pub mod config;
pub mod error;
pub mod types;

pub use config::CowbotConfig;
pub use error::{CowbotError, Result};
pub use types::{IncomingMessage, MessageSource, OutgoingMessage, ResponseScope};
