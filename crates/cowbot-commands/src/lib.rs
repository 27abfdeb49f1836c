//! Chat command pipeline: trigger matching, variant resolution and the
//! handler collection the bot loop dispatches every incoming message to.

pub mod handler;
pub mod matcher;
pub mod render_handler;
pub mod trigger;

pub use handler::{HandlerError, HandlerSet, MessageHandler};
pub use matcher::{parse_command, ParsedCommand};
pub use render_handler::RenderHandler;
pub use trigger::{resolve_flags, TriggerCommand, TriggerSpec, TRIGGERS};
