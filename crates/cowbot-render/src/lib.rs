//! cowbot-render: bounded invocation of the external text renderer.
//!
//! The renderer (normally `cowsay`) receives the payload on stdin and writes
//! the rendered text to stdout. Every invocation spawns exactly one process,
//! is capped by a hard deadline, and reaps the child on every exit path.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use cowbot_render::{ProcessRenderer, RenderFlags, RenderRequest, Renderer};
//!
//! #[tokio::main]
//! async fn main() {
//!     let renderer = ProcessRenderer::new("/usr/bin/cowsay");
//!     let request = RenderRequest::new(RenderFlags::variant("tux"), "hello");
//!     match renderer.render(&request).await {
//!         Ok(rendered) => println!("{}", rendered.text),
//!         Err(e) => eprintln!("render failed: {e}"),
//!     }
//! }
//! ```

pub mod error;
pub mod renderer;
pub mod types;

pub use error::{RenderError, Result};
pub use renderer::{ProcessRenderer, Renderer};
pub use types::{RenderFlags, RenderId, RenderRequest, Rendered, DEFAULT_TIMEOUT};
