//! Shared data types for cowbot-render.

use std::fmt;
use std::time::Duration;

use uuid::Uuid;

/// Hard ceiling applied to every request unless a caller overrides it.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

// ---------------------------------------------------------------------------
// RenderId
// ---------------------------------------------------------------------------

/// Opaque identifier attached to one renderer invocation for log correlation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RenderId(pub String);

impl RenderId {
    /// Generate a fresh random ID (UUIDv4).
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for RenderId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RenderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// RenderFlags
// ---------------------------------------------------------------------------

/// Command-line options passed to the renderer.
///
/// Either nothing (the renderer's baseline look) or a single `-f <variant>`
/// pair selecting an alternate figure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderFlags {
    variant: Option<String>,
}

impl RenderFlags {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn variant(name: impl Into<String>) -> Self {
        Self {
            variant: Some(name.into()),
        }
    }

    /// Argument vector handed to the process, never through a shell.
    pub fn args(&self) -> Vec<&str> {
        match self.variant.as_deref() {
            Some(name) => vec!["-f", name],
            None => Vec::new(),
        }
    }
}

impl fmt::Display for RenderFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args().join(" "))
    }
}

// ---------------------------------------------------------------------------
// RenderRequest / Rendered
// ---------------------------------------------------------------------------

/// One renderer invocation: flags, stdin payload and deadline.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub id: RenderId,
    pub flags: RenderFlags,
    pub payload: String,
    pub timeout: Duration,
}

impl RenderRequest {
    /// Build a request with the standard 15-second deadline.
    pub fn new(flags: RenderFlags, payload: impl Into<String>) -> Self {
        Self {
            id: RenderId::new(),
            flags,
            payload: payload.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Successful renderer output.
#[derive(Debug, Clone)]
pub struct Rendered {
    /// Captured stdout, byte-for-byte apart from trailing whitespace.
    pub text: String,

    /// Wall-clock time from spawn to exit.
    pub elapsed: Duration,
}

impl Rendered {
    /// True when there is nothing worth sending to a channel.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}
