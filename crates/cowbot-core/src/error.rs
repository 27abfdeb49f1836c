use thiserror::Error;

#[derive(Debug, Error)]
pub enum CowbotError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Handler validation failed: {0}")]
    InvalidHandlers(String),
}

impl CowbotError {
    /// Short error code string used in startup diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            CowbotError::Config(_) => "CONFIG_ERROR",
            CowbotError::InvalidHandlers(_) => "INVALID_HANDLERS",
        }
    }
}

pub type Result<T> = std::result::Result<T, CowbotError>;
