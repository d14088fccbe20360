use std::io;
use thiserror::Error;

/// Custom error type for the FrameHUD metrics engine
#[derive(Error, Debug)]
pub enum HudError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Unknown module: {0}")]
    UnknownModule(String),

    #[error("Helper channel error: {0}")]
    Channel(String),

    #[error("Parse error: {0}")]
    Parse(String),
}

/// Result type alias for the FrameHUD metrics engine
pub type Result<T> = std::result::Result<T, HudError>;

impl HudError {
    /// Create a helper channel error
    pub fn channel<S: Into<String>>(msg: S) -> Self {
        HudError::Channel(msg.into())
    }

    /// Create a parse error
    pub fn parse<S: Into<String>>(msg: S) -> Self {
        HudError::Parse(msg.into())
    }
}
