// Error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuayError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid server address: {0}")]
    Address(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Settings I/O failed: {0}")]
    SettingsIo(#[from] std::io::Error),

    #[error("Malformed notification: {0}")]
    Protocol(#[from] serde_json::Error),

    #[error("Event channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, QuayError>;
