//! Error types for the market data client

use thiserror::Error;

/// Market data client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("WebSocket connection error: {0}")]
    Connection(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Subscribe error: {0}")]
    Subscribe(String),

    #[error("WebSocket read error: {0}")]
    TransportRead(String),

    #[error("Failed to decode message: {0}")]
    Decode(String),

    #[error("Ping write error: {0}")]
    LivenessWrite(String),
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
