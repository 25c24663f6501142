//! Error types for the faucet client

use thiserror::Error;

/// Faucet client errors
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Server { status: u16, message: Option<String> },

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Message supplied by the server in an error body, if any
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ClientError::Server {
                message: Some(message),
                ..
            } if !message.trim().is_empty() => Some(message),
            _ => None,
        }
    }
}

impl From<config::ConfigError> for ClientError {
    fn from(err: config::ConfigError) -> Self {
        ClientError::Config(err.to_string())
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
