//! Application layer errors

use thiserror::Error;

/// Chat gateway and adapter errors
#[derive(Error, Debug)]
pub enum BotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("API error: {status} {body}")]
    Api { status: u16, body: String },

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Gateway closed")]
    Closed,
}

/// Failures of external command backends (fact service, RCON)
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("unexpected status: {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Decode(String),

    #[error("connection error: {0}")]
    Io(#[from] std::io::Error),

    #[error("authentication failed")]
    AuthFailed,

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("timed out")]
    Timeout,

    #[error("{0} is not configured")]
    NotConfigured(&'static str),
}

impl From<reqwest::Error> for BackendError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            BackendError::Timeout
        } else if e.is_decode() {
            BackendError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            BackendError::Status(status.as_u16())
        } else {
            BackendError::Http(e.to_string())
        }
    }
}

impl From<tokio::time::error::Elapsed> for BackendError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        BackendError::Timeout
    }
}

/// Command execution errors; the display text is the reply sent to the user
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("error getting cat fact")]
    FactUnavailable(#[source] BackendError),

    #[error("{0}")]
    Backend(#[from] BackendError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
