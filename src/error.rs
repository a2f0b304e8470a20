//! Startup and server errors
//!
//! Per-request failures never surface here; they become HTTP responses.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to load configuration: {0}")]
    Config(#[from] config::ConfigError),

    #[error("invalid listen address '{addr}': {source}")]
    InvalidAddress {
        addr: String,
        #[source]
        source: std::net::AddrParseError,
    },

    #[error("failed to initialize logging: {0}")]
    Logger(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
