//! Logger module
//!
//! Provides logging utilities for the home server including:
//! - Subscriber setup from the logging configuration
//! - Server lifecycle logging
//! - Access logging with multiple formats
//! - Error and warning logging

mod format;

pub use format::AccessLogEntry;

use crate::config::{Config, LoggingConfig};
use crate::error::ServerError;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

/// Target for access log lines, so they can be filtered separately
const ACCESS_TARGET: &str = "access";

/// Initialize the global subscriber
///
/// `RUST_LOG` takes precedence over `logging.level`. Should be called once
/// at application startup.
pub fn init(config: &LoggingConfig) -> Result<(), ServerError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| ServerError::Logger(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(|e| ServerError::Logger(e.to_string()))
}

pub fn log_server_start(addr: &SocketAddr, config: &Config) {
    tracing::info!("Async server started, listening on http://{addr}");
    tracing::info!(
        prefix = %config.ai_home.prefix,
        resources = %config.ai_home.resource_base().display(),
        "Serving assistant home"
    );
    tracing::info!(
        keep_alive_timeout = config.performance.keep_alive_timeout,
        read_timeout = config.performance.read_timeout,
        write_timeout = config.performance.write_timeout,
        "Connection timeouts (seconds)"
    );
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    tracing::debug!("[Connection] Accepted from: {peer_addr}");
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    tracing::error!("Failed to serve connection: {err:?}");
}

pub fn log_error(message: &str) {
    tracing::error!("{message}");
}

pub fn log_warning(message: &str) {
    tracing::warn!("{message}");
}

pub fn log_debug(message: &str) {
    tracing::debug!("{message}");
}

pub fn log_headers_count(count: usize, show: bool) {
    if show {
        tracing::info!("[Headers] Count: {count}");
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    tracing::info!(target: ACCESS_TARGET, "{}", entry.format(format));
}

pub fn log_shutdown(active_connections: usize) {
    tracing::info!("Shutdown requested, {active_connections} connection(s) still active");
}
