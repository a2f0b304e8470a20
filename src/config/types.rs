// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    #[serde(default)]
    pub routes: RoutesConfig,
    pub ai_home: AiHomeConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Filter directive for the subscriber (e.g. `info`, `ai_home=debug`)
    pub level: String,
    pub access_log: bool,
    pub show_headers: bool,
    /// Access log format (combined, common, json, or custom pattern)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub enable_cors: bool,
    pub max_body_size: u64,
}

/// Routes outside the home prefix
#[derive(Debug, Deserialize, Clone, Default)]
pub struct RoutesConfig {
    #[serde(default)]
    pub health: HealthConfig,
}

/// Health check configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HealthConfig {
    /// Enable health check endpoints
    #[serde(default = "default_health_enabled")]
    pub enabled: bool,
    /// Liveness probe path (default: /healthz)
    #[serde(default = "default_healthz_path")]
    pub liveness_path: String,
    /// Readiness probe path (default: /readyz)
    #[serde(default = "default_readyz_path")]
    pub readiness_path: String,
}

#[allow(clippy::missing_const_for_fn)]
fn default_health_enabled() -> bool {
    true
}

#[allow(clippy::missing_const_for_fn)]
fn default_healthz_path() -> String {
    "/healthz".to_string()
}

#[allow(clippy::missing_const_for_fn)]
fn default_readyz_path() -> String {
    "/readyz".to_string()
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            enabled: default_health_enabled(),
            liveness_path: default_healthz_path(),
            readiness_path: default_readyz_path(),
        }
    }
}

/// Assistant home page configuration
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct AiHomeConfig {
    /// Application resources root
    pub resources_path: PathBuf,
    /// Directory under `resources_path` holding the home page
    pub resource_dir: String,
    /// URL prefix served by the home router; a trailing slash is added if
    /// missing
    pub prefix: String,
    /// Root document rendered for the bare prefix
    pub index_file: String,
    /// Value injected as `js_callbacks` into the root document
    #[serde(default)]
    pub js_callbacks: String,
    /// `max-age` for static assets, in seconds
    pub asset_max_age: u32,
}

impl AiHomeConfig {
    /// Directory anchoring every home lookup
    pub fn resource_base(&self) -> PathBuf {
        self.resources_path.join(&self.resource_dir)
    }
}

impl Default for AiHomeConfig {
    fn default() -> Self {
        Self {
            resources_path: PathBuf::from("resources"),
            resource_dir: "ai_resources".to_string(),
            prefix: "/ai/doc/home/".to_string(),
            index_file: "index.htm".to_string(),
            js_callbacks: String::new(),
            asset_max_age: 3600,
        }
    }
}
