// Configuration module entry point
// Loads layered configuration and holds runtime state

mod state;
mod types;

use std::net::SocketAddr;

use crate::error::ServerError;

// Re-export public types
pub use state::AppState;
pub use types::{
    AiHomeConfig, Config, HealthConfig, HttpConfig, LoggingConfig, PerformanceConfig,
    RoutesConfig, ServerConfig,
};

/// Default config file name (without extension)
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Prefix of environment overrides, e.g. `AI_HOME__SERVER__PORT=9000`
const ENV_PREFIX: &str = "AI_HOME";

impl Config {
    /// Load configuration from specified file path (without extension),
    /// overlaid with `AI_HOME__*` environment variables
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let home = AiHomeConfig::default();
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__"),
            )
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("logging.show_headers", false)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "ai-home/0.1")?
            .set_default("http.enable_cors", false)?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("ai_home.resources_path", home.resources_path.to_string_lossy().as_ref())?
            .set_default("ai_home.resource_dir", home.resource_dir)?
            .set_default("ai_home.prefix", home.prefix)?
            .set_default("ai_home.index_file", home.index_file)?
            .set_default("ai_home.js_callbacks", home.js_callbacks)?
            .set_default("ai_home.asset_max_age", i64::from(home.asset_max_age))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, ServerError> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .map_err(|source| ServerError::InvalidAddress { addr, source })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file() {
        let cfg = Config::load_from("does-not-exist/config").unwrap();
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.ai_home.prefix, "/ai/doc/home/");
        assert_eq!(cfg.ai_home.index_file, "index.htm");
        assert_eq!(
            cfg.ai_home.resource_base(),
            std::path::PathBuf::from("resources/ai_resources")
        );
        assert!(cfg.routes.health.enabled);
        assert_eq!(cfg.get_socket_addr().unwrap().port(), 8080);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9100\n\n[ai_home]\nresources_path = \"/opt/app/resources\"\njs_callbacks = \"cb123\"\nasset_max_age = 60"
        )
        .unwrap();

        let base = dir.path().join("home");
        let cfg = Config::load_from(base.to_str().unwrap()).unwrap();
        assert_eq!(cfg.server.port, 9100);
        assert_eq!(cfg.ai_home.js_callbacks, "cb123");
        assert_eq!(cfg.ai_home.asset_max_age, 60);
        assert_eq!(
            cfg.ai_home.resource_base(),
            std::path::PathBuf::from("/opt/app/resources/ai_resources")
        );
    }

    #[test]
    fn test_invalid_address() {
        let mut cfg = Config::load_from("does-not-exist/config").unwrap();
        cfg.server.host = "not a host".to_string();
        assert!(matches!(
            cfg.get_socket_addr(),
            Err(ServerError::InvalidAddress { .. })
        ));
    }
}
