// Configuration module entry point
// Loads config.toml, environment overrides, and coded defaults

pub mod types;

use std::net::SocketAddr;

pub use types::Config;

/// Default CSRF key; fine for local teaching use, flagged at startup
pub const DEV_CSRF_KEY: &str = "vulnlab-dev-csrf-key";

impl Config {
    /// Load configuration from "config.toml" plus `SERVER_*` env overrides
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from specified file path (without extension)
    pub fn load_from(config_path: &str) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(config_path).required(false))
            .add_source(config::Environment::with_prefix("SERVER"))
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("logging.level", "info")?
            .set_default("logging.access_log", true)?
            .set_default("performance.keep_alive_timeout", 75)?
            .set_default("performance.read_timeout", 30)?
            .set_default("performance.write_timeout", 30)?
            .set_default("http.server_name", "vulnlab/0.1")?
            .set_default("http.max_body_size", 1_048_576)? // 1MB
            .set_default("storage.database_path", "database.sqlite")?
            .set_default("storage.upload_dir", "uploads")?
            .set_default("security.csrf_key", DEV_CSRF_KEY)?
            .set_default("security.parameterized_lookup", true)?
            .set_default("security.strict_path_check", false)?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}
