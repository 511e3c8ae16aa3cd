// Configuration types module
// Defines all configuration-related data structures

use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub performance: PerformanceConfig,
    pub http: HttpConfig,
    pub storage: StorageConfig,
    pub security: SecurityConfig,
}

/// Server configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub workers: Option<usize>,
}

/// Logging configuration
#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub access_log: bool,
    /// Access log format (combined or json)
    #[serde(default = "default_access_log_format")]
    pub access_log_format: String,
    /// Access log file path (stdout if not set)
    #[serde(default)]
    pub access_log_file: Option<String>,
    /// Error log file path (stderr if not set)
    #[serde(default)]
    pub error_log_file: Option<String>,
}

fn default_access_log_format() -> String {
    "combined".to_string()
}

/// Performance configuration
#[derive(Debug, Deserialize, Clone)]
pub struct PerformanceConfig {
    pub keep_alive_timeout: u64,
    pub read_timeout: u64,
    pub write_timeout: u64,
    #[serde(default)]
    pub max_connections: Option<u64>,
}

/// HTTP configuration
#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub server_name: String,
    pub max_body_size: u64,
}

/// Storage configuration
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// SQLite database file, created if missing
    pub database_path: String,
    /// Root directory for the `/files` endpoint
    pub upload_dir: String,
}

/// Security posture configuration
///
/// These switches exist so the deployed posture is stated explicitly rather
/// than baked in. The defaults reproduce the original teaching server:
/// parameterized lookup, weak prefix-based path containment.
#[derive(Debug, Deserialize, Clone)]
pub struct SecurityConfig {
    /// Server-side key for CSRF token HMACs
    pub csrf_key: String,
    /// `true`: `/user` binds the name as a parameter.
    /// `false`: the vulnerable variant, the name is concatenated into SQL.
    pub parameterized_lookup: bool,
    /// `true`: `/files` containment via canonicalized ancestor check.
    /// `false`: the vulnerable variant, raw string prefix comparison.
    pub strict_path_check: bool,
}
