//! Configuration loading: TOML file with environment variable overrides.
//!
//! Looks for `dashconf.toml` in the working directory, or at the path named
//! by `DASHCONF_CONFIG`. Every field has a sensible default so the file is
//! optional. Environment variables take precedence over file values.

use std::path::PathBuf;

use serde::Deserialize;

use dashconf_domain::forms::application::DEFAULT_MODULE_PATH;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Where the INI configuration files live.
    pub storage: StorageConfig,
    /// Module discovery settings.
    pub modules: ModulesConfig,
    /// Identity settings.
    pub auth: AuthConfig,
    /// First-run wizard toggle.
    pub setup: SetupConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to (e.g. `0.0.0.0`).
    pub host: String,
    /// TCP port.
    pub port: u16,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding `config.ini`, `authentication.ini`, `resources.ini`…
    pub config_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModulesConfig {
    /// Colon-separated list of directories searched for modules.
    pub path: String,
    /// Directory holding one entry per enabled module.
    pub enabled_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Request header carrying the authenticated user name.
    pub remote_user_header: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SetupConfig {
    /// Mount the `/setup` pages.
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from `dashconf.toml` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load() -> Result<Self, ConfigError> {
        let path = std::env::var("DASHCONF_CONFIG").unwrap_or_else(|_| "dashconf.toml".to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("DASHCONF_HOST") {
            self.server.host = val;
        }
        if let Some(val) = var("DASHCONF_PORT")
            && let Ok(port) = val.parse()
        {
            self.server.port = port;
        }
        if let Some(val) = var("DASHCONF_BIND")
            && let Some((host, port)) = val.rsplit_once(':')
        {
            self.server.host = host.to_string();
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("DASHCONF_CONFIG_DIR") {
            self.storage.config_dir = PathBuf::from(val);
        }
        if let Some(val) = var("DASHCONF_MODULE_PATH") {
            self.modules.path = val;
        }
        if let Some(val) = var("DASHCONF_ENABLED_MODULES_DIR") {
            self.modules.enabled_dir = PathBuf::from(val);
        }
        if let Some(val) = var("DASHCONF_REMOTE_USER_HEADER") {
            self.auth.remote_user_header = val;
        }
        if let Some(enabled) = var("DASHCONF_SETUP").as_deref().and_then(parse_flag) {
            self.setup.enabled = enabled;
        }
        if let Some(val) = var("DASHCONF_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Validation("port must be non-zero".to_string()));
        }
        if self.storage.config_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "storage.config_dir must not be empty".to_string(),
            ));
        }
        if self.auth.remote_user_header.trim().is_empty() {
            return Err(ConfigError::Validation(
                "auth.remote_user_header must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Return the `host:port` bind address.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            config_dir: PathBuf::from("/etc/dashconf"),
        }
    }
}

impl Default for ModulesConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MODULE_PATH.to_string(),
            enabled_dir: PathBuf::from("/etc/dashconf/enabledModules"),
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            remote_user_header: "X-Remote-User".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "dashconfd=info,dashconf_app=info,dashconf_adapter_http_axum=info,tower_http=debug"
                .to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}
