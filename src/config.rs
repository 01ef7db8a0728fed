//! Configuration management for the Pterodactyl exporter.
//!
//! Supports loading configuration from:
//! - TOML configuration files
//! - Environment variables (with `PTERODACTYL_EXPORTER_` prefix)
//! - Command-line arguments

use crate::error::{PanelError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Panel connection settings.
#[derive(Clone, Serialize, Deserialize)]
pub struct PanelConfig {
    /// Panel hostname (e.g., "panel.example.com")
    pub host: String,

    /// Panel port; defaults to 443 with HTTPS and 80 without
    #[serde(default)]
    pub port: Option<u16>,

    /// Talk to the panel over HTTPS
    #[serde(default = "default_https")]
    pub https: bool,

    /// Skip TLS certificate verification (self-signed panels)
    #[serde(default)]
    pub ignore_ssl: bool,

    /// Client API key, sent as a bearer token
    #[serde(default)]
    pub api_key: String,

    /// Server list filter passed as `type` (owner, admin, admin-all)
    #[serde(default = "default_server_list_type")]
    pub server_list_type: String,

    /// Request timeout in seconds (unset = transport default)
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl PanelConfig {
    /// Base URL of the panel, with the port made explicit.
    pub fn base_url(&self) -> String {
        let (scheme, default_port) = if self.https {
            ("https", 443)
        } else {
            ("http", 80)
        };
        format!(
            "{}://{}:{}",
            scheme,
            self.host,
            self.port.unwrap_or(default_port)
        )
    }
}

impl std::fmt::Debug for PanelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanelConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("https", &self.https)
            .field("ignore_ssl", &self.ignore_ssl)
            .field("api_key", &"***REDACTED***")
            .field("server_list_type", &self.server_list_type)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

/// Exporter specific settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExporterConfig {
    /// Address to listen on for metrics endpoint
    #[serde(default = "default_listen_address")]
    pub listen_address: String,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Log output format (text, json)
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

/// Main configuration structure for the exporter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Panel configuration
    pub panel: PanelConfig,

    /// Exporter server configuration
    #[serde(default)]
    pub exporter: ExporterConfig,
}

fn default_https() -> bool {
    true
}

fn default_server_list_type() -> String {
    "owner".to_string()
}

fn default_listen_address() -> String {
    "0.0.0.0:9531".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

impl Default for ExporterConfig {
    fn default() -> Self {
        Self {
            listen_address: default_listen_address(),
            log_level: default_log_level(),
            log_format: default_log_format(),
        }
    }
}

impl Settings {
    /// Load configuration from a file and environment variables.
    ///
    /// # Arguments
    ///
    /// * `config_path` - Optional path to configuration file
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use pterodactyl_exporter::config::Settings;
    ///
    /// let settings = Settings::load(Some("config/default.toml")).unwrap();
    /// ```
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = config_path {
            if Path::new(path).exists() {
                builder = builder.add_source(config::File::with_name(path));
            }
        }

        builder = builder.add_source(
            config::Environment::with_prefix("PTERODACTYL_EXPORTER")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        let settings: Settings = config.try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<()> {
        if self.panel.host.is_empty() {
            return Err(PanelError::Config(config::ConfigError::Message(
                "Panel host cannot be empty".to_string(),
            )));
        }

        if self.panel.api_key.is_empty() {
            return Err(PanelError::Config(config::ConfigError::Message(
                "Panel API key is required".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            panel: PanelConfig {
                host: "localhost".to_string(),
                port: None,
                https: default_https(),
                ignore_ssl: false,
                api_key: String::new(),
                server_list_type: default_server_list_type(),
                timeout_seconds: None,
            },
            exporter: ExporterConfig::default(),
        }
    }
}
