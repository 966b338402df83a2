//! Layered application configuration.
//!
//! Precedence, lowest first:
//! - Bundled defaults (`include_str!` of `ragumami.toml`)
//! - `~/.config/ragumami/ragumami.toml`
//! - `./ragumami.toml`, or the file passed with `--config`
//! - Environment variables (`API_PORT`, `OLLAMA_MODEL`, ...)

use config::{Config, File, FileFormat};
use derive_getters::Getters;
use ragumami_error::ConfigError;
use ragumami_models::OllamaConfig;
use ragumami_schema::BigQueryConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../ragumami.toml");

/// Environment variables and the keys they override.
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("API_HOST", "server.host"),
    ("API_PORT", "server.port"),
    ("OLLAMA_BASE_URL", "ollama.base_url"),
    ("OLLAMA_MODEL", "ollama.model"),
    ("OLLAMA_CONNECT_TIMEOUT_MS", "ollama.connect_timeout_ms"),
    ("OLLAMA_REQUEST_TIMEOUT_MS", "ollama.request_timeout_ms"),
    ("BIGQUERY_PROJECT_ID", "bigquery.project_id"),
    ("BIGQUERY_DATASET", "bigquery.dataset"),
    ("BIGQUERY_LOCATION", "bigquery.location"),
    ("BIGQUERY_ACCESS_TOKEN", "bigquery.access_token"),
    ("BIGQUERY_QUERY_DEADLINE_MS", "bigquery.query_deadline_ms"),
];

/// Listener and CORS settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct ServerSettings {
    /// Interface to bind
    host: String,
    /// Port to bind
    port: u16,
    /// Origins allowed by CORS
    #[serde(default)]
    cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8004,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(),
            ],
        }
    }
}

impl ServerSettings {
    /// Override the listener address.
    pub fn with_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        if let Some(host) = host {
            self.host = host;
        }
        if let Some(port) = port {
            self.port = port;
        }
        self
    }

    /// `host:port` to bind.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct LoggingSettings {
    /// Filter used when `RUST_LOG` is unset
    level: String,
    /// Emit JSON lines instead of text
    #[serde(default)]
    json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Schema context settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct SchemaSettings {
    /// Replaces the built-in fallback schema text
    #[serde(default)]
    fallback_template: Option<String>,
}

impl SchemaSettings {
    /// Settings with an optional replacement fallback template.
    pub fn new(fallback_template: Option<String>) -> Self {
        Self { fallback_template }
    }
}

/// Complete server configuration.
#[derive(
    Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters, derive_builder::Builder,
)]
pub struct AppConfig {
    /// Listener and CORS
    #[builder(default)]
    #[serde(default)]
    server: ServerSettings,
    /// Log output
    #[builder(default)]
    #[serde(default)]
    logging: LoggingSettings,
    /// Generation backend
    ollama: OllamaConfig,
    /// Warehouse; unconfigured means static schema only
    #[builder(default)]
    #[serde(default)]
    bigquery: BigQueryConfig,
    /// Schema context
    #[builder(default)]
    #[serde(default)]
    schema: SchemaSettings,
}

impl AppConfig {
    /// Creates a new config builder.
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Load from files and the process environment.
    ///
    /// With `path`, that file must exist and replaces `./ragumami.toml`.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_env(path, |key| std::env::var(key).ok())
    }

    /// Load from files, reading environment overrides through `env`.
    ///
    /// Blank environment values are ignored.
    #[instrument(skip(env))]
    pub fn load_with_env(
        path: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        debug!("Loading configuration with precedence: env > local file > home file > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/ragumami/ragumami.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = match path {
            Some(path) => builder.add_source(File::from(path).required(true)),
            None => builder.add_source(File::with_name("ragumami").required(false)),
        };

        for &(var, key) in ENV_OVERRIDES {
            let value = env(var).filter(|v| !v.trim().is_empty());
            if value.is_some() {
                debug!(var, key, "Applying environment override");
            }
            builder = builder
                .set_override_option(key, value)
                .map_err(|e| ConfigError::new(format!("Invalid override {}: {}", var, e)))?;
        }

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;

        config.ollama.validate()?;
        Ok(config)
    }

    /// Replace the listener address (CLI flags).
    pub fn with_address(mut self, host: Option<String>, port: Option<u16>) -> Self {
        self.server = self.server.with_address(host, port);
        self
    }

    /// Whether a live warehouse source should be built.
    pub fn warehouse_configured(&self) -> bool {
        self.bigquery.is_configured()
    }
}
