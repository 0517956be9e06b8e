//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (applied by the binary on top of both)

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{NetguardError, Result};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerSection,

    /// Signature registry configuration
    #[serde(default)]
    pub signatures: SignatureConfig,

    /// Traffic sample configuration
    #[serde(default)]
    pub traffic: TrafficConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| NetguardError::Config(format!("Failed to read config file: {e}")))?;

        toml::from_str(&content)
            .map_err(|e| NetguardError::Config(format!("Failed to parse config: {e}")))
    }

    /// Default config file location (`<config_dir>/netguard/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("netguard").join("config.toml"))
    }

    /// Load configuration: explicit file, else the default file if present,
    /// else defaults; environment variables are applied last
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(path)?,
                None => Self::default(),
            },
        };
        Ok(config.with_env_overrides())
    }

    /// Apply `NETGUARD_*` environment variables
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, var: impl Fn(&str) -> Option<String>) -> Self {
        // Server settings
        if let Some(host) = var("NETGUARD_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("NETGUARD_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            }
        }
        if let Some(val) = var("NETGUARD_RECORD_ALERTS") {
            if let Ok(val) = val.parse() {
                self.server.record_alerts = val;
            }
        }

        // Data sources
        if let Some(path) = var("NETGUARD_SIGNATURES") {
            self.signatures.path = Some(PathBuf::from(path));
        }
        if let Some(path) = var("NETGUARD_TRAFFIC_CSV") {
            self.traffic.csv_path = PathBuf::from(path);
        }

        self
    }
}

/// HTTP server section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSection {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Enable permissive CORS
    pub cors: bool,

    /// Enable request logging
    pub logging: bool,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Record threat verdicts from `/scan` as alerts
    pub record_alerts: bool,

    /// Start the alert log with the demo alerts
    pub seed_alerts: bool,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            cors: true,
            logging: true,
            max_body_size: 1024 * 1024, // 1 MB
            record_alerts: false,
            seed_alerts: true,
        }
    }
}

/// Signature registry section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureConfig {
    /// Extra signatures file (TOML)
    pub path: Option<PathBuf>,

    /// Keep the built-in signatures ahead of the file's
    pub include_builtin: bool,
}

impl Default for SignatureConfig {
    fn default() -> Self {
        Self {
            path: None,
            include_builtin: true,
        }
    }
}

/// Traffic sample section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// CSV file with traffic rows
    pub csv_path: PathBuf,
}

impl Default for TrafficConfig {
    fn default() -> Self {
        Self {
            csv_path: PathBuf::from("data/network_traffic.csv"),
        }
    }
}
