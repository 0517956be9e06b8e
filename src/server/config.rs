//! Server configuration.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use crate::config::Config;

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub addr: SocketAddr,
    /// Maximum request body size (bytes)
    pub max_body_size: usize,
    /// Enable request logging
    pub logging: bool,
    /// CORS enabled
    pub cors_enabled: bool,
    /// Record threat verdicts as alerts
    pub record_alerts: bool,
    /// Start with the demo alerts
    pub seed_alerts: bool,
    /// Extra signatures file (optional)
    pub signatures_path: Option<PathBuf>,
    /// Keep built-in signatures when a file is given
    pub include_builtin_signatures: bool,
    /// Traffic CSV path
    pub traffic_csv: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, 5000)),
            max_body_size: 1024 * 1024, // 1MB
            logging: true,
            cors_enabled: true,
            record_alerts: false,
            seed_alerts: true,
            signatures_path: None,
            include_builtin_signatures: true,
            traffic_csv: PathBuf::from("data/network_traffic.csv"),
        }
    }
}

impl From<&Config> for ServerConfig {
    fn from(config: &Config) -> Self {
        let server = &config.server;
        let ip = server.host.parse::<IpAddr>().unwrap_or_else(|_| {
            tracing::warn!("Invalid host {:?}, binding to 127.0.0.1", server.host);
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        });

        Self {
            addr: SocketAddr::new(ip, server.port),
            max_body_size: server.max_body_size,
            logging: server.logging,
            cors_enabled: server.cors,
            record_alerts: server.record_alerts,
            seed_alerts: server.seed_alerts,
            signatures_path: config.signatures.path.clone(),
            include_builtin_signatures: config.signatures.include_builtin,
            traffic_csv: config.traffic.csv_path.clone(),
        }
    }
}

impl ServerConfig {
    /// Create with custom port
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    /// Bind to all interfaces
    pub fn bind_all(mut self) -> Self {
        self.addr.set_ip(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
        self
    }

    /// Set address directly
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    /// Set max body size
    pub fn with_max_body_size(mut self, size: usize) -> Self {
        self.max_body_size = size;
        self
    }

    /// Record threat verdicts as alerts
    pub fn with_alert_recording(mut self) -> Self {
        self.record_alerts = true;
        self
    }

    /// Start with an empty alert log
    pub fn without_seed_alerts(mut self) -> Self {
        self.seed_alerts = false;
        self
    }

    /// Load extra signatures from a file
    pub fn with_signatures(mut self, path: impl Into<PathBuf>) -> Self {
        self.signatures_path = Some(path.into());
        self
    }

    /// Read traffic rows from a CSV file
    pub fn with_traffic_csv(mut self, path: impl Into<PathBuf>) -> Self {
        self.traffic_csv = path.into();
        self
    }

    /// Disable logging
    pub fn without_logging(mut self) -> Self {
        self.logging = false;
        self
    }

    /// Disable CORS
    pub fn without_cors(mut self) -> Self {
        self.cors_enabled = false;
        self
    }
}
