//! Server state.

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::config::ServerConfig;
use crate::alerts::AlertStore;
use crate::error::Result;
use crate::security::{MatchEngine, SignatureRegistry, ThreatScanner};
use crate::traffic::TrafficSample;

/// Application state shared across handlers
pub struct AppState {
    /// Server configuration
    pub config: ServerConfig,
    /// Threat scanner (immutable after startup)
    pub scanner: ThreatScanner,
    /// Alert log
    pub alerts: AlertStore,
    /// Traffic sample (immutable after startup)
    pub traffic: TrafficSample,
    /// Server start time
    pub start_time: Instant,
}

impl AppState {
    /// Create application state, loading signatures and traffic rows
    pub fn new(config: ServerConfig) -> Result<Self> {
        let registry = SignatureRegistry::load(
            config.signatures_path.as_deref(),
            config.include_builtin_signatures,
        )?;
        let engine = MatchEngine::new(Arc::new(registry))?;
        let scanner = ThreatScanner::with_engine(Arc::new(engine));
        let traffic = TrafficSample::load_or_builtin(&config.traffic_csv);
        let alerts = if config.seed_alerts {
            AlertStore::seeded()
        } else {
            AlertStore::new()
        };

        Ok(Self::from_parts(config, scanner, alerts, traffic))
    }

    /// Assemble state from already built components
    pub fn from_parts(
        config: ServerConfig,
        scanner: ThreatScanner,
        alerts: AlertStore,
        traffic: TrafficSample,
    ) -> Self {
        tracing::info!(
            signatures = scanner.registry().len(),
            traffic_records = traffic.len(),
            "Server state ready"
        );

        Self {
            config,
            scanner,
            alerts,
            traffic,
            start_time: Instant::now(),
        }
    }

    /// Get server uptime
    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::security::BUILTIN_PATTERNS;

    fn signature_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[[signature]]\npattern = \"sqlmap\"\ncategory = \"Scanner\"\nseverity = \"medium\""
        )
        .unwrap();
        file
    }

    #[tokio::test]
    async fn test_default_state() {
        let config = ServerConfig::default().with_traffic_csv("/nonexistent.csv");
        let state = AppState::new(config).unwrap();

        assert_eq!(state.scanner.registry().len(), BUILTIN_PATTERNS.len());
        assert_eq!(state.alerts.count().await, 2);
        assert_eq!(state.traffic.len(), 10);
    }

    #[tokio::test]
    async fn test_unseeded_state() {
        let config = ServerConfig::default()
            .with_traffic_csv("/nonexistent.csv")
            .without_seed_alerts();
        let state = AppState::new(config).unwrap();

        assert_eq!(state.alerts.count().await, 0);
    }

    #[test]
    fn test_signature_file_extends_builtin() {
        let file = signature_file();
        let config = ServerConfig::default()
            .with_traffic_csv("/nonexistent.csv")
            .with_signatures(file.path());
        let state = AppState::new(config).unwrap();

        assert_eq!(state.scanner.registry().len(), BUILTIN_PATTERNS.len() + 1);
        assert!(state.scanner.scan("sqlmap/1.7").is_threat());
        assert!(state.scanner.scan("DROP TABLE").is_threat());
    }

    #[test]
    fn test_signature_file_only() {
        let file = signature_file();
        let mut config = ServerConfig::default()
            .with_traffic_csv("/nonexistent.csv")
            .with_signatures(file.path());
        config.include_builtin_signatures = false;
        let state = AppState::new(config).unwrap();

        assert_eq!(state.scanner.registry().len(), 1);
        assert!(!state.scanner.scan("DROP TABLE").is_threat());
    }

    #[test]
    fn test_missing_signature_file_fails() {
        let config = ServerConfig::default().with_signatures("/nonexistent/sigs.toml");
        assert!(AppState::new(config).is_err());
    }
}
