//! Scan service and verdict builder.
//!
//! [`ThreatScanner`] is the stateless boundary in front of the
//! [`MatchEngine`]: it takes a payload, runs the engine and wraps the matches
//! into a [`ScanResult`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::matcher::{MatchEngine, ThreatMatch};
use super::patterns::{Severity, SignatureRegistry};
use crate::error::Result;

/// Scan request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanRequest {
    /// Text to inspect
    pub payload: String,
}

impl ScanRequest {
    /// Create a request
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Result of a threat scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Whether any signature matched
    is_threat: bool,
    /// Matches in registry order
    threats: Vec<ThreatMatch>,
    /// When the scan completed
    scanned_at: DateTime<Utc>,
}

impl ScanResult {
    /// Build the verdict for a match list, stamped with the current time
    pub fn from_matches(matches: Vec<ThreatMatch>) -> Self {
        Self {
            is_threat: !matches.is_empty(),
            threats: matches,
            scanned_at: Utc::now(),
        }
    }

    /// Whether any signature matched
    pub fn is_threat(&self) -> bool {
        self.is_threat
    }

    /// Matches in registry order
    pub fn threats(&self) -> &[ThreatMatch] {
        &self.threats
    }

    /// When the scan completed
    pub fn scanned_at(&self) -> DateTime<Utc> {
        self.scanned_at
    }

    /// Highest severity among the matches
    pub fn max_severity(&self) -> Option<Severity> {
        self.threats.iter().map(|t| t.severity).max()
    }

    /// Distinct matched categories, in result order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for threat in &self.threats {
            if !seen.contains(&threat.category.as_str()) {
                seen.push(&threat.category);
            }
        }
        seen
    }
}

/// Threat scanner
#[derive(Debug, Clone)]
pub struct ThreatScanner {
    engine: Arc<MatchEngine>,
}

impl ThreatScanner {
    /// Scanner over the built-in signatures
    pub fn builtin() -> Result<Self> {
        Ok(Self::with_engine(Arc::new(MatchEngine::builtin()?)))
    }

    /// Scanner over a custom registry
    pub fn new(registry: SignatureRegistry) -> Result<Self> {
        Ok(Self::with_engine(Arc::new(MatchEngine::new(Arc::new(
            registry,
        ))?)))
    }

    /// Scanner sharing an already compiled engine
    pub fn with_engine(engine: Arc<MatchEngine>) -> Self {
        Self { engine }
    }

    /// Signature registry in use
    pub fn registry(&self) -> &SignatureRegistry {
        self.engine.registry()
    }

    /// Scan a payload
    pub fn scan(&self, payload: &str) -> ScanResult {
        let matches = self.engine.scan(payload);
        tracing::debug!(
            bytes = payload.len(),
            matches = matches.len(),
            "Scanned payload"
        );
        ScanResult::from_matches(matches)
    }

    /// Scan a request
    pub fn scan_request(&self, request: &ScanRequest) -> ScanResult {
        self.scan(&request.payload)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::patterns::{category, Signature};

    #[test]
    fn test_safe_content() {
        let scanner = ThreatScanner::builtin().unwrap();
        let result = scanner.scan("User logged in successfully");

        assert!(!result.is_threat());
        assert!(result.threats().is_empty());
        assert_eq!(result.max_severity(), None);
    }

    #[test]
    fn test_empty_payload() {
        let scanner = ThreatScanner::builtin().unwrap();
        let result = scanner.scan_request(&ScanRequest::new(""));

        assert!(!result.is_threat());
        assert!(result.threats().is_empty());
    }

    #[test]
    fn test_verdict_matches_threats() {
        let scanner = ThreatScanner::builtin().unwrap();
        for payload in ["", "hello", "rm -rf /", "<?php system($_GET['c']); ?>"] {
            let result = scanner.scan(payload);
            assert_eq!(result.is_threat(), !result.threats().is_empty());
        }
    }

    #[test]
    fn test_max_severity_and_categories() {
        let scanner = ThreatScanner::builtin().unwrap();
        let result = scanner.scan("cat /etc/shadow; alert(1)");

        assert!(result.is_threat());
        assert_eq!(result.max_severity(), Some(Severity::Critical));
        assert_eq!(
            result.categories(),
            vec![category::XSS, category::PATH_TRAVERSAL]
        );
    }

    #[test]
    fn test_custom_registry() {
        let registry =
            SignatureRegistry::new(vec![Signature::new("sqlmap", "Scanner", Severity::Medium)])
                .unwrap();
        let scanner = ThreatScanner::new(registry).unwrap();

        assert!(scanner.scan("User-Agent: SQLMAP/1.7").is_threat());
        assert!(!scanner.scan("DROP TABLE users").is_threat());
    }

    #[test]
    fn test_scanned_at_is_recent() {
        let before = Utc::now();
        let result = ThreatScanner::builtin().unwrap().scan("x");
        let after = Utc::now();

        assert!(result.scanned_at() >= before && result.scanned_at() <= after);
    }

    #[test]
    fn test_wire_format() {
        let scanner = ThreatScanner::builtin().unwrap();
        let result = scanner.scan("1 OR 1=1");
        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json["isThreat"], true);
        assert_eq!(json["threats"][0]["type"], "SQL Injection");
        assert_eq!(json["threats"][0]["severity"], "high");
        assert_eq!(json["threats"][0]["pattern"], "OR 1=1");
        assert_eq!(json["threats"][0]["position"], 2);
        assert!(json["scannedAt"].is_string());
    }
}
