//! Alert log.
//!
//! An append-only list of security alerts, newest first. Alerts are never
//! deleted; the only mutation is resolving one by id.
//!
//! The store is an explicit value handed to whoever needs it (the HTTP state
//! holds one), not a process-wide global, so tests get isolated stores and
//! concurrent handlers share one through its lock.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{NetguardError, Result};
use crate::security::ScanResult;

/// Alert lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStatus {
    /// Newly raised
    Active,
    /// Being looked at
    Investigating,
    /// Closed
    Resolved,
}

/// Caller-supplied alert fields
///
/// Unknown fields are kept and echoed back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AlertDetails {
    /// Alert type (e.g. `DDoS`, `SQL Injection`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub alert_type: Option<String>,
    /// Severity label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub severity: Option<String>,
    /// Source address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_ip: Option<String>,
    /// Destination address
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub destination_ip: Option<String>,
    /// Free-form description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Any other fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fields the store always assigns itself
const RESERVED_FIELDS: [&str; 3] = ["id", "timestamp", "status"];

impl AlertDetails {
    /// Alert details for a threat verdict
    ///
    /// Typed by the first matched category, rated at the highest matched
    /// severity.
    pub fn from_scan(result: &ScanResult) -> Self {
        let patterns: Vec<&str> = result.threats().iter().map(|t| t.pattern.as_str()).collect();
        Self {
            alert_type: result.categories().first().map(|c| (*c).to_string()),
            severity: result.max_severity().map(|s| s.to_string()),
            description: Some(format!(
                "Payload matched {} signature(s): {}",
                patterns.len(),
                patterns.join(", ")
            )),
            ..Self::default()
        }
    }
}

/// A recorded alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Alert ID
    pub id: Uuid,
    /// Caller-supplied fields
    #[serde(flatten)]
    pub details: AlertDetails,
    /// When the alert was recorded
    pub timestamp: DateTime<Utc>,
    /// Current status
    pub status: AlertStatus,
}

impl Alert {
    fn new(mut details: AlertDetails, timestamp: DateTime<Utc>, status: AlertStatus) -> Self {
        for key in RESERVED_FIELDS {
            details.extra.remove(key);
        }
        Self {
            id: Uuid::new_v4(),
            details,
            timestamp,
            status,
        }
    }
}

/// Shared alert log
#[derive(Debug, Clone, Default)]
pub struct AlertStore {
    /// Alerts, newest first
    alerts: Arc<RwLock<Vec<Alert>>>,
}

impl AlertStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the demo alerts
    pub fn seeded() -> Self {
        let now = Utc::now();
        let alerts = vec![
            Alert::new(
                AlertDetails {
                    alert_type: Some("DDoS".to_string()),
                    severity: Some("high".to_string()),
                    source_ip: Some("192.168.1.100".to_string()),
                    destination_ip: Some("10.0.0.50".to_string()),
                    description: Some("Multiple SYN flood attempts detected".to_string()),
                    extra: Map::new(),
                },
                now,
                AlertStatus::Active,
            ),
            Alert::new(
                AlertDetails {
                    alert_type: Some("Port Scan".to_string()),
                    severity: Some("medium".to_string()),
                    source_ip: Some("192.168.1.150".to_string()),
                    destination_ip: Some("10.0.0.25".to_string()),
                    description: Some("Rapid port scanning activity detected".to_string()),
                    extra: Map::new(),
                },
                now - Duration::minutes(5),
                AlertStatus::Investigating,
            ),
        ];

        Self {
            alerts: Arc::new(RwLock::new(alerts)),
        }
    }

    /// All alerts, newest first
    pub async fn list(&self) -> Vec<Alert> {
        self.alerts.read().await.clone()
    }

    /// Record a new active alert
    pub async fn create(&self, details: AlertDetails) -> Alert {
        let alert = Alert::new(details, Utc::now(), AlertStatus::Active);
        self.alerts.write().await.insert(0, alert.clone());

        tracing::info!(
            id = %alert.id,
            alert_type = alert.details.alert_type.as_deref().unwrap_or("unknown"),
            "Alert recorded"
        );
        alert
    }

    /// Mark an alert resolved
    pub async fn resolve(&self, id: &str) -> Result<Alert> {
        let mut alerts = self.alerts.write().await;

        let alert = alerts
            .iter_mut()
            .find(|a| a.id.to_string() == id)
            .ok_or_else(|| NetguardError::AlertNotFound(id.to_string()))?;

        alert.status = AlertStatus::Resolved;
        tracing::info!(id = %alert.id, "Alert resolved");
        Ok(alert.clone())
    }

    /// Get alert by ID
    pub async fn get(&self, id: &str) -> Option<Alert> {
        self.alerts
            .read()
            .await
            .iter()
            .find(|a| a.id.to_string() == id)
            .cloned()
    }

    /// Number of alerts
    pub async fn count(&self) -> usize {
        self.alerts.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::ThreatScanner;

    fn details(alert_type: &str) -> AlertDetails {
        AlertDetails {
            alert_type: Some(alert_type.to_string()),
            ..AlertDetails::default()
        }
    }

    #[tokio::test]
    async fn test_seeded_store() {
        let store = AlertStore::seeded();
        let alerts = store.list().await;

        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].details.alert_type.as_deref(), Some("DDoS"));
        assert_eq!(alerts[0].status, AlertStatus::Active);
        assert_eq!(alerts[1].status, AlertStatus::Investigating);
        assert!(alerts[1].timestamp < alerts[0].timestamp);
    }

    #[tokio::test]
    async fn test_create_prepends() {
        let store = AlertStore::new();
        store.create(details("first")).await;
        let second = store.create(details("second")).await;

        let alerts = store.list().await;
        assert_eq!(alerts.len(), 2);
        assert_eq!(alerts[0].id, second.id);
        assert_eq!(alerts[0].status, AlertStatus::Active);
    }

    #[tokio::test]
    async fn test_resolve() {
        let store = AlertStore::new();
        let alert = store.create(details("XSS Attack")).await;

        let resolved = store.resolve(&alert.id.to_string()).await.unwrap();
        assert_eq!(resolved.status, AlertStatus::Resolved);

        let stored = store.get(&alert.id.to_string()).await.unwrap();
        assert_eq!(stored.status, AlertStatus::Resolved);
    }

    #[tokio::test]
    async fn test_resolve_unknown() {
        let store = AlertStore::seeded();
        let result = store.resolve("does-not-exist").await;

        assert!(matches!(result, Err(NetguardError::AlertNotFound(_))));
        assert_eq!(store.count().await, 2);
    }

    #[tokio::test]
    async fn test_reserved_fields_overridden() {
        let store = AlertStore::new();
        let details: AlertDetails = serde_json::from_value(serde_json::json!({
            "type": "Custom",
            "id": "client-chosen",
            "status": "resolved",
            "timestamp": "1999-01-01T00:00:00Z",
            "rule": 42
        }))
        .unwrap();

        let alert = store.create(details).await;
        let json = serde_json::to_value(&alert).unwrap();

        assert_eq!(json["status"], "active");
        assert_ne!(json["id"], "client-chosen");
        assert_ne!(json["timestamp"], "1999-01-01T00:00:00Z");
        assert_eq!(json["rule"], 42);
        assert_eq!(json["type"], "Custom");
    }

    #[tokio::test]
    async fn test_details_from_scan() {
        let scanner = ThreatScanner::builtin().unwrap();
        let result = scanner.scan("rm -rf / ; alert(1)");
        let details = AlertDetails::from_scan(&result);

        assert_eq!(details.alert_type.as_deref(), Some("XSS Attack"));
        assert_eq!(details.severity.as_deref(), Some("critical"));
        assert!(details.description.unwrap().contains("rm -rf"));
    }

    #[tokio::test]
    async fn test_shared_between_clones() {
        let store = AlertStore::new();
        let handle = store.clone();
        handle.create(details("DDoS")).await;

        assert_eq!(store.count().await, 1);
    }
}
