//! # Netguard - Signature-Based Threat Detection
//!
//! A small network-security surface built around a multi-pattern signature
//! engine:
//!
//! - **Threat scanning**: match a text payload against a catalog of known
//!   attack signatures (SQL injection, XSS, path traversal, command
//!   injection, XXE, SSRF, ...)
//! - **Alert log**: append-only list of alerts with create/list/resolve
//! - **Traffic sample**: fixed traffic rows with pagination and statistics
//! - **HTTP API**: axum server exposing all of the above
//!
//! ## Detection Pipeline
//!
//! ```text
//!  caller ──payload──> ThreatScanner ──> MatchEngine ──> ScanResult::from_matches
//!                                          │                    │
//!                          SignatureRegistry (immutable)   isThreat / threats / scannedAt
//! ```
//!
//! The registry is built once at startup and compiled into a single
//! Aho-Corasick automaton. A scan lower-cases the payload, makes one pass
//! over it and reports each matching signature once, at its first
//! occurrence, in registry order.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use netguard::ThreatScanner;
//!
//! let scanner = ThreatScanner::builtin()?;
//! let result = scanner.scan("id=1' OR 1=1 --<script>alert(1)</script>");
//!
//! assert!(result.is_threat());
//! for threat in result.threats() {
//!     println!("{:<18} {:<8} {:?} @ {}",
//!         threat.category, threat.severity, threat.pattern, threat.position);
//! }
//! ```
//!
//! ## Wire Format
//!
//! ```text
//! POST /scan  {"payload": "..."}
//!
//! {"isThreat": true,
//!  "threats": [{"type": "SQL Injection", "severity": "high",
//!               "pattern": "OR 1=1", "position": 6}],
//!  "scannedAt": "2024-01-15T08:30:00.123Z"}
//! ```
//!
//! ## Modules
//!
//! - [`security`]: Signature registry, matching engine, scan service
//! - [`alerts`]: Alert log
//! - [`traffic`]: Traffic sample, pagination and stats
//! - [`server`]: HTTP API server (Axum-based)
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod alerts;
pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod traffic;

// Re-exports for convenience
pub use alerts::{Alert, AlertDetails, AlertStatus, AlertStore};
pub use config::Config;
pub use error::{NetguardError, Result};
pub use security::{
    MatchEngine, ScanRequest, ScanResult, Severity, Signature, SignatureRegistry, ThreatMatch,
    ThreatScanner,
};
pub use server::{AppState, ServerConfig};
pub use traffic::{TrafficPage, TrafficRecord, TrafficSample, TrafficStats};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
