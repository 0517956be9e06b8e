//! Signature-based threat detection.
//!
//! Scans a text payload against a registry of known attack signatures and
//! reports which signatures occur, at what severity, and where.
//!
//! # Threat Categories
//!
//! | Category            | Examples                                  | Severity       |
//! |---------------------|-------------------------------------------|----------------|
//! | `SQL Injection`     | `DROP TABLE`, `UNION SELECT`, `OR 1=1`    | Medium–Critical|
//! | `XSS Attack`        | `<script>`, `onerror=`, `javascript:`     | Low–High       |
//! | `Path Traversal`    | `../etc/passwd`, `%2e%2e%2f`              | Medium–Critical|
//! | `Command Injection` | `; ls`, `&& whoami`, `rm -rf`             | Medium–Critical|
//! | `Code Injection`    | `<?php`, `${`, `{{`                       | Medium–High    |
//! | `LDAP Injection`    | `*)(`, `))(`                              | High           |
//! | `XXE Attack`        | `<!DOCTYPE`, `<!ENTITY`                   | High–Critical  |
//! | `SSRF Attack`       | `169.254.169.254`, `file:///`             | Medium–High    |
//! | `JWT Tampering`     | `alg: none` header                        | Medium         |
//! | `NoSQL Injection`   | `"$where":`, `"$ne":`                     | Medium–High    |
//!
//! # Matching Rules
//!
//! - Matching is case-insensitive: payload and patterns are lower-cased.
//! - Each signature reports at most once, at its first occurrence.
//! - Results follow registry order, not the order of occurrence.
//! - `position` counts chars in the lower-cased payload.
//!
//! # Usage
//!
//! ```rust,ignore
//! use netguard::security::ThreatScanner;
//!
//! let scanner = ThreatScanner::builtin()?;
//!
//! let result = scanner.scan("User logged in successfully");
//! assert!(!result.is_threat());
//!
//! let result = scanner.scan("' OR 1=1 --<script>alert(1)</script>");
//! assert!(result.is_threat());
//! for threat in result.threats() {
//!     println!("{} ({}) at {}", threat.pattern, threat.category, threat.position);
//! }
//! ```

mod matcher;
mod patterns;
mod scanner;

pub use matcher::{linear_scan, MatchEngine, ThreatMatch};
pub use patterns::{
    category, Severity, Signature, SignatureRegistry, ThreatPattern, BUILTIN_PATTERNS,
    BUILTIN_REGISTRY,
};
pub use scanner::{ScanRequest, ScanResult, ThreatScanner};
