//! Threat signatures and the signature registry.
//!
//! Every signature is a literal pattern (matched case-insensitively) bound to
//! a threat category and a severity. The built-in table covers:
//! - SQL injection
//! - Cross-site scripting
//! - Path traversal
//! - Command and code injection
//! - LDAP, XXE, SSRF, JWT and NoSQL attacks
//!
//! Registry order is significant: scan results list matches in the order
//! their signatures were registered.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use crate::error::{NetguardError, Result};

/// Threat severity, ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Suspicious but usually harmless on its own
    Low,
    /// Worth investigating
    Medium,
    /// Likely attack
    High,
    /// Attack with immediate impact (shell, credential files)
    Critical,
}

impl Severity {
    /// Wire name
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Severity {
    type Err = NetguardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(NetguardError::InvalidInput(format!(
                "Unknown severity: {other}"
            ))),
        }
    }
}

/// Built-in threat category names
pub mod category {
    /// SQL injection
    pub const SQL_INJECTION: &str = "SQL Injection";
    /// Cross-site scripting
    pub const XSS: &str = "XSS Attack";
    /// Directory traversal / sensitive file access
    pub const PATH_TRAVERSAL: &str = "Path Traversal";
    /// OS command injection
    pub const COMMAND_INJECTION: &str = "Command Injection";
    /// Server-side code / template injection
    pub const CODE_INJECTION: &str = "Code Injection";
    /// LDAP filter injection
    pub const LDAP_INJECTION: &str = "LDAP Injection";
    /// XML external entity
    pub const XXE: &str = "XXE Attack";
    /// Server-side request forgery
    pub const SSRF: &str = "SSRF Attack";
    /// Unsigned JWT
    pub const JWT_TAMPERING: &str = "JWT Tampering";
    /// MongoDB operator injection
    pub const NOSQL_INJECTION: &str = "NoSQL Injection";
}

/// A static entry in the built-in signature table
#[derive(Debug, Clone, Copy)]
pub struct ThreatPattern {
    /// Literal pattern
    pub pattern: &'static str,
    /// Threat category
    pub category: &'static str,
    /// Severity
    pub severity: Severity,
}

const fn sig(pattern: &'static str, category: &'static str, severity: Severity) -> ThreatPattern {
    ThreatPattern {
        pattern,
        category,
        severity,
    }
}

use category::{
    CODE_INJECTION, COMMAND_INJECTION, JWT_TAMPERING, LDAP_INJECTION, NOSQL_INJECTION,
    PATH_TRAVERSAL, SQL_INJECTION, SSRF, XSS, XXE,
};
use Severity::{Critical, High, Low, Medium};

/// Built-in signatures, in registry order
pub static BUILTIN_PATTERNS: &[ThreatPattern] = &[
    // SQL injection
    sig("DROP TABLE", SQL_INJECTION, High),
    sig("UNION SELECT", SQL_INJECTION, High),
    sig("OR 1=1", SQL_INJECTION, High),
    sig("; --", SQL_INJECTION, High),
    sig("EXEC xp_cmdshell", SQL_INJECTION, Critical),
    sig("SLEEP(", SQL_INJECTION, Medium),
    sig("BENCHMARK", SQL_INJECTION, Medium),
    sig("UPDATE users SET", SQL_INJECTION, High),
    sig("INSERT INTO", SQL_INJECTION, High),
    sig("SELECT * FROM", SQL_INJECTION, Medium),
    // XSS
    sig("<script>", XSS, High),
    sig("onerror=", XSS, High),
    sig("onload=", XSS, High),
    sig("onmouseover=", XSS, Medium),
    sig("javascript:", XSS, High),
    sig("<iframe", XSS, Medium),
    sig("<svg", XSS, Medium),
    sig("<body onload", XSS, High),
    sig("alert(", XSS, Low),
    sig("eval(", XSS, High),
    // Path traversal
    sig("../etc/passwd", PATH_TRAVERSAL, High),
    sig("..\\windows", PATH_TRAVERSAL, High),
    sig("/etc/passwd", PATH_TRAVERSAL, High),
    sig("/etc/shadow", PATH_TRAVERSAL, Critical),
    sig("C:\\Windows", PATH_TRAVERSAL, Medium),
    sig("/proc/self", PATH_TRAVERSAL, Medium),
    sig("%2e%2e%2f", PATH_TRAVERSAL, High),
    // Command injection
    sig("; ls", COMMAND_INJECTION, High),
    sig("| cat", COMMAND_INJECTION, High),
    sig("&& whoami", COMMAND_INJECTION, High),
    sig("`id`", COMMAND_INJECTION, High),
    sig("$(", COMMAND_INJECTION, High),
    sig("net user", COMMAND_INJECTION, High),
    sig("wget http", COMMAND_INJECTION, Medium),
    sig("curl http", COMMAND_INJECTION, Medium),
    sig("nc -lvp", COMMAND_INJECTION, Critical),
    sig("rm -rf", COMMAND_INJECTION, Critical),
    sig("system(", COMMAND_INJECTION, High),
    // Code injection
    sig("<?php", CODE_INJECTION, High),
    sig("<?=", CODE_INJECTION, High),
    sig("<%", CODE_INJECTION, High),
    sig("${", CODE_INJECTION, Medium),
    sig("#{", CODE_INJECTION, Medium),
    sig("{{", CODE_INJECTION, Medium),
    // LDAP injection
    sig("*)(", LDAP_INJECTION, High),
    sig("))(", LDAP_INJECTION, High),
    // XXE
    sig("<!DOCTYPE", XXE, High),
    sig("<!ENTITY", XXE, High),
    sig("SYSTEM \"file://", XXE, Critical),
    // SSRF
    sig("169.254.169.254", SSRF, High),
    sig("localhost:22", SSRF, Medium),
    sig("127.0.0.1:", SSRF, Medium),
    sig("file:///", SSRF, High),
    // JWT with alg "none"
    sig("eyJhbGciOiJub25l", JWT_TAMPERING, Medium),
    // NoSQL injection
    sig("\"$where\":", NOSQL_INJECTION, High),
    sig("\"$ne\":", NOSQL_INJECTION, Medium),
    sig("\"$regex\":", NOSQL_INJECTION, Medium),
];

lazy_static! {
    /// Shared registry of the built-in signatures
    pub static ref BUILTIN_REGISTRY: Arc<SignatureRegistry> = Arc::new(SignatureRegistry::builtin());
}

/// A threat signature
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Literal pattern, matched case-insensitively
    pub pattern: String,
    /// Threat category
    #[serde(rename = "type", alias = "category")]
    pub category: String,
    /// Severity
    pub severity: Severity,
}

impl Signature {
    /// Create a signature
    pub fn new(pattern: impl Into<String>, category: impl Into<String>, severity: Severity) -> Self {
        Self {
            pattern: pattern.into(),
            category: category.into(),
            severity,
        }
    }
}

impl From<&ThreatPattern> for Signature {
    fn from(p: &ThreatPattern) -> Self {
        Self::new(p.pattern, p.category, p.severity)
    }
}

/// On-disk signature file layout:
///
/// ```toml
/// [[signature]]
/// pattern = "DROP TABLE"
/// category = "SQL Injection"
/// severity = "high"
/// ```
#[derive(Debug, Deserialize)]
struct SignatureFile {
    #[serde(default, rename = "signature")]
    signatures: Vec<Signature>,
}

/// Ordered, immutable collection of signatures
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureRegistry {
    signatures: Vec<Signature>,
}

impl Default for SignatureRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl SignatureRegistry {
    /// Registry holding the built-in signature table
    pub fn builtin() -> Self {
        Self {
            signatures: BUILTIN_PATTERNS.iter().map(Signature::from).collect(),
        }
    }

    /// Build a registry from signatures, keeping their order
    pub fn new(signatures: Vec<Signature>) -> Result<Self> {
        for (index, sig) in signatures.iter().enumerate() {
            if sig.pattern.is_empty() {
                return Err(NetguardError::Registry(format!(
                    "Signature #{index} ({}) has an empty pattern",
                    sig.category
                )));
            }
        }
        Ok(Self { signatures })
    }

    /// Parse a TOML signature file
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: SignatureFile = toml::from_str(content)
            .map_err(|e| NetguardError::Registry(format!("Failed to parse signatures: {e}")))?;
        Self::new(file.signatures)
    }

    /// Load a TOML signature file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            NetguardError::Registry(format!(
                "Failed to read signature file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Built-ins when `path` is `None`; otherwise the file's signatures,
    /// appended after the built-ins when `include_builtin` is set
    pub fn load(path: Option<&Path>, include_builtin: bool) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::builtin());
        };

        let custom = Self::from_file(path)?;
        tracing::info!(
            path = %path.display(),
            signatures = custom.len(),
            include_builtin,
            "Loaded signature file"
        );

        Ok(if include_builtin {
            Self::builtin().extend(custom)
        } else {
            custom
        })
    }

    /// Append another registry after this one
    pub fn extend(mut self, other: SignatureRegistry) -> Self {
        self.signatures.extend(other.signatures);
        self
    }

    /// Signatures in registry order
    pub fn iter(&self) -> std::slice::Iter<'_, Signature> {
        self.signatures.iter()
    }

    /// Signature at a registry position
    pub fn get(&self, index: usize) -> Option<&Signature> {
        self.signatures.get(index)
    }

    /// Number of signatures
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Distinct categories in first-seen order
    pub fn categories(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for sig in &self.signatures {
            if !seen.contains(&sig.category.as_str()) {
                seen.push(&sig.category);
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a SignatureRegistry {
    type Item = &'a Signature;
    type IntoIter = std::slice::Iter<'a, Signature>;

    fn into_iter(self) -> Self::IntoIter {
        self.signatures.iter()
    }
}
