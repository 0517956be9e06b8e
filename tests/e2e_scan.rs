//! End-to-end detection tests.
//!
//! These tests drive the public scanner API with the built-in and custom
//! registries and check the verdict contract callers depend on.

use netguard::security::{category, linear_scan, MatchEngine, BUILTIN_REGISTRY};
use netguard::{ScanRequest, Severity, Signature, SignatureRegistry, ThreatScanner};
use proptest::prelude::*;

fn scanner() -> ThreatScanner {
    ThreatScanner::builtin().unwrap()
}

/// Test empty payload is a valid, clean scan
#[test]
fn test_empty_payload() {
    let result = scanner().scan("");

    assert!(!result.is_threat());
    assert!(result.threats().is_empty());
}

/// Test benign text produces no matches
#[test]
fn test_benign_payload() {
    let result = scanner().scan("User logged in successfully");

    assert!(!result.is_threat());
    assert!(result.threats().is_empty());
}

/// Test matching ignores case on both sides
#[test]
fn test_case_insensitive_match() {
    let scanner = scanner();
    let upper = scanner.scan("DROP TABLE");
    let lower = scanner.scan("drop table");

    assert_eq!(upper.threats(), lower.threats());
    assert_eq!(upper.threats()[0].pattern, "DROP TABLE");
    assert_eq!(upper.threats()[0].position, 0);
}

/// Test a signature repeated in the payload is reported once, at its first offset
#[test]
fn test_first_occurrence_only() {
    let result = scanner().scan("x=SLEEP(1) and y=SLEEP(1)");

    let sleeps: Vec<_> = result
        .threats()
        .iter()
        .filter(|t| t.pattern == "SLEEP(")
        .collect();
    assert_eq!(sleeps.len(), 1);
    assert_eq!(sleeps[0].position, 2);
    assert_eq!(sleeps[0].severity, Severity::Medium);
}

/// Test results follow registry order, not payload position
#[test]
fn test_registry_order_preserved() {
    let registry = SignatureRegistry::new(vec![
        Signature::new("late-marker", "A", Severity::Low),
        Signature::new("early-marker", "B", Severity::High),
    ])
    .unwrap();
    let scanner = ThreatScanner::new(registry).unwrap();

    let payload = format!("early-marker{}late-marker", " ".repeat(68));
    let result = scanner.scan(&payload);

    assert_eq!(result.threats().len(), 2);
    assert_eq!(result.threats()[0].category, "A");
    assert_eq!(result.threats()[0].position, 80);
    assert_eq!(result.threats()[1].category, "B");
    assert_eq!(result.threats()[1].position, 0);
}

/// Test one payload can trip several categories at once
#[test]
fn test_multi_category_payload() {
    let payload = format!("{}{}", "' OR 1=1 --", "<script>alert(1)</script>");
    let result = scanner().scan(&payload);

    let categories = result.categories();
    assert!(categories.contains(&category::SQL_INJECTION));
    assert!(categories.contains(&category::XSS));

    let sql = result
        .threats()
        .iter()
        .find(|t| t.pattern == "OR 1=1")
        .unwrap();
    assert_eq!(sql.position, 2);

    // SQL signatures come first in the registry
    assert_eq!(result.threats()[0].category, category::SQL_INJECTION);
    assert_eq!(result.max_severity(), Some(Severity::High));
}

/// Test every built-in category is reachable
#[test]
fn test_builtin_categories_detected() {
    let scanner = scanner();
    let cases = [
        ("1 UNION SELECT password FROM users", category::SQL_INJECTION),
        ("<img src=x onerror=alert(1)>", category::XSS),
        ("GET /static/../../etc/passwd", category::PATH_TRAVERSAL),
        ("name=bob; rm -rf /", category::COMMAND_INJECTION),
        ("<?php echo 1; ?>", category::CODE_INJECTION),
        ("(uid=*)(|(objectclass=*))", category::LDAP_INJECTION),
        ("<!DOCTYPE foo [<!ENTITY x SYSTEM \"file:///etc/passwd\">]>", category::XXE),
        ("url=http://169.254.169.254/latest/meta-data", category::SSRF),
        ("Bearer eyJhbGciOiJub25lIn0.e30.", category::JWT_TAMPERING),
        ("{\"user\": {\"$ne\": null}}", category::NOSQL_INJECTION),
    ];

    for (payload, expected) in cases {
        let result = scanner.scan(payload);
        assert!(
            result.categories().contains(&expected),
            "{payload:?} should trip {expected}, got {:?}",
            result.categories()
        );
    }
}

/// Test the wire format of a verdict
#[test]
fn test_scan_result_json() {
    let result = scanner().scan_request(&ScanRequest::new("1 OR 1=1"));
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["isThreat"], true);
    assert_eq!(json["threats"][0]["type"], "SQL Injection");
    assert_eq!(json["threats"][0]["severity"], "high");
    assert_eq!(json["threats"][0]["pattern"], "OR 1=1");
    assert_eq!(json["threats"][0]["position"], 2);
    assert!(json["scannedAt"].is_string());
}

/// Test a signature file loaded from TOML participates in scans
#[test]
fn test_custom_signatures_from_toml() {
    let registry = SignatureRegistry::from_toml_str(
        r#"
        [[signature]]
        pattern = "sqlmap"
        type = "Scanner"
        severity = "low"
        "#,
    )
    .unwrap();
    let scanner = ThreatScanner::new(SignatureRegistry::builtin().extend(registry)).unwrap();

    let result = scanner.scan("User-Agent: SQLMAP/1.7; DROP TABLE x");
    assert_eq!(result.threats().len(), 2);
    assert_eq!(result.threats()[0].pattern, "DROP TABLE");
    assert_eq!(result.threats()[1].category, "Scanner");
    assert_eq!(result.threats()[1].position, 12);
}

const FRAGMENTS: &[&str] = &[
    "drop table",
    "UNION SELECT",
    "or 1=1",
    "<script>",
    "../etc/passwd",
    "/etc/passwd",
    "$(",
    "${",
    "{{",
    "*)(",
    "))(",
    "SLEEP(",
    "hello",
    " ",
    "=",
    "é",
    "ß",
    "İ",
    "x",
    "0",
];

fn payload() -> impl Strategy<Value = String> {
    prop::collection::vec(prop::sample::select(FRAGMENTS), 0..24).prop_map(|parts| parts.concat())
}

proptest! {
    /// Scanning is deterministic and the verdict flag tracks the match list
    #[test]
    fn prop_scan_deterministic(payload in payload()) {
        let scanner = scanner();
        let first = scanner.scan(&payload);
        let second = scanner.scan(&payload);

        prop_assert_eq!(first.threats(), second.threats());
        prop_assert_eq!(first.is_threat(), !first.threats().is_empty());
    }

    /// The automaton reports exactly what a per-signature substring search does
    #[test]
    fn prop_automaton_matches_linear_scan(payload in payload()) {
        let engine = MatchEngine::builtin().unwrap();
        prop_assert_eq!(engine.scan(&payload), linear_scan(&payload, &BUILTIN_REGISTRY));
    }

    /// Arbitrary text never breaks either matcher
    #[test]
    fn prop_arbitrary_text(payload in ".{0,64}") {
        let engine = MatchEngine::builtin().unwrap();
        prop_assert_eq!(engine.scan(&payload), linear_scan(&payload, &BUILTIN_REGISTRY));
    }
}
