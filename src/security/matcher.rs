//! Multi-pattern matching engine.
//!
//! All signature patterns are lower-cased and compiled into a single
//! Aho-Corasick automaton when the engine is built. A scan lower-cases the
//! payload once and walks it in a single overlapping pass, remembering where
//! each pattern fired first.
//!
//! The output contract is independent of the automaton:
//! - at most one match per signature, at its first occurrence
//! - matches listed in registry order, not payload order
//! - positions are `char` offsets into the lower-cased payload
//!
//! [`linear_scan`] implements the same contract with one substring search
//! per signature and serves as the reference for tests and benchmarks.

use std::collections::HashMap;
use std::sync::Arc;

use aho_corasick::{AhoCorasick, AhoCorasickBuilder, MatchKind};
use serde::{Deserialize, Serialize};

use super::patterns::{Severity, Signature, SignatureRegistry, BUILTIN_REGISTRY};
use crate::error::Result;

/// Evidence that one signature occurs in a payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatMatch {
    /// Threat category
    #[serde(rename = "type")]
    pub category: String,
    /// Severity
    pub severity: Severity,
    /// Matched signature pattern, as registered
    pub pattern: String,
    /// Offset of the first occurrence in the lower-cased payload (chars)
    pub position: usize,
}

impl ThreatMatch {
    fn new(signature: &Signature, position: usize) -> Self {
        Self {
            category: signature.category.clone(),
            severity: signature.severity,
            pattern: signature.pattern.clone(),
            position,
        }
    }
}

/// Compiled matcher over a signature registry
pub struct MatchEngine {
    registry: Arc<SignatureRegistry>,
    automaton: AhoCorasick,
    /// Automaton pattern id for each registry index
    pattern_of: Vec<usize>,
    /// Number of distinct normalized patterns
    distinct: usize,
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("signatures", &self.registry.len())
            .field("distinct_patterns", &self.distinct)
            .finish()
    }
}

impl MatchEngine {
    /// Compile an engine for the registry
    pub fn new(registry: Arc<SignatureRegistry>) -> Result<Self> {
        // Signatures that normalize to the same text share one automaton pattern.
        let mut ids: HashMap<String, usize> = HashMap::new();
        let mut distinct_patterns: Vec<String> = Vec::new();
        let mut pattern_of = Vec::with_capacity(registry.len());

        for sig in registry.iter() {
            let normalized = sig.pattern.to_lowercase();
            let id = *ids.entry(normalized.clone()).or_insert_with(|| {
                distinct_patterns.push(normalized);
                distinct_patterns.len() - 1
            });
            pattern_of.push(id);
        }

        let automaton = AhoCorasickBuilder::new()
            .match_kind(MatchKind::Standard)
            .build(&distinct_patterns)?;

        tracing::debug!(
            signatures = registry.len(),
            distinct = distinct_patterns.len(),
            "Compiled signature automaton"
        );

        Ok(Self {
            registry,
            automaton,
            pattern_of,
            distinct: distinct_patterns.len(),
        })
    }

    /// Engine over the built-in signatures
    pub fn builtin() -> Result<Self> {
        Self::new(Arc::clone(&*BUILTIN_REGISTRY))
    }

    /// Registry the engine was compiled from
    pub fn registry(&self) -> &Arc<SignatureRegistry> {
        &self.registry
    }

    /// Scan a payload, returning matches in registry order
    pub fn scan(&self, payload: &str) -> Vec<ThreatMatch> {
        if payload.is_empty() || self.distinct == 0 {
            return Vec::new();
        }

        let normalized = payload.to_lowercase();
        let mut first_seen: Vec<Option<usize>> = vec![None; self.distinct];
        let mut remaining = self.distinct;

        // Overlapping matches arrive in end-offset order, so the first report
        // of a fixed-length pattern is its leftmost occurrence.
        for m in self.automaton.find_overlapping_iter(&normalized) {
            let slot = &mut first_seen[m.pattern().as_usize()];
            if slot.is_none() {
                *slot = Some(m.start());
                remaining -= 1;
                if remaining == 0 {
                    break;
                }
            }
        }

        let offsets = CharOffsets::new(&normalized);
        self.registry
            .iter()
            .zip(&self.pattern_of)
            .filter_map(|(sig, &id)| {
                first_seen[id].map(|byte| ThreatMatch::new(sig, offsets.char_offset(byte)))
            })
            .collect()
    }
}

/// Reference scan: one substring search per signature
pub fn linear_scan(payload: &str, registry: &SignatureRegistry) -> Vec<ThreatMatch> {
    let normalized = payload.to_lowercase();
    let offsets = CharOffsets::new(&normalized);

    registry
        .iter()
        .filter_map(|sig| {
            normalized
                .find(&sig.pattern.to_lowercase())
                .map(|byte| ThreatMatch::new(sig, offsets.char_offset(byte)))
        })
        .collect()
}

/// Byte to char offset conversion for a single string
struct CharOffsets<'a> {
    text: &'a str,
    ascii: bool,
}

impl<'a> CharOffsets<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            ascii: text.is_ascii(),
        }
    }

    /// `byte` must lie on a char boundary
    fn char_offset(&self, byte: usize) -> usize {
        if self.ascii {
            byte
        } else {
            self.text[..byte].chars().count()
        }
    }
}
