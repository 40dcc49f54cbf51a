//! # Digest Sets & Digest References
//!
//! `lawpack_digest_set` and `ruleset_digest_set` are sets of SHA-256 hex
//! digests, normalized to a sorted, deduplicated, lowercase vector before
//! they're digested or compared — the wire order a caller supplies them in
//! is never significant.

use serde::{Deserialize, Serialize};

/// Sorts, lowercases, and deduplicates a digest set.
pub fn normalize_digest_set(set: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = set.iter().map(|d| d.trim().to_lowercase()).collect();
    normalized.sort();
    normalized.dedup();
    normalized
}

/// True if `actual` contains every digest in `expected` (a superset check,
/// used for `ruleset_digest_set`, which may grow over the corridor's life).
pub fn is_superset(actual: &[String], expected: &[String]) -> bool {
    let actual_norm = normalize_digest_set(actual);
    normalize_digest_set(expected)
        .iter()
        .all(|d| actual_norm.contains(d))
}

/// A reference to a content-addressed artifact, in either of two accepted
/// shapes: a bare hex digest, or a typed object naming the artifact type
/// and (optionally) a resolvable URI.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum DigestRef {
    Raw(String),
    Typed {
        artifact_type: String,
        digest_sha256: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        uri: Option<String>,
    },
}

impl DigestRef {
    pub fn digest_hex(&self) -> &str {
        match self {
            DigestRef::Raw(hex) => hex,
            DigestRef::Typed { digest_sha256, .. } => digest_sha256,
        }
    }
}
