//! # Content Digest — Content-Addressed Identifiers
//!
//! Defines `ContentDigest` and `DigestAlgorithm` for the content-addressed
//! storage (CAS) system and for every hash-chain link in the core.
//!
//! ## Security Invariant
//!
//! `ContentDigest` is only ever constructed from `CanonicalBytes` (see
//! `msez_crypto::sha256_digest`), ensuring that all digests in the system
//! are produced through the correct canonicalization pipeline.

use serde::{Deserialize, Serialize};

/// The hash algorithm used to produce a content digest.
///
/// The core uses SHA-256 exclusively; the tag exists so commitment
/// structures are self-describing if a second algorithm is ever added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DigestAlgorithm {
    /// SHA-256 — the only algorithm the core currently produces.
    Sha256,
}

/// A content-addressed digest with its algorithm tag.
///
/// Produced exclusively from `CanonicalBytes` to ensure canonicalization
/// correctness. The 32-byte digest and algorithm tag together form a
/// self-describing content identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentDigest {
    /// The hash algorithm that produced this digest.
    pub algorithm: DigestAlgorithm,
    /// The raw 32-byte digest value.
    pub bytes: [u8; 32],
}

impl ContentDigest {
    /// Create a new content digest from raw bytes and algorithm.
    ///
    /// Prefer `msez_crypto::sha256_digest()` for constructing SHA256 digests
    /// from `CanonicalBytes`.
    pub fn new(algorithm: DigestAlgorithm, bytes: [u8; 32]) -> Self {
        Self { algorithm, bytes }
    }

    /// Render the digest as a lowercase hex string.
    pub fn to_hex(&self) -> String {
        self.bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl std::fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}",
            match self.algorithm {
                DigestAlgorithm::Sha256 => "sha256",
            },
            self.to_hex()
        )
    }
}
