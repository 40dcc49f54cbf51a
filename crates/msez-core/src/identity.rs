//! # Domain Identity Newtypes
//!
//! Newtype wrappers for the identifiers that flow through the verifiable
//! state channel core. These prevent accidental identifier confusion — you
//! cannot pass a `Did` where a `CorridorId` is expected.
//!
//! ## Security Invariant
//!
//! Type-level distinction between identifier namespaces prevents
//! cross-namespace confusion attacks where an attacker substitutes
//! one kind of identifier for another.

use serde::{Deserialize, Serialize};

/// Identifier of a corridor (a bilateral/multilateral state channel).
///
/// A corridor is named by the module/directory it lives in, not a generated
/// UUID — the id is a stable string pinned into every receipt's
/// `corridor_id` field and into the genesis root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CorridorId(pub String);

impl CorridorId {
    /// Wrap a string as a corridor identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CorridorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorridorId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CorridorId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// A `did:key` decentralized identifier, carried as its wire string.
///
/// `Did` does not itself validate or decode the multicodec payload — that
/// requires the base58btc/multicodec logic in `msez-crypto`. This type just
/// gives the string a distinct, documented home so callers don't confuse a
/// DID with an arbitrary `String` or with a `verificationMethod` (a DID plus
/// an optional `#fragment` key id).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Did(pub String);

impl Did {
    /// Wrap a string as a DID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Access the inner string value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Strip a trailing `#fragment` key identifier, returning the base DID.
    ///
    /// `verificationMethod` values are `did:key:z...#key-1`; signature
    /// verification resolves the key from the DID portion only.
    pub fn without_fragment(&self) -> &str {
        match self.0.split_once('#') {
            Some((base, _)) => base,
            None => &self.0,
        }
    }
}

impl std::fmt::Display for Did {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Did {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for Did {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corridor_id_display_roundtrip() {
        let id = CorridorId::new("org.momentum.msez.corridor.swift.iso20022-cross-border");
        assert_eq!(id.to_string(), id.as_str());
    }

    #[test]
    fn did_without_fragment_strips_key_id() {
        let vm = Did::new("did:key:zExample#key-1");
        assert_eq!(vm.without_fragment(), "did:key:zExample");
    }

    #[test]
    fn did_without_fragment_is_identity_when_absent() {
        let did = Did::new("did:key:zExample");
        assert_eq!(did.without_fragment(), "did:key:zExample");
    }
}
