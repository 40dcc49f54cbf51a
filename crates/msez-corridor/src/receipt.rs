//! # Corridor State Receipt
//!
//! The unit of corridor state transition. Each receipt links `prev_root` to
//! `next_root`; `next_root` is computed over the receipt's canonical bytes
//! with `proof` and `next_root` itself excluded — never over the whole
//! receipt, so attaching a proof (or recomputing `next_root`) never moves
//! the thing the proof is over.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use msez_core::CanonicalBytes;
use msez_crypto::sha256::sha256_hex;
use msez_vc::ProofSet;

use crate::digest_set::{is_superset, normalize_digest_set, DigestRef};
use crate::error::ReceiptError;

pub const RECEIPT_TYPE: &str = "MSEZCorridorStateReceipt";

/// The state-transition payload a receipt carries. `kind` is the
/// canonical field name; `transition_kind` is accepted on read for
/// artifacts written before `kind` existed, and is never written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionEnvelope {
    #[serde(alias = "transition_kind")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_digest_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ruleset_digest_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zk_circuit_digest_sha256: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<DigestRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorridorStateReceipt {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub corridor_id: String,
    pub sequence: u64,
    pub prev_root: String,
    pub timestamp: String,
    pub lawpack_digest_set: Vec<String>,
    pub ruleset_digest_set: Vec<String>,
    pub transition: TransitionEnvelope,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transition_type_registry_digest_sha256: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofSet>,
}

impl CorridorStateReceipt {
    pub fn new(
        corridor_id: impl Into<String>,
        sequence: u64,
        prev_root: impl Into<String>,
        timestamp: impl Into<String>,
        lawpack_digest_set: Vec<String>,
        ruleset_digest_set: Vec<String>,
        transition: TransitionEnvelope,
    ) -> Self {
        Self {
            doc_type: RECEIPT_TYPE.to_string(),
            corridor_id: corridor_id.into(),
            sequence,
            prev_root: prev_root.into(),
            timestamp: timestamp.into(),
            lawpack_digest_set: normalize_digest_set(&lawpack_digest_set),
            ruleset_digest_set: normalize_digest_set(&ruleset_digest_set),
            transition,
            transition_type_registry_digest_sha256: None,
            next_root: None,
            proof: None,
        }
    }

    /// Computes `next_root`: the SHA-256 of this receipt's canonical bytes
    /// with `proof` and `next_root` removed.
    pub fn compute_next_root(&self) -> Result<String, ReceiptError> {
        let mut value = serde_json::to_value(self)?;
        if let Value::Object(ref mut map) = value {
            map.remove("proof");
            map.remove("next_root");
        }
        let bytes = CanonicalBytes::new(&value)?;
        Ok(sha256_hex(&bytes))
    }

    /// Computes and sets `next_root` on a copy of this receipt.
    pub fn with_computed_next_root(mut self) -> Result<Self, ReceiptError> {
        let root = self.compute_next_root()?;
        self.next_root = Some(root);
        Ok(self)
    }

    /// True if the receipt's declared `next_root` matches its recomputed value.
    pub fn next_root_is_consistent(&self) -> bool {
        match (&self.next_root, self.compute_next_root()) {
            (Some(declared), Ok(computed)) => declared.eq_ignore_ascii_case(&computed),
            _ => false,
        }
    }

    /// Validates digest sets against a corridor's expected sets:
    /// `lawpack_digest_set` must equal `expected_lawpack` exactly (when
    /// non-empty); `ruleset_digest_set` must be a superset of
    /// `expected_ruleset` (rulesets only grow over a corridor's life).
    pub fn validate_digest_sets(
        &self,
        expected_lawpack: &[String],
        expected_ruleset: &[String],
    ) -> Result<(), ReceiptError> {
        if !expected_lawpack.is_empty() {
            let actual = normalize_digest_set(&self.lawpack_digest_set);
            let expected = normalize_digest_set(expected_lawpack);
            if actual != expected {
                return Err(ReceiptError::DigestSetMismatch(format!(
                    "lawpack_digest_set mismatch: expected {expected:?}, got {actual:?}"
                )));
            }
        }
        if !expected_ruleset.is_empty() && !is_superset(&self.ruleset_digest_set, expected_ruleset) {
            return Err(ReceiptError::DigestSetMismatch(
                "ruleset_digest_set is missing one or more expected entries".to_string(),
            ));
        }
        Ok(())
    }

    /// The effective transition kind, preferring `kind` (the canonical,
    /// modern field) — `transition_kind` only ever arrives via the serde
    /// alias on deserialization of an older artifact.
    pub fn transition_kind(&self) -> &str {
        &self.transition.kind
    }
}
