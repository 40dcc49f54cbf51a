//! # Checkpoints
//!
//! A checkpoint is a signed snapshot of a corridor's chain head at a given
//! receipt count: it binds `genesis_root`, `receipt_count`,
//! `final_state_root`, and the MMR's `root`/`size`/`peaks` into one
//! document. Checkpoints let a verifier trust a chain's state without
//! replaying every receipt from genesis, and let inclusion proofs bind to
//! a specific, previously-trusted snapshot via `checkpoint_ref`.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use msez_core::CanonicalBytes;
use msez_crypto::mmr::Peak;
use msez_crypto::sha256::sha256_hex;
use msez_crypto::Ed25519PublicKey;
use msez_vc::{ProofSet, VcError};

use crate::authority::{did_from_verification_method, TrustAnchorSet};
use crate::chain::ChainHead;
use crate::digest_set::normalize_digest_set;
use crate::error::ChainError;
use crate::vc_kinds::SigningThreshold;

pub const CHECKPOINT_TYPE: &str = "MSEZCorridorCheckpoint";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PeakSnapshot {
    pub height: u32,
    pub hash: String,
}

impl From<&Peak> for PeakSnapshot {
    fn from(peak: &Peak) -> Self {
        Self {
            height: peak.height,
            hash: peak.hash.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MmrSnapshot {
    pub size: u64,
    pub root: String,
    pub peaks: Vec<PeakSnapshot>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub corridor_id: String,
    pub timestamp: String,
    pub genesis_root: String,
    pub receipt_count: u64,
    pub final_state_root: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lawpack_digest_set: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ruleset_digest_set: Vec<String>,
    pub mmr: MmrSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofSet>,
}

impl Checkpoint {
    /// Builds an unsigned checkpoint from a chain head's current state.
    pub fn from_chain_head(
        head: &ChainHead,
        timestamp: impl Into<String>,
        lawpack_digest_set: &[String],
        ruleset_digest_set: &[String],
    ) -> Result<Self, ChainError> {
        let mmr = MmrSnapshot {
            size: head.mmr.leaf_count(),
            root: head.mmr.root()?,
            peaks: head.mmr.peaks().iter().map(PeakSnapshot::from).collect(),
        };
        Ok(Self {
            doc_type: CHECKPOINT_TYPE.to_string(),
            corridor_id: head.corridor_id.clone(),
            timestamp: timestamp.into(),
            genesis_root: head.genesis_root.clone(),
            receipt_count: head.receipt_count(),
            final_state_root: head.final_state_root(),
            lawpack_digest_set: normalize_digest_set(lawpack_digest_set),
            ruleset_digest_set: normalize_digest_set(ruleset_digest_set),
            mmr,
            proof: None,
        })
    }

    /// `SHA256(canonical(self without "proof"))` — the digest an inclusion
    /// proof's `checkpoint_ref` binds to.
    pub fn digest(&self) -> Result<String, ChainError> {
        let mut value =
            serde_json::to_value(self).map_err(|e| ChainError::Receipt(crate::error::ReceiptError::Serialization(e)))?;
        if let serde_json::Value::Object(ref mut map) = value {
            map.remove("proof");
        }
        let bytes = CanonicalBytes::new(&value)?;
        Ok(sha256_hex(&bytes))
    }

    /// Re-derives a checkpoint from `head` and checks it against this one,
    /// field by field (ignoring `timestamp` and `proof`, which aren't part
    /// of the state being attested to).
    pub fn is_consistent_with(&self, head: &ChainHead) -> Result<bool, ChainError> {
        let recomputed =
            Self::from_chain_head(head, self.timestamp.clone(), &self.lawpack_digest_set, &self.ruleset_digest_set)?;
        Ok(self.corridor_id == recomputed.corridor_id
            && self.genesis_root == recomputed.genesis_root
            && self.receipt_count == recomputed.receipt_count
            && self.final_state_root == recomputed.final_state_root
            && self.mmr == recomputed.mmr)
    }

    /// Full checkpoint verification (§4.6): structural consistency with
    /// `head`, a valid proof from a (optionally trust-anchor-authorized)
    /// signer, and — when `threshold` is given — that the verified signer
    /// set satisfies its per-role `required` counts.
    ///
    /// `trust_anchors`, when given, restricts counted signers to those
    /// authorized for `"corridor.checkpoint"`. A checkpoint with no
    /// attached proof verifies only if no threshold is being enforced.
    pub fn verify(
        &self,
        head: &ChainHead,
        trust_anchors: Option<&TrustAnchorSet>,
        resolve_signer: impl Fn(&str) -> Result<Ed25519PublicKey, VcError>,
        threshold: Option<&SigningThreshold>,
    ) -> Result<bool, ChainError> {
        if !self.is_consistent_with(head)? {
            return Ok(false);
        }

        let Some(proofs) = &self.proof else {
            return Ok(threshold.is_none());
        };

        let verifications = msez_vc::proof::verify_proofs(self, proofs, &resolve_signer)?;
        let mut signer_dids: BTreeSet<String> = BTreeSet::new();
        for v in &verifications {
            if !v.ok {
                continue;
            }
            if let Some(anchors) = trust_anchors {
                if !anchors.is_authorized(&v.verification_method, "corridor.checkpoint") {
                    continue;
                }
            }
            signer_dids.insert(did_from_verification_method(&v.verification_method).to_string());
        }

        if signer_dids.is_empty() {
            return Ok(false);
        }

        match threshold {
            Some(t) => Ok(t.is_satisfied_by(&signer_dids)),
            None => Ok(true),
        }
    }
}
