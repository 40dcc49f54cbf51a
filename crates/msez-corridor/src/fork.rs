//! # Fork Resolution
//!
//! When two or more receipts share `(sequence, prev_root)` but disagree on
//! `next_root`, the chain builder cannot pick a canonical branch on its
//! own — it requires an externally supplied, signed fork-resolution
//! artifact naming the `next_root` the corridor's governing parties agreed
//! on. This is deliberately not automatic: a heuristic (most recent
//! timestamp, most watcher attestations) would make the "canonical" chain
//! depend on network timing rather than an auditable decision.

use serde::{Deserialize, Serialize};

use msez_vc::ProofSet;

pub const FORK_RESOLUTION_TYPE: &str = "MSEZForkResolution";

/// A signed artifact resolving a fork at `(corridor_id, sequence, prev_root)`
/// in favor of `chosen_next_root`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForkResolutionArtifact {
    #[serde(rename = "type")]
    pub doc_type: String,
    pub corridor_id: String,
    pub sequence: u64,
    pub prev_root: String,
    pub chosen_next_root: String,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolved_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofSet>,
}

impl ForkResolutionArtifact {
    pub fn new(
        corridor_id: impl Into<String>,
        sequence: u64,
        prev_root: impl Into<String>,
        chosen_next_root: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            doc_type: FORK_RESOLUTION_TYPE.to_string(),
            corridor_id: corridor_id.into(),
            sequence,
            prev_root: prev_root.into(),
            chosen_next_root: chosen_next_root.into(),
            reason: reason.into(),
            resolved_at: None,
            proof: None,
        }
    }

    /// The key a fork-resolution artifact addresses: `(sequence, prev_root)`.
    pub fn fork_key(&self) -> (u64, &str) {
        (self.sequence, self.prev_root.as_str())
    }
}
