//! # Watcher Attestations
//!
//! Independent watchers observe a corridor's chain and periodically sign
//! an attestation of what they see at its head. Comparing attestations
//! against a trusted chain head surfaces staleness, forks, lag, and
//! checkpoint divergence — and lets a verifier compute quorum over
//! however many watchers currently agree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use msez_core::Timestamp;
use msez_vc::VerifiableCredential;

use crate::chain::ChainHead;
use crate::error::WatcherError;

pub const WATCHER_ATTESTATION_TYPE: &str = "MSEZWatcherAttestation";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatcherAttestationSubject {
    pub corridor_id: String,
    pub observed_at: String,
    pub head_receipt_count: u64,
    pub head_state_root: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head_checkpoint_digest_sha256: Option<String>,
}

pub type WatcherAttestationVc = VerifiableCredential<WatcherAttestationSubject>;

/// How a single watcher attestation relates to a trusted chain head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttestationClassification {
    /// Agrees exactly with the trusted head.
    Agreement,
    /// Names a `head_state_root` the trusted head never produced at that
    /// `head_receipt_count` — an irreconcilable fork in the watcher's view.
    Fork,
    /// Reports fewer receipts than the trusted head, but agrees with the
    /// trusted head's state root as of that earlier count — the watcher
    /// just hasn't caught up yet.
    Lagging { behind_by: u64 },
    /// Reports more receipts than the trusted head currently has — the
    /// watcher is ahead, which a verifier should treat with the same
    /// suspicion as a fork until the local head catches up.
    Ahead { ahead_by: u64 },
    /// Claims a checkpoint digest the trusted head's checkpoint does not
    /// produce, while otherwise agreeing on receipt count and state root.
    CheckpointDivergence,
    /// Older than the configured staleness window relative to `now`.
    Stale,
}

/// Compares a single attestation against `head`, at the given `checkpoint
/// digest` (if the head has one the caller trusts), applying a staleness
/// cutoff of `max_age_seconds` relative to `now`.
pub fn classify_attestation(
    subject: &WatcherAttestationSubject,
    head: &ChainHead,
    trusted_checkpoint_digest: Option<&str>,
    now: Timestamp,
    max_age_seconds: i64,
) -> Result<AttestationClassification, WatcherError> {
    let observed_at = Timestamp::parse_rfc3339(&subject.observed_at)
        .map_err(|e| WatcherError::Vc(msez_vc::VcError::MalformedProof(e.to_string())))?;
    let age_seconds = now.as_datetime().signed_duration_since(*observed_at.as_datetime()).num_seconds();
    if age_seconds > max_age_seconds {
        return Ok(AttestationClassification::Stale);
    }

    let trusted_count = head.receipt_count();

    if subject.head_receipt_count > trusted_count {
        return Ok(AttestationClassification::Ahead {
            ahead_by: subject.head_receipt_count - trusted_count,
        });
    }

    let state_root_at_count = if subject.head_receipt_count == trusted_count {
        head.final_state_root()
    } else {
        let index = subject.head_receipt_count as usize;
        match index.checked_sub(1) {
            Some(i) => head.receipts[i].next_root.clone().unwrap_or_default(),
            None => head.genesis_root.clone(),
        }
    };

    if subject.head_state_root != state_root_at_count {
        return Ok(AttestationClassification::Fork);
    }

    if subject.head_receipt_count < trusted_count {
        return Ok(AttestationClassification::Lagging {
            behind_by: trusted_count - subject.head_receipt_count,
        });
    }

    if let (Some(claimed), Some(trusted)) = (&subject.head_checkpoint_digest_sha256, trusted_checkpoint_digest) {
        if claimed != trusted {
            return Ok(AttestationClassification::CheckpointDivergence);
        }
    }

    Ok(AttestationClassification::Agreement)
}

/// Quorum policy over a set of classified attestations.
#[derive(Debug, Clone, Copy)]
pub enum QuorumPolicy {
    /// Strictly more than half of `total_watchers` must agree.
    Majority { total_watchers: u64 },
    /// At least `k` of `n` named watchers must agree.
    KOfN { k: u64, n: u64 },
}

#[derive(Debug, Clone)]
pub struct QuorumResult {
    pub agreeing: u64,
    pub required: u64,
    /// `true` when `agreeing >= required` and no fork signal was present.
    /// A single `Fork` classification forces this to `false` regardless
    /// of how many attestations otherwise agree (§4.7, §8 property 10).
    pub met: bool,
    pub fork_detected: bool,
    pub by_classification: BTreeMap<String, u64>,
}

/// Evaluates quorum across a set of already-classified attestations.
pub fn evaluate_quorum(
    classifications: &[AttestationClassification],
    policy: QuorumPolicy,
) -> Result<QuorumResult, WatcherError> {
    let agreeing = classifications
        .iter()
        .filter(|c| matches!(c, AttestationClassification::Agreement))
        .count() as u64;

    let fork_detected = classifications
        .iter()
        .any(|c| matches!(c, AttestationClassification::Fork));

    let required = match policy {
        QuorumPolicy::Majority { total_watchers } => total_watchers / 2 + 1,
        QuorumPolicy::KOfN { k, n } => {
            if k > n {
                return Err(WatcherError::MalformedQuorum(format!(
                    "k ({k}) cannot exceed n ({n})"
                )));
            }
            k
        }
    };

    let mut by_classification: BTreeMap<String, u64> = BTreeMap::new();
    for c in classifications {
        *by_classification.entry(label(c).to_string()).or_insert(0) += 1;
    }

    Ok(QuorumResult {
        agreeing,
        required,
        met: !fork_detected && agreeing >= required,
        fork_detected,
        by_classification,
    })
}

fn label(c: &AttestationClassification) -> &'static str {
    match c {
        AttestationClassification::Agreement => "agreement",
        AttestationClassification::Fork => "fork",
        AttestationClassification::Lagging { .. } => "lagging",
        AttestationClassification::Ahead { .. } => "ahead",
        AttestationClassification::CheckpointDivergence => "checkpoint_divergence",
        AttestationClassification::Stale => "stale",
    }
}
