//! # Finality Ladder
//!
//! A corridor's state at a given `(sequence, next_root)` climbs a
//! monotonic ladder of finality as more evidence accumulates. The ladder
//! is recomputed fresh from whatever evidence is on hand each call — it
//! is never cached or advanced as a side effect, since evidence (an
//! L1 anchor, a later legal ruling) can arrive out of order.

use serde::{Deserialize, Serialize};

use crate::watcher::QuorumResult;

/// A rung on the finality ladder, ordered from weakest to strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FinalityLevel {
    /// A transition has been proposed but no receipt exists yet.
    Proposed,
    /// A Corridor State Receipt for this transition carries at least one
    /// valid proof.
    ReceiptSigned,
    /// The receipt is included in a signed checkpoint.
    CheckpointSigned,
    /// A watcher quorum attests to the checkpointed (or receipt) state.
    WatcherQuorum,
    /// The state root has been anchored to an L1 chain.
    L1Anchored,
    /// A jurisdiction's legal process has recognized the state as final.
    LegallyRecognized,
}

/// The evidence available for a given `(sequence, next_root)` pair, used
/// to compute its current finality level.
#[derive(Debug, Clone, Default)]
pub struct FinalityEvidence {
    pub receipt_has_valid_proof: bool,
    pub included_in_signed_checkpoint: bool,
    pub watcher_quorum: Option<QuorumResult>,
    pub l1_anchored: bool,
    pub legally_recognized: bool,
}

/// Computes the highest finality level the evidence supports.
///
/// This is a pure max-fold: each condition independently qualifies its
/// rung, and the result is the highest rung reached, not the highest rung
/// whose prerequisites were also met — a legal ruling can outrun an L1
/// anchor that was never filed.
pub fn compute_finality_level(evidence: &FinalityEvidence) -> FinalityLevel {
    let mut level = FinalityLevel::Proposed;

    if evidence.receipt_has_valid_proof {
        level = level.max(FinalityLevel::ReceiptSigned);
    }
    if evidence.included_in_signed_checkpoint {
        level = level.max(FinalityLevel::CheckpointSigned);
    }
    if evidence.watcher_quorum.as_ref().is_some_and(|q| q.met) {
        level = level.max(FinalityLevel::WatcherQuorum);
    }
    if evidence.l1_anchored {
        level = level.max(FinalityLevel::L1Anchored);
    }
    if evidence.legally_recognized {
        level = level.max(FinalityLevel::LegallyRecognized);
    }

    level
}
