//! # Chain Builder
//!
//! Assembles a canonical, linear receipt chain out of a set of (possibly
//! forking, possibly multiply-signed) Corridor State Receipts:
//!
//! 1. Validate each receipt independently and group physically distinct
//!    receipts that agree on `(sequence, prev_root, next_root)`, merging
//!    their proof sets.
//! 2. Index the surviving logical receipts by `(sequence, prev_root)`.
//! 3. Walk the chain from `genesis_root` at `sequence = 0`, following the
//!    sole candidate at each step, or the one named by a matching
//!    fork-resolution artifact when more than one candidate exists.
//! 4. Recompute the MMR over the resulting `next_root` sequence.
//!
//! Branches that never make it into the canonical walk — because they
//! lost a fork, or because the walk stopped short of them — are reported
//! as warnings, not discarded silently.

use std::collections::{BTreeMap, BTreeSet};

use msez_crypto::mmr::Peak;
use msez_crypto::{Ed25519PublicKey, MerkleMountainRange};
use msez_vc::VcError;

use crate::authority::{did_from_verification_method, TrustAnchorSet};
use crate::fork::ForkResolutionArtifact;
use crate::receipt::CorridorStateReceipt;
use crate::vc_kinds::SigningThreshold;

/// A previously-trusted chain head a caller wants to extend without
/// replaying the full receipt history from genesis — the `receipt_count`,
/// `final_state_root`, and MMR peaks of a checkpoint that already verified.
#[derive(Debug, Clone)]
pub struct ChainBootstrap {
    pub start_sequence: u64,
    pub start_prev_root: String,
    pub peaks: Vec<Peak>,
}

/// Policy knobs for `build_chain`.
#[derive(Debug, Clone, Default)]
pub struct ChainBuilderPolicy {
    /// Expected `lawpack_digest_set`; empty skips the check.
    pub expected_lawpack_set: Vec<String>,
    /// Expected `ruleset_digest_set`; empty skips the check.
    pub expected_ruleset_set: Vec<String>,
    /// When true, a receipt with no valid proof from an authorized signer
    /// is excluded from the candidate pool rather than merely noted.
    pub require_valid_signatures: bool,
    /// When set, a logical candidate whose combined (verified, authorized)
    /// signer set does not satisfy the threshold's per-role `required`
    /// counts is dropped before canonical selection (§4.5 step 3).
    pub receipt_signing_threshold: Option<SigningThreshold>,
}

/// The canonical chain as of the last successful build step.
#[derive(Debug)]
pub struct ChainHead {
    pub corridor_id: String,
    pub genesis_root: String,
    /// Sequence number of `receipts[0]` — `0` for a head built from
    /// genesis, or a checkpoint's `receipt_count` for a bootstrapped head.
    pub base_sequence: u64,
    /// The root `receipts[0]` chains from — `genesis_root` for a head
    /// built from genesis, or a checkpoint's `final_state_root` otherwise.
    pub base_root: String,
    /// Receipts in canonical order starting at `base_sequence`.
    pub receipts: Vec<CorridorStateReceipt>,
    pub mmr: MerkleMountainRange,
}

impl ChainHead {
    /// Total receipts from genesis through this head, including any a
    /// bootstrap checkpoint already accounted for.
    pub fn receipt_count(&self) -> u64 {
        self.base_sequence + self.receipts.len() as u64
    }

    /// The corridor's current state root: the last receipt's `next_root`,
    /// or `base_root` if no receipts follow it yet.
    pub fn final_state_root(&self) -> String {
        self.receipts
            .last()
            .and_then(|r| r.next_root.clone())
            .unwrap_or_else(|| self.base_root.clone())
    }
}

/// The outcome of a `build_chain` call: the best chain head reachable
/// given the inputs, plus diagnostics about receipts that were rejected
/// or left unreachable.
#[derive(Debug, Default)]
pub struct ChainBuildReport {
    pub head: Option<ChainHead>,
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

struct LogicalReceipt {
    receipt: CorridorStateReceipt,
    signer_methods: BTreeSet<String>,
}

/// Builds the canonical receipt chain for a corridor.
///
/// `resolve_signer` maps a `verificationMethod` (a `did:key:...#fragment`)
/// to the Ed25519 public key it names; it's how receipt and fork-
/// resolution proofs get verified. `trust_anchors`, when given, further
/// restricts which signers count by requiring `corridor.receipt`
/// authorization.
#[tracing::instrument(skip(receipts, fork_resolutions, trust_anchors, resolve_signer, policy), fields(candidate_count = receipts.len()))]
pub fn build_chain(
    corridor_id: &str,
    genesis_root: &str,
    receipts: Vec<CorridorStateReceipt>,
    fork_resolutions: &[ForkResolutionArtifact],
    trust_anchors: Option<&TrustAnchorSet>,
    resolve_signer: impl Fn(&str) -> Result<Ed25519PublicKey, VcError>,
    policy: &ChainBuilderPolicy,
) -> ChainBuildReport {
    let (ordered, mut report) = select_canonical_chain(
        corridor_id,
        0,
        genesis_root,
        receipts,
        fork_resolutions,
        trust_anchors,
        resolve_signer,
        policy,
    );

    let mut mmr = MerkleMountainRange::new();
    let mut mmr_ok = true;
    for receipt in &ordered {
        if let Some(next_root) = &receipt.next_root {
            if let Err(e) = mmr.append(next_root) {
                report
                    .errors
                    .push(format!("failed to extend MMR with sequence {}: {e}", receipt.sequence));
                mmr_ok = false;
                break;
            }
        }
    }

    if mmr_ok {
        let receipt_count = ordered.len();
        report.head = Some(ChainHead {
            corridor_id: corridor_id.to_string(),
            genesis_root: genesis_root.to_string(),
            base_sequence: 0,
            base_root: genesis_root.to_string(),
            receipts: ordered,
            mmr,
        });
        tracing::debug!(receipt_count, warnings = report.warnings.len(), "chain built");
    } else {
        tracing::warn!(errors = report.errors.len(), "chain build failed");
    }

    report
}

/// Extends a previously-trusted chain head (`bootstrap`) with a tail of
/// new receipts, without replaying the receipts that produced it. The MMR
/// is resumed from `bootstrap.peaks` rather than rebuilt from scratch —
/// see `MerkleMountainRange::from_bootstrap`.
///
/// The resulting head's MMR cannot build inclusion proofs for receipts
/// that predate the bootstrap point (their leaf hashes were never
/// replayed); it can only prove receipts in the tail this call appended.
/// A caller needing a historical proof must go back to full-history
/// `build_chain`, or to the checkpoint's own inclusion proof if one was
/// issued for that receipt.
///
/// `genesis_root` is carried through to the resulting `ChainHead` for
/// display/audit purposes only — selection starts at `bootstrap`, not at
/// genesis, so a genesis-root mismatch elsewhere in the tail is not
/// re-validated here.
#[tracing::instrument(skip(receipts, fork_resolutions, trust_anchors, resolve_signer, policy, bootstrap), fields(candidate_count = receipts.len(), start_sequence = bootstrap.start_sequence))]
pub fn build_chain_from_bootstrap(
    corridor_id: &str,
    genesis_root: &str,
    bootstrap: &ChainBootstrap,
    receipts: Vec<CorridorStateReceipt>,
    fork_resolutions: &[ForkResolutionArtifact],
    trust_anchors: Option<&TrustAnchorSet>,
    resolve_signer: impl Fn(&str) -> Result<Ed25519PublicKey, VcError>,
    policy: &ChainBuilderPolicy,
) -> ChainBuildReport {
    let (ordered, mut report) = select_canonical_chain(
        corridor_id,
        bootstrap.start_sequence,
        &bootstrap.start_prev_root,
        receipts,
        fork_resolutions,
        trust_anchors,
        resolve_signer,
        policy,
    );

    let mut mmr = MerkleMountainRange::from_bootstrap(bootstrap.peaks.clone(), bootstrap.start_sequence);
    let mut mmr_ok = true;
    for receipt in &ordered {
        match &receipt.next_root {
            Some(next_root) => {
                if let Err(e) = mmr.append(next_root) {
                    report
                        .errors
                        .push(format!("failed to extend bootstrap MMR with sequence {}: {e}", receipt.sequence));
                    mmr_ok = false;
                    break;
                }
            }
            None => {
                report
                    .errors
                    .push(format!("sequence {} has no next_root", receipt.sequence));
                mmr_ok = false;
                break;
            }
        }
    }

    if mmr_ok {
        let receipt_count = ordered.len();
        report.head = Some(ChainHead {
            corridor_id: corridor_id.to_string(),
            genesis_root: genesis_root.to_string(),
            base_sequence: bootstrap.start_sequence,
            base_root: bootstrap.start_prev_root.clone(),
            receipts: ordered,
            mmr,
        });
        tracing::debug!(receipt_count, warnings = report.warnings.len(), "bootstrap chain extended");
    } else {
        tracing::warn!(errors = report.errors.len(), "bootstrap chain build failed");
    }

    report
}

#[allow(clippy::too_many_arguments)]
fn select_canonical_chain(
    corridor_id: &str,
    start_sequence: u64,
    start_root: &str,
    receipts: Vec<CorridorStateReceipt>,
    fork_resolutions: &[ForkResolutionArtifact],
    trust_anchors: Option<&TrustAnchorSet>,
    resolve_signer: impl Fn(&str) -> Result<Ed25519PublicKey, VcError>,
    policy: &ChainBuilderPolicy,
) -> (Vec<CorridorStateReceipt>, ChainBuildReport) {
    let mut report = ChainBuildReport::default();

    let mut groups: BTreeMap<(u64, String, String), LogicalReceipt> = BTreeMap::new();

    for receipt in receipts {
        if receipt.corridor_id != corridor_id {
            report.errors.push(format!(
                "sequence {}: corridor_id '{}' does not match expected '{corridor_id}'",
                receipt.sequence, receipt.corridor_id
            ));
            continue;
        }
        if let Err(e) =
            receipt.validate_digest_sets(&policy.expected_lawpack_set, &policy.expected_ruleset_set)
        {
            report.errors.push(format!("sequence {}: {e}", receipt.sequence));
            continue;
        }

        let next_root = match &receipt.next_root {
            Some(declared) if receipt.next_root_is_consistent() => declared.clone(),
            Some(declared) => {
                report.errors.push(format!(
                    "sequence {}: declared next_root {declared} does not match the receipt's recomputed value",
                    receipt.sequence
                ));
                continue;
            }
            None => {
                report.errors.push(format!("sequence {}: missing next_root", receipt.sequence));
                continue;
            }
        };

        let mut signer_methods = BTreeSet::new();
        if let Some(proofs) = &receipt.proof {
            match msez_vc::proof::verify_proofs(&receipt, proofs, &resolve_signer) {
                Ok(verifications) => {
                    for v in &verifications {
                        if !v.ok {
                            report.warnings.push(format!(
                                "sequence {}: proof by {} failed verification: {}",
                                receipt.sequence,
                                v.verification_method,
                                v.error.clone().unwrap_or_default()
                            ));
                            continue;
                        }
                        match trust_anchors {
                            Some(anchors) if !anchors.is_authorized(&v.verification_method, "corridor.receipt") => {
                                report.warnings.push(format!(
                                    "sequence {}: {} is not an authorized corridor.receipt signer",
                                    receipt.sequence, v.verification_method
                                ));
                            }
                            _ => {
                                signer_methods.insert(v.verification_method.clone());
                            }
                        }
                    }
                }
                Err(e) => {
                    report.errors.push(format!("sequence {}: {e}", receipt.sequence));
                    continue;
                }
            }
        }

        if policy.require_valid_signatures && signer_methods.is_empty() {
            report.errors.push(format!(
                "sequence {}: rejected — no valid, authorized signature and policy requires one",
                receipt.sequence
            ));
            continue;
        }

        let key = (receipt.sequence, receipt.prev_root.clone(), next_root);
        groups
            .entry(key)
            .and_modify(|existing| existing.signer_methods.extend(signer_methods.iter().cloned()))
            .or_insert(LogicalReceipt { receipt, signer_methods });
    }

    if let Some(threshold) = &policy.receipt_signing_threshold {
        let dropped: Vec<(u64, String, String)> = groups
            .iter()
            .filter(|(_, logical)| {
                let signer_dids: BTreeSet<String> = logical
                    .signer_methods
                    .iter()
                    .map(|vm| did_from_verification_method(vm).to_string())
                    .collect();
                !threshold.is_satisfied_by(&signer_dids)
            })
            .map(|(key, _)| key.clone())
            .collect();
        for key in dropped {
            report.errors.push(format!(
                "sequence {}: dropped — signer set does not satisfy the receipt-signing threshold",
                key.0
            ));
            groups.remove(&key);
        }
    }

    let mut candidates: BTreeMap<(u64, String), Vec<String>> = BTreeMap::new();
    for (seq, prev, next) in groups.keys() {
        candidates
            .entry((*seq, prev.clone()))
            .or_default()
            .push(next.clone());
    }

    let mut resolutions: BTreeMap<(u64, String), Vec<&ForkResolutionArtifact>> = BTreeMap::new();
    for artifact in fork_resolutions {
        if artifact.corridor_id != corridor_id {
            continue;
        }
        resolutions
            .entry((artifact.sequence, artifact.prev_root.clone()))
            .or_default()
            .push(artifact);
    }

    let mut ordered: Vec<CorridorStateReceipt> = Vec::new();
    let mut chosen_at: BTreeMap<u64, String> = BTreeMap::new();
    let mut seq = start_sequence;
    let mut root = start_root.to_string();

    loop {
        let key = (seq, root.clone());
        let Some(candidate_list) = candidates.get(&key) else {
            break;
        };

        let chosen_next = if candidate_list.len() == 1 {
            candidate_list[0].clone()
        } else {
            match resolutions.get(&key) {
                None => {
                    report.errors.push(format!(
                        "unresolved fork at sequence {seq} after prev_root {root}: {} competing next_root \
                         candidates and no fork-resolution artifact names one of them",
                        candidate_list.len()
                    ));
                    break;
                }
                Some(artifacts) => {
                    let distinct: BTreeSet<&str> =
                        artifacts.iter().map(|a| a.chosen_next_root.as_str()).collect();
                    if distinct.len() > 1 {
                        report.errors.push(format!(
                            "{} fork-resolution artifacts for sequence {seq} after prev_root {root} \
                             disagree on the chosen next_root",
                            distinct.len()
                        ));
                        break;
                    }
                    let chosen = artifacts[0].chosen_next_root.clone();
                    if !candidate_list.contains(&chosen) {
                        report.errors.push(format!(
                            "fork-resolution artifact for sequence {seq} chooses next_root {chosen} but \
                             no candidate receipt has that next_root"
                        ));
                        break;
                    }
                    chosen
                }
            }
        };

        let logical = &groups[&(seq, root.clone(), chosen_next.clone())];
        ordered.push(logical.receipt.clone());
        chosen_at.insert(seq, chosen_next.clone());
        root = chosen_next;
        seq += 1;
    }

    for ((at_seq, prev), next_roots) in &candidates {
        for next_root in next_roots {
            let is_chosen = chosen_at.get(at_seq).map(|c| c == next_root).unwrap_or(false);
            if !is_chosen {
                report.warnings.push(format!(
                    "unreachable branch at sequence {at_seq} prev_root {prev}: next_root {next_root} \
                     never became part of the canonical chain"
                ));
            }
        }
    }

    (ordered, report)
}
