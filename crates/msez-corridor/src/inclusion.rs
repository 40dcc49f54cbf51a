//! # Inclusion Proofs
//!
//! Wraps `msez_crypto::mmr`'s inclusion-proof machinery with corridor-level
//! concerns: proving a specific receipt (by sequence) is part of a chain
//! head, and optionally binding that proof to a checkpoint so a verifier
//! who already trusts the checkpoint doesn't need to re-derive the MMR
//! root from the full receipt history.

use msez_crypto::mmr::{build_inclusion_proof_for_checkpoint, verify_inclusion_proof, InclusionProof};

use crate::chain::ChainHead;
use crate::checkpoint::Checkpoint;
use crate::error::ChainError;

/// Builds an inclusion proof for the receipt at `sequence` within `head`,
/// optionally bound to `checkpoint`.
///
/// `head` must have full leaf history back to genesis (`base_sequence ==
/// 0`): a head produced by `build_chain_from_bootstrap` only carries its
/// bootstrap point's MMR peaks, not the leaf hashes that produced them —
/// see `MerkleMountainRange::from_bootstrap`'s documented limitation — so
/// no inclusion proof can be built from it for any sequence, bootstrapped
/// or not, without replaying from genesis first.
pub fn prove_receipt(
    head: &ChainHead,
    sequence: u64,
    checkpoint: Option<&Checkpoint>,
) -> Result<InclusionProof, ChainError> {
    if head.base_sequence != 0 {
        return Err(ChainError::IncompleteMmrHistory {
            base_sequence: head.base_sequence,
            sequence,
        });
    }

    let leaf_index = sequence as usize;
    if leaf_index >= head.receipts.len() {
        return Err(ChainError::CheckpointMismatch(format!(
            "sequence {sequence} is out of range for a chain with {} receipts",
            head.receipts.len()
        )));
    }

    let next_roots: Vec<String> = head
        .receipts
        .iter()
        .map(|r| {
            r.next_root.clone().ok_or_else(|| {
                ChainError::CheckpointMismatch(format!(
                    "receipt at sequence {} has no next_root",
                    r.sequence
                ))
            })
        })
        .collect::<Result<_, _>>()?;

    let checkpoint_digest = checkpoint.map(|c| c.digest()).transpose()?;

    Ok(build_inclusion_proof_for_checkpoint(
        &next_roots,
        leaf_index,
        checkpoint_digest.as_deref(),
    )?)
}

/// Verifies an inclusion proof on its own terms (path, peaks, root), and,
/// when `checkpoint` is given, additionally checks the proof's
/// `checkpoint_ref` names that exact checkpoint.
pub fn verify_receipt_inclusion(proof: &InclusionProof, checkpoint: Option<&Checkpoint>) -> Result<bool, ChainError> {
    if !verify_inclusion_proof(proof) {
        return Ok(false);
    }
    if let Some(checkpoint) = checkpoint {
        let expected_digest = checkpoint.digest()?;
        let bound_digest = proof.checkpoint_ref.as_ref().map(|r| r.digest_sha256.as_str());
        if bound_digest != Some(expected_digest.as_str()) {
            return Ok(false);
        }
        if proof.root != checkpoint.mmr.root || proof.size as u64 != checkpoint.mmr.size {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::{build_chain, ChainBuilderPolicy};
    use crate::receipt::{CorridorStateReceipt, TransitionEnvelope};
    use msez_crypto::Ed25519PublicKey;
    use msez_vc::VcError;

    fn no_signer(_vm: &str) -> Result<Ed25519PublicKey, VcError> {
        Err(VcError::MalformedProof("unused".to_string()))
    }

    fn transition(kind: &str) -> TransitionEnvelope {
        TransitionEnvelope {
            kind: kind.to_string(),
            payload: None,
            payload_sha256: None,
            schema_digest_sha256: None,
            ruleset_digest_sha256: None,
            zk_circuit_digest_sha256: None,
            attachments: vec![],
        }
    }

    fn sample_head() -> ChainHead {
        let genesis = "bb".repeat(32);
        let r0 = CorridorStateReceipt::new("corridor-a", 0, &genesis, "2026-01-15T12:00:00Z", vec![], vec![], transition("a"))
            .with_computed_next_root()
            .unwrap();
        let r1 = CorridorStateReceipt::new(
            "corridor-a",
            1,
            r0.next_root.as_ref().unwrap(),
            "2026-01-15T12:01:00Z",
            vec![],
            vec![],
            transition("b"),
        )
        .with_computed_next_root()
        .unwrap();

        build_chain(
            "corridor-a",
            &genesis,
            vec![r0, r1],
            &[],
            None,
            no_signer,
            &ChainBuilderPolicy::default(),
        )
        .head
        .unwrap()
    }

    #[test]
    fn proves_and_verifies_a_receipt_without_a_checkpoint() {
        let head = sample_head();
        let proof = prove_receipt(&head, 1, None).unwrap();
        assert!(verify_receipt_inclusion(&proof, None).unwrap());
    }

    #[test]
    fn out_of_range_sequence_is_rejected() {
        let head = sample_head();
        assert!(prove_receipt(&head, 5, None).is_err());
    }

    #[test]
    fn proof_bound_to_wrong_checkpoint_fails_verification() {
        let head = sample_head();
        let checkpoint = Checkpoint::from_chain_head(&head, "2026-01-15T12:05:00Z", &[], &[]).unwrap();
        let proof = prove_receipt(&head, 0, None).unwrap();
        assert!(!verify_receipt_inclusion(&proof, Some(&checkpoint)).unwrap());

        let bound_proof = prove_receipt(&head, 0, Some(&checkpoint)).unwrap();
        assert!(verify_receipt_inclusion(&bound_proof, Some(&checkpoint)).unwrap());
    }

    #[test]
    fn prove_receipt_rejects_a_bootstrapped_head() {
        use crate::chain::{build_chain_from_bootstrap, ChainBootstrap};

        let genesis = "cc".repeat(32);
        let r0 = CorridorStateReceipt::new("corridor-a", 0, &genesis, "2026-01-15T12:00:00Z", vec![], vec![], transition("a"))
            .with_computed_next_root()
            .unwrap();
        let r1 = CorridorStateReceipt::new(
            "corridor-a",
            1,
            r0.next_root.as_ref().unwrap(),
            "2026-01-15T12:01:00Z",
            vec![],
            vec![],
            transition("b"),
        )
        .with_computed_next_root()
        .unwrap();

        let prefix = build_chain("corridor-a", &genesis, vec![r0], &[], None, no_signer, &ChainBuilderPolicy::default())
            .head
            .unwrap();

        let bootstrap = ChainBootstrap {
            start_sequence: prefix.receipt_count(),
            start_prev_root: prefix.final_state_root(),
            peaks: prefix.mmr.peaks(),
        };

        let bootstrapped = build_chain_from_bootstrap(
            "corridor-a",
            &genesis,
            &bootstrap,
            vec![r1],
            &[],
            None,
            no_signer,
            &ChainBuilderPolicy::default(),
        )
        .head
        .unwrap();

        let err = prove_receipt(&bootstrapped, 1, None).unwrap_err();
        assert!(matches!(err, ChainError::IncompleteMmrHistory { .. }));
    }
}
