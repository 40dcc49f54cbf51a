//! # Transitive Artifact Completeness
//!
//! A receipt's `lawpack_digest_set`, `ruleset_digest_set`, and transition
//! `attachments` name artifacts by digest; those artifacts may themselves
//! carry further `attachments` (a lawpack bundle referencing the rulesets
//! it was checked against, a ruleset referencing a compiled circuit). A
//! verifier running under `--require-artifacts` only needs the artifacts a
//! receipt names directly to resolve in the CAS; one running under
//! `--transitive-require-artifacts` walks the whole reachable set and
//! reports every digest that resolves nowhere, not just the first.

use std::collections::BTreeSet;

use msez_core::{ContentDigest, DigestAlgorithm};
use msez_crypto::CasStoreSet;

use crate::digest_set::DigestRef;
use crate::error::ChainError;
use crate::receipt::CorridorStateReceipt;

/// One digest, named as an attachment somewhere in the walked set, that
/// does not resolve in any configured CAS root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingArtifact {
    pub artifact_type: String,
    pub digest: String,
    /// `<type>/<digest>` of the artifact whose attachment list named it —
    /// `"receipt"` for a digest named directly by the receipt itself.
    pub required_by: String,
}

/// A digest reference paired with the artifact type it should resolve
/// under, and what named it — used while walking attachments that may
/// nest arbitrarily deep.
struct PendingRef {
    artifact_type: String,
    digest: String,
    required_by: String,
    /// `0` for a digest the receipt names directly; `> 0` for one found
    /// while expanding an artifact's own `attachments`.
    depth: u32,
}

fn parse_digest_hex(hex: &str) -> Option<ContentDigest> {
    if hex.len() != 64 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let mut bytes = [0u8; 32];
    for (i, b) in bytes.iter_mut().enumerate() {
        *b = u8::from_str_radix(&hex[i * 2..i * 2 + 2], 16).ok()?;
    }
    Some(ContentDigest::new(DigestAlgorithm::Sha256, bytes))
}

/// Resolves a single `(type, digest)` pair in `store`. When `transitive`
/// is set, also parses the artifact's content for a top-level
/// `"attachments"` array and queues whatever `DigestRef`s it finds for
/// further walking. Artifacts whose content isn't a JSON object, or that
/// carry no `attachments` field, are leaves either way.
fn expand(
    store: &CasStoreSet,
    pending: &PendingRef,
    transitive: bool,
    queue: &mut Vec<PendingRef>,
) -> Option<MissingArtifact> {
    let Some(digest) = parse_digest_hex(&pending.digest) else {
        return Some(MissingArtifact {
            artifact_type: pending.artifact_type.clone(),
            digest: pending.digest.clone(),
            required_by: pending.required_by.clone(),
        });
    };

    let bytes = match store.resolve_bytes(&pending.artifact_type, &digest) {
        Ok(bytes) => bytes,
        Err(_) => {
            return Some(MissingArtifact {
                artifact_type: pending.artifact_type.clone(),
                digest: pending.digest.clone(),
                required_by: pending.required_by.clone(),
            })
        }
    };

    if !transitive {
        return None;
    }

    let Ok(serde_json::Value::Object(obj)) = serde_json::from_slice::<serde_json::Value>(&bytes) else {
        return None;
    };
    let Some(serde_json::Value::Array(attachments)) = obj.get("attachments") else {
        return None;
    };

    let required_by = format!("{}/{}", pending.artifact_type, pending.digest);
    for raw in attachments {
        let Ok(attachment) = serde_json::from_value::<DigestRef>(raw.clone()) else {
            continue;
        };
        let artifact_type = match &attachment {
            DigestRef::Typed { artifact_type, .. } => artifact_type.clone(),
            DigestRef::Raw(_) => "blob".to_string(),
        };
        queue.push(PendingRef {
            artifact_type,
            digest: attachment.digest_hex().to_string(),
            required_by: required_by.clone(),
            depth: pending.depth + 1,
        });
    }

    None
}

/// Walks every digest a receipt names — `lawpack_digest_set`,
/// `ruleset_digest_set`, and its transition's `attachments` — and, when
/// `transitive` is true, every attachment those artifacts themselves
/// name, recursively. Returns every digest that never resolved; an empty
/// result means the receipt's commitment set is (transitively) complete
/// in `store`.
///
/// A digest already visited is never re-queued, so a cycle in attachment
/// references terminates rather than looping.
pub fn check_receipt_completeness(
    store: &CasStoreSet,
    receipt: &CorridorStateReceipt,
    transitive: bool,
) -> Vec<MissingArtifact> {
    let mut queue = Vec::new();
    for digest in &receipt.lawpack_digest_set {
        queue.push(PendingRef {
            artifact_type: "lawpack".to_string(),
            digest: digest.clone(),
            required_by: "receipt".to_string(),
            depth: 0,
        });
    }
    for digest in &receipt.ruleset_digest_set {
        queue.push(PendingRef {
            artifact_type: "ruleset".to_string(),
            digest: digest.clone(),
            required_by: "receipt".to_string(),
            depth: 0,
        });
    }
    for attachment in &receipt.transition.attachments {
        let artifact_type = match attachment {
            DigestRef::Typed { artifact_type, .. } => artifact_type.clone(),
            DigestRef::Raw(_) => "blob".to_string(),
        };
        queue.push(PendingRef {
            artifact_type,
            digest: attachment.digest_hex().to_string(),
            required_by: "receipt".to_string(),
            depth: 0,
        });
    }

    let mut missing = Vec::new();
    let mut visited: BTreeSet<(String, String)> = BTreeSet::new();

    while let Some(pending) = queue.pop() {
        let key = (pending.artifact_type.clone(), pending.digest.clone());
        if !visited.insert(key) {
            continue;
        }
        // Every queued digest is resolved regardless of `transitive` — in
        // direct-only mode the queue only ever holds depth-0 entries,
        // since `expand` won't enqueue an artifact's own attachments
        // unless `transitive` is set.
        if let Some(gap) = expand(store, &pending, transitive, &mut queue) {
            missing.push(gap);
        }
    }

    missing
}

/// Checks completeness and turns the first gap (if any) into a
/// [`ChainError::Cas`] `MissingTransitiveReference`, for callers that want
/// a hard failure rather than a report to render themselves.
pub fn require_receipt_completeness(
    store: &CasStoreSet,
    receipt: &CorridorStateReceipt,
    transitive: bool,
) -> Result<(), ChainError> {
    if let Some(gap) = check_receipt_completeness(store, receipt, transitive).into_iter().next() {
        return Err(ChainError::Cas(msez_crypto::CasError::MissingTransitiveReference {
            artifact_type: gap.artifact_type,
            digest: gap.digest,
            required_by: gap.required_by,
        }));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::receipt::TransitionEnvelope;
    use msez_crypto::CasStoreSet;
    use serde_json::json;

    fn transition_with_attachments(attachments: Vec<DigestRef>) -> TransitionEnvelope {
        TransitionEnvelope {
            kind: "payment.settle".to_string(),
            payload: None,
            payload_sha256: None,
            schema_digest_sha256: None,
            ruleset_digest_sha256: None,
            zk_circuit_digest_sha256: None,
            attachments,
        }
    }

    fn sample_receipt(lawpacks: Vec<String>, attachments: Vec<DigestRef>) -> CorridorStateReceipt {
        CorridorStateReceipt::new(
            "corridor-a",
            0,
            "00".repeat(32),
            "2026-01-15T12:00:00Z",
            lawpacks,
            vec![],
            transition_with_attachments(attachments),
        )
    }

    #[test]
    fn receipt_with_no_references_is_trivially_complete() {
        let dir = tempfile::tempdir().unwrap();
        let store = CasStoreSet::single(dir.path());
        let receipt = sample_receipt(vec![], vec![]);
        assert!(check_receipt_completeness(&store, &receipt, true).is_empty());
    }

    #[test]
    fn missing_direct_reference_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = CasStoreSet::single(dir.path());
        let receipt = sample_receipt(vec!["ab".repeat(32)], vec![]);
        let missing = check_receipt_completeness(&store, &receipt, true);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].artifact_type, "lawpack");
        assert_eq!(missing[0].required_by, "receipt");
    }

    #[test]
    fn transitive_walk_follows_nested_attachments() {
        let dir = tempfile::tempdir().unwrap();
        let store = CasStoreSet::single(dir.path());

        // Store a ruleset whose own attachments name a circuit that is
        // never stored.
        let missing_circuit_hex = "cd".repeat(32);
        let ruleset_digest = store
            .store(
                "ruleset",
                &json!({
                    "type": "ruleset",
                    "attachments": [{"artifact_type": "circuit", "digest_sha256": missing_circuit_hex}],
                }),
            )
            .unwrap();

        let receipt = sample_receipt(
            vec![],
            vec![DigestRef::Typed {
                artifact_type: "ruleset".to_string(),
                digest_sha256: ruleset_digest.to_hex(),
                uri: None,
            }],
        );

        let direct_only = check_receipt_completeness(&store, &receipt, false);
        assert!(direct_only.is_empty(), "the ruleset itself resolves directly");

        let transitive = check_receipt_completeness(&store, &receipt, true);
        assert_eq!(transitive.len(), 1);
        assert_eq!(transitive[0].artifact_type, "circuit");
        assert_eq!(transitive[0].digest, missing_circuit_hex);
        assert_eq!(transitive[0].required_by, format!("ruleset/{}", ruleset_digest.to_hex()));
    }

    #[test]
    fn require_receipt_completeness_surfaces_a_cas_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = CasStoreSet::single(dir.path());
        let receipt = sample_receipt(vec!["ef".repeat(32)], vec![]);
        let err = require_receipt_completeness(&store, &receipt, false).unwrap_err();
        assert!(matches!(err, ChainError::Cas(msez_crypto::CasError::MissingTransitiveReference { .. })));
    }
}
