//! # Governance Credential Kinds
//!
//! Agreement, Definition, and Transition-Type-Registry-Lock credentials
//! feed a corridor's genesis root (`agreement_set_sha256`,
//! `definition_payload_sha256`) and its transition-kind allow-list. They
//! share `VerifiableCredential`'s envelope and proof machinery and differ
//! only in `credentialSubject` shape.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use msez_vc::VerifiableCredential;

pub const AGREEMENT_CREDENTIAL_TYPE: &str = "AgreementCredential";
pub const DEFINITION_CREDENTIAL_TYPE: &str = "DefinitionCredential";
pub const TRANSITION_TYPE_REGISTRY_LOCK_CREDENTIAL_TYPE: &str = "TransitionTypeRegistryLockCredential";

/// A per-role signing threshold an Agreement or a corridor's checkpoint
/// policy may impose (§4.5 step 3, §4.6). `roles` maps a role name (e.g.
/// `"originator"`, `"correspondent"`) to the DIDs that hold it; `required`
/// names the minimum number of each role's DIDs that must appear among the
/// (already verified, already trust-anchor-authorized) signer set. A role
/// absent from `required` is not enforced.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SigningThreshold {
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub required: BTreeMap<String, u32>,
}

impl SigningThreshold {
    /// True when `signer_dids` satisfies every role's `required` count.
    pub fn is_satisfied_by(&self, signer_dids: &BTreeSet<String>) -> bool {
        self.required.iter().all(|(role, needed)| {
            let holders = self.roles.get(role).map(Vec::as_slice).unwrap_or(&[]);
            let present = holders.iter().filter(|did| signer_dids.contains(*did)).count() as u32;
            present >= *needed
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AgreementSubject {
    pub corridor_id: String,
    /// DIDs of the parties bound by this agreement.
    pub parties: Vec<String>,
    pub payload_sha256: String,
    /// The receipt-signing threshold this agreement imposes, if any
    /// (§4.5 step 3). Absent when the agreement requires no more than
    /// "some valid, authorized signature," which
    /// `ChainBuilderPolicy::require_valid_signatures` alone already covers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing_threshold: Option<SigningThreshold>,
}

pub type AgreementCredential = VerifiableCredential<AgreementSubject>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DefinitionSubject {
    pub corridor_id: String,
    pub payload_sha256: String,
    pub lawpack_digest_set: Vec<String>,
}

pub type DefinitionCredential = VerifiableCredential<DefinitionSubject>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransitionTypeRegistryLockSubject {
    pub corridor_id: String,
    /// Digest of the transition-type registry this lock freezes.
    pub registry_digest_sha256: String,
    /// Transition `kind` values the locked registry permits.
    pub allowed_kinds: Vec<String>,
}

pub type TransitionTypeRegistryLockCredential = VerifiableCredential<TransitionTypeRegistryLockSubject>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn agreement_credential_round_trips() {
        let subject = AgreementSubject {
            corridor_id: "corridor-a".to_string(),
            parties: vec!["did:key:zAlice".to_string(), "did:key:zBob".to_string()],
            payload_sha256: "aa".repeat(32),
            signing_threshold: None,
        };
        let vc = AgreementCredential::new(AGREEMENT_CREDENTIAL_TYPE, "did:key:zIssuer", subject.clone());
        let json = serde_json::to_string(&vc).unwrap();
        let back: AgreementCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(back.credential_subject, subject);
    }

    #[test]
    fn transition_type_registry_lock_round_trips() {
        let subject = TransitionTypeRegistryLockSubject {
            corridor_id: "corridor-a".to_string(),
            registry_digest_sha256: "bb".repeat(32),
            allowed_kinds: vec!["payment.settle".to_string()],
        };
        let vc = TransitionTypeRegistryLockCredential::new(
            TRANSITION_TYPE_REGISTRY_LOCK_CREDENTIAL_TYPE,
            "did:key:zIssuer",
            subject.clone(),
        );
        let json = serde_json::to_string(&vc).unwrap();
        let back: TransitionTypeRegistryLockCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(back.credential_subject, subject);
    }

    fn two_role_threshold() -> SigningThreshold {
        SigningThreshold {
            roles: BTreeMap::from([
                ("originator".to_string(), vec!["did:key:zAlice".to_string()]),
                (
                    "correspondent".to_string(),
                    vec!["did:key:zBob".to_string(), "did:key:zCarol".to_string()],
                ),
            ]),
            required: BTreeMap::from([("originator".to_string(), 1), ("correspondent".to_string(), 2)]),
        }
    }

    #[test]
    fn threshold_is_satisfied_only_once_every_role_meets_its_count() {
        let threshold = two_role_threshold();

        let only_originator: BTreeSet<String> = ["did:key:zAlice".to_string()].into_iter().collect();
        assert!(!threshold.is_satisfied_by(&only_originator));

        let one_correspondent: BTreeSet<String> =
            ["did:key:zAlice".to_string(), "did:key:zBob".to_string()].into_iter().collect();
        assert!(!threshold.is_satisfied_by(&one_correspondent));

        let both_correspondents: BTreeSet<String> = [
            "did:key:zAlice".to_string(),
            "did:key:zBob".to_string(),
            "did:key:zCarol".to_string(),
        ]
        .into_iter()
        .collect();
        assert!(threshold.is_satisfied_by(&both_correspondents));
    }

    #[test]
    fn role_absent_from_required_is_never_enforced() {
        let threshold = SigningThreshold {
            roles: BTreeMap::from([("observer".to_string(), vec!["did:key:zObserver".to_string()])]),
            required: BTreeMap::new(),
        };
        assert!(threshold.is_satisfied_by(&BTreeSet::new()));
    }
}
