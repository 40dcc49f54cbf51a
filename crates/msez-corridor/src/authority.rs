//! # Authority Registry & Trust Anchors
//!
//! A corridor's Authority Registry names the `did:key` identities allowed to
//! sign receipts, checkpoints, fork resolutions, and watcher attestations on
//! its behalf, and which attestation kinds each identity may sign. A trust
//! anchor may delegate its authority to another identity for a named scope;
//! delegation chains are resolved transitively but never cyclically.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use msez_vc::VerifiableCredential;

pub const AUTHORITY_REGISTRY_TYPE: &str = "MSEZAuthorityRegistry";

/// Attestation kind an Authority Registry VC delegates from parent to child
/// issuer (§4.9): a treaty-level registry names a national zone's issuer DID
/// as authorized to publish its own registry for the attestation kinds the
/// treaty names.
pub const AUTHORITY_REGISTRY_DELEGATION_KIND: &str = "authority_registry";

/// A single entry in an Authority Registry: an identity, the attestation
/// kinds it may sign, and an optional identity it delegates to for those
/// kinds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TrustAnchor {
    pub did: String,
    /// Attestation kinds this anchor may sign, e.g. `"corridor.receipt"`,
    /// `"corridor.checkpoint"`, `"fork.resolution"`, `"watcher.attestation"`.
    /// A single entry of `"*"` authorizes every kind.
    pub allowed_attestations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegates_to: Option<String>,
}

impl TrustAnchor {
    pub fn new(did: impl Into<String>, allowed_attestations: Vec<String>) -> Self {
        Self {
            did: did.into(),
            allowed_attestations,
            delegates_to: None,
        }
    }

    pub fn with_delegate(mut self, delegate_did: impl Into<String>) -> Self {
        self.delegates_to = Some(delegate_did.into());
        self
    }

    fn authorizes(&self, attestation_kind: &str) -> bool {
        self.allowed_attestations
            .iter()
            .any(|a| a == "*" || a == attestation_kind)
    }
}

/// A corridor's full set of trust anchors, keyed by DID.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TrustAnchorSet {
    pub corridor_id: String,
    pub anchors: Vec<TrustAnchor>,
}

impl TrustAnchorSet {
    pub fn new(corridor_id: impl Into<String>, anchors: Vec<TrustAnchor>) -> Self {
        Self {
            corridor_id: corridor_id.into(),
            anchors,
        }
    }

    fn find(&self, did: &str) -> Option<&TrustAnchor> {
        self.anchors.iter().find(|a| a.did == did)
    }

    /// True if `verification_method` (a `did:key:...#fragment`) is
    /// authorized, directly or via delegation, for `attestation_kind`.
    ///
    /// Delegation is followed up to the size of the anchor set, which
    /// bounds any cycle; a cycle that never reaches a directly-authorizing
    /// anchor resolves to `false` rather than looping forever.
    pub fn is_authorized(&self, verification_method: &str, attestation_kind: &str) -> bool {
        let did = did_from_verification_method(verification_method);
        let mut current = did;
        let mut seen = BTreeSet::new();

        for _ in 0..=self.anchors.len() {
            if !seen.insert(current.to_string()) {
                return false;
            }
            let Some(anchor) = self.find(current) else {
                return false;
            };
            if anchor.authorizes(attestation_kind) {
                return true;
            }
            match &anchor.delegates_to {
                Some(delegate) => current = delegate.as_str(),
                None => return false,
            }
        }
        false
    }

    /// The DIDs directly or transitively authorized for `attestation_kind`.
    pub fn effective_allow_list(&self, attestation_kind: &str) -> Vec<String> {
        self.anchors
            .iter()
            .filter(|a| self.is_authorized(&a.did, attestation_kind))
            .map(|a| a.did.clone())
            .collect()
    }
}

/// Strips a `did:key:...#fragment` verification method down to its bare
/// `did:key:...` identity; returns the input unchanged if there's no
/// fragment separator.
pub(crate) fn did_from_verification_method(verification_method: &str) -> &str {
    verification_method
        .split_once('#')
        .map(|(did, _)| did)
        .unwrap_or(verification_method)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorityRegistrySubject {
    #[serde(flatten)]
    pub registry: TrustAnchorSet,
}

pub type AuthorityRegistryVc = VerifiableCredential<AuthorityRegistrySubject>;

/// Failure modes when resolving an authority-registry delegation chain
/// (§4.9: treaty → national → zone).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DelegationError {
    #[error("delegation chain is empty")]
    EmptyChain,
    #[error("registry at position {position} (issuer {issuer}) is not authorized by its parent for `{AUTHORITY_REGISTRY_DELEGATION_KIND}`")]
    NotDelegated { position: usize, issuer: String },
}

/// Walks an ordered authority-registry VC chain (treaty first, leaf last)
/// and confirms each registry in the chain names its successor's issuer as
/// authorized for [`AUTHORITY_REGISTRY_DELEGATION_KIND`] — i.e. the parent
/// delegates the right to publish a registry to the child's issuer. Returns
/// the leaf registry's [`TrustAnchorSet`] once the whole chain checks out.
///
/// A single-element chain (no delegation, just a root registry) always
/// resolves to its own registry.
pub fn resolve_delegation_chain(
    chain: &[AuthorityRegistryVc],
) -> Result<&TrustAnchorSet, DelegationError> {
    if chain.is_empty() {
        return Err(DelegationError::EmptyChain);
    }

    for (position, window) in chain.windows(2).enumerate() {
        let parent = &window[0].credential_subject.registry;
        let child = &window[1];
        if !parent.is_authorized(&child.issuer, AUTHORITY_REGISTRY_DELEGATION_KIND) {
            return Err(DelegationError::NotDelegated {
                position: position + 1,
                issuer: child.issuer.clone(),
            });
        }
    }

    Ok(&chain.last().expect("non-empty chain").credential_subject.registry)
}

/// The effective allow-list for `attestation_kind`: the leaf registry's own
/// allow-list intersected with the module's separately-maintained trust
/// anchors (§4.9 — a zone's registry can only attest for DIDs the module
/// itself already recognizes; a zone cannot unilaterally mint new trust).
pub fn effective_trust_anchors(
    leaf_registry: &TrustAnchorSet,
    module_trust_anchors: &TrustAnchorSet,
    attestation_kind: &str,
) -> BTreeSet<String> {
    let leaf_allowed: BTreeSet<String> = leaf_registry
        .effective_allow_list(attestation_kind)
        .into_iter()
        .collect();
    let module_allowed: BTreeSet<String> = module_trust_anchors
        .effective_allow_list(attestation_kind)
        .into_iter()
        .collect();
    leaf_allowed.intersection(&module_allowed).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_set() -> TrustAnchorSet {
        TrustAnchorSet::new(
            "corridor-a",
            vec![
                TrustAnchor::new("did:key:zRoot", vec!["corridor.receipt".to_string(), "corridor.checkpoint".to_string()]),
                TrustAnchor::new("did:key:zWildcard", vec!["*".to_string()]),
                TrustAnchor::new("did:key:zDelegate", vec![]).with_delegate("did:key:zRoot"),
            ],
        )
    }

    #[test]
    fn direct_authorization() {
        let set = sample_set();
        assert!(set.is_authorized("did:key:zRoot#key-1", "corridor.receipt"));
        assert!(!set.is_authorized("did:key:zRoot#key-1", "fork.resolution"));
    }

    #[test]
    fn wildcard_authorizes_everything() {
        let set = sample_set();
        assert!(set.is_authorized("did:key:zWildcard", "anything.at.all"));
    }

    #[test]
    fn delegation_follows_to_the_delegate() {
        let set = sample_set();
        assert!(set.is_authorized("did:key:zDelegate", "corridor.receipt"));
        assert!(!set.is_authorized("did:key:zDelegate", "fork.resolution"));
    }

    #[test]
    fn unknown_did_is_unauthorized() {
        let set = sample_set();
        assert!(!set.is_authorized("did:key:zStranger", "corridor.receipt"));
    }

    #[test]
    fn delegation_cycle_resolves_to_false_not_a_loop() {
        let set = TrustAnchorSet::new(
            "c",
            vec![
                TrustAnchor::new("did:key:zA", vec![]).with_delegate("did:key:zB"),
                TrustAnchor::new("did:key:zB", vec![]).with_delegate("did:key:zA"),
            ],
        );
        assert!(!set.is_authorized("did:key:zA", "corridor.receipt"));
    }

    #[test]
    fn effective_allow_list_includes_delegates() {
        let set = sample_set();
        let allowed = set.effective_allow_list("corridor.receipt");
        assert!(allowed.contains(&"did:key:zRoot".to_string()));
        assert!(allowed.contains(&"did:key:zDelegate".to_string()));
        assert!(allowed.contains(&"did:key:zWildcard".to_string()));
    }

    fn registry_vc(issuer: &str, set: TrustAnchorSet) -> AuthorityRegistryVc {
        AuthorityRegistryVc::new(
            AUTHORITY_REGISTRY_TYPE,
            issuer,
            AuthorityRegistrySubject { registry: set },
        )
    }

    #[test]
    fn delegation_chain_of_one_resolves_to_its_own_registry() {
        let chain = vec![registry_vc("did:key:zTreaty", sample_set())];
        let resolved = resolve_delegation_chain(&chain).unwrap();
        assert_eq!(resolved.corridor_id, "corridor-a");
    }

    #[test]
    fn treaty_delegates_to_national_delegates_to_zone() {
        let zone_set = TrustAnchorSet::new(
            "zone-1",
            vec![TrustAnchor::new("did:key:zZoneSigner", vec!["corridor.receipt".to_string()])],
        );
        let treaty = registry_vc(
            "did:key:zTreaty",
            TrustAnchorSet::new(
                "treaty",
                vec![TrustAnchor::new(
                    "did:key:zNational",
                    vec![AUTHORITY_REGISTRY_DELEGATION_KIND.to_string()],
                )],
            ),
        );
        let national = registry_vc(
            "did:key:zNational",
            TrustAnchorSet::new(
                "national",
                vec![TrustAnchor::new(
                    "did:key:zZone",
                    vec![AUTHORITY_REGISTRY_DELEGATION_KIND.to_string()],
                )],
            ),
        );
        let zone = registry_vc("did:key:zZone", zone_set);

        let chain = vec![treaty, national, zone];
        let resolved = resolve_delegation_chain(&chain).unwrap();
        assert_eq!(resolved.corridor_id, "zone-1");
        assert!(resolved.is_authorized("did:key:zZoneSigner", "corridor.receipt"));
    }

    #[test]
    fn broken_delegation_link_is_rejected() {
        let treaty = registry_vc(
            "did:key:zTreaty",
            TrustAnchorSet::new(
                "treaty",
                vec![TrustAnchor::new("did:key:zSomeoneElse", vec![AUTHORITY_REGISTRY_DELEGATION_KIND.to_string()])],
            ),
        );
        let national = registry_vc("did:key:zNational", sample_set());

        let chain = vec![treaty, national];
        let err = resolve_delegation_chain(&chain).unwrap_err();
        assert_eq!(
            err,
            DelegationError::NotDelegated { position: 1, issuer: "did:key:zNational".to_string() }
        );
    }

    #[test]
    fn empty_chain_is_rejected() {
        let chain: Vec<AuthorityRegistryVc> = Vec::new();
        assert_eq!(resolve_delegation_chain(&chain).unwrap_err(), DelegationError::EmptyChain);
    }

    #[test]
    fn effective_trust_anchors_intersects_leaf_with_module_anchors() {
        let leaf = TrustAnchorSet::new(
            "zone-1",
            vec![
                TrustAnchor::new("did:key:zZoneSigner", vec!["corridor.receipt".to_string()]),
                TrustAnchor::new("did:key:zUnrecognized", vec!["corridor.receipt".to_string()]),
            ],
        );
        let module = TrustAnchorSet::new(
            "module",
            vec![TrustAnchor::new("did:key:zZoneSigner", vec!["corridor.receipt".to_string()])],
        );

        let effective = effective_trust_anchors(&leaf, &module, "corridor.receipt");
        assert!(effective.contains("did:key:zZoneSigner"));
        assert!(!effective.contains("did:key:zUnrecognized"));
    }
}
