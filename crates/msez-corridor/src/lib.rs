//! # msez-corridor — Verifiable Corridor State Channel Core
//!
//! Implements the corridor state-channel model described in `msez-core`'s
//! and `msez-vc`'s building blocks:
//!
//! - **Genesis** (`genesis.rs`): binds a corridor's identity, definition,
//!   agreement set, and starting digest sets into the root a corridor's
//!   first receipt links from.
//!
//! - **Digest sets** (`digest_set.rs`): normalization and superset
//!   checking for `lawpack_digest_set`/`ruleset_digest_set`, and the
//!   `DigestRef` attachment type.
//!
//! - **Receipt** (`receipt.rs`): the Corridor State Receipt — a signed
//!   state transition linking `prev_root` to a computed `next_root`.
//!
//! - **Fork** (`fork.rs`): the externally-supplied, signed artifact that
//!   resolves a fork in favor of one `next_root` candidate. Deliberately
//!   not automatic — an auditable decision, not a network-timing race.
//!
//! - **Chain** (`chain.rs`): assembles a canonical, linear chain out of a
//!   receipt set plus any fork-resolution artifacts, and recomputes the
//!   Merkle Mountain Range (`msez-crypto`) over it.
//!
//! - **Checkpoint** (`checkpoint.rs`): a signed snapshot of a chain head,
//!   letting verifiers trust corridor state without replaying history.
//!
//! - **Completeness** (`completeness.rs`): walks a receipt's digest sets
//!   and transition attachments against a [`msez_crypto::CasStoreSet`],
//!   optionally following nested attachments transitively, and reports
//!   every digest that resolves nowhere.
//!
//! - **Inclusion** (`inclusion.rs`): inclusion proofs for individual
//!   receipts, optionally bound to a checkpoint.
//!
//! - **Watcher** (`watcher.rs`): watcher attestation comparison —
//!   staleness, fork, lag, and checkpoint-divergence classification, plus
//!   quorum evaluation.
//!
//! - **Finality** (`finality.rs`): the monotonic finality ladder, computed
//!   fresh from whatever evidence is on hand.
//!
//! - **Authority** (`authority.rs`): per-corridor trust anchors and
//!   delegation chains, scoping which signers count for which attestation
//!   kinds.
//!
//! - **Context** (`context.rs`): `VerifierContext` — the explicit bundle
//!   of schema validator, CAS store set, and trust anchors a verification
//!   entry point needs, in place of any process-wide singleton.
//!
//! - **Anchor** (`anchor.rs`): the credential recording an L1 anchor of a
//!   checkpoint digest. Corridors are L1-optional; this is an additional
//!   finality rung, not a dependency.
//!
//! - **VC kinds** (`vc_kinds.rs`): Agreement, Definition, and
//!   Transition-Type-Registry-Lock credentials — the governance artifacts
//!   a genesis root's digests are drawn from.
//!
//! ## Crate Policy
//!
//! - Depends on `msez-core`, `msez-crypto`, and `msez-vc` internally.
//! - Every digest computation flows through `CanonicalBytes`; no ad hoc
//!   `serde_json::to_vec` for anything that gets hashed or signed.
//! - Receipt chains use `MerkleMountainRange` from `msez-crypto`, never a
//!   hand-rolled accumulator.

pub mod anchor;
pub mod authority;
pub mod chain;
pub mod checkpoint;
pub mod completeness;
pub mod context;
pub mod digest_set;
pub mod error;
pub mod finality;
pub mod fork;
pub mod genesis;
pub mod inclusion;
pub mod receipt;
pub mod vc_kinds;
pub mod watcher;

pub use anchor::{AnchorCredential, AnchorSubject, ANCHOR_CREDENTIAL_TYPE};
pub use authority::{
    effective_trust_anchors, resolve_delegation_chain, AuthorityRegistrySubject, AuthorityRegistryVc,
    DelegationError, TrustAnchor, TrustAnchorSet, AUTHORITY_REGISTRY_DELEGATION_KIND, AUTHORITY_REGISTRY_TYPE,
};
pub use chain::{
    build_chain, build_chain_from_bootstrap, ChainBootstrap, ChainBuildReport, ChainBuilderPolicy,
    ChainHead,
};
pub use checkpoint::{Checkpoint, PeakSnapshot};
pub use completeness::{check_receipt_completeness, require_receipt_completeness, MissingArtifact};
pub use context::VerifierContext;
pub use digest_set::{is_superset, normalize_digest_set, DigestRef};
pub use error::{ChainError, ReceiptError, WatcherError};
pub use finality::{compute_finality_level, FinalityEvidence, FinalityLevel};
pub use fork::ForkResolutionArtifact;
pub use genesis::genesis_root;
pub use inclusion::{prove_receipt, verify_receipt_inclusion};
pub use receipt::{CorridorStateReceipt, TransitionEnvelope, RECEIPT_TYPE};
pub use vc_kinds::{
    AgreementCredential, AgreementSubject, DefinitionCredential, DefinitionSubject, SigningThreshold,
    TransitionTypeRegistryLockCredential, TransitionTypeRegistryLockSubject,
};
pub use watcher::{
    classify_attestation, evaluate_quorum, AttestationClassification, QuorumPolicy, QuorumResult,
    WatcherAttestationSubject, WatcherAttestationVc,
};
