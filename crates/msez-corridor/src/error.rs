//! # Corridor Error Types

use thiserror::Error;

/// Errors raised while validating or assembling a single Corridor State
/// Receipt, independent of its place in a chain.
#[derive(Error, Debug)]
pub enum ReceiptError {
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] msez_core::CanonicalizationError),

    #[error("receipt corridor_id '{actual}' does not match expected '{expected}'")]
    CorridorMismatch { expected: String, actual: String },

    #[error("next_root mismatch: receipt declares {declared}, recomputed {computed}")]
    NextRootMismatch { declared: String, computed: String },

    #[error("digest set mismatch: {0}")]
    DigestSetMismatch(String),

    #[error("transition envelope missing both 'kind' and 'transition_kind'")]
    MissingTransitionKind,

    #[error("receipt serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors raised while building or extending a receipt chain.
#[derive(Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    Receipt(#[from] ReceiptError),

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] msez_core::CanonicalizationError),

    #[error("crypto error: {0}")]
    Crypto(#[from] msez_crypto::CryptoError),

    #[error("vc error: {0}")]
    Vc(#[from] msez_vc::VcError),

    #[error(
        "fork at sequence {sequence} after prev_root {prev_root}: {count} competing next_root \
         candidates and no fork-resolution artifact names one of them"
    )]
    UnresolvedFork {
        sequence: u64,
        prev_root: String,
        count: usize,
    },

    #[error(
        "fork-resolution artifact for sequence {sequence} chooses next_root {chosen} but no \
         candidate receipt has that next_root"
    )]
    InvalidResolution { sequence: u64, chosen: String },

    #[error(
        "{count} fork-resolution artifacts for sequence {sequence} after prev_root {prev_root} \
         disagree on the chosen next_root"
    )]
    ConflictingResolutions {
        sequence: u64,
        prev_root: String,
        count: usize,
    },

    #[error("trust anchor violation: {0}")]
    Trust(String),

    #[error("checkpoint mismatch: {0}")]
    CheckpointMismatch(String),

    #[error("checkpoint signer set does not satisfy the required threshold: {0}")]
    InsufficientCheckpointSigners(String),

    #[error("cas error: {0}")]
    Cas(#[from] msez_crypto::CasError),

    #[error(
        "inclusion proof requested for a bootstrapped chain head (base_sequence {base_sequence}): \
         the MMR's pre-bootstrap leaf history was never replayed, so a proof for sequence {sequence} \
         cannot be built from it"
    )]
    IncompleteMmrHistory { base_sequence: u64, sequence: u64 },
}

/// Errors raised while comparing watcher attestations against a chain head.
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("vc error: {0}")]
    Vc(#[from] msez_vc::VcError),

    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] msez_core::CanonicalizationError),

    #[error("malformed quorum threshold: {0}")]
    MalformedQuorum(String),
}
