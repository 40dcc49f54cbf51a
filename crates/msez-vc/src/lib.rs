//! # msez-vc — Verifiable Credentials
//!
//! Implements the corridor core's single Verifiable-Credential shape and
//! proof envelope:
//!
//! - **Credential** (`credential.rs`): the generic `VerifiableCredential<T>`
//!   envelope (W3C VC Data Model v2.0 shape), temporal validation, and
//!   proof attach/verify.
//!
//! - **Proof** (`proof.rs`): the `MsezEd25519Signature2025` proof type —
//!   signing input, multi-sign append semantics, and aggregated
//!   per-proof verification.
//!
//! - **JWK** (`jwk.rs`): loading and generating Ed25519 signing keys in JWK
//!   form, including the two on-disk shapes proof-signing keys are
//!   distributed in.
//!
//! ## Security Invariant
//!
//! All signing inputs are computed from `CanonicalBytes` via
//! `msez-crypto`. Proof signing uses real Ed25519 — no mocking in
//! production paths.
//!
//! ## Crate Policy
//!
//! - Depends on `msez-core` and `msez-crypto` internally.
//! - `credentialSubject` is generic over the caller's payload type.
//! - Every credential kind in the corridor core is a
//!   `VerifiableCredential<T>` instantiation — there is no separate
//!   per-kind envelope implementation to keep in sync.

pub mod credential;
pub mod jwk;
pub mod proof;

pub use credential::{VerifiableCredential, DEFAULT_CONTEXT};
pub use jwk::{
    generate_ed25519_jwk, load_ed25519_private_key_from_jwk, load_proof_keypair,
    public_jwk_from_private_jwk, resolve_did_key, Jwk, ProofKeypair,
};
pub use proof::{
    sign_document, signing_bytes, verify_proofs, Proof, ProofSet, ProofVerification, VcError,
    ALLOWED_PROOF_PURPOSES, PROOF_TYPE,
};
