//! # msez-crypto — Cryptographic Primitives
//!
//! Provides the cryptographic building blocks for the verifiable state
//! channel core:
//!
//! - **Ed25519** signing and verification for Verifiable Credential proofs.
//!   Signing input MUST be `&CanonicalBytes` — you cannot sign raw bytes.
//! - **`did:key`** encode/decode, Ed25519 only, two-byte multicodec on
//!   write, one-byte accepted on read for compatibility.
//! - **SHA-256** digest computation from `CanonicalBytes` (the only valid
//!   input type, enforcing canonicalization correctness).
//! - **Merkle Mountain Range (MMR)** for append-only corridor receipt chains.
//! - **Content-Addressed Storage (CAS)** for artifact store/resolve
//!   operations under `<root>/<type>/<digest>.*`.
//!
//! ## Crate Policy
//!
//! - Depends only on `msez-core` internally.
//! - No mocking of cryptographic operations in tests — all tests use real
//!   `CanonicalBytes`, real SHA-256, real Ed25519.
//! - `unsafe` prohibited without `// SAFETY:` justification.
//! - No raw `serde_json` serialization for digest computation — all digest
//!   paths flow through `CanonicalBytes::new()`.

pub mod cas;
pub mod did;
pub mod ed25519;
pub mod error;
pub mod mmr;
pub mod sha256;

pub use cas::{CasStore, CasStoreSet};
pub use did::{did_key_from_ed25519, ed25519_from_did_key};
pub use ed25519::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};
pub use error::{CasError, CryptoError};
pub use mmr::MerkleMountainRange;
pub use sha256::sha256_digest;
