//! # msez-core — Foundational Types for the MSEZ Verifiable State Channel Core
//!
//! This crate is the bedrock of the core. It defines the type-system
//! primitives that enforce correctness guarantees at compile time. Every
//! other crate in the workspace depends on `msez-core`; it depends on
//! nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `CorridorId`, `Did` — all
//!    newtypes, no bare strings passed across module boundaries.
//!
//! 2. **`CanonicalBytes` newtype.** ALL digest computation flows through
//!    `CanonicalBytes::new()`. No raw `serde_json::to_vec()` for digests. Ever.
//!    This prevents the canonicalization split defect class by construction.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with Z suffix
//!    and seconds precision — matching the canonical-bytes datetime rule.
//!
//! 4. **`sha256_digest()` (in `msez-crypto`) accepts only `&CanonicalBytes`.**
//!    Compile-time enforcement that all digest paths flow through canonicalization.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `msez-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement `Serialize`/`Deserialize`.

pub mod canonical;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use canonical::CanonicalBytes;
pub use digest::{ContentDigest, DigestAlgorithm};
pub use error::{CanonicalizationError, MsezError};
pub use identity::{CorridorId, Did};
pub use temporal::Timestamp;
