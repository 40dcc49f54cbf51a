//! # msez-schema
//!
//! Pluggable JSON Schema validation for MSEZ corridor entities: receipts,
//! checkpoints, inclusion proofs, watcher attestations, fork-resolution
//! artifacts, anchor and finality-status documents, the authority registry,
//! and the VC-shaped agreement/definition/transition-type-registry-lock
//! credentials.
//!
//! Validation is optional and injected via the [`SchemaValidator`] trait —
//! callers that don't need schema enforcement (unit tests building documents
//! in-process, for instance) use [`NullSchemaValidator`]; callers that do
//! wire a [`JsonSchemaValidator`] loaded from a `schemas/` directory.
//!
//! ## Crate Policy
//!
//! - Depends only on `msez-core` internally.
//! - Schema `$id` values are the `schema_id` strings passed to `validate`.

pub mod validate;

pub use validate::{JsonSchemaValidator, NullSchemaValidator, SchemaValidationError, SchemaValidator};

/// Schema ids every MSEZ entity validates under, matching the
/// `<id>.schema.json` file names shipped in `schemas/`.
pub const ENTITY_SCHEMA_IDS: &[&str] = &[
    "corridor.receipt",
    "corridor.checkpoint",
    "corridor.inclusion-proof",
    "vc.watcher-attestation",
    "vc.fork-resolution",
    "vc.anchor",
    "corridor.finality-status",
    "vc.authority-registry",
    "vc.agreement",
    "vc.definition",
    "vc.transition-type-registry-lock",
];
