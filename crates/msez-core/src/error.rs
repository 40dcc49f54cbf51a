//! # Error Types — Structured Error Hierarchy
//!
//! Defines the error types shared across the core. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//! Crate-specific concerns (crypto, VC, chain-building) define their own
//! error enums downstream and compose them into `MsezError` via `#[from]`.

use thiserror::Error;

/// Top-level error type for callers that span more than one crate's concern.
#[derive(Error, Debug)]
pub enum MsezError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// Content integrity violation (CAS hash mismatch, tampered artifact).
    #[error("integrity error: {0}")]
    Integrity(String),

    /// Security policy violation (trust anchor, signature, quorum).
    #[error("security violation: {0}")]
    Security(String),

    /// Schema validation failure.
    #[error("schema validation error: {0}")]
    SchemaValidation(String),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    /// Amounts must be strings or integers.
    #[error("float values are not permitted in canonical representations; use string or integer for amount: {0}")]
    FloatRejected(f64),

    /// A JSON number could not be represented as an i64 or u64 (e.g. came
    /// from a non-integer, non-finite, or out-of-range source).
    #[error("unsupported number representation in canonical value")]
    UnsupportedNumber,

    /// A naive (timezone-less) datetime was encountered without an explicit
    /// instruction to assume UTC.
    #[error("ambiguous timestamp: naive datetime without explicit UTC assumption")]
    AmbiguousTimestamp,

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}
