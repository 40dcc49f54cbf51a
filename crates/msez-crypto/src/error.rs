//! # Crypto Error Types
//!
//! Errors raised by the Ed25519, `did:key`, MMR, and CAS operations in this
//! crate. Kept separate from `msez_core::MsezError` so callers that only
//! touch crypto primitives don't need to match on unrelated variants.

use thiserror::Error;

/// Error in cryptographic or identity operations.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Signature verification failed.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// Key generation or parsing failed.
    #[error("key error: {0}")]
    KeyError(String),

    /// Digest computation failed.
    #[error("digest error: {0}")]
    DigestError(String),

    /// A `did:key` string was malformed (bad prefix, bad base58, wrong
    /// multicodec, or wrong decoded key length).
    #[error("did:key error: {0}")]
    DidError(String),
}

/// Error raised by the content-addressed store.
#[derive(Error, Debug)]
pub enum CasError {
    /// No artifact exists at the requested `(type, digest)`.
    #[error("artifact not found: {artifact_type}/{digest}")]
    NotFound {
        /// The artifact type directory.
        artifact_type: String,
        /// The requested digest.
        digest: String,
    },

    /// Content already stored at this digest does not hash to it.
    #[error("hash collision writing {artifact_type}/{digest}: existing content does not match")]
    HashCollision {
        /// The artifact type directory.
        artifact_type: String,
        /// The digest the write declared.
        digest: String,
    },

    /// Content read back from the store does not hash to its file name.
    #[error("integrity warning reading {artifact_type}/{digest}: content hashes to {actual}")]
    IntegrityMismatch {
        /// The artifact type directory.
        artifact_type: String,
        /// The digest named by the file path.
        digest: String,
        /// The digest actually produced by the file's content.
        actual: String,
    },

    /// Underlying filesystem I/O failure.
    #[error("cas io error: {0}")]
    Io(#[from] std::io::Error),

    /// A referenced artifact's own attachments name a digest that resolves
    /// nowhere in any configured store root — the commitment set is not
    /// transitively complete.
    #[error("missing transitive reference: {artifact_type}/{digest}, required by {required_by}")]
    MissingTransitiveReference {
        /// The artifact type directory of the missing reference.
        artifact_type: String,
        /// The missing digest.
        digest: String,
        /// `<type>/<digest>` of the artifact whose attachment named it.
        required_by: String,
    },
}
