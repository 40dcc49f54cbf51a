//! # Proof Envelope — `MsezEd25519Signature2025`
//!
//! Defines the single proof type the corridor core ever produces or
//! accepts: an Ed25519 signature over the canonical bytes of a document
//! with its `proof` field removed. Proof verification never depends on the
//! shape of the document beyond that — receipts, checkpoints, and VC
//! `credentialSubject` payloads are all signed the same way.
//!
//! ## Multi-sign semantics
//!
//! A document's `proof` field is `None`, a single object, or an array of
//! objects. [`attach_proof`] normalizes all three on read and, on write,
//! converts a single proof into a two-element array rather than
//! overwriting it — corridor documents accumulate signatures, they never
//! lose one.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use msez_core::{CanonicalBytes, Timestamp};
use msez_crypto::{Ed25519KeyPair, Ed25519PublicKey, Ed25519Signature};

use thiserror::Error;

/// The only proof type this core emits or accepts.
pub const PROOF_TYPE: &str = "MsezEd25519Signature2025";

/// `proofPurpose` values the verifier accepts.
pub const ALLOWED_PROOF_PURPOSES: &[&str] = &["assertionMethod"];

#[derive(Error, Debug)]
pub enum VcError {
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] msez_core::CanonicalizationError),

    #[error("crypto error: {0}")]
    Crypto(#[from] msez_crypto::CryptoError),

    #[error("malformed proof: {0}")]
    MalformedProof(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A single cryptographic proof attached to a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Proof {
    #[serde(rename = "type")]
    pub proof_type: String,
    pub created: String,
    #[serde(rename = "verificationMethod")]
    pub verification_method: String,
    #[serde(rename = "proofPurpose")]
    pub proof_purpose: String,
    pub jws: String,
}

/// The `proof` field of a document: absent, a single object, or a list.
/// Always (de)serializes in whichever shape was present on the wire; code
/// that wants a uniform view should call [`ProofSet::as_slice`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ProofSet {
    One(Proof),
    Many(Vec<Proof>),
}

impl ProofSet {
    pub fn as_slice(&self) -> &[Proof] {
        match self {
            ProofSet::One(p) => std::slice::from_ref(p),
            ProofSet::Many(ps) => ps,
        }
    }

    pub fn into_vec(self) -> Vec<Proof> {
        match self {
            ProofSet::One(p) => vec![p],
            ProofSet::Many(ps) => ps,
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Append a proof to an existing set, converting a single proof into a
    /// two-element list. Never drops an existing proof.
    pub fn append(existing: Option<ProofSet>, new_proof: Proof) -> ProofSet {
        match existing {
            None => ProofSet::One(new_proof),
            Some(ProofSet::One(p)) => ProofSet::Many(vec![p, new_proof]),
            Some(ProofSet::Many(mut ps)) => {
                ps.push(new_proof);
                ProofSet::Many(ps)
            }
        }
    }
}

/// The outcome of verifying a single proof within a set.
#[derive(Debug, Clone)]
pub struct ProofVerification {
    pub verification_method: String,
    pub ok: bool,
    pub error: Option<String>,
}

/// Constant-time ASCII comparison, used for the proof `type` field so a
/// malformed/near-miss type string doesn't leak timing information about
/// where the mismatch occurred.
fn constant_time_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        diff |= x ^ y;
    }
    diff == 0
}

/// Computes the bytes a proof is signed over: the canonical JSON of `doc`
/// with its `proof` field (if any) removed.
pub fn signing_bytes(doc: &impl Serialize) -> Result<CanonicalBytes, VcError> {
    let mut value = serde_json::to_value(doc)?;
    if let Value::Object(ref mut map) = value {
        map.remove("proof");
    }
    CanonicalBytes::new(&value).map_err(Into::into)
}

/// Signs `doc` (proof field, if present, is ignored for the signing input)
/// and returns a new [`Proof`] ready to be attached via [`ProofSet::append`].
pub fn sign_document(
    doc: &impl Serialize,
    keypair: &Ed25519KeyPair,
    verification_method: &str,
    proof_purpose: &str,
    created: Option<Timestamp>,
) -> Result<Proof, VcError> {
    let bytes = signing_bytes(doc)?;
    let sig = keypair.sign(&bytes);
    let created = created.unwrap_or_else(Timestamp::now_effective);
    Ok(Proof {
        proof_type: PROOF_TYPE.to_string(),
        created: created.to_iso8601(),
        verification_method: verification_method.to_string(),
        proof_purpose: proof_purpose.to_string(),
        jws: base64_url_encode(sig.as_bytes()),
    })
}

/// Validates a single proof's structural shape (type, purpose, RFC3339
/// `created`, base64url `jws`) without touching cryptography.
fn validate_proof_shape(proof: &Proof) -> Result<(), String> {
    if !constant_time_eq(&proof.proof_type, PROOF_TYPE) {
        return Err(format!("unsupported proof type: {}", proof.proof_type));
    }
    if !ALLOWED_PROOF_PURPOSES.contains(&proof.proof_purpose.as_str()) {
        return Err(format!("unsupported proofPurpose: {}", proof.proof_purpose));
    }
    if msez_core::Timestamp::parse_rfc3339(&proof.created).is_err() {
        return Err(format!("malformed created timestamp: {}", proof.created));
    }
    if base64_url_decode(&proof.jws).is_err() {
        return Err(format!("malformed jws (not base64url): {}", proof.jws));
    }
    Ok(())
}

/// Verifies every proof in `proofs` against `doc`'s signing bytes, resolving
/// each proof's verification method to an Ed25519 public key via `resolve`.
/// Aggregates per-proof results rather than stopping at the first failure.
pub fn verify_proofs(
    doc: &impl Serialize,
    proofs: &ProofSet,
    resolve: impl Fn(&str) -> Result<Ed25519PublicKey, VcError>,
) -> Result<Vec<ProofVerification>, VcError> {
    let bytes = signing_bytes(doc)?;
    let mut results = Vec::with_capacity(proofs.len());
    for proof in proofs.as_slice() {
        let result = verify_single_proof(&bytes, proof, &resolve);
        results.push(result);
    }
    Ok(results)
}

fn verify_single_proof(
    bytes: &CanonicalBytes,
    proof: &Proof,
    resolve: &impl Fn(&str) -> Result<Ed25519PublicKey, VcError>,
) -> ProofVerification {
    let vm = proof.verification_method.clone();
    let attempt = (|| -> Result<(), String> {
        validate_proof_shape(proof)?;
        let pubkey = resolve(&proof.verification_method).map_err(|e| e.to_string())?;
        let sig_bytes = base64_url_decode(&proof.jws).map_err(|e| e.to_string())?;
        if sig_bytes.len() != 64 {
            return Err(format!("jws decodes to {} bytes, expected 64", sig_bytes.len()));
        }
        let mut arr = [0u8; 64];
        arr.copy_from_slice(&sig_bytes);
        let signature = Ed25519Signature::from_bytes(arr);
        let vk = pubkey.to_verifying_key().map_err(|e| e.to_string())?;
        msez_crypto::ed25519::verify(bytes, &signature, &vk).map_err(|e| e.to_string())
    })();

    match attempt {
        Ok(()) => ProofVerification {
            verification_method: vm,
            ok: true,
            error: None,
        },
        Err(e) => ProofVerification {
            verification_method: vm,
            ok: false,
            error: Some(e),
        },
    }
}

fn base64_url_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn base64_url_decode(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(s)
}
