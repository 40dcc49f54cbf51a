//! # Verifiable Credential Envelope
//!
//! A generic W3C-VC-Data-Model-v2.0-shaped envelope, parameterized over the
//! `credentialSubject` payload. Every credential kind the corridor core
//! issues (watcher attestations, agreement/definition credentials, anchor
//! credentials, authority-registry delegations, transition-type-registry
//! locks) is `VerifiableCredential<T>` for its own subject type `T` — the
//! envelope, temporal validation, and proof handling are shared.

use serde::{Deserialize, Serialize};

use msez_core::Timestamp;

use crate::proof::{sign_document, verify_proofs, ProofSet, ProofVerification, VcError};
use msez_crypto::{Ed25519KeyPair, Ed25519PublicKey};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifiableCredential<T> {
    #[serde(rename = "@context")]
    pub context: Vec<String>,
    #[serde(rename = "type")]
    pub vc_type: Vec<String>,
    pub issuer: String,
    #[serde(rename = "issuanceDate", skip_serializing_if = "Option::is_none")]
    pub issuance_date: Option<String>,
    #[serde(rename = "expirationDate", skip_serializing_if = "Option::is_none")]
    pub expiration_date: Option<String>,
    #[serde(rename = "credentialSubject")]
    pub credential_subject: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<ProofSet>,
}

/// The default `@context` every credential in this core carries.
pub const DEFAULT_CONTEXT: &[&str] = &["https://www.w3.org/ns/credentials/v2"];

impl<T: Serialize> VerifiableCredential<T> {
    pub fn new(vc_type: &str, issuer: impl Into<String>, credential_subject: T) -> Self {
        Self {
            context: DEFAULT_CONTEXT.iter().map(|s| s.to_string()).collect(),
            vc_type: vec!["VerifiableCredential".to_string(), vc_type.to_string()],
            issuer: issuer.into(),
            issuance_date: None,
            expiration_date: None,
            credential_subject,
            proof: None,
        }
    }

    pub fn with_issuance_date(mut self, ts: Timestamp) -> Self {
        self.issuance_date = Some(ts.to_iso8601());
        self
    }

    pub fn with_expiration_date(mut self, ts: Timestamp) -> Self {
        self.expiration_date = Some(ts.to_iso8601());
        self
    }

    /// Signs the credential (with its current `proof` field, if any,
    /// excluded from the signing input) and appends the resulting proof —
    /// never overwrites an existing one.
    pub fn attach_proof(
        &mut self,
        keypair: &Ed25519KeyPair,
        verification_method: &str,
        created: Option<Timestamp>,
    ) -> Result<(), VcError> {
        let proof = sign_document(self, keypair, verification_method, "assertionMethod", created)?;
        self.proof = Some(ProofSet::append(self.proof.take(), proof));
        Ok(())
    }

    /// Verifies every attached proof, resolving each verification method to
    /// a public key via `resolve`. Returns an empty vec if `proof` is absent.
    pub fn verify_proofs(
        &self,
        resolve: impl Fn(&str) -> Result<Ed25519PublicKey, VcError>,
    ) -> Result<Vec<ProofVerification>, VcError> {
        match &self.proof {
            None => Ok(Vec::new()),
            Some(proofs) => verify_proofs(self, proofs, resolve),
        }
    }

    /// Validates `issuanceDate`/`expirationDate` against `now`. Returns the
    /// list of temporal problems found (empty if the credential is
    /// currently valid). A 60-second clock-skew tolerance is applied to
    /// future-dated `issuanceDate` checks. A missing `expirationDate` means
    /// the credential never expires.
    pub fn validate_temporal(&self, now: Timestamp) -> Vec<String> {
        const SKEW_TOLERANCE_SECS: i64 = 60;
        let mut problems = Vec::new();

        if let Some(issuance) = &self.issuance_date {
            match Timestamp::parse_rfc3339(issuance) {
                Ok(issuance_ts) => {
                    let delta = issuance_ts.as_datetime().signed_duration_since(*now.as_datetime());
                    if delta.num_seconds() > SKEW_TOLERANCE_SECS {
                        problems.push(format!("issuanceDate {issuance} is in the future"));
                    }
                }
                Err(_) => problems.push(format!("malformed issuanceDate: {issuance}")),
            }
        }

        if let Some(expiration) = &self.expiration_date {
            match Timestamp::parse_rfc3339(expiration) {
                Ok(expiration_ts) => {
                    if expiration_ts.as_datetime() < now.as_datetime() {
                        problems.push(format!("expirationDate {expiration} is in the past"));
                    }
                }
                Err(_) => problems.push(format!("malformed expirationDate: {expiration}")),
            }
        }

        problems
    }
}
