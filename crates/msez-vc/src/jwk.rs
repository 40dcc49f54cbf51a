//! # JWK Key Loading
//!
//! Loads and generates Ed25519 signing keys in JWK form (`kty: "OKP"`,
//! `crv: "Ed25519"`), the format proof-signing keys are distributed in on
//! disk. Two file shapes are accepted when loading a signer: a bare
//! private JWK, or a wrapper object carrying the JWK plus the
//! `verificationMethod` it corresponds to.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use msez_crypto::{did_key_from_ed25519, Ed25519KeyPair, Ed25519PublicKey};

use crate::proof::VcError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

fn b64url_encode(bytes: &[u8]) -> String {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn b64url_decode(s: &str) -> Result<Vec<u8>, VcError> {
    use base64::Engine;
    base64::engine::general_purpose::URL_SAFE_NO_PAD
        .decode(s)
        .map_err(|e| VcError::MalformedProof(format!("invalid base64url in JWK: {e}")))
}

/// Generate a fresh Ed25519 JWK pair (private + its public-only projection).
pub fn generate_ed25519_jwk() -> (Jwk, Ed25519KeyPair) {
    let keypair = Ed25519KeyPair::generate();
    (private_jwk_from_keypair(&keypair), keypair)
}

fn private_jwk_from_keypair(keypair: &Ed25519KeyPair) -> Jwk {
    // Ed25519KeyPair does not expose its seed (by design — private key
    // material is never serialized); callers that need the private JWK
    // build it from a seed they already hold via `load_ed25519_private_key_from_jwk`.
    Jwk {
        kty: "OKP".to_string(),
        crv: "Ed25519".to_string(),
        x: b64url_encode(keypair.public_key().as_bytes()),
        d: None,
    }
}

/// Loads an Ed25519 signing key from a private JWK (`kty: "OKP"`,
/// `crv: "Ed25519"`, `d` present).
pub fn load_ed25519_private_key_from_jwk(jwk: &Jwk) -> Result<Ed25519KeyPair, VcError> {
    if jwk.kty != "OKP" || jwk.crv != "Ed25519" {
        return Err(VcError::MalformedProof(format!(
            "unsupported JWK kty/crv: {}/{}",
            jwk.kty, jwk.crv
        )));
    }
    let d = jwk
        .d
        .as_ref()
        .ok_or_else(|| VcError::MalformedProof("JWK missing private component 'd'".to_string()))?;
    let seed_bytes = b64url_decode(d)?;
    if seed_bytes.len() != 32 {
        return Err(VcError::MalformedProof(format!(
            "JWK 'd' decodes to {} bytes, expected 32",
            seed_bytes.len()
        )));
    }
    let mut seed = [0u8; 32];
    seed.copy_from_slice(&seed_bytes);
    Ok(Ed25519KeyPair::from_seed(&seed))
}

/// Derives the public-only JWK from a private JWK.
pub fn public_jwk_from_private_jwk(jwk: &Jwk) -> Result<Jwk, VcError> {
    let keypair = load_ed25519_private_key_from_jwk(jwk)?;
    Ok(private_jwk_from_keypair(&keypair))
}

/// A loaded proof signer: the keypair plus the `verificationMethod` DID URL
/// it should sign as.
pub struct ProofKeypair {
    pub keypair: Ed25519KeyPair,
    pub verification_method: String,
}

/// Loads a signing key and its verification method from a JSON document in
/// one of two accepted shapes:
///
/// - A bare private JWK — the verification method defaults to
///   `did:key:<encoded>#<fragment>` derived from the key itself.
/// - A wrapper `{"jwk" | "private_jwk": <JWK>, "verificationMethod" | "verification_method" | "vm": <string>}`.
pub fn load_proof_keypair(doc: &Value) -> Result<ProofKeypair, VcError> {
    let (jwk_value, explicit_vm) = if doc.get("kty").is_some() {
        (doc.clone(), None)
    } else {
        let jwk_value = doc
            .get("jwk")
            .or_else(|| doc.get("private_jwk"))
            .cloned()
            .ok_or_else(|| VcError::MalformedProof("missing 'jwk'/'private_jwk' field".to_string()))?;
        let vm = doc
            .get("verificationMethod")
            .or_else(|| doc.get("verification_method"))
            .or_else(|| doc.get("vm"))
            .and_then(Value::as_str)
            .map(str::to_string);
        (jwk_value, vm)
    };

    let jwk: Jwk = serde_json::from_value(jwk_value)?;
    let keypair = load_ed25519_private_key_from_jwk(&jwk)?;

    let verification_method = match explicit_vm {
        Some(vm) => vm,
        None => {
            let did = did_key_from_ed25519(&keypair.public_key());
            format!("{}#{}", did.as_str(), did.as_str().trim_start_matches("did:key:"))
        }
    };

    Ok(ProofKeypair {
        keypair,
        verification_method,
    })
}

/// Resolves a `did:key:...#fragment` verification method to its Ed25519
/// public key — the standard `resolve` callback for [`crate::proof::verify_proofs`]
/// and [`crate::credential::VerifiableCredential::verify_proofs`] when the
/// signer is a bare `did:key`.
pub fn resolve_did_key(verification_method: &str) -> Result<Ed25519PublicKey, VcError> {
    let did = msez_core::Did::new(verification_method.to_string());
    msez_crypto::ed25519_from_did_key(&did).map_err(Into::into)
}
