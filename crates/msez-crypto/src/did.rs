//! # `did:key` — Ed25519-only Decentralized Identifiers
//!
//! Encodes and decodes the `did:key` method restricted to Ed25519 public
//! keys: `did:key:z<base58btc(multicodec || pubkey)>`.
//!
//! ## Security Invariant
//!
//! The two-byte multicodec prefix `0xED 0x01` is always emitted on encode.
//! A bare one-byte `0xED` prefix (33-byte payload total) is accepted on
//! decode only, for interoperability with older artifacts; new proofs never
//! produce it.
//!
//! ## Implements
//!
//! `did:key` profile, Ed25519 only, per the corridor proof envelope's
//! verification-method resolution.

use msez_core::Did;

use crate::ed25519::Ed25519PublicKey;
use crate::error::CryptoError;

const MULTICODEC_ED25519_PUB: [u8; 2] = [0xed, 0x01];

/// Encode an Ed25519 public key as a `did:key` string.
///
/// Always emits the two-byte multicodec form, `did:key:z<base58btc>`.
pub fn did_key_from_ed25519(public_key: &Ed25519PublicKey) -> Did {
    let mut payload = Vec::with_capacity(2 + 32);
    payload.extend_from_slice(&MULTICODEC_ED25519_PUB);
    payload.extend_from_slice(public_key.as_bytes());
    let encoded = bs58::encode(payload).into_string();
    Did::new(format!("did:key:z{encoded}"))
}

/// Decode a `did:key` string into its Ed25519 public key.
///
/// Accepts `#fragment` verification-method suffixes by ignoring them.
/// Accepts both the two-byte (`0xED 0x01`) and the legacy one-byte
/// (`0xED`) multicodec prefix; the latter is compatibility-only.
pub fn ed25519_from_did_key(did: &Did) -> Result<Ed25519PublicKey, CryptoError> {
    let base = did.without_fragment();
    let encoded = base
        .strip_prefix("did:key:z")
        .ok_or_else(|| CryptoError::DidError(format!("not a did:key:z string: {base}")))?;

    let payload = bs58::decode(encoded)
        .into_vec()
        .map_err(|e| CryptoError::DidError(format!("invalid base58btc: {e}")))?;

    let raw_key: &[u8] = if payload.len() == 34 && payload[0..2] == MULTICODEC_ED25519_PUB {
        &payload[2..]
    } else if payload.len() == 33 && payload[0] == 0xed {
        &payload[1..]
    } else {
        return Err(CryptoError::DidError(format!(
            "unexpected did:key payload length/multicodec: {} bytes",
            payload.len()
        )));
    };

    let mut bytes = [0u8; 32];
    bytes.copy_from_slice(raw_key);
    Ok(Ed25519PublicKey::from_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ed25519::Ed25519KeyPair;

    #[test]
    fn roundtrips_two_byte_form() {
        let kp = Ed25519KeyPair::generate();
        let pk = kp.public_key();
        let did = did_key_from_ed25519(&pk);
        assert!(did.as_str().starts_with("did:key:z"));
        let decoded = ed25519_from_did_key(&did).unwrap();
        assert_eq!(decoded, pk);
    }

    #[test]
    fn accepts_fragment_suffix() {
        let kp = Ed25519KeyPair::generate();
        let pk = kp.public_key();
        let did = did_key_from_ed25519(&pk);
        let vm = Did::new(format!("{}#key-1", did.as_str()));
        let decoded = ed25519_from_did_key(&vm).unwrap();
        assert_eq!(decoded, pk);
    }

    #[test]
    fn accepts_one_byte_multicodec_compat() {
        let kp = Ed25519KeyPair::generate();
        let pk = kp.public_key();
        let mut payload = vec![0xedu8];
        payload.extend_from_slice(pk.as_bytes());
        let encoded = bs58::encode(payload).into_string();
        let did = Did::new(format!("did:key:z{encoded}"));
        let decoded = ed25519_from_did_key(&did).unwrap();
        assert_eq!(decoded, pk);
    }

    #[test]
    fn rejects_non_did_key_prefix() {
        let did = Did::new("did:web:example.com");
        assert!(ed25519_from_did_key(&did).is_err());
    }

    #[test]
    fn rejects_bad_base58() {
        let did = Did::new("did:key:z0OIl-not-base58");
        assert!(ed25519_from_did_key(&did).is_err());
    }

    #[test]
    fn rejects_wrong_payload_length() {
        let encoded = bs58::encode([0xed, 0x01, 1, 2, 3]).into_string();
        let did = Did::new(format!("did:key:z{encoded}"));
        assert!(ed25519_from_did_key(&did).is_err());
    }
}
