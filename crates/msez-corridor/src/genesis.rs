//! # Genesis Root
//!
//! The genesis root binds a corridor's identity, its definition payload,
//! its initial agreement set, and its starting digest sets into a single
//! SHA-256 digest — the `prev_root` of the corridor's first receipt.

use msez_core::CanonicalBytes;
use msez_crypto::sha256::sha256_hex;
use serde_json::json;

use crate::digest_set::normalize_digest_set;
use crate::error::ChainError;

/// Computes a corridor's genesis root.
pub fn genesis_root(
    corridor_id: &str,
    definition_payload_sha256: &str,
    agreement_set_sha256: &str,
    lawpack_digest_set: &[String],
    ruleset_digest_set: &[String],
) -> Result<String, ChainError> {
    let value = json!({
        "tag": "msez.corridor.state.genesis.v1",
        "corridor_id": corridor_id,
        "definition_payload_sha256": definition_payload_sha256,
        "agreement_set_sha256": agreement_set_sha256,
        "lawpack_digest_set": normalize_digest_set(lawpack_digest_set),
        "ruleset_digest_set": normalize_digest_set(ruleset_digest_set),
    });
    let bytes = CanonicalBytes::new(&value)?;
    Ok(sha256_hex(&bytes))
}
