//! # L1 Anchoring
//!
//! A corridor is L1-optional: it functions entirely on signed receipts,
//! checkpoints, and watcher quorum. Anchoring a checkpoint's digest to an
//! L1 chain is an additional, independently verifiable finality rung —
//! an `AnchorCredential` records where and what was anchored, it does not
//! perform the anchoring transaction itself.

use serde::{Deserialize, Serialize};

use msez_vc::VerifiableCredential;

pub const ANCHOR_CREDENTIAL_TYPE: &str = "MSEZAnchorCredential";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnchorSubject {
    pub corridor_id: String,
    /// The checkpoint digest (`SHA256(canonical(checkpoint_without_proof))`)
    /// that was anchored.
    pub checkpoint_digest_sha256: String,
    /// Chain identifier for the anchoring L1, e.g. `"eip155:1"`.
    pub anchor_chain_id: String,
    /// The L1 transaction hash carrying the anchor.
    pub anchor_tx_hash: String,
    /// The L1 block height the transaction was included in, once known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub anchor_block_height: Option<u64>,
}

pub type AnchorCredential = VerifiableCredential<AnchorSubject>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_credential_round_trips() {
        let subject = AnchorSubject {
            corridor_id: "corridor-a".to_string(),
            checkpoint_digest_sha256: "aa".repeat(32),
            anchor_chain_id: "eip155:1".to_string(),
            anchor_tx_hash: "0xdeadbeef".to_string(),
            anchor_block_height: Some(19_000_000),
        };
        let vc = AnchorCredential::new(ANCHOR_CREDENTIAL_TYPE, "did:key:zRoot", subject.clone());
        let json = serde_json::to_string(&vc).unwrap();
        let back: AnchorCredential = serde_json::from_str(&json).unwrap();
        assert_eq!(back.credential_subject, subject);
    }
}
