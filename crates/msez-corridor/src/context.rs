//! # Verifier Context
//!
//! Bundles the adapters a verification entry point needs — a schema
//! validator, a content-addressed store (possibly spanning several search
//! roots), and a corridor's trust anchors — into one explicit value a
//! caller constructs and passes in, rather than a process-wide registry.
//! Tests inject a [`NullSchemaValidator`](msez_schema::NullSchemaValidator)
//! and a throwaway [`CasStoreSet`]; a server embedding the core builds one
//! `VerifierContext` per corridor and reuses it across requests.

use std::sync::Arc;

use msez_crypto::CasStoreSet;
use msez_schema::SchemaValidator;
use serde_json::Value;

use crate::authority::TrustAnchorSet;
use crate::chain::{build_chain, ChainBuildReport, ChainBuilderPolicy};
use crate::receipt::CorridorStateReceipt;

/// The schema id receipt documents validate under before they're parsed —
/// see `msez_schema::ENTITY_SCHEMA_IDS`.
pub const RECEIPT_SCHEMA_ID: &str = "corridor.receipt";

/// The adapters a single corridor's verification needs, constructed once
/// by the caller and threaded through every entry point that needs one.
#[derive(Clone)]
pub struct VerifierContext {
    pub schema_validator: Arc<dyn SchemaValidator + Send + Sync>,
    pub cas: CasStoreSet,
    pub trust_anchors: Option<TrustAnchorSet>,
    pub policy: ChainBuilderPolicy,
}

impl VerifierContext {
    pub fn new(
        schema_validator: Arc<dyn SchemaValidator + Send + Sync>,
        cas: CasStoreSet,
        trust_anchors: Option<TrustAnchorSet>,
        policy: ChainBuilderPolicy,
    ) -> Self {
        Self {
            schema_validator,
            cas,
            trust_anchors,
            policy,
        }
    }

    /// Schema-checks each raw receipt document, parses the ones that pass,
    /// and builds the canonical chain from the survivors — the chain
    /// builder's step 1 ("parse, schema-check") ahead of the structural and
    /// signature checks `build_chain` itself performs.
    ///
    /// A document that fails schema validation or fails to parse as a
    /// `CorridorStateReceipt` is dropped with an error appended to the
    /// returned report, exactly as a structurally-invalid receipt would be
    /// — it never reaches the candidate pool `build_chain` assembles.
    #[allow(clippy::too_many_arguments)]
    pub fn build_chain_from_documents(
        &self,
        corridor_id: &str,
        genesis_root: &str,
        documents: Vec<Value>,
        fork_resolutions: &[crate::fork::ForkResolutionArtifact],
        resolve_signer: impl Fn(&str) -> Result<msez_crypto::Ed25519PublicKey, msez_vc::VcError>,
    ) -> ChainBuildReport {
        let mut report = ChainBuildReport::default();
        let mut receipts = Vec::with_capacity(documents.len());

        for document in documents {
            if let Err(e) = self.schema_validator.validate(RECEIPT_SCHEMA_ID, &document) {
                report.errors.push(format!("schema validation failed: {e}"));
                continue;
            }
            match serde_json::from_value::<CorridorStateReceipt>(document) {
                Ok(receipt) => receipts.push(receipt),
                Err(e) => report.errors.push(format!("failed to parse receipt: {e}")),
            }
        }

        let chain_report = build_chain(
            corridor_id,
            genesis_root,
            receipts,
            fork_resolutions,
            self.trust_anchors.as_ref(),
            resolve_signer,
            &self.policy,
        );

        report.errors.extend(chain_report.errors);
        report.warnings.extend(chain_report.warnings);
        report.head = chain_report.head;
        report
    }
}
