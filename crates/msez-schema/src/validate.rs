//! # Schema Validation
//!
//! Runtime validation of JSON documents against JSON Schema definitions
//! (Draft 2020-12), via a pluggable [`SchemaValidator`] trait plus a
//! `jsonschema`-backed implementation.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use jsonschema::{Draft, JSONSchema};
use serde_json::Value;
use thiserror::Error;

/// Error during schema validation.
#[derive(Error, Debug)]
pub enum SchemaValidationError {
    /// The document did not conform to the schema.
    #[error("validation failed: {message}")]
    ValidationFailed { message: String },

    /// The schema file could not be loaded or compiled.
    #[error("schema load error: {0}")]
    SchemaLoadError(String),

    /// `validate` was called with an id nothing was ever loaded for.
    #[error("no schema registered for id '{0}'")]
    UnknownSchema(String),

    /// IO error reading a schema file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A pluggable entity validator, injected at the call site rather than
/// looked up through a global registry. Callers check a document against a
/// named schema before it is signed, digested, or written to the
/// content-addressed store.
pub trait SchemaValidator {
    fn validate(&self, schema_id: &str, document: &Value) -> Result<(), SchemaValidationError>;
}

/// A validator backed by the `jsonschema` crate. Schemas are Draft 2020-12
/// documents named `<schema_id>.schema.json` under `schema_dir`, compiled on
/// demand via [`JsonSchemaValidator::load`].
pub struct JsonSchemaValidator {
    schema_dir: PathBuf,
    compiled: HashMap<String, JSONSchema>,
}

impl JsonSchemaValidator {
    /// Create a new validator reading schemas from the given directory.
    pub fn new(schema_dir: impl AsRef<Path>) -> Self {
        Self {
            schema_dir: schema_dir.as_ref().to_path_buf(),
            compiled: HashMap::new(),
        }
    }

    /// Returns the schema directory path.
    pub fn schema_dir(&self) -> &Path {
        &self.schema_dir
    }

    /// Compiles and registers every `<id>.schema.json` that exists under
    /// `schema_dir` for the given ids. Ids with no file on disk are skipped;
    /// validating against one later returns [`SchemaValidationError::UnknownSchema`].
    pub fn load(mut self, schema_ids: &[&str]) -> Result<Self, SchemaValidationError> {
        for id in schema_ids {
            let path = self.schema_dir.join(format!("{id}.schema.json"));
            if !path.exists() {
                continue;
            }
            let text = std::fs::read_to_string(&path)?;
            let schema_value: Value = serde_json::from_str(&text)
                .map_err(|e| SchemaValidationError::SchemaLoadError(format!("{id}: {e}")))?;
            let compiled = JSONSchema::options()
                .with_draft(Draft::Draft202012)
                .compile(&schema_value)
                .map_err(|e| SchemaValidationError::SchemaLoadError(format!("{id}: {e}")))?;
            self.compiled.insert((*id).to_string(), compiled);
        }
        Ok(self)
    }

    pub fn is_loaded(&self, schema_id: &str) -> bool {
        self.compiled.contains_key(schema_id)
    }
}

impl SchemaValidator for JsonSchemaValidator {
    fn validate(&self, schema_id: &str, document: &Value) -> Result<(), SchemaValidationError> {
        let compiled = self
            .compiled
            .get(schema_id)
            .ok_or_else(|| SchemaValidationError::UnknownSchema(schema_id.to_string()))?;
        if let Err(errors) = compiled.validate(document) {
            let message = errors.map(|e| e.to_string()).collect::<Vec<_>>().join("; ");
            return Err(SchemaValidationError::ValidationFailed { message });
        }
        Ok(())
    }
}

/// A validator that accepts every document. Gives callers the
/// `SchemaValidator` seam without paying for schema compilation — useful in
/// fixtures and tests that construct documents already known to be
/// well-formed.
pub struct NullSchemaValidator;

impl SchemaValidator for NullSchemaValidator {
    fn validate(&self, _schema_id: &str, _document: &Value) -> Result<(), SchemaValidationError> {
        Ok(())
    }
}
