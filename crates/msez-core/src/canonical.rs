//! # Canonical Serialization — JCS-Compatible Byte Production
//!
//! This module defines `CanonicalBytes`, the sole construction path for bytes
//! used in digest computation across the entire SEZ Stack.
//!
//! ## Security Invariant
//!
//! The `CanonicalBytes` newtype has a private inner field. The only way to
//! construct it is through `CanonicalBytes::new()`, which applies the full
//! Momentum type-coercion pipeline (float rejection, datetime normalization,
//! key stringification) before JCS serialization.
//!
//! This makes the "wrong serialization path" defect class (audit finding §2.1)
//! structurally impossible: any function requiring canonical bytes for digest
//! computation must accept `&CanonicalBytes`, and the only way to produce one
//! is through the correct pipeline.
//!
//! ## Cross-Language Compatibility
//!
//! The coercion rules match `tools/lawpack.py:_coerce_json_types()` exactly:
//!
//! 1. **Reject floats** — amounts must be strings or integers. Floats have
//!    non-deterministic JCS number serialization edge cases.
//! 2. **Normalize datetimes** — UTC ISO8601 with `Z` suffix, truncated to seconds.
//!    Naive datetimes are assumed UTC. Non-UTC offsets are converted.
//! 3. **Coerce non-string keys** — all object keys become strings via `to_string()`.
//! 4. **Convert tuples to lists** — tuples serialize as JSON arrays.
//! 5. **Unknown types** — fall back to `to_string()` (Python's `str(obj)`).
//!
//! After coercion, serialization uses `serde_jcs` for RFC 8785 (JSON
//! Canonicalization Scheme) compliant output: sorted keys, compact separators,
//! deterministic byte sequence.
//!
//! ## Implements
//!
//! Spec §8 — Canonical Digest computation rules.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS-compatible canonicalization with
/// Momentum-specific type coercion rules.
///
/// # Invariants
///
/// - The only constructor is `CanonicalBytes::new()`.
/// - All datetime values are normalized to UTC ISO8601 with Z suffix, truncated to seconds.
/// - All numeric amounts are integers or strings, never floats.
/// - All dict keys are strings.
/// - Tuples/sequences are JSON arrays.
/// - Serialization uses sorted keys with compact separators (RFC 8785).
///
/// These invariants are enforced by the constructor and cannot be violated
/// by downstream code because the inner `Vec<u8>` is private.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Construct canonical bytes from any serializable value.
    ///
    /// Applies the full Momentum type coercion pipeline before JCS serialization.
    /// This is the ONLY way to construct `CanonicalBytes`. All digest computation
    /// in the entire stack must flow through this constructor.
    ///
    /// # Errors
    ///
    /// Returns `CanonicalizationError::FloatRejected` if the value contains float
    /// numbers. Returns `CanonicalizationError::SerializationFailed` if JCS
    /// serialization fails.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        let coerced = coerce_json_value(value)?;
        let bytes = serialize_canonical(&coerced)?;
        Ok(Self(bytes))
    }

    /// Access the canonical bytes for digest computation.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Returns the length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the canonical byte sequence is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Recursively coerce JSON values according to Momentum canonicalization rules.
///
/// These rules match `tools/lawpack.py:_coerce_json_types()` exactly:
///
/// 1. `null`, `bool`, `string`, `integer` — pass through unchanged.
/// 2. `float` (non-integer) — **rejected** with `FloatRejected` error.
/// 3. `object` — keys coerced to strings (already strings in JSON), values recursed.
/// 4. `array` — elements recursed.
///
/// In the Rust/serde world, datetime and tuple coercion happen at the
/// serialization boundary (`Serialize` impl), not in the JSON value tree.
/// Chrono's `DateTime<Utc>` serializes to an ISO8601 string, and Rust tuples
/// serialize to JSON arrays. The `Timestamp` type in this crate ensures the
/// Z-suffix and second-precision invariants.
fn coerce_json_value(value: Value) -> Result<Value, CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(value),
        Value::Number(ref n) => {
            // Reject pure floats (not representable as i64/u64).
            // This matches Python's: if isinstance(obj, float): raise ValueError(...)
            if n.is_f64() && !n.is_i64() && !n.is_u64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(value)
        }
        Value::Object(map) => {
            let mut coerced = serde_json::Map::new();
            for (k, v) in map {
                // Keys are already strings in JSON (serde_json::Map<String, Value>).
                // This matches Python's: out[str(k)] = _coerce_json_types(v)
                coerced.insert(k, coerce_json_value(v)?);
            }
            Ok(Value::Object(coerced))
        }
        Value::Array(arr) => {
            let coerced: Result<Vec<_>, _> = arr.into_iter().map(coerce_json_value).collect();
            Ok(Value::Array(coerced?))
        }
    }
}

/// Serialize a JSON value in JCS-canonical form (RFC 8785).
///
/// Uses `serde_jcs` for deterministic output: sorted keys, compact separators,
/// no trailing whitespace. The output is UTF-8 encoded bytes matching the
/// Python equivalent: `json.dumps(obj, sort_keys=True, separators=(",", ":"), ensure_ascii=False).encode("utf-8")`
fn serialize_canonical(value: &Value) -> Result<Vec<u8>, CanonicalizationError> {
    let s = serde_jcs::to_string(value)?;
    Ok(s.into_bytes())
}
