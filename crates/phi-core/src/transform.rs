//! Record transformation: apply the envelope codec to exactly the manifest
//! fields of a record.
//!
//! [`Transformer::protect`] produces the encrypted-at-rest form handed to
//! storage; [`Transformer::reveal`] produces the plaintext view handed back
//! to the caller. Both are pure functions over a copied record — the caller's
//! map is never mutated in place.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::warn;

use crate::crypto::cipher::{decrypt_value, encrypt_value, CipherError, ENVELOPE_MARKER};
use crate::keys::MasterKey;
use crate::manifest;

/// A string-keyed record with mixed sensitive and structural fields, as the
/// portal's storage layer hands them over.
pub type Record = Map<String, Value>;

/// Errors produced while transforming a record.
///
/// The message names the entity and field, never the field's value.
#[derive(Debug, Error)]
pub enum TransformError {
    /// Encryption of one field failed.
    #[error("failed to encrypt {entity}.{field}: {source}")]
    Encrypt {
        entity: String,
        field: String,
        #[source]
        source: CipherError,
    },

    /// Decryption of one field failed.
    #[error("failed to decrypt {entity}.{field}: {source}")]
    Decrypt {
        entity: String,
        field: String,
        #[source]
        source: CipherError,
    },
}

/// Applies the field codec to records according to the entity manifest.
///
/// Holds the injected [`MasterKey`]; stateless otherwise, so one instance may
/// be shared across threads freely.
#[derive(Debug, Clone)]
pub struct Transformer {
    key: MasterKey,
}

impl Transformer {
    /// Create a transformer around an injected key.
    pub fn new(key: MasterKey) -> Self {
        Self { key }
    }

    /// Encrypt every manifest field of `record` for storage at rest.
    ///
    /// Only fields present with a non-empty string value are touched; null,
    /// absent, and non-string values pass through, as does anything outside
    /// the entity's manifest. A value already carrying the envelope marker is
    /// left alone, so a second pass over stored data never double-wraps.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Encrypt`] naming the first field that failed.
    /// The record is never partially returned with an empty-string substitute.
    pub fn protect(&self, record: &Record, entity_type: &str) -> Result<Record, TransformError> {
        let mut out = record.clone();
        for field in manifest::fields_for(entity_type) {
            let value = match out.get_mut(*field) {
                Some(v) => v,
                None => continue,
            };
            let s = match value.as_str() {
                Some(s) => s,
                None => continue,
            };
            if s.is_empty() || s.starts_with(ENVELOPE_MARKER) {
                continue;
            }
            match encrypt_value(s, &self.key) {
                Ok(sealed) => *value = Value::String(sealed),
                Err(source) => {
                    warn!(entity = %entity_type, field = %field, "field encryption failed");
                    return Err(TransformError::Encrypt {
                        entity: entity_type.to_owned(),
                        field: (*field).to_owned(),
                        source,
                    });
                }
            }
        }
        Ok(out)
    }

    /// Decrypt every manifest field of `record` for presentation.
    ///
    /// Values without the envelope marker are legacy plaintext and pass
    /// through unchanged. Null, absent, non-string, and non-manifest fields
    /// are untouched, mirroring [`Transformer::protect`].
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Decrypt`] naming the first field whose
    /// envelope is malformed or fails authentication.
    pub fn reveal(&self, record: &Record, entity_type: &str) -> Result<Record, TransformError> {
        let mut out = record.clone();
        for field in manifest::fields_for(entity_type) {
            let value = match out.get_mut(*field) {
                Some(v) => v,
                None => continue,
            };
            let s = match value.as_str() {
                Some(s) => s,
                None => continue,
            };
            if !s.starts_with(ENVELOPE_MARKER) {
                continue;
            }
            match decrypt_value(s, &self.key) {
                Ok(plaintext) => *value = Value::String(plaintext),
                Err(source) => {
                    warn!(entity = %entity_type, field = %field, "field decryption failed");
                    return Err(TransformError::Decrypt {
                        entity: entity_type.to_owned(),
                        field: (*field).to_owned(),
                        source,
                    });
                }
            }
        }
        Ok(out)
    }
}
