//! [`MasterKey`]: the validated symmetric key for field encryption.
//!
//! The key is constructed once (from [`crate::config::Config`] in production,
//! from raw bytes in tests) and injected into the [`crate::transform::Transformer`].
//! Nothing in this crate reads key material from ambient global state.

use thiserror::Error;

/// Byte length of the master key (32 bytes = 256 bits, AES-256).
pub const KEY_LEN: usize = 32;

/// Errors produced when constructing a [`MasterKey`].
#[derive(Debug, Error)]
pub enum KeyError {
    /// The key material is not exactly [`KEY_LEN`] bytes.
    #[error("invalid key length: expected {KEY_LEN} bytes, got {0}")]
    InvalidLength(usize),

    /// The configured key string is not valid hex.
    #[error("key is not valid hex")]
    InvalidEncoding,
}

/// Fixed-size buffer holding exactly [`KEY_LEN`] bytes of key material.
///
/// When this type is dropped, the memory is overwritten with zeroes to
/// minimise the window during which plaintext key material lives in RAM.
#[derive(Clone)]
pub struct MasterKey(Box<[u8; KEY_LEN]>);

impl MasterKey {
    /// Build a key from raw bytes.
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidLength`] if `bytes` is not [`KEY_LEN`] long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KeyError> {
        if bytes.len() != KEY_LEN {
            return Err(KeyError::InvalidLength(bytes.len()));
        }
        let mut buf = Box::new([0u8; KEY_LEN]);
        buf.copy_from_slice(bytes);
        Ok(Self(buf))
    }

    /// Build a key from a hex-encoded string (64 hex characters).
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::InvalidEncoding`] on non-hex input and
    /// [`KeyError::InvalidLength`] if the decoded bytes are not [`KEY_LEN`] long.
    pub fn from_hex(s: &str) -> Result<Self, KeyError> {
        let bytes = hex::decode(s.trim()).map_err(|_| KeyError::InvalidEncoding)?;
        Self::from_bytes(&bytes)
    }

    /// Borrow the raw key bytes. Crate-internal: only the cipher needs them.
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.0
    }
}

impl Drop for MasterKey {
    fn drop(&mut self) {
        // Zero the key material on drop.
        self.0.iter_mut().for_each(|b| *b = 0);
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key material — not even in debug builds.
        f.write_str("MasterKey([REDACTED])")
    }
}
