//! AES-256-GCM encryption and decryption of individual string field values.
//!
//! **Algorithm choice:** AES-256-GCM with a fresh random 96-bit nonce per
//! call. Nonce reuse under GCM is catastrophic — it breaks both
//! confidentiality and authentication — so every encryption draws new
//! randomness from the OS CSPRNG and no nonce is ever derived from the data.
//!
//! The authentication tag travels as its own envelope segment so a stored
//! value can be visually split into nonce, tag, and ciphertext.

use aes_gcm::{
    aead::{Aead, KeyInit, OsRng},
    Aes256Gcm, Key, Nonce,
};
use thiserror::Error;

use crate::keys::MasterKey;

/// Byte length of an AES-GCM nonce (12 bytes = 96 bits).
pub const NONCE_LEN: usize = 12;

/// Byte length of the GCM authentication tag (16 bytes = 128 bits).
pub const TAG_LEN: usize = 16;

/// Prefix that appears at the start of every encrypted field value.
pub const ENVELOPE_MARKER: &str = "ENC:";

/// Errors produced by the cipher layer.
#[derive(Debug, Error)]
pub enum CipherError {
    /// The envelope string does not parse: wrong part count, bad hex, wrong
    /// nonce/tag length, or non-UTF-8 plaintext. Indicates corrupted storage.
    #[error("invalid envelope format")]
    Format,

    /// GCM tag verification failed: tampering, wrong key, or corruption.
    /// Always a hard failure — unverified plaintext is never returned.
    #[error("envelope authentication failed")]
    Authentication,

    /// The AEAD backend refused to encrypt (unreachable with a valid key).
    #[error("aead operation failed")]
    AeadFailure,
}

/// A parsed encrypted field value.
///
/// The string representation is `ENC:<nonce hex>:<tag hex>:<ciphertext hex>`,
/// all hex lowercase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Raw nonce bytes.
    pub nonce: [u8; NONCE_LEN],
    /// Raw authentication tag bytes.
    pub tag: [u8; TAG_LEN],
    /// Raw ciphertext bytes (tag excluded).
    pub ciphertext: Vec<u8>,
}

impl Envelope {
    /// Encode this envelope to its canonical string representation.
    pub fn to_string_repr(&self) -> String {
        format!(
            "{}{}:{}:{}",
            ENVELOPE_MARKER,
            hex::encode(self.nonce),
            hex::encode(self.tag),
            hex::encode(&self.ciphertext),
        )
    }

    /// Parse an envelope string back into an [`Envelope`].
    ///
    /// # Errors
    ///
    /// Returns [`CipherError::Format`] if the string does not match the
    /// expected `ENC:<nonce>:<tag>:<ciphertext>` structure.
    pub fn parse(s: &str) -> Result<Self, CipherError> {
        let body = s.strip_prefix(ENVELOPE_MARKER).ok_or(CipherError::Format)?;

        let parts: Vec<&str> = body.splitn(3, ':').collect();
        if parts.len() != 3 {
            return Err(CipherError::Format);
        }

        let nonce_bytes = hex::decode(parts[0]).map_err(|_| CipherError::Format)?;
        if nonce_bytes.len() != NONCE_LEN {
            return Err(CipherError::Format);
        }
        let mut nonce = [0u8; NONCE_LEN];
        nonce.copy_from_slice(&nonce_bytes);

        let tag_bytes = hex::decode(parts[1]).map_err(|_| CipherError::Format)?;
        if tag_bytes.len() != TAG_LEN {
            return Err(CipherError::Format);
        }
        let mut tag = [0u8; TAG_LEN];
        tag.copy_from_slice(&tag_bytes);

        let ciphertext = hex::decode(parts[2]).map_err(|_| CipherError::Format)?;

        Ok(Self {
            nonce,
            tag,
            ciphertext,
        })
    }
}

/// Encrypt a plaintext field value into an envelope string.
///
/// Empty plaintext is returned unchanged — empty values are never wrapped.
/// Otherwise a random 96-bit nonce is generated per call via the OS CSPRNG
/// and the UTF-8 bytes of `plaintext` are sealed under AES-256-GCM.
///
/// # Errors
///
/// Returns [`CipherError::AeadFailure`] on an internal AEAD error (should be
/// unreachable with a valid key and nonce).
pub fn encrypt_value(plaintext: &str, key: &MasterKey) -> Result<String, CipherError> {
    if plaintext.is_empty() {
        return Ok(String::new());
    }

    let cipher = build_cipher(key);

    // Use OsRng for a cryptographically secure random nonce.
    use aes_gcm::aead::rand_core::RngCore;
    let mut nonce_bytes = [0u8; NONCE_LEN];
    OsRng.fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // RustCrypto appends the tag to the ciphertext; the envelope carries it
    // as a separate segment, so split it back off.
    let mut sealed = cipher
        .encrypt(nonce, plaintext.as_bytes())
        .map_err(|_| CipherError::AeadFailure)?;
    if sealed.len() < TAG_LEN {
        return Err(CipherError::AeadFailure);
    }
    let tag_bytes = sealed.split_off(sealed.len() - TAG_LEN);
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&tag_bytes);

    let envelope = Envelope {
        nonce: nonce_bytes,
        tag,
        ciphertext: sealed,
    };
    Ok(envelope.to_string_repr())
}

/// Decrypt an envelope string back to its plaintext field value.
///
/// Input that does not start with [`ENVELOPE_MARKER`] is returned unchanged:
/// data stored before encryption was enabled reads back as-is. This is a
/// deliberate backward-compatibility affordance, not an error path — though
/// it also means a corrupted envelope that lost its marker reads as
/// plaintext rather than failing.
///
/// # Errors
///
/// Returns [`CipherError::Format`] for a malformed envelope and
/// [`CipherError::Authentication`] when tag verification fails.
pub fn decrypt_value(value: &str, key: &MasterKey) -> Result<String, CipherError> {
    if !value.starts_with(ENVELOPE_MARKER) {
        // Legacy plaintext passthrough.
        return Ok(value.to_owned());
    }

    let envelope = Envelope::parse(value)?;
    let cipher = build_cipher(key);
    let nonce = Nonce::from_slice(&envelope.nonce);

    // Re-join ciphertext and tag into the layout RustCrypto expects.
    let mut sealed = envelope.ciphertext;
    sealed.extend_from_slice(&envelope.tag);

    let plaintext = cipher
        .decrypt(nonce, sealed.as_ref())
        .map_err(|_| CipherError::Authentication)?;

    String::from_utf8(plaintext).map_err(|_| CipherError::Format)
}

fn build_cipher(key: &MasterKey) -> Aes256Gcm {
    // MasterKey guarantees exactly 32 bytes.
    Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(key.as_bytes()))
}
