//! AES-256-GCM field encryption primitives.
//!
//! This module is intentionally free of manifest and record dependencies.
//! It provides the low-level encrypt/decrypt operations used by the
//! record transformer.
//!
//! # Envelope format
//!
//! ```text
//! ENC:<nonce hex>:<auth tag hex>:<ciphertext hex>
//! ```
//!
//! The `ENC:` marker distinguishes ciphertext from plaintext at a glance and
//! must match the format of previously stored data bit-exactly.

pub mod cipher;

pub use cipher::{decrypt_value, encrypt_value, CipherError, ENVELOPE_MARKER};
