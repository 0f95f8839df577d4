//! Field-level PHI encryption core for the portal.
//!
//! The portal's storage, session, and HTTP layers are external collaborators:
//! they hand this crate a record plus an entity-type tag and receive back a
//! transformed record. Four pieces live here:
//!
//! - [`config`] — process configuration, including the master key source.
//! - [`keys`] — the validated 256-bit master key.
//! - [`crypto`] — the `ENC:`-prefixed envelope codec for single field values.
//! - [`manifest`] — the per-entity allow-list of PHI field names.
//! - [`transform`] — applies the codec to exactly the manifest fields of a record.
//!
//! # Module invariants
//!
//! - **No async I/O.** Everything in this crate is a short, CPU-bound
//!   computation over in-memory buffers.
//! - **No audit dependencies.** Access auditing lives in `phi-audit`, which
//!   depends on this crate and never the other way around.

pub mod config;
pub mod crypto;
pub mod keys;
pub mod manifest;
pub mod transform;

pub use config::Config;
pub use keys::MasterKey;
pub use transform::{Record, Transformer};
