//! PHI access auditing for the portal.
//!
//! Every operation that reads or writes a record with sensitive fields owes
//! one [`AuditEvent`] to the append-only audit log. Auditing is a secondary
//! concern relative to serving the request, so the [`AccessNotifier`] is
//! strictly non-blocking: events are queued to a bounded channel and a
//! background worker appends them to the configured [`AuditSink`], retrying
//! a bounded number of times before dropping with a warning. A failing sink
//! can never abort or slow the primary operation.
//!
//! This is the only crate in the workspace that suspends; `phi-core` stays
//! synchronous and never depends on it.

pub mod event;
pub mod notifier;
pub mod sink;

pub use event::{Actor, AuditAction, AuditEvent};
pub use notifier::AccessNotifier;
pub use sink::{AuditSink, LogSink, SinkError};
