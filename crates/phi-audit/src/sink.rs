//! [`AuditSink`]: the seam between the notifier and the append-only store.
//!
//! The portal's real sink is a database table owned by the host application;
//! this crate only defines the contract plus a structured-log sink useful in
//! development and as a last-resort fallback.

use async_trait::async_trait;
use thiserror::Error;
use tracing::info;

use crate::event::AuditEvent;

/// Errors produced by an audit sink.
#[derive(Debug, Error)]
pub enum SinkError {
    /// The append could not be persisted.
    #[error("audit sink append failed: {0}")]
    Append(String),
}

/// Port for persisting append-only audit events.
///
/// Implementations must be safe to call from the notifier's worker task and
/// should assign the event timestamp at insert time.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist one audit event.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Append`] if the event could not be stored; the
    /// notifier retries a bounded number of times.
    async fn append(&self, event: AuditEvent) -> Result<(), SinkError>;
}

/// Sink that emits each event as a structured log line instead of storing it.
///
/// Not a durability story — used in development and tests.
#[derive(Debug, Default, Clone)]
pub struct LogSink;

#[async_trait]
impl AuditSink for LogSink {
    async fn append(&self, event: AuditEvent) -> Result<(), SinkError> {
        info!(
            event_id = %event.event_id,
            user_id = %event.actor.user_id,
            role = %event.actor.role,
            action = ?event.action,
            resource_type = %event.resource_type,
            resource_id = event.resource_id.as_deref().unwrap_or("-"),
            sensitive_fields = event.sensitive_fields.len(),
            "audit event"
        );
        Ok(())
    }
}
