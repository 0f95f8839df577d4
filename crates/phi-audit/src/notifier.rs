//! [`AccessNotifier`]: the non-blocking path from request handlers to the
//! audit sink.
//!
//! Handlers call [`AccessNotifier::notify`] and move on; the event crosses a
//! bounded channel to a background worker that owns all sink I/O and retry
//! handling. Nothing on this path can block, fail, or slow the primary
//! operation — on a full queue or a dead worker the event is dropped with a
//! warning rather than applying backpressure to the request.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time;
use tracing::warn;

use crate::event::AuditEvent;
use crate::sink::AuditSink;

/// Handle for emitting audit events without awaiting their persistence.
///
/// Cheap to clone; all clones feed the same worker. When the last clone is
/// dropped the channel closes and the worker drains the queue and exits, so
/// a host that wants a clean shutdown can await the [`JoinHandle`] returned
/// by [`AccessNotifier::spawn`].
#[derive(Clone)]
pub struct AccessNotifier {
    tx: mpsc::Sender<AuditEvent>,
}

impl AccessNotifier {
    /// Spawn the worker task and return the notifier plus its join handle.
    ///
    /// `queue_depth` bounds how many events may be in flight; `retry_limit`
    /// is how many times the worker re-attempts a failed sink append before
    /// dropping the event.
    pub fn spawn(
        sink: Arc<dyn AuditSink>,
        queue_depth: usize,
        retry_limit: u32,
    ) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(queue_depth);
        let handle = tokio::spawn(worker(rx, sink, retry_limit));
        (Self { tx }, handle)
    }

    /// Queue an event for persistence. Never blocks and never fails the
    /// caller: a full or closed queue logs a warning and drops the event.
    pub fn notify(&self, event: AuditEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(event_id = %dropped.event_id, "audit queue full; event dropped");
            }
            Err(mpsc::error::TrySendError::Closed(dropped)) => {
                warn!(event_id = %dropped.event_id, "audit worker gone; event dropped");
            }
        }
    }
}

/// Drain the queue, appending each event to the sink with bounded retries.
///
/// A still-failing append after `retry_limit` re-attempts drops the event;
/// the warning carrying its id is the operator's dead-letter record.
async fn worker(mut rx: mpsc::Receiver<AuditEvent>, sink: Arc<dyn AuditSink>, retry_limit: u32) {
    while let Some(event) = rx.recv().await {
        let mut attempt: u32 = 0;
        loop {
            match sink.append(event.clone()).await {
                Ok(()) => break,
                Err(e) => {
                    attempt += 1;
                    if attempt > retry_limit {
                        warn!(
                            event_id = %event.event_id,
                            error = %e,
                            "audit append failed; event dropped after retries"
                        );
                        break;
                    }
                    time::sleep(Duration::from_millis(50 * u64::from(attempt))).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Actor, AuditAction};
    use crate::sink::SinkError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    fn event() -> AuditEvent {
        AuditEvent::patient_access(
            Actor::new("u-1", "dr@example.com", "provider"),
            AuditAction::Read,
            Some("p-17"),
        )
    }

    /// Collects appended events in memory.
    #[derive(Default)]
    struct MemorySink {
        events: Mutex<Vec<AuditEvent>>,
    }

    #[async_trait]
    impl AuditSink for MemorySink {
        async fn append(&self, event: AuditEvent) -> Result<(), SinkError> {
            self.events.lock().unwrap().push(event);
            Ok(())
        }
    }

    /// Fails every append.
    struct FailingSink;

    #[async_trait]
    impl AuditSink for FailingSink {
        async fn append(&self, _event: AuditEvent) -> Result<(), SinkError> {
            Err(SinkError::Append("table unavailable".into()))
        }
    }

    /// Fails the first `failures` appends, then succeeds.
    struct FlakySink {
        failures: u32,
        attempts: AtomicU32,
        inner: MemorySink,
    }

    #[async_trait]
    impl AuditSink for FlakySink {
        async fn append(&self, event: AuditEvent) -> Result<(), SinkError> {
            if self.attempts.fetch_add(1, Ordering::SeqCst) < self.failures {
                return Err(SinkError::Append("transient failure".into()));
            }
            self.inner.append(event).await
        }
    }

    #[tokio::test]
    async fn events_reach_the_sink() {
        let sink = Arc::new(MemorySink::default());
        let (notifier, handle) = AccessNotifier::spawn(sink.clone(), 16, 3);
        let sent = event();
        let id = sent.event_id;
        notifier.notify(sent);
        drop(notifier);
        handle.await.unwrap();

        let events = sink.events.lock().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_id, id);
    }

    #[tokio::test]
    async fn failing_sink_never_reaches_the_caller() {
        // Capture the dropped-event warnings in the test output.
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let (notifier, handle) = AccessNotifier::spawn(Arc::new(FailingSink), 16, 1);
        // notify must not panic or surface the sink failure.
        for _ in 0..5 {
            notifier.notify(event());
        }
        drop(notifier);
        // Worker drains, gives up per event, and exits cleanly.
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failures_are_retried() {
        let sink = Arc::new(FlakySink {
            failures: 2,
            attempts: AtomicU32::new(0),
            inner: MemorySink::default(),
        });
        let (notifier, handle) = AccessNotifier::spawn(sink.clone(), 16, 3);
        notifier.notify(event());
        drop(notifier);
        handle.await.unwrap();

        assert_eq!(sink.attempts.load(Ordering::SeqCst), 3);
        assert_eq!(sink.inner.events.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retry_limit_bounds_attempts() {
        let sink = Arc::new(FlakySink {
            failures: u32::MAX,
            attempts: AtomicU32::new(0),
            inner: MemorySink::default(),
        });
        let (notifier, handle) = AccessNotifier::spawn(sink.clone(), 16, 2);
        notifier.notify(event());
        drop(notifier);
        handle.await.unwrap();

        // Initial attempt plus two retries.
        assert_eq!(sink.attempts.load(Ordering::SeqCst), 3);
        assert!(sink.inner.events.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn full_queue_drops_instead_of_blocking() {
        /// Parks every append until released, so the queue stays full.
        struct ParkedSink {
            release: tokio::sync::Notify,
            appended: AtomicU32,
        }

        #[async_trait]
        impl AuditSink for ParkedSink {
            async fn append(&self, _event: AuditEvent) -> Result<(), SinkError> {
                self.release.notified().await;
                self.appended.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        }

        let sink = Arc::new(ParkedSink {
            release: tokio::sync::Notify::new(),
            appended: AtomicU32::new(0),
        });
        let (notifier, handle) = AccessNotifier::spawn(sink.clone(), 1, 0);

        // Far more events than the queue holds; notify never blocks.
        for _ in 0..50 {
            notifier.notify(event());
        }
        drop(notifier);

        // Release the worker until the queue drains.
        while !handle.is_finished() {
            sink.release.notify_one();
            tokio::task::yield_now().await;
        }
        handle.await.unwrap();

        let appended = sink.appended.load(Ordering::SeqCst);
        assert!(appended >= 1, "worker made no progress");
        assert!(appended < 50, "expected most events to be dropped, got {appended}");
    }
}
