// Command Queue - bounded FIFO with a single background drain loop

mod shutdown;


pub use shutdown::{shutdown_channel, ShutdownSender, ShutdownToken};

use crate::application::metrics::MetricsSink;
use crate::domain::Command;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

/// Enqueue rejection when the queue is at capacity.
///
/// A fast, synchronous failure: callers are never blocked waiting for space.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("command queue is full (capacity {capacity})")]
pub struct QueueFullError {
    pub capacity: usize,
}

/// Lifecycle snapshot of the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueState {
    pub capacity: usize,
    pub current_size: usize,
    pub running: bool,
}

/// Callback invoked by the drain loop for each dequeued command.
///
/// Errors are logged and swallowed by the loop; a bad command is dropped
/// after one attempt (no retry, no dead-letter path).
#[async_trait]
pub trait DrainHandler: Send + Sync {
    async fn on_command(&self, command: Command) -> Result<()>;
}

struct DrainLoop {
    shutdown: ShutdownSender,
    handle: JoinHandle<()>,
}

/// Fixed-capacity FIFO of commands plus its owned background drain loop.
///
/// Safe for concurrent enqueue-from-many / dequeue-from-one. The loop is the
/// single consumer, which makes processing order strict FIFO. The delay is
/// measured from completion of one tick to the start of the next, so a slow
/// handler naturally throttles throughput (fixed delay, not fixed rate).
///
/// Enqueues after `stop` are still accepted but are never drained.
pub struct CommandQueue {
    capacity: usize,
    processing_delay: Duration,
    metrics: Arc<MetricsSink>,
    buffer: Mutex<VecDeque<Command>>,
    len: AtomicUsize,
    drain: Mutex<Option<DrainLoop>>,
}

impl CommandQueue {
    /// Create a queue. `capacity` must be positive.
    pub fn new(capacity: usize, processing_delay: Duration, metrics: Arc<MetricsSink>) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self {
            capacity,
            processing_delay,
            metrics,
            buffer: Mutex::new(VecDeque::with_capacity(capacity)),
            len: AtomicUsize::new(0),
            drain: Mutex::new(None),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Current element count; safe to call concurrently with enqueue/dequeue
    pub fn size(&self) -> usize {
        self.len.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.drain
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    pub fn state(&self) -> QueueState {
        QueueState {
            capacity: self.capacity,
            current_size: self.size(),
            running: self.is_running(),
        }
    }

    /// Non-blocking insert at the tail.
    ///
    /// Returns the queue size after the insert. Metrics updates are the
    /// caller's responsibility.
    pub fn enqueue(&self, command: Command) -> std::result::Result<usize, QueueFullError> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        if buffer.len() >= self.capacity {
            return Err(QueueFullError {
                capacity: self.capacity,
            });
        }
        buffer.push_back(command);
        let size = buffer.len();
        self.len.store(size, Ordering::SeqCst);
        debug!(queue_size = size, "command enqueued");
        Ok(size)
    }

    fn pop(&self) -> Option<Command> {
        let mut buffer = self.buffer.lock().unwrap_or_else(|e| e.into_inner());
        let command = buffer.pop_front();
        self.len.store(buffer.len(), Ordering::SeqCst);
        command
    }

    /// Start the drain loop on a dedicated task.
    ///
    /// Calling twice is an `InvalidState` error, never a double-schedule.
    pub fn start(self: &Arc<Self>, handler: Arc<dyn DrainHandler>) -> Result<()> {
        let mut drain = self.drain.lock().unwrap_or_else(|e| e.into_inner());
        if drain.is_some() {
            return Err(AppError::InvalidState(
                "drain loop already started".to_string(),
            ));
        }

        let (tx, token) = shutdown_channel();
        let queue = Arc::clone(self);
        let handle = tokio::spawn(async move {
            queue.drain_loop(handler, token).await;
        });
        *drain = Some(DrainLoop {
            shutdown: tx,
            handle,
        });

        info!(
            capacity = self.capacity,
            delay_ms = self.processing_delay.as_millis() as u64,
            "command queue drain loop started"
        );
        Ok(())
    }

    /// Signal the drain loop to stop, wait up to `timeout` for the in-flight
    /// tick, then force cancellation.
    ///
    /// No new dequeue begins after this returns; an in-flight tick may still
    /// complete or be abandoned past the timeout. Safe to call concurrently
    /// with enqueues and from within the drain callback itself.
    pub async fn stop(&self, timeout: Duration) {
        let drain = self.drain.lock().unwrap_or_else(|e| e.into_inner()).take();
        let Some(DrainLoop { shutdown, handle }) = drain else {
            warn!("stop requested but drain loop is not running");
            return;
        };

        info!("stopping command queue drain loop");
        shutdown.shutdown();

        let abort = handle.abort_handle();
        match tokio::time::timeout(timeout, handle).await {
            Ok(_) => info!("drain loop stopped"),
            Err(_) => {
                warn!(
                    timeout_ms = timeout.as_millis() as u64,
                    "drain loop did not stop in time, aborting"
                );
                abort.abort();
            }
        }
    }

    async fn drain_loop(self: Arc<Self>, handler: Arc<dyn DrainHandler>, mut shutdown: ShutdownToken) {
        loop {
            // The inter-tick sleep is the only intentional suspension point
            // and it is cancellable.
            tokio::select! {
                _ = sleep(self.processing_delay) => {}
                _ = shutdown.wait() => break,
            }
            if shutdown.is_shutdown() {
                break;
            }

            let Some(command) = self.pop() else { continue };
            self.metrics.set_queue_size(self.size());

            debug!(
                author = %command.author,
                priority = %command.priority,
                "drain tick: dequeued command"
            );

            // A failing or panicking handler must not kill the loop, so each
            // command runs in its own task and the JoinHandle absorbs panics.
            let tick_handler = Arc::clone(&handler);
            let tick = tokio::spawn(async move { tick_handler.on_command(command).await });

            match tick.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    error!(error = %e, "command processing failed, dropping command");
                }
                Err(join_err) if join_err.is_panic() => {
                    error!(error = ?join_err, "command handler panicked, dropping command");
                }
                Err(join_err) => {
                    error!(error = ?join_err, "command handler cancelled");
                }
            }
        }
        info!("drain loop exited");
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;

    /// Drain handler that records processed command descriptions in order
    #[derive(Default)]
    pub struct RecordingHandler {
        processed: Mutex<Vec<String>>,
    }

    impl RecordingHandler {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn processed(&self) -> Vec<String> {
            self.processed.lock().unwrap().clone()
        }

        pub fn count(&self) -> usize {
            self.processed.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl DrainHandler for RecordingHandler {
        async fn on_command(&self, command: Command) -> Result<()> {
            self.processed.lock().unwrap().push(command.description);
            Ok(())
        }
    }

    /// Drain handler that fails on commands whose description contains the
    /// marker and records everything it attempted
    pub struct FlakyHandler {
        marker: String,
        attempted: Mutex<Vec<String>>,
    }

    impl FlakyHandler {
        pub fn new(marker: impl Into<String>) -> Self {
            Self {
                marker: marker.into(),
                attempted: Mutex::new(Vec::new()),
            }
        }

        pub fn attempted(&self) -> Vec<String> {
            self.attempted.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DrainHandler for FlakyHandler {
        async fn on_command(&self, command: Command) -> Result<()> {
            self.attempted
                .lock()
                .unwrap()
                .push(command.description.clone());
            if command.description.contains(&self.marker) {
                return Err(AppError::Internal(format!(
                    "handler refused '{}'",
                    command.description
                )));
            }
            Ok(())
        }
    }

    /// Drain handler that panics on commands whose description contains the
    /// marker (for loop-survival tests)
    pub struct PanickingHandler {
        marker: String,
        survived: Mutex<Vec<String>>,
    }

    impl PanickingHandler {
        pub fn new(marker: impl Into<String>) -> Self {
            Self {
                marker: marker.into(),
                survived: Mutex::new(Vec::new()),
            }
        }

        pub fn survived(&self) -> Vec<String> {
            self.survived.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DrainHandler for PanickingHandler {
        async fn on_command(&self, command: Command) -> Result<()> {
            if command.description.contains(&self.marker) {
                panic!("handler panic on '{}'", command.description);
            }
            self.survived.lock().unwrap().push(command.description);
            Ok(())
        }
    }
}
