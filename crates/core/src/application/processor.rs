// Command Processor - submission and status surface
//
// Owns validation and the critical/non-critical routing decision. Also
// implements the drain callback for commands coming back out of the queue.

use crate::application::metrics::MetricsSink;
use crate::application::queue::{CommandQueue, DrainHandler, QueueFullError};
use crate::application::validation;
use crate::domain::Command;
use crate::error::{AppError, Result};
use crate::port::{CommandExecutor, IdProvider, TimeProvider};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingResult {
    /// CRITICAL command executed synchronously in the caller's context
    #[serde(rename = "critical_command_executed")]
    CriticalExecuted {
        command_id: String,
        description: String,
        timestamp: i64,
    },
    /// Command appended to the queue; `queue_size` is the post-enqueue size
    #[serde(rename = "command_queued")]
    Queued {
        command_id: String,
        description: String,
        queue_size: usize,
        timestamp: i64,
    },
}

/// Read-only aggregate of queue and metrics state.
///
/// Each field is independently consistent; there is no cross-field atomicity.
#[derive(Debug, Clone, Serialize)]
pub struct QueueStatus {
    pub queue_size: usize,
    pub capacity: usize,
    pub running: bool,
    pub processed_total: u64,
    pub processed_by_author: HashMap<String, u64>,
    pub queue_overflow_total: u64,
    pub timestamp: i64,
}

/// Externally-facing submission and status API
pub struct CommandProcessor {
    queue: Arc<CommandQueue>,
    metrics: Arc<MetricsSink>,
    executor: Arc<dyn CommandExecutor>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl CommandProcessor {
    pub fn new(
        queue: Arc<CommandQueue>,
        metrics: Arc<MetricsSink>,
        executor: Arc<dyn CommandExecutor>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            queue,
            metrics,
            executor,
            id_provider,
            time_provider,
        }
    }

    /// Submit a command for processing.
    ///
    /// CRITICAL commands execute immediately in the caller's context and
    /// never touch the queue; everything else is enqueued for the drain loop.
    pub async fn submit(&self, command: Command) -> Result<ProcessingResult> {
        validation::validate(&command, self.time_provider.now_millis())?;

        if command.priority.is_critical() {
            self.execute_critical(command).await
        } else {
            self.enqueue(command)
        }
    }

    async fn execute_critical(&self, command: Command) -> Result<ProcessingResult> {
        info!(
            author = %command.author,
            description = %command.description,
            "executing critical command"
        );

        // No retry and no queue fallback; metrics only move on success.
        self.executor.execute(&command).await?;

        self.metrics.increment_processed(&command.author);
        info!(author = %command.author, "critical command executed");

        Ok(ProcessingResult::CriticalExecuted {
            command_id: self.id_provider.generate_id(),
            description: command.description,
            timestamp: self.time_provider.now_millis(),
        })
    }

    fn enqueue(&self, command: Command) -> Result<ProcessingResult> {
        let description = command.description.clone();

        match self.queue.enqueue(command) {
            Ok(queue_size) => {
                self.metrics.set_queue_size(queue_size);
                info!(queue_size, "command queued");
                Ok(ProcessingResult::Queued {
                    command_id: self.id_provider.generate_id(),
                    description,
                    queue_size,
                    timestamp: self.time_provider.now_millis(),
                })
            }
            Err(QueueFullError { capacity }) => {
                self.metrics.increment_overflow();
                warn!(capacity, "command queue overflow");
                Err(AppError::QueueOverflow { capacity })
            }
        }
    }

    /// Point-in-time view of the pipeline assembled from the individual
    /// thread-safe counters
    pub fn queue_status(&self) -> QueueStatus {
        let state = self.queue.state();
        let snapshot = self.metrics.snapshot();

        QueueStatus {
            queue_size: state.current_size,
            capacity: state.capacity,
            running: state.running,
            processed_total: snapshot.processed_total,
            processed_by_author: snapshot.processed_by_author,
            queue_overflow_total: snapshot.queue_overflow_total,
            timestamp: self.time_provider.now_millis(),
        }
    }
}

#[async_trait]
impl DrainHandler for CommandProcessor {
    /// Processing callback for dequeued commands (distinct from `submit`).
    ///
    /// Errors raised here are logged and swallowed by the drain loop.
    async fn on_command(&self, command: Command) -> Result<()> {
        info!(
            author = %command.author,
            description = %command.description,
            "processing queued command"
        );
        self.metrics.increment_processed(&command.author);
        Ok(())
    }
}
