// Audit Decorator
//
// Explicit start/success/error wrapping around the processor surface,
// replacing implicit cross-cutting interception. Records go to a pluggable
// sink; the default sink writes JSON lines through `tracing`.

use crate::application::processor::{CommandProcessor, ProcessingResult, QueueStatus};
use crate::domain::Command;
use crate::error::Result;
use crate::port::{IdProvider, TimeProvider};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditStatus {
    Start,
    Success,
    Error,
}

/// One audit entry; a start/outcome pair shares an `audit_id`
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    pub audit_id: String,
    pub timestamp: i64,
    pub status: AuditStatus,
    pub operation: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Destination for audit records
pub trait AuditSink: Send + Sync {
    fn record(&self, record: &AuditRecord);
}

/// Sink that emits audit records as JSON lines on the `audit` target
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, record: &AuditRecord) {
        match serde_json::to_string(record) {
            Ok(json) => info!(target: "audit", "{}", json),
            Err(e) => error!(error = %e, "failed to serialize audit record"),
        }
    }
}

/// Decorates `CommandProcessor` with audit records around each call
pub struct AuditedProcessor {
    inner: Arc<CommandProcessor>,
    sink: Arc<dyn AuditSink>,
    id_provider: Arc<dyn IdProvider>,
    time_provider: Arc<dyn TimeProvider>,
}

impl AuditedProcessor {
    pub fn new(
        inner: Arc<CommandProcessor>,
        sink: Arc<dyn AuditSink>,
        id_provider: Arc<dyn IdProvider>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            inner,
            sink,
            id_provider,
            time_provider,
        }
    }

    pub async fn submit(&self, command: Command) -> Result<ProcessingResult> {
        let audit_id = self.id_provider.generate_id();
        let summary = format!("{} from {}", command.priority, command.author);
        self.emit(&audit_id, AuditStatus::Start, "submit", Some(summary));

        match self.inner.submit(command).await {
            Ok(result) => {
                let outcome = match &result {
                    ProcessingResult::CriticalExecuted { command_id, .. } => {
                        format!("critical executed ({})", command_id)
                    }
                    ProcessingResult::Queued {
                        command_id,
                        queue_size,
                        ..
                    } => format!("queued ({}) at size {}", command_id, queue_size),
                };
                self.emit(&audit_id, AuditStatus::Success, "submit", Some(outcome));
                Ok(result)
            }
            Err(e) => {
                self.emit(&audit_id, AuditStatus::Error, "submit", Some(e.to_string()));
                Err(e)
            }
        }
    }

    pub fn queue_status(&self) -> QueueStatus {
        let audit_id = self.id_provider.generate_id();
        self.emit(&audit_id, AuditStatus::Start, "queue_status", None);

        let status = self.inner.queue_status();

        self.emit(
            &audit_id,
            AuditStatus::Success,
            "queue_status",
            Some(format!("queue size {}", status.queue_size)),
        );
        status
    }

    fn emit(&self, audit_id: &str, status: AuditStatus, operation: &'static str, detail: Option<String>) {
        self.sink.record(&AuditRecord {
            audit_id: audit_id.to_string(),
            timestamp: self.time_provider.now_millis(),
            status,
            operation,
            detail,
        });
    }
}
