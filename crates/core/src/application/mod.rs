// Application Layer - Pipeline services and business logic

pub mod audit;
pub mod constants;
pub mod metrics;
pub mod processor;
pub mod queue;
pub mod validation;

#[cfg(test)]
mod processor_test;

// Re-exports
pub use audit::{AuditRecord, AuditSink, AuditStatus, AuditedProcessor, TracingAuditSink};
pub use metrics::{MetricsSink, MetricsSnapshot};
pub use processor::{CommandProcessor, ProcessingResult, QueueStatus};
pub use queue::{CommandQueue, DrainHandler, QueueFullError, QueueState};
