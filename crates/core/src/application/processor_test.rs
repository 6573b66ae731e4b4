//! Unit tests for command submission routing and status

use crate::application::metrics::MetricsSink;
use crate::application::processor::{CommandProcessor, ProcessingResult};
use crate::application::queue::CommandQueue;
use crate::domain::{Command, Priority};
use crate::error::AppError;
use crate::port::command_executor::mocks::{MockBehavior, MockCommandExecutor};
use crate::port::id_provider::mocks::SequentialIdProvider;
use crate::port::time_provider::mocks::FixedTimeProvider;
use std::sync::Arc;
use std::time::Duration;

const NOW: i64 = 1_700_000_000_000;

struct Harness {
    queue: Arc<CommandQueue>,
    metrics: Arc<MetricsSink>,
    executor: Arc<MockCommandExecutor>,
    processor: CommandProcessor,
}

fn harness(capacity: usize, behavior: MockBehavior) -> Harness {
    let metrics = Arc::new(MetricsSink::new());
    let queue = Arc::new(CommandQueue::new(
        capacity,
        Duration::from_millis(10),
        Arc::clone(&metrics),
    ));
    let executor = Arc::new(MockCommandExecutor::new(behavior));
    let processor = CommandProcessor::new(
        Arc::clone(&queue),
        Arc::clone(&metrics),
        executor.clone(),
        Arc::new(SequentialIdProvider::default()),
        Arc::new(FixedTimeProvider(NOW)),
    );
    Harness {
        queue,
        metrics,
        executor,
        processor,
    }
}

fn command(description: &str, priority: Priority) -> Command {
    Command::new(description, priority, "Ellen Ripley", Some(NOW - 500))
}

#[tokio::test]
async fn test_critical_command_bypasses_queue() {
    let h = harness(5, MockBehavior::Success);

    let result = h
        .processor
        .submit(command("engage reactor purge", Priority::Critical))
        .await
        .unwrap();

    match result {
        ProcessingResult::CriticalExecuted {
            command_id,
            description,
            timestamp,
        } => {
            assert_eq!(command_id, "cmd-1");
            assert_eq!(description, "engage reactor purge");
            assert_eq!(timestamp, NOW);
        }
        other => panic!("expected CriticalExecuted, got {:?}", other),
    }

    assert_eq!(h.executor.call_count(), 1);
    assert_eq!(h.queue.size(), 0, "critical commands never touch the queue");
    assert_eq!(h.metrics.processed_total(), 1);
}

#[tokio::test]
async fn test_critical_failure_surfaces_execution_error() {
    let h = harness(5, MockBehavior::FailOnMarker("fail".to_string()));

    let err = h
        .processor
        .submit(command("fail the purge", Priority::Critical))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Execution(_)));
    assert_eq!(h.queue.size(), 0);
    assert_eq!(
        h.metrics.processed_total(),
        0,
        "failed criticals must not count as processed"
    );
}

#[tokio::test]
async fn test_non_critical_command_is_queued() {
    let h = harness(5, MockBehavior::Success);

    let result = h
        .processor
        .submit(command("inventory cargo bay", Priority::Medium))
        .await
        .unwrap();

    match result {
        ProcessingResult::Queued {
            queue_size,
            description,
            ..
        } => {
            assert_eq!(queue_size, 1);
            assert_eq!(description, "inventory cargo bay");
        }
        other => panic!("expected Queued, got {:?}", other),
    }

    assert_eq!(h.executor.call_count(), 0, "executor is critical-only");
    assert_eq!(h.queue.size(), 1);
    assert_eq!(h.metrics.queue_size(), 1);
    assert_eq!(h.metrics.processed_total(), 0, "queued is not yet processed");
}

#[tokio::test]
async fn test_overflow_is_propagated_and_counted() {
    let h = harness(1, MockBehavior::Success);

    h.processor
        .submit(command("first", Priority::Low))
        .await
        .unwrap();
    let err = h
        .processor
        .submit(command("second", Priority::Low))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::QueueOverflow { capacity: 1 }));
    assert_eq!(h.metrics.queue_overflow_total(), 1);
    assert_eq!(h.queue.size(), 1);
}

#[tokio::test]
async fn test_invalid_command_is_rejected_before_routing() {
    let h = harness(5, MockBehavior::Success);

    let err = h
        .processor
        .submit(Command::new("", Priority::Critical, "", Some(NOW)))
        .await
        .unwrap_err();

    let AppError::Validation(errors) = err else {
        panic!("expected validation error");
    };
    assert_eq!(errors.len(), 2);
    assert_eq!(h.executor.call_count(), 0);
    assert_eq!(h.queue.size(), 0);
}

#[tokio::test]
async fn test_queue_status_assembles_all_counters() {
    let h = harness(2, MockBehavior::Success);

    h.processor
        .submit(command("critical one", Priority::Critical))
        .await
        .unwrap();
    h.processor
        .submit(command("queued one", Priority::High))
        .await
        .unwrap();
    h.processor
        .submit(command("queued two", Priority::Low))
        .await
        .unwrap();
    let _ = h
        .processor
        .submit(command("overflowing", Priority::Low))
        .await
        .unwrap_err();

    let status = h.processor.queue_status();
    assert_eq!(status.queue_size, 2);
    assert_eq!(status.capacity, 2);
    assert!(!status.running);
    assert_eq!(status.processed_total, 1);
    assert_eq!(status.processed_by_author.get("Ellen Ripley"), Some(&1));
    assert_eq!(status.queue_overflow_total, 1);
    assert_eq!(status.timestamp, NOW);
}

#[tokio::test]
async fn test_drained_commands_count_once_per_author() {
    use crate::application::queue::DrainHandler;

    let h = harness(5, MockBehavior::Success);

    h.processor
        .on_command(command("drained", Priority::Low))
        .await
        .unwrap();

    assert_eq!(h.metrics.processed_total(), 1);
    let snapshot = h.metrics.snapshot();
    assert_eq!(snapshot.processed_by_author.get("Ellen Ripley"), Some(&1));
}
