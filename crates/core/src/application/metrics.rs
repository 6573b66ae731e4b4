// Metrics Sink
//
// Concurrent-safe counters shared by producer contexts and the single drain
// loop. Per-author cardinality is unbounded; accepted as a known risk.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

/// Thread-safe counters and gauges for the command pipeline
#[derive(Debug, Default)]
pub struct MetricsSink {
    processed_total: AtomicU64,
    queue_overflow_total: AtomicU64,
    queue_size: AtomicUsize,
    processed_by_author: Mutex<HashMap<String, u64>>,
}

/// Point-in-time copy of all counters.
///
/// Each field is independently consistent; cross-field atomicity is not
/// guaranteed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub queue_size: usize,
    pub processed_total: u64,
    pub processed_by_author: HashMap<String, u64>,
    pub queue_overflow_total: u64,
}

impl MetricsSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment the per-author counter (created on first use) and the
    /// global processed total.
    pub fn increment_processed(&self, author: &str) {
        {
            let mut by_author = self
                .processed_by_author
                .lock()
                .unwrap_or_else(|e| e.into_inner());
            *by_author.entry(author.to_string()).or_insert(0) += 1;
        }
        self.processed_total.fetch_add(1, Ordering::SeqCst);
    }

    /// Register a queue overflow event
    pub fn increment_overflow(&self) {
        self.queue_overflow_total.fetch_add(1, Ordering::SeqCst);
    }

    /// Set the current queue size gauge (last-write-wins)
    pub fn set_queue_size(&self, size: usize) {
        self.queue_size.store(size, Ordering::SeqCst);
    }

    pub fn processed_total(&self) -> u64 {
        self.processed_total.load(Ordering::SeqCst)
    }

    pub fn queue_overflow_total(&self) -> u64 {
        self.queue_overflow_total.load(Ordering::SeqCst)
    }

    pub fn queue_size(&self) -> usize {
        self.queue_size.load(Ordering::SeqCst)
    }

    /// Copy all counters. Writers are only blocked for the duration of the
    /// per-author map copy.
    pub fn snapshot(&self) -> MetricsSnapshot {
        let processed_by_author = self
            .processed_by_author
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone();

        MetricsSnapshot {
            queue_size: self.queue_size(),
            processed_total: self.processed_total(),
            processed_by_author,
            queue_overflow_total: self.queue_overflow_total(),
        }
    }
}
