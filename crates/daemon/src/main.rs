//! Synth Core daemon - composition root
//!
//! Explicit constructor wiring: MetricsSink, then CommandQueue(capacity,
//! delay, metrics), then CommandProcessor(queue, metrics, executor), with the
//! audit decorator on the outside.

mod executor;
mod transport;

use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use executor::LoggingExecutor;
use synth_core::application::audit::{AuditedProcessor, TracingAuditSink};
use synth_core::application::constants::{
    DEFAULT_PROCESSING_DELAY, DEFAULT_QUEUE_CAPACITY, DEFAULT_STOP_TIMEOUT,
};
use synth_core::application::{CommandProcessor, CommandQueue, MetricsSink};
use synth_core::port::id_provider::UuidProvider;
use synth_core::port::time_provider::SystemTimeProvider;
use synth_core::port::TimeProvider;
use transport::LineTransport;

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize logging (JSON for production, pretty for development)
    let log_format = std::env::var("SYNTH_LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("synth=info,synth_core=info,audit=info"))?;

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty())
                .init();
        }
    }

    info!("Synth Core v{} starting...", VERSION);

    // 2. Load configuration
    let capacity: usize = std::env::var("SYNTH_QUEUE_CAPACITY")
        .ok()
        .and_then(|s| s.parse().ok())
        .filter(|c| *c > 0)
        .unwrap_or(DEFAULT_QUEUE_CAPACITY);

    let processing_delay = std::env::var("SYNTH_PROCESSING_DELAY_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_PROCESSING_DELAY);

    // 3. Wire the pipeline
    let time_provider: Arc<dyn TimeProvider> = Arc::new(SystemTimeProvider);
    let id_provider = Arc::new(UuidProvider);
    let metrics = Arc::new(MetricsSink::new());
    let queue = Arc::new(CommandQueue::new(
        capacity,
        processing_delay,
        Arc::clone(&metrics),
    ));
    let processor = Arc::new(CommandProcessor::new(
        Arc::clone(&queue),
        Arc::clone(&metrics),
        Arc::new(LoggingExecutor),
        id_provider.clone(),
        Arc::clone(&time_provider),
    ));
    let audited = Arc::new(AuditedProcessor::new(
        Arc::clone(&processor),
        Arc::new(TracingAuditSink),
        id_provider,
        Arc::clone(&time_provider),
    ));

    // 4. Start the drain loop; failure to start is fatal
    queue.start(processor)?;
    info!(
        capacity,
        delay_ms = processing_delay.as_millis() as u64,
        "command pipeline ready"
    );

    // 5. Serve submissions until stdin closes or a shutdown signal arrives
    let transport = LineTransport::new(audited, time_provider);
    tokio::select! {
        result = transport.run() => match result {
            Ok(()) => info!("transport closed"),
            Err(e) => tracing::error!(error = %e, "transport failed"),
        },
        _ = tokio::signal::ctrl_c() => info!("shutdown signal received"),
    }

    // 6. Graceful shutdown
    queue.stop(DEFAULT_STOP_TIMEOUT).await;
    info!("shutdown complete");

    Ok(())
}
