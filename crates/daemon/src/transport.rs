// Line Transport - minimal submission boundary
//
// One JSON command per stdin line, one JSON response per stdout line; the
// literal line "status" returns the queue status. Errors are mapped to
// response payloads the way an HTTP layer would map them to status codes
// (validation -> client error, overflow -> rate-limit-style response).

use anyhow::Result;
use serde_json::json;
use std::sync::Arc;
use synth_core::application::audit::AuditedProcessor;
use synth_core::domain::Command;
use synth_core::error::AppError;
use synth_core::port::TimeProvider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

pub struct LineTransport {
    processor: Arc<AuditedProcessor>,
    time_provider: Arc<dyn TimeProvider>,
}

impl LineTransport {
    pub fn new(processor: Arc<AuditedProcessor>, time_provider: Arc<dyn TimeProvider>) -> Self {
        Self {
            processor,
            time_provider,
        }
    }

    /// Read submissions until stdin closes
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();

        while let Some(line) = lines.next_line().await? {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.eq_ignore_ascii_case("status") {
                let status = self.processor.queue_status();
                println!("{}", serde_json::to_string(&status)?);
                continue;
            }

            let mut command: Command = match serde_json::from_str(line) {
                Ok(command) => command,
                Err(e) => {
                    warn!(error = %e, "malformed command line");
                    println!(
                        "{}",
                        json!({ "error": "malformed_request", "message": e.to_string() })
                    );
                    continue;
                }
            };

            // Boundary rule: submission time defaults to "now" when absent.
            if command.submitted_at.is_none() {
                command.submitted_at = Some(self.time_provider.now_millis());
            }

            match self.processor.submit(command).await {
                Ok(result) => println!("{}", serde_json::to_string(&result)?),
                Err(e) => println!("{}", error_response(&e)),
            }
        }
        Ok(())
    }
}

fn error_response(err: &AppError) -> String {
    let value = match err {
        AppError::Validation(fields) => {
            json!({ "error": "validation_failed", "fields": fields })
        }
        AppError::QueueOverflow { capacity } => {
            json!({ "error": "queue_overflow", "capacity": capacity, "retry_later": true })
        }
        AppError::Execution(e) => {
            json!({ "error": "execution_failed", "message": e.to_string() })
        }
        other => json!({ "error": "internal", "message": other.to_string() }),
    };
    value.to_string()
}
