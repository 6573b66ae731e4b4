// Default critical-command executor
//
// Logs the command and refuses descriptions carrying the failure marker.
// Real deployments plug their own CommandExecutor in at the composition root.

use async_trait::async_trait;
use synth_core::domain::Command;
use synth_core::port::{CommandExecutor, ExecutionError};
use tracing::info;

/// Marker in a description that makes execution fail (used by failure drills)
pub const FAILURE_MARKER: &str = "fail";

pub struct LoggingExecutor;

#[async_trait]
impl CommandExecutor for LoggingExecutor {
    async fn execute(&self, command: &Command) -> Result<(), ExecutionError> {
        info!(
            author = %command.author,
            description = %command.description,
            "executing critical command"
        );

        if command.description.contains(FAILURE_MARKER) {
            return Err(ExecutionError::Failed(format!(
                "critical command refused: description contains '{}'",
                FAILURE_MARKER
            )));
        }
        Ok(())
    }
}
