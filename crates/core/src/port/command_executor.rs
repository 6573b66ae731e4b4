// Command Executor Port
// Abstraction for the side-effecting execution of CRITICAL commands.
// The core treats the implementation as opaque and never retries.

use crate::domain::Command;
use async_trait::async_trait;
use thiserror::Error;

/// Execution errors
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Command execution failed: {0}")]
    Failed(String),

    #[error("Command rejected by executor: {0}")]
    Rejected(String),
}

/// Command Executor trait
///
/// Invoked only for CRITICAL commands, synchronously in the submitter's
/// context. A failure is surfaced as-is; the command is never queued as a
/// fallback.
#[async_trait]
pub trait CommandExecutor: Send + Sync {
    /// Execute a command
    ///
    /// # Errors
    /// - ExecutionError::Failed if the execution step fails
    /// - ExecutionError::Rejected if the executor refuses the command
    async fn execute(&self, command: &Command) -> Result<(), ExecutionError>;
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock executor behavior
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        /// Always succeed
        Success,
        /// Always fail with message
        Fail(String),
        /// Fail only when the description contains the marker
        FailOnMarker(String),
        /// Panic with message (for isolation testing)
        Panic(String),
    }

    /// Mock Command Executor for testing
    pub struct MockCommandExecutor {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockCommandExecutor {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn new_success() -> Self {
            Self::new(MockBehavior::Success)
        }

        pub fn new_fail(message: impl Into<String>) -> Self {
            Self::new(MockBehavior::Fail(message.into()))
        }

        pub fn new_fail_on_marker(marker: impl Into<String>) -> Self {
            Self::new(MockBehavior::FailOnMarker(marker.into()))
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl CommandExecutor for MockCommandExecutor {
        async fn execute(&self, command: &Command) -> Result<(), ExecutionError> {
            *self.call_count.lock().unwrap() += 1;

            let behavior = self.behavior.lock().unwrap().clone();

            match behavior {
                MockBehavior::Success => Ok(()),
                MockBehavior::Fail(msg) => Err(ExecutionError::Failed(msg)),
                MockBehavior::FailOnMarker(marker) => {
                    if command.description.contains(&marker) {
                        Err(ExecutionError::Failed(format!(
                            "description contains failure marker '{}'",
                            marker
                        )))
                    } else {
                        Ok(())
                    }
                }
                MockBehavior::Panic(msg) => {
                    panic!("{}", msg); // Actually panic for isolation testing
                }
            }
        }
    }
}
