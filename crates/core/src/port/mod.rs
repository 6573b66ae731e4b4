// Port Layer - Interfaces for external collaborators

pub mod command_executor;
pub mod id_provider; // For deterministic testing
pub mod time_provider;

// Re-exports
pub use command_executor::{CommandExecutor, ExecutionError};
pub use id_provider::IdProvider;
pub use time_provider::TimeProvider;
