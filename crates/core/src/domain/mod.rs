// Domain Layer - Pure business entities

pub mod command;

// Re-exports
pub use command::{Command, Priority};
