// Synth Core - Command Admission & Processing Pipeline
// NO infrastructure dependencies: transport and metrics backends live outside

pub mod application;
pub mod domain;
pub mod error;
pub mod port;

pub use error::{AppError, Result};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
