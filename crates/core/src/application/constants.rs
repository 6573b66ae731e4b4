// Pipeline constants (no magic values)
use std::time::Duration;

/// Maximum length of a command author, in characters
pub const MAX_AUTHOR_LEN: usize = 100;

/// Maximum length of a command description, in characters
pub const MAX_DESCRIPTION_LEN: usize = 1000;

/// Default queue capacity when none is configured
pub const DEFAULT_QUEUE_CAPACITY: usize = 100;

/// Default delay between drain ticks, measured from completion of one tick
/// to the start of the next (100ms)
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(100);

/// Default wait for the in-flight tick during shutdown (5s)
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(5);
