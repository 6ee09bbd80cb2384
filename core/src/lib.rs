pub mod config;
pub mod protocol;
pub mod timer;

// Re-exports for convenience
pub use config::{ConfigError, ServerConfig};
pub use protocol::{Command, ProtocolError, Reply, Verb};
pub use timer::{PoolError, PoolHandle, TimerPool};
