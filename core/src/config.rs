//! Server configuration
//!
//! Persisted with confy under the platform config directory
//! (`~/.config/metronome/server.toml` on Linux). A missing or unreadable
//! file falls back to defaults.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors during configuration persistence
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration")]
    Load(#[from] confy::ConfyError),

    #[error("failed to save configuration")]
    Save(#[source] confy::ConfyError),
}

/// Listener and session settings for the timer service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address the TCP listener binds
    pub bind_address: String,

    /// Port the TCP listener binds
    pub port: u16,

    /// Slots in each session's timer pool
    pub timers_per_session: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 7654,
            timers_per_session: 5,
        }
    }
}

impl ServerConfig {
    /// Load the stored configuration, falling back to defaults.
    pub fn load() -> Self {
        confy::load("metronome", "server").unwrap_or_default()
    }

    /// Persist the configuration.
    pub fn save(&self) -> Result<(), ConfigError> {
        confy::store("metronome", "server", self).map_err(ConfigError::Save)
    }

    /// `bind_address:port` as passed to the listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}
