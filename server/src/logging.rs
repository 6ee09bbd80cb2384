//! Logging configuration with optional file output
//!
//! Always logs to stdout; additionally writes to
//! `~/.config/metronome/server.log` (or platform equivalent) with 10 MB
//! size-based rotation when a config directory is available. Set
//! `DEBUG_LOGGING=1` to enable debug output for workspace crates.

use std::path::PathBuf;

use rolling_file::{BasicRollingFileAppender, RollingConditionBasic};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Initialize logging.
///
/// Returns the file writer guard, which must be held for the process
/// lifetime so buffered logs flush on shutdown; `None` means the file layer
/// was unavailable and only stdout is in use.
pub fn init() -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = EnvFilter::new(filter_directive());
    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_span_events(FmtSpan::NONE);

    let file_appender = log_dir().and_then(|dir| {
        std::fs::create_dir_all(&dir).ok()?;
        BasicRollingFileAppender::new(
            dir.join("server.log"),
            RollingConditionBasic::new().max_size(MAX_LOG_BYTES),
            1, // server.log plus one rotated file
        )
        .ok()
    });

    match file_appender {
        Some(appender) => {
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);
            let file_layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true)
                .with_span_events(FmtSpan::NONE);

            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(file_layer)
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(filter)
                .init();
            tracing::warn!("file logging unavailable, using stdout only");
            None
        }
    }
}

fn filter_directive() -> &'static str {
    if std::env::var("DEBUG_LOGGING").is_ok() {
        "info,metronome_core=debug,metronome_server=debug"
    } else {
        "info"
    }
}

fn log_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("metronome"))
}
