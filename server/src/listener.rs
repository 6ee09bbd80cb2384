//! TCP accept loop
//!
//! Each accepted connection gets its own session task and its own timer
//! pool; sessions share nothing with each other.

use std::sync::atomic::{AtomicU32, Ordering};

use metronome_core::ServerConfig;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};

use crate::session::Session;

static NEXT_SESSION_ID: AtomicU32 = AtomicU32::new(0);

/// Bind the listener and serve until ctrl-c.
pub async fn serve(config: ServerConfig) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.listen_addr()).await?;
    info!(
        addr = %config.listen_addr(),
        timers_per_session = config.timers_per_session,
        "listening"
    );

    loop {
        tokio::select! {
            accepted = listener.accept() => {
                match accepted {
                    Ok((socket, peer)) => {
                        let session_id = NEXT_SESSION_ID.fetch_add(1, Ordering::Relaxed) + 1;
                        let session = Session::new(session_id, config.timers_per_session);
                        tokio::spawn(async move {
                            if let Err(error) = session.run(socket, peer).await {
                                error!(session_id, %error, "session ended with error");
                            }
                        });
                    }
                    Err(error) => error!(%error, "accept failed"),
                }
            }
            _ = signal::ctrl_c() => {
                info!("shutdown requested");
                break;
            }
        }
    }

    Ok(())
}
