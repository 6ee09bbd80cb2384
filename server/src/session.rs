//! Per-connection session
//!
//! Architecture:
//! - read loop: frames request lines, parses commands, drives the pool
//! - writer task: drains a channel of replies, so pool callbacks (which run
//!   on the pool's worker thread) can enqueue fired notifications without
//!   ever touching the socket
//! - each session owns an independent `TimerPool`

use std::net::SocketAddr;

use metronome_core::protocol::{Command, Reply};
use metronome_core::timer::TimerPool;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// One client connection and its private timer pool.
pub struct Session {
    id: u32,
    pool: TimerPool,
}

impl Session {
    pub fn new(id: u32, timer_slots: usize) -> Self {
        Self {
            id,
            pool: TimerPool::new(timer_slots),
        }
    }

    /// Serve the connection until the peer disconnects.
    pub async fn run(self, socket: TcpStream, peer: SocketAddr) -> std::io::Result<()> {
        info!(session_id = self.id, %peer, "session opened");

        let (read_half, write_half) = socket.into_split();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let writer = tokio::spawn(write_replies(write_half, reply_rx));

        let mut lines = BufReader::new(read_half).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if line.trim().is_empty() {
                        continue;
                    }
                    let reply = self.dispatch(&line, &reply_tx);
                    if reply_tx.send(reply).is_err() {
                        break; // writer gone, the connection is dead
                    }
                }
                Ok(None) => break,
                Err(error) => {
                    warn!(session_id = self.id, %error, "read failed");
                    // Dropping the session tears the pool down; the writer
                    // exits once every reply sender is gone.
                    return Err(error);
                }
            }
        }

        // Drop the pool first: it joins the worker (so nothing fires past
        // this point) and releases the reply senders held by still-armed
        // callbacks. Only then can the writer drain and exit.
        drop(self.pool);
        drop(reply_tx);
        let _ = writer.await;

        info!(session_id = self.id, "session closed");
        Ok(())
    }

    /// Apply one request line to the pool and produce the direct reply.
    fn dispatch(&self, line: &str, reply_tx: &mpsc::UnboundedSender<Reply>) -> Reply {
        let command = match Command::parse(line) {
            Ok(command) => command,
            Err(error) => {
                warn!(session_id = self.id, line, %error, "rejected request");
                return Reply::Rejected {
                    detail: error.to_string(),
                };
            }
        };

        debug!(session_id = self.id, %command, "request");
        let verb = command.verb();
        let slot = command.id();
        let result = match command {
            Command::Set { id, timeout } => {
                self.pool.arm(id, timeout, fired_notifier(reply_tx.clone(), id))
            }
            Command::Cancel { id } => self.pool.cancel(id),
            Command::Reset { id, timeout } => {
                self.pool
                    .reset(id, timeout, fired_notifier(reply_tx.clone(), id))
            }
        };

        match result {
            Ok(()) => Reply::Done { verb, id: slot },
            Err(error) => {
                debug!(session_id = self.id, %error, "pool refused command");
                Reply::failed(verb, slot, &error)
            }
        }
    }
}

/// Callback armed into the pool. Runs on the pool worker thread, so it only
/// enqueues the notification; the writer task owns the socket.
fn fired_notifier(
    reply_tx: mpsc::UnboundedSender<Reply>,
    id: usize,
) -> impl FnOnce() + Send + 'static {
    move || {
        let _ = reply_tx.send(Reply::Fired { id });
    }
}

async fn write_replies(mut socket: OwnedWriteHalf, mut replies: mpsc::UnboundedReceiver<Reply>) {
    while let Some(reply) = replies.recv().await {
        let line = format!("{reply}\n");
        if let Err(error) = socket.write_all(line.as_bytes()).await {
            debug!(%error, "write failed, dropping remaining replies");
            break;
        }
    }
}
