//! Connection to a running timer service

use std::io;

use metronome_core::protocol::Command;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::task::JoinHandle;

/// Client side of one server connection.
///
/// Server lines (command replies and fired notifications) arrive at any
/// time, not just in response to input, so a background task prints them
/// as they come in.
pub struct Connection {
    writer: OwnedWriteHalf,
    printer: JoinHandle<()>,
}

impl Connection {
    pub async fn connect(address: &str) -> io::Result<Self> {
        let socket = TcpStream::connect(address).await?;
        let (read_half, writer) = socket.into_split();
        let printer = tokio::spawn(print_server_lines(read_half));
        Ok(Self { writer, printer })
    }

    /// Send one command in canonical wire form.
    pub async fn send(&mut self, command: &Command) -> io::Result<()> {
        self.writer
            .write_all(format!("{command}\n").as_bytes())
            .await
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        self.printer.abort();
    }
}

async fn print_server_lines(read_half: OwnedReadHalf) {
    let mut lines = BufReader::new(read_half).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        println!("<< {line}");
    }
    println!("server closed the connection");
}
