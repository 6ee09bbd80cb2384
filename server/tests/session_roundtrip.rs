//! End-to-end wire tests: real listener, real client socket
//!
//! `SET:<id>:0` is used where a fire is wanted so tests never wait out a
//! real countdown; multi-second timeouts are used where a fire must NOT
//! happen within the observation window.

use std::net::SocketAddr;
use std::time::Duration;

use metronome_server::Session;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const TIMERS_PER_SESSION: usize = 5;

async fn spawn_server() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let mut next_id = 0;
        while let Ok((socket, peer)) = listener.accept().await {
            next_id += 1;
            let session = Session::new(next_id, TIMERS_PER_SESSION);
            tokio::spawn(async move {
                let _ = session.run(socket, peer).await;
            });
        }
    });

    addr
}

struct Client {
    lines: tokio::io::Lines<BufReader<OwnedReadHalf>>,
    writer: tokio::net::tcp::OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let socket = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = socket.into_split();
        Self {
            lines: BufReader::new(read_half).lines(),
            writer,
        }
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    async fn expect_line(&mut self, want: &str) {
        let line = timeout(Duration::from_secs(5), self.lines.next_line())
            .await
            .expect("timed out waiting for a server line")
            .unwrap()
            .expect("server closed the connection");
        assert_eq!(line, want);
    }

    async fn expect_silence(&mut self, window: Duration) {
        let read = timeout(window, self.lines.next_line()).await;
        assert!(
            read.is_err(),
            "expected no server line, got {:?}",
            read.unwrap()
        );
    }
}

#[tokio::test]
async fn set_fires_and_notifies() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("SET:0:0").await;
    client.expect_line("SET DONE:0").await;
    client.expect_line("CALLBACK EXECUTED:0").await;
}

#[tokio::test]
async fn double_set_is_refused() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("SET:1:30").await;
    client.expect_line("SET DONE:1").await;

    client.send("SET:1:30").await;
    client.expect_line("SET FAILED:1:ALREADY ACTIVE").await;
}

#[tokio::test]
async fn cancel_prevents_notification() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("SET:0:1").await;
    client.expect_line("SET DONE:0").await;

    client.send("CANCEL:0:").await;
    client.expect_line("CANCEL DONE:0").await;

    // Past the original 1s deadline, nothing may arrive
    client.expect_silence(Duration::from_millis(1500)).await;
}

#[tokio::test]
async fn cancel_of_inactive_slot_is_refused() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("CANCEL:3:").await;
    client.expect_line("CANCEL FAILED:3:NOT ACTIVE").await;
}

#[tokio::test]
async fn reset_replaces_pending_timer() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("SET:2:30").await;
    client.expect_line("SET DONE:2").await;

    client.send("RESET:2:0").await;
    client.expect_line("RESET DONE:2").await;
    client.expect_line("CALLBACK EXECUTED:2").await;
}

#[tokio::test]
async fn reset_of_inactive_slot_arms_it() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("RESET:4:0").await;
    client.expect_line("RESET DONE:4").await;
    client.expect_line("CALLBACK EXECUTED:4").await;
}

#[tokio::test]
async fn out_of_range_id_is_refused() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("SET:9:1").await;
    client.expect_line("SET FAILED:9:INVALID ID").await;
}

#[tokio::test]
async fn malformed_line_gets_error_reply() {
    let addr = spawn_server().await;
    let mut client = Client::connect(addr).await;

    client.send("PING:0:1").await;
    client
        .expect_line("ERROR:unknown verb 'PING': expected SET, CANCEL or RESET")
        .await;
}

#[tokio::test]
async fn sessions_have_independent_pools() {
    let addr = spawn_server().await;
    let mut first = Client::connect(addr).await;
    let mut second = Client::connect(addr).await;

    first.send("SET:0:30").await;
    first.expect_line("SET DONE:0").await;

    // Same slot id is free in the other session
    second.send("SET:0:30").await;
    second.expect_line("SET DONE:0").await;
}
