use std::net::SocketAddr;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::{mpsc, oneshot};

use tile_merge::adapter::protocol::{create_ack, create_hello, to_line};
use tile_merge::adapter::runtime::InboundPayload;
use tile_merge::adapter::server::{run_server, ServerConfig};
use tile_merge::adapter::{InboundCommand, OutboundMessage};

async fn next_json(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> serde_json::Value {
    let line = tokio::time::timeout(Duration::from_secs(2), lines.next_line())
        .await
        .expect("timeout waiting for line")
        .expect("io error")
        .expect("expected line");
    serde_json::from_str(&line).unwrap()
}

/// Connect and finish the handshake without observation streaming
async fn handshake(
    addr: SocketAddr,
    name: &str,
) -> (Lines<BufReader<OwnedReadHalf>>, OwnedWriteHalf, serde_json::Value) {
    let stream = TcpStream::connect(addr).await.unwrap();
    let (read_half, mut write_half) = stream.into_split();
    let mut lines = BufReader::new(read_half).lines();

    let mut hello = create_hello(1, name, "1.0.0");
    hello.requested.stream_observations = false;
    let mut line = to_line("hello", &hello).unwrap();
    line.push('\n');
    write_half.write_all(line.as_bytes()).await.unwrap();
    write_half.flush().await.unwrap();

    let welcome = next_json(&mut lines).await;
    assert_eq!(welcome["type"], "welcome");
    (lines, write_half, welcome)
}

#[tokio::test]
async fn controller_disconnect_does_not_leave_stale_controller() {
    let config = ServerConfig {
        port: 0,
        max_pending_commands: 64,
        ..ServerConfig::default()
    };
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<InboundCommand>(128);
    let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();
    let (ready_tx, ready_rx) = oneshot::channel();

    let server = tokio::spawn(run_server(config, cmd_tx, out_rx, Some(ready_tx)));

    // Stand-in game loop: ack commands without touching any game.
    let acker = tokio::spawn(async move {
        while let Some(inbound) = cmd_rx.recv().await {
            if let InboundPayload::Command(_) = inbound.payload {
                let ack = create_ack(inbound.seq);
                let _ = out_tx.send(OutboundMessage::ToClientAck {
                    client_id: inbound.client_id,
                    ack,
                });
            }
        }
    });

    let addr = tokio::time::timeout(Duration::from_secs(2), ready_rx)
        .await
        .unwrap()
        .unwrap();

    let (first_lines, mut first_writer, welcome) = handshake(addr, "first").await;
    assert_eq!(welcome["role"], "controller");

    // Invalid UTF-8 makes the server's line reader fail, so cleanup runs on
    // the I/O error path rather than a clean EOF.
    first_writer.write_all(&[0xFF, b'\n']).await.unwrap();
    let _ = first_writer.flush().await;
    drop(first_writer);
    drop(first_lines);

    tokio::time::sleep(Duration::from_millis(50)).await;

    let (mut lines, mut writer, welcome) = handshake(addr, "second").await;
    assert_eq!(welcome["role"], "controller", "stale controller kept: {welcome}");

    let cmd = serde_json::json!({
        "type": "command",
        "seq": 2,
        "ts": 1,
        "actions": [{"select": 5}, "togglePause"]
    });
    writer
        .write_all(format!("{cmd}\n").as_bytes())
        .await
        .unwrap();
    writer.flush().await.unwrap();

    let resp = next_json(&mut lines).await;
    assert_eq!(resp["type"], "ack", "expected ack, got {resp}");
    assert_eq!(resp["seq"], 2);

    server.abort();
    acker.abort();
}
