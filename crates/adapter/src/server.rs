//! TCP server for the remote-control adapter
//!
//! Handles incoming connections and manages client lifecycle.
//! Uses tokio for async networking.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot, RwLock};
use tracing::{debug, info, warn};

use crate::protocol::*;
use crate::runtime::{ClientCommand, InboundCommand, InboundPayload, OutboundMessage};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub protocol_version: String,
    pub max_pending_commands: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7788,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands: 10,
        }
    }
}

impl ServerConfig {
    /// Create from `TILE_MERGE_AI_*` environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TILE_MERGE_AI_HOST").unwrap_or(defaults.host);
        let port = env::var("TILE_MERGE_AI_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("TILE_MERGE_AI_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);

        Self {
            host,
            port,
            protocol_version: PROTOCOL_VERSION.to_string(),
            max_pending_commands,
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid adapter address {}:{}", self.host, self.port))
    }

    /// Check if the adapter is disabled via `TILE_MERGE_AI_DISABLED`
    pub fn is_disabled() -> bool {
        std::env::var("TILE_MERGE_AI_DISABLED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    }
}

/// Shared server state
pub struct ServerState {
    config: ServerConfig,
    clients: RwLock<Vec<ClientHandle>>,
    controller: RwLock<Option<usize>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            clients: RwLock::new(Vec::new()),
            controller: RwLock::new(None),
        }
    }

    pub async fn controller(&self) -> Option<usize> {
        *self.controller.read().await
    }

    pub async fn client_count(&self) -> usize {
        self.clients.read().await.len()
    }

    async fn is_handshaken(&self, client_id: usize) -> bool {
        let clients = self.clients.read().await;
        clients
            .iter()
            .find(|c| c.id == client_id)
            .map(|c| c.handshaken)
            .unwrap_or(false)
    }

    async fn is_controller(&self, client_id: usize) -> bool {
        *self.controller.read().await == Some(client_id)
    }

    /// Enforce strictly increasing `seq` per client
    async fn check_and_update_seq(&self, client_id: usize, seq: u64) -> bool {
        let mut clients = self.clients.write().await;
        let Some(client) = clients.iter_mut().find(|c| c.id == client_id) else {
            return true;
        };
        match client.last_seq {
            Some(prev) if seq <= prev => false,
            _ => {
                client.last_seq = Some(seq);
                true
            }
        }
    }

    async fn send_to(&self, client_id: usize, msg: ServerMessage) {
        let clients = self.clients.read().await;
        if let Some(c) = clients.iter().find(|c| c.id == client_id) {
            let _ = c.tx.send(msg);
        }
    }

    async fn broadcast(&self, msg: ServerMessage) {
        let clients = self.clients.read().await;
        for c in clients.iter().filter(|c| c.handshaken && c.stream_observations) {
            let _ = c.tx.send(msg.clone());
        }
    }

    /// Drop a client, promoting the lowest remaining id if it held control
    async fn remove_client(&self, client_id: usize) {
        let mut controller = self.controller.write().await;
        let mut clients = self.clients.write().await;
        clients.retain(|c| c.id != client_id);

        if *controller != Some(client_id) {
            return;
        }
        let next_id = clients.iter().filter(|c| c.handshaken).map(|c| c.id).min();
        *controller = next_id;
        match next_id {
            Some(new_id) => {
                if let Some(c) = clients.iter_mut().find(|c| c.id == new_id) {
                    c.is_controller = true;
                }
                info!(client_id = new_id, "controller promoted");
            }
            None => info!(client_id, "controller released"),
        }
    }
}

/// Handle to a connected client
pub struct ClientHandle {
    pub id: usize,
    pub addr: SocketAddr,
    pub is_controller: bool,
    pub stream_observations: bool,
    pub handshaken: bool,
    pub last_seq: Option<u64>,
    pub tx: mpsc::UnboundedSender<ServerMessage>,
}

/// Start the TCP server
///
/// `ready_tx` receives the bound address (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    command_tx: mpsc::Sender<InboundCommand>,
    mut out_rx: mpsc::UnboundedReceiver<OutboundMessage>,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> anyhow::Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind adapter on {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "adapter listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let state = Arc::new(ServerState::new(config));
    let mut client_id_counter = 0usize;

    // Outbound dispatcher.
    {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            while let Some(msg) = out_rx.recv().await {
                match msg {
                    OutboundMessage::ToClientAck { client_id, ack } => {
                        state.send_to(client_id, ServerMessage::Ack(ack)).await
                    }
                    OutboundMessage::ToClientError { client_id, err } => {
                        state.send_to(client_id, ServerMessage::Error(err)).await
                    }
                    OutboundMessage::ToClientObservation { client_id, obs } => {
                        state
                            .send_to(client_id, ServerMessage::Observation(*obs))
                            .await
                    }
                    OutboundMessage::BroadcastObservation { obs } => {
                        state.broadcast(ServerMessage::Observation(*obs)).await
                    }
                }
            }
        });
    }

    loop {
        let (socket, addr) = listener.accept().await?;
        client_id_counter += 1;
        let client_id = client_id_counter;
        info!(client_id, %addr, "client connected");

        let state = Arc::clone(&state);
        let command_tx = command_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = handle_client(socket, addr, client_id, &state, command_tx).await {
                warn!(client_id, error = %e, "client error");
            }
            info!(client_id, "client disconnected");
        });
    }
}

/// Handle a single client connection
async fn handle_client(
    socket: TcpStream,
    addr: SocketAddr,
    client_id: usize,
    state: &ServerState,
    command_tx: mpsc::Sender<InboundCommand>,
) -> anyhow::Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut reader = BufReader::new(reader);
    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();

    state.clients.write().await.push(ClientHandle {
        id: client_id,
        addr,
        is_controller: false,
        stream_observations: false,
        handshaken: false,
        last_seq: None,
        tx: tx.clone(),
    });

    let write_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            let mut line = match msg.to_line() {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, kind = msg.type_name(), "failed to encode message");
                    continue;
                }
            };
            line.push('\n');
            if writer.write_all(line.as_bytes()).await.is_err() {
                break;
            }
            if writer.flush().await.is_err() {
                break;
            }
        }
    });

    let send_error = |seq: u64, code: ErrorCode, message: &str| {
        let _ = tx.send(ServerMessage::Error(create_error(seq, code, message)));
    };

    let mut line = String::new();
    let result = loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break Ok(()),
            Ok(_) => {}
            Err(e) => break Err(e.into()),
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        debug!(client_id, line = trimmed, "inbound");

        let parsed = match parse_message(trimmed) {
            Ok(parsed) => parsed,
            Err(e) => {
                let seq = extract_seq_best_effort(trimmed).unwrap_or(0);
                send_error(seq, ErrorCode::InvalidCommand, &format!("JSON parse error: {e}"));
                continue;
            }
        };

        match parsed {
            ParsedMessage::Hello(hello) => {
                if state.is_handshaken(client_id).await {
                    if !state.check_and_update_seq(client_id, hello.seq).await {
                        send_error(
                            hello.seq,
                            ErrorCode::InvalidCommand,
                            "seq must be strictly increasing",
                        );
                    } else {
                        send_error(hello.seq, ErrorCode::InvalidCommand, "Already handshaken");
                    }
                    continue;
                }

                if !hello.protocol_version.starts_with("1.") {
                    send_error(
                        hello.seq,
                        ErrorCode::ProtocolMismatch,
                        &format!("Protocol version {} not supported", hello.protocol_version),
                    );
                    break Ok(());
                }

                // Hold the controller lock across the check so two hellos
                // cannot both become controller.
                let role = {
                    let mut controller = state.controller.write().await;
                    let role = if controller.is_none() {
                        *controller = Some(client_id);
                        info!(client_id, client = %hello.client.name, "client is now controller");
                        AssignedRole::Controller
                    } else {
                        AssignedRole::Observer
                    };
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.handshaken = true;
                        client.last_seq = Some(hello.seq);
                        client.is_controller = role == AssignedRole::Controller;
                        client.stream_observations = hello.requested.stream_observations;
                    }
                    role
                };

                let welcome = create_welcome(
                    hello.seq,
                    &state.config.protocol_version,
                    client_id,
                    role,
                    state.controller().await,
                );
                let _ = tx.send(ServerMessage::Welcome(welcome));

                if hello.requested.stream_observations {
                    let _ = command_tx.try_send(InboundCommand {
                        client_id,
                        seq: hello.seq,
                        payload: InboundPayload::SnapshotRequest,
                    });
                }
            }

            ParsedMessage::Command(cmd) => {
                if !state.is_handshaken(client_id).await {
                    send_error(cmd.seq, ErrorCode::HandshakeRequired, "Send hello before command");
                    continue;
                }
                if !state.check_and_update_seq(client_id, cmd.seq).await {
                    send_error(cmd.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                if !state.is_controller(client_id).await {
                    send_error(cmd.seq, ErrorCode::NotController, "Only controller may send commands");
                    continue;
                }
                let Some(actions) = cmd.actions else {
                    send_error(cmd.seq, ErrorCode::InvalidCommand, "Missing actions");
                    continue;
                };

                let inbound = InboundCommand {
                    client_id,
                    seq: cmd.seq,
                    payload: InboundPayload::Command(ClientCommand::Actions(actions.0)),
                };
                // Ack is sent by the game loop once the command is applied.
                if command_tx.try_send(inbound).is_err() {
                    send_error(cmd.seq, ErrorCode::Backpressure, "Command queue is full");
                }
            }

            ParsedMessage::Control(ctrl) => {
                if !state.is_handshaken(client_id).await {
                    send_error(ctrl.seq, ErrorCode::HandshakeRequired, "Send hello before control");
                    continue;
                }
                if !state.check_and_update_seq(client_id, ctrl.seq).await {
                    send_error(ctrl.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }

                let mut controller = state.controller.write().await;
                let granted = match ctrl.action {
                    ControlAction::Claim if controller.is_none() => {
                        *controller = Some(client_id);
                        true
                    }
                    ControlAction::Claim => {
                        if *controller != Some(client_id) {
                            send_error(ctrl.seq, ErrorCode::ControllerActive, "Controller already assigned");
                            continue;
                        }
                        true
                    }
                    ControlAction::Release if *controller == Some(client_id) => {
                        *controller = None;
                        false
                    }
                    ControlAction::Release => {
                        send_error(ctrl.seq, ErrorCode::NotController, "Only controller may release");
                        continue;
                    }
                };
                {
                    let mut clients = state.clients.write().await;
                    if let Some(client) = clients.iter_mut().find(|c| c.id == client_id) {
                        client.is_controller = granted;
                    }
                }
                drop(controller);
                info!(client_id, action = ?ctrl.action, "control changed");
                let _ = tx.send(ServerMessage::Ack(create_ack(ctrl.seq)));
            }

            ParsedMessage::Unknown(unknown) => {
                if state.is_handshaken(client_id).await
                    && !state.check_and_update_seq(client_id, unknown.seq).await
                {
                    send_error(unknown.seq, ErrorCode::InvalidCommand, "seq must be strictly increasing");
                    continue;
                }
                send_error(unknown.seq, ErrorCode::InvalidCommand, "Unknown message type");
            }
        }
    };

    // Let queued replies (e.g. protocol_mismatch) flush before closing.
    drop(tx);
    state.remove_client(client_id).await;
    let _ = write_task.await;

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 7788);
        assert_eq!(config.protocol_version, PROTOCOL_VERSION);
        assert_eq!(config.socket_addr().unwrap().port(), 7788);
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }

    #[tokio::test]
    async fn test_seq_must_increase() {
        let state = ServerState::new(ServerConfig::default());
        let (tx, _rx) = mpsc::unbounded_channel();
        state.clients.write().await.push(ClientHandle {
            id: 1,
            addr: "127.0.0.1:1".parse().unwrap(),
            is_controller: false,
            stream_observations: false,
            handshaken: true,
            last_seq: Some(3),
            tx,
        });

        assert!(!state.check_and_update_seq(1, 3).await);
        assert!(state.check_and_update_seq(1, 4).await);
        assert!(!state.check_and_update_seq(1, 2).await);
    }

    #[tokio::test]
    async fn test_controller_promotion_picks_lowest_id() {
        let state = ServerState::new(ServerConfig::default());
        for id in [2usize, 5, 3] {
            let (tx, _rx) = mpsc::unbounded_channel();
            state.clients.write().await.push(ClientHandle {
                id,
                addr: "127.0.0.1:1".parse().unwrap(),
                is_controller: id == 2,
                stream_observations: true,
                handshaken: true,
                last_seq: None,
                tx,
            });
        }
        *state.controller.write().await = Some(2);

        state.remove_client(2).await;
        assert_eq!(state.controller().await, Some(3));
        assert_eq!(state.client_count().await, 2);

        state.remove_client(5).await;
        assert_eq!(state.controller().await, Some(3));
    }
}
