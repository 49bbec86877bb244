//! Adapter runtime integration.
//!
//! Bridges the sync game loop with the async TCP server.

use anyhow::Context;
use arrayvec::ArrayVec;
use tokio::runtime::Runtime;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::engine::{GameRunner, Presenter};
use crate::protocol::{build_observation, create_ack, AckMessage, ErrorMessage, ObservationMessage, MAX_ACTIONS};
use crate::server::{run_server, ServerConfig};
use crate::store::KeyValueStore;
use crate::types::GameAction;

/// Command delivered to the game loop.
#[derive(Debug, Clone)]
pub struct InboundCommand {
    pub client_id: usize,
    pub seq: u64,
    pub payload: InboundPayload,
}

#[derive(Debug, Clone)]
pub enum InboundPayload {
    Command(ClientCommand),
    SnapshotRequest,
}

/// Command payload.
#[derive(Debug, Clone)]
pub enum ClientCommand {
    Actions(ArrayVec<GameAction, MAX_ACTIONS>),
}

/// Outbound message to be delivered by the server.
#[derive(Debug, Clone)]
pub enum OutboundMessage {
    ToClientAck { client_id: usize, ack: AckMessage },
    ToClientError { client_id: usize, err: ErrorMessage },
    ToClientObservation { client_id: usize, obs: Box<ObservationMessage> },
    BroadcastObservation { obs: Box<ObservationMessage> },
}

/// Running adapter instance.
pub struct Adapter {
    _rt: Runtime,
    cmd_rx: mpsc::Receiver<InboundCommand>,
    out_tx: mpsc::UnboundedSender<OutboundMessage>,
    port: u16,
    obs_seq: u64,
    commands: u64,
}

impl Adapter {
    /// Start the adapter on its own runtime.
    pub fn start(config: ServerConfig) -> anyhow::Result<Self> {
        // Fail early on a bad address instead of inside the spawned task.
        let port = config.socket_addr()?.port();

        let max_pending = config.max_pending_commands.max(1);
        let (cmd_tx, cmd_rx) = mpsc::channel::<InboundCommand>(max_pending);
        let (out_tx, out_rx) = mpsc::unbounded_channel::<OutboundMessage>();

        let rt = Runtime::new().context("failed to create tokio runtime")?;
        rt.spawn(async move {
            if let Err(e) = run_server(config, cmd_tx, out_rx, None).await {
                warn!(error = %e, "adapter stopped");
            }
        });

        Ok(Self {
            _rt: rt,
            cmd_rx,
            out_tx,
            port,
            obs_seq: 0,
            commands: 0,
        })
    }

    /// Start the adapter from environment variables.
    ///
    /// Returns `Ok(None)` if `TILE_MERGE_AI_DISABLED` is set.
    pub fn start_from_env() -> anyhow::Result<Option<Self>> {
        if ServerConfig::is_disabled() {
            info!("remote control disabled via TILE_MERGE_AI_DISABLED");
            return Ok(None);
        }
        Self::start(ServerConfig::from_env()).map(Some)
    }

    /// Configured port (0 means OS-assigned)
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Commands applied through [`Adapter::pump`]
    pub fn commands_applied(&self) -> u64 {
        self.commands
    }

    pub fn try_recv(&mut self) -> Option<InboundCommand> {
        self.cmd_rx.try_recv().ok()
    }

    pub fn send(&self, msg: OutboundMessage) {
        let _ = self.out_tx.send(msg);
    }

    /// Apply every queued command to `runner`; true if any changed the game
    pub fn pump<S: KeyValueStore, P: Presenter>(&mut self, runner: &mut GameRunner<S, P>) -> bool {
        let mut changed = false;
        while let Some(cmd) = self.try_recv() {
            for msg in handle_inbound(runner, &cmd, &mut self.obs_seq) {
                if matches!(msg, OutboundMessage::ToClientAck { .. }) {
                    self.commands += 1;
                    changed = true;
                }
                self.send(msg);
            }
        }
        changed
    }

    /// Stream the current state to every observing client
    pub fn broadcast<S: KeyValueStore, P: Presenter>(&mut self, runner: &GameRunner<S, P>) {
        self.obs_seq += 1;
        let obs = build_observation(&runner.snapshot(), self.obs_seq);
        self.send(OutboundMessage::BroadcastObservation { obs: Box::new(obs) });
    }
}

/// Apply one inbound command to the game and build the replies
///
/// A command is acked and followed by a fresh observation for the sender;
/// a snapshot request only gets the observation.
pub fn handle_inbound<S: KeyValueStore, P: Presenter>(
    runner: &mut GameRunner<S, P>,
    cmd: &InboundCommand,
    obs_seq: &mut u64,
) -> ArrayVec<OutboundMessage, 2> {
    let mut out = ArrayVec::new();
    if let InboundPayload::Command(ClientCommand::Actions(actions)) = &cmd.payload {
        for &action in actions {
            runner.apply_action(action);
        }
        out.push(OutboundMessage::ToClientAck {
            client_id: cmd.client_id,
            ack: create_ack(cmd.seq),
        });
    }
    *obs_seq += 1;
    out.push(OutboundMessage::ToClientObservation {
        client_id: cmd.client_id,
        obs: Box::new(build_observation(&runner.snapshot(), *obs_seq)),
    });
    out
}
