//! Adapter module - remote control via TCP socket with JSON protocol
//!
//! Lets an external agent (a bot, a test harness, a second screen) watch and
//! play the game over a TCP connection.
//!
//! # Protocol Overview
//!
//! The adapter implements a **line-delimited JSON protocol** over TCP:
//!
//! 1. **Connection**: Client connects to TCP socket (default: 127.0.0.1:7788)
//! 2. **Handshake**: Client sends `hello`, server responds with `welcome`
//! 3. **Controller Assignment**: First client to hello becomes the controller
//! 4. **Observation Streaming**: Server sends a board observation after every change
//! 5. **Commanding**: Controller sends commands to select tiles, pause or restart
//!
//! # Message Types
//!
//! ## Client → Server
//!
//! - **hello**: Initial handshake with client info and requested capabilities
//! - **command**: A list of actions (`"pause"`, `"resume"`, `"togglePause"`,
//!   `"restart"`, `{"select": 5}`)
//! - **control**: Claim or release controller status
//!
//! ## Server → Client
//!
//! - **welcome**: Response to hello with assigned role and capabilities
//! - **observation**: Full game snapshot (board cells, selection, score, combo, ...)
//! - **ack**: Command acknowledgment
//! - **error**: Error response with code and message
//!
//! # Environment Variables
//!
//! - `TILE_MERGE_AI_HOST`: Bind address (default: "127.0.0.1")
//! - `TILE_MERGE_AI_PORT`: Port number (default: 7788)
//! - `TILE_MERGE_AI_MAX_PENDING`: Command queue depth (default: 10)
//! - `TILE_MERGE_AI_DISABLED`: Set to "1" or "true" to disable adapter entirely
//!
//! # Example Protocol Flow
//!
//! ```text
//! Client -> Server: {"type":"hello","seq":1,"ts":1700000000000,"client":{"name":"bot","version":"0.1.0"},"protocol_version":"1.0.0"}
//! Server -> Client: {"type":"welcome","seq":1,"ts":1700000000001,"protocol_version":"1.0.0","client_id":1,"role":"controller",...}
//! Server -> Client: {"type":"observation","seq":1,"ts":1700000000002,"phase":"running","board":{"width":4,"height":4,"cells":[[2,0,0,0],...]},...}
//! Client -> Server: {"type":"command","seq":2,"ts":1700000000100,"actions":[{"select":0},{"select":5}]}
//! Server -> Client: {"type":"ack","seq":2,"ts":1700000000101,"status":"ok"}
//! ```
//!
//! Try it by hand:
//!
//! ```bash
//! nc 127.0.0.1 7788
//! {"type":"hello","seq":1,"ts":0,"client":{"name":"nc","version":"0"},"protocol_version":"1.0.0"}
//! ```

pub mod protocol;
pub mod runtime;
pub mod server;

pub use tile_merge_core as core;
pub use tile_merge_engine as engine;
pub use tile_merge_store as store;
pub use tile_merge_types as types;

pub use protocol::*;
pub use runtime::{Adapter, ClientCommand, InboundCommand, InboundPayload, OutboundMessage};
pub use server::{run_server, ServerConfig, ServerState};
