//! Protocol module - JSON message types for remote control
//!
//! Line-delimited JSON. Every message carries `type`, `seq` (sequence number)
//! and `ts` (timestamp in ms).

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

use crate::core::GameSnapshot;
use crate::types::{GameAction, SessionPhase, Slot, BOARD_SIDE, BOARD_SLOTS};

pub const PROTOCOL_VERSION: &str = "1.0.0";
pub const GAME_ID: &str = "tile-merge";

/// Most actions accepted in one command
pub const MAX_ACTIONS: usize = 32;

// ============== Client -> Game Messages ==============

/// Client hello message (first message to establish connection)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HelloMessage {
    pub seq: u64,
    pub ts: u64,
    pub client: ClientInfo,
    pub protocol_version: String,
    #[serde(default)]
    pub formats: FormatsList,
    #[serde(default)]
    pub requested: RequestedCapabilities,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatsList {
    pub json: bool,
}

impl Default for FormatsList {
    fn default() -> Self {
        Self { json: true }
    }
}

impl<'de> Deserialize<'de> for FormatsList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = FormatsList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of format strings")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut json = false;
                while let Some(v) = seq.next_element::<String>()? {
                    if v.eq_ignore_ascii_case("json") {
                        json = true;
                    }
                }
                Ok(FormatsList { json })
            }
        }

        deserializer.deserialize_seq(V)
    }
}

impl Serialize for FormatsList {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeSeq;
        let mut seq = serializer.serialize_seq(Some(usize::from(self.json)))?;
        if self.json {
            seq.serialize_element("json")?;
        }
        seq.end()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestedCapabilities {
    #[serde(default = "default_true")]
    pub stream_observations: bool,
}

impl Default for RequestedCapabilities {
    fn default() -> Self {
        Self {
            stream_observations: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Command message (controller only)
#[derive(Debug, Clone, Deserialize)]
pub struct CommandMessage {
    pub seq: u64,
    pub ts: u64,
    pub actions: Option<ActionList>,
}

/// Actions of one command, in order
///
/// Each element is a name (`"pause"`, `"resume"`, `"togglePause"`,
/// `"restart"`) or a selection object (`{"select": 5}`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionList(pub ArrayVec<GameAction, MAX_ACTIONS>);

struct WireAction(GameAction);

impl<'de> Deserialize<'de> for WireAction {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = WireAction;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an action name or {{\"select\": index}}")
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                GameAction::from_str(v)
                    .map(WireAction)
                    .ok_or_else(|| E::custom(format!("unknown action: {v}")))
            }

            fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::MapAccess<'de>,
            {
                let mut index: Option<u64> = None;
                while let Some(key) = map.next_key::<String>()? {
                    if key == "select" {
                        index = Some(map.next_value()?);
                    } else {
                        return Err(serde::de::Error::custom(format!("unknown action: {key}")));
                    }
                }
                match index {
                    Some(i) if (i as usize) < BOARD_SLOTS => {
                        Ok(WireAction(GameAction::Select(i as usize)))
                    }
                    Some(i) => Err(serde::de::Error::custom(format!(
                        "select index {i} out of range"
                    ))),
                    None => Err(serde::de::Error::custom("missing select index")),
                }
            }
        }

        deserializer.deserialize_any(V)
    }
}

impl<'de> Deserialize<'de> for ActionList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = ActionList;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "an array of actions")
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
            where
                A: serde::de::SeqAccess<'de>,
            {
                let mut out = ArrayVec::<GameAction, MAX_ACTIONS>::new();
                while let Some(WireAction(a)) = seq.next_element::<WireAction>()? {
                    out.try_push(a)
                        .map_err(|_| serde::de::Error::custom("too many actions"))?;
                }
                Ok(ActionList(out))
            }
        }

        deserializer.deserialize_seq(V)
    }
}

/// Control message (claim/release controller status)
#[derive(Debug, Clone, Deserialize)]
pub struct ControlMessage {
    pub seq: u64,
    pub ts: u64,
    pub action: ControlAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Claim,
    Release,
}

// ============== Game -> Client Messages ==============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssignedRole {
    Controller,
    Observer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AckStatus {
    #[serde(rename = "ok")]
    Ok,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    HandshakeRequired,
    ProtocolMismatch,
    NotController,
    ControllerActive,
    InvalidCommand,
    Backpressure,
}

/// Welcome message (response to hello)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WelcomeMessage {
    pub seq: u64,
    pub ts: u64,
    pub protocol_version: String,
    pub client_id: usize,
    pub role: AssignedRole,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_id: Option<usize>,
    pub game_id: String,
    pub capabilities: ServerCapabilities,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCapabilities {
    pub formats: FormatsList,
    pub actions: Vec<String>,
    /// Slots per board row and column
    pub board_side: usize,
}

/// Acknowledgment for an applied command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AckMessage {
    pub seq: u64,
    pub ts: u64,
    pub status: AckStatus,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub seq: u64,
    pub ts: u64,
    pub code: ErrorCode,
    pub message: String,
}

/// Game state observation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservationMessage {
    pub seq: u64,
    pub ts: u64,
    pub phase: String,
    pub playable: bool,
    pub paused: bool,
    pub game_over: bool,
    pub episode_id: u32,
    pub seed: u32,
    pub difficulty: String,
    pub board: BoardSnapshot,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<usize>,
    pub score: u64,
    pub max_number: u64,
    pub matches: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub streak: u32,
    pub spawned: u32,
    pub bonus_progress: u32,
    pub state_hash: StateHash,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub width: u8,
    pub height: u8,
    /// Row-major; 0 = empty, n = number, "bonus" = bonus marker
    pub cells: [[CellValue; BOARD_SIDE]; BOARD_SIDE],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellValue(pub Slot);

impl Serialize for CellValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self.0 {
            Slot::Empty => serializer.serialize_u64(0),
            Slot::Number(n) => serializer.serialize_u64(n),
            Slot::Bonus => serializer.serialize_str("bonus"),
        }
    }
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct V;
        impl<'de> serde::de::Visitor<'de> for V {
            type Value = CellValue;

            fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(f, "a tile value or \"bonus\"")
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(CellValue(if v == 0 {
                    Slot::Empty
                } else {
                    Slot::Number(v)
                }))
            }

            fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.eq_ignore_ascii_case("bonus") {
                    Ok(CellValue(Slot::Bonus))
                } else {
                    Err(E::custom("invalid cell"))
                }
            }
        }

        deserializer.deserialize_any(V)
    }
}

/// Deterministic state hash serialized as lowercase hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateHash(pub u64);

impl Serialize for StateHash {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&format!("{:016x}", self.0))
    }
}

impl<'de> Deserialize<'de> for StateHash {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        u64::from_str_radix(s.trim(), 16)
            .map(StateHash)
            .map_err(|_| serde::de::Error::custom("invalid hex"))
    }
}

/// Stable 64-bit FNV-1a hasher for `state_hash`.
///
/// `DefaultHasher` output is not guaranteed stable across Rust versions.
#[derive(Debug, Clone)]
pub struct Fnv1aHasher {
    state: u64,
}

impl Fnv1aHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
        }
    }
}

impl Default for Fnv1aHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl std::hash::Hasher for Fnv1aHasher {
    fn finish(&self) -> u64 {
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.state ^= b as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Hash of everything an observation reports except `seq`/`ts`
pub fn state_hash(snapshot: &GameSnapshot) -> StateHash {
    use std::hash::{Hash, Hasher};

    let mut hasher = Fnv1aHasher::new();
    snapshot.slots.hash(&mut hasher);
    snapshot.phase.hash(&mut hasher);
    snapshot.selected.hash(&mut hasher);
    snapshot.difficulty.hash(&mut hasher);
    snapshot.episode_id.hash(&mut hasher);
    snapshot.seed.hash(&mut hasher);
    snapshot.score.hash(&mut hasher);
    snapshot.max_number.hash(&mut hasher);
    snapshot.matches.hash(&mut hasher);
    snapshot.combo.hash(&mut hasher);
    snapshot.max_combo.hash(&mut hasher);
    snapshot.streak.hash(&mut hasher);
    snapshot.spawned.hash(&mut hasher);
    StateHash(hasher.finish())
}

/// Build an observation from a snapshot
pub fn build_observation(snapshot: &GameSnapshot, seq: u64) -> ObservationMessage {
    let cells: [[CellValue; BOARD_SIDE]; BOARD_SIDE] = std::array::from_fn(|row| {
        std::array::from_fn(|col| CellValue(snapshot.slots[row * BOARD_SIDE + col]))
    });

    ObservationMessage {
        seq,
        ts: current_timestamp_ms(),
        phase: snapshot.phase.as_str().to_string(),
        playable: snapshot.playable(),
        paused: snapshot.phase == SessionPhase::Paused,
        game_over: snapshot.phase == SessionPhase::Ended,
        episode_id: snapshot.episode_id,
        seed: snapshot.seed,
        difficulty: snapshot.difficulty.as_str().to_string(),
        board: BoardSnapshot {
            width: BOARD_SIDE as u8,
            height: BOARD_SIDE as u8,
            cells,
        },
        selected: snapshot.selected,
        score: snapshot.score,
        max_number: snapshot.max_number,
        matches: snapshot.matches,
        combo: snapshot.combo,
        max_combo: snapshot.max_combo,
        streak: snapshot.streak,
        spawned: snapshot.spawned,
        bonus_progress: snapshot.bonus_progress,
        state_hash: state_hash(snapshot),
    }
}

// ============== Message Parsing ==============

/// Parsed incoming message
#[derive(Debug, Clone)]
pub enum ParsedMessage {
    Hello(HelloMessage),
    Command(CommandMessage),
    Control(ControlMessage),
    Unknown(UnknownMessage),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownMessage {
    pub seq: u64,
}

/// Parse a JSON message from a string
pub fn parse_message(json: &str) -> Result<ParsedMessage, serde_json::Error> {
    #[derive(Debug, Deserialize)]
    #[serde(tag = "type")]
    enum InboundMessage {
        #[serde(rename = "hello")]
        Hello(HelloMessage),
        #[serde(rename = "command")]
        Command(CommandMessage),
        #[serde(rename = "control")]
        Control(ControlMessage),
    }

    match serde_json::from_str::<InboundMessage>(json) {
        Ok(InboundMessage::Hello(m)) => Ok(ParsedMessage::Hello(m)),
        Ok(InboundMessage::Command(m)) => Ok(ParsedMessage::Command(m)),
        Ok(InboundMessage::Control(m)) => Ok(ParsedMessage::Control(m)),
        Err(e) => {
            // An unknown message type is reported, not treated as a parse failure.
            #[derive(Debug, Deserialize)]
            struct Header {
                #[serde(rename = "type")]
                msg_type: Option<String>,
                seq: Option<u64>,
            }
            let header = serde_json::from_str::<Header>(json)?;
            match header.msg_type.as_deref() {
                Some("hello" | "command" | "control") => Err(e),
                _ => Ok(ParsedMessage::Unknown(UnknownMessage {
                    seq: header.seq.unwrap_or(0),
                })),
            }
        }
    }
}

/// Best-effort `seq` from a line that failed to parse
pub fn extract_seq_best_effort(s: &str) -> Option<u64> {
    let start = s.find("\"seq\"")?;
    let after_key = &s[start + 5..];
    let colon = after_key.find(':')?;
    let rest = after_key[colon + 1..].trim_start();
    let end = rest.bytes().take_while(u8::is_ascii_digit).count();
    if end == 0 {
        return None;
    }
    rest[..end].parse::<u64>().ok()
}

// ============== Serialization ==============

/// Serialize a server message as one JSON line with its `type` tag
pub fn to_line<T: Serialize>(msg_type: &str, msg: &T) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(msg)?;
    if let serde_json::Value::Object(map) = &mut value {
        map.insert(
            "type".to_string(),
            serde_json::Value::String(msg_type.to_string()),
        );
    }
    serde_json::to_string(&value)
}

/// Server message ready to write
#[derive(Debug, Clone)]
pub enum ServerMessage {
    Welcome(WelcomeMessage),
    Ack(AckMessage),
    Error(ErrorMessage),
    Observation(ObservationMessage),
}

impl ServerMessage {
    pub fn type_name(&self) -> &'static str {
        match self {
            ServerMessage::Welcome(_) => "welcome",
            ServerMessage::Ack(_) => "ack",
            ServerMessage::Error(_) => "error",
            ServerMessage::Observation(_) => "observation",
        }
    }

    pub fn seq(&self) -> u64 {
        match self {
            ServerMessage::Welcome(m) => m.seq,
            ServerMessage::Ack(m) => m.seq,
            ServerMessage::Error(m) => m.seq,
            ServerMessage::Observation(m) => m.seq,
        }
    }

    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        match self {
            ServerMessage::Welcome(m) => to_line(self.type_name(), m),
            ServerMessage::Ack(m) => to_line(self.type_name(), m),
            ServerMessage::Error(m) => to_line(self.type_name(), m),
            ServerMessage::Observation(m) => to_line(self.type_name(), m),
        }
    }
}

// ============== Utility Functions ==============

/// Create a hello message (clients and tests)
pub fn create_hello(seq: u64, client_name: &str, protocol_version: &str) -> HelloMessage {
    HelloMessage {
        seq,
        ts: current_timestamp_ms(),
        client: ClientInfo {
            name: client_name.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        protocol_version: protocol_version.to_string(),
        formats: FormatsList { json: true },
        requested: RequestedCapabilities {
            stream_observations: true,
        },
    }
}

/// Create a welcome message
pub fn create_welcome(
    seq: u64,
    protocol_version: &str,
    client_id: usize,
    role: AssignedRole,
    controller_id: Option<usize>,
) -> WelcomeMessage {
    let actions = [
        GameAction::Select(0),
        GameAction::TogglePause,
        GameAction::Pause,
        GameAction::Resume,
        GameAction::Restart,
    ]
    .iter()
    .map(|a| a.as_str().to_string())
    .collect();

    WelcomeMessage {
        seq,
        ts: current_timestamp_ms(),
        protocol_version: protocol_version.to_string(),
        client_id,
        role,
        controller_id,
        game_id: GAME_ID.to_string(),
        capabilities: ServerCapabilities {
            formats: FormatsList { json: true },
            actions,
            board_side: BOARD_SIDE,
        },
    }
}

/// Create an acknowledgment
pub fn create_ack(seq: u64) -> AckMessage {
    AckMessage {
        seq,
        ts: current_timestamp_ms(),
        status: AckStatus::Ok,
    }
}

/// Create an error message
pub fn create_error(seq: u64, code: ErrorCode, message: &str) -> ErrorMessage {
    ErrorMessage {
        seq,
        ts: current_timestamp_ms(),
        code,
        message: message.to_string(),
    }
}

/// Get current timestamp in milliseconds
pub fn current_timestamp_ms() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hello() {
        let json = r#"{"type":"hello","seq":1,"ts":1234567890,"client":{"name":"test-ai","version":"1.0.0"},"protocol_version":"1.0.0","formats":["json"],"requested":{"stream_observations":true}}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => {
                assert_eq!(msg.seq, 1);
                assert_eq!(msg.client.name, "test-ai");
                assert_eq!(msg.protocol_version, "1.0.0");
                assert!(msg.formats.json);
                assert!(msg.requested.stream_observations);
            }
            other => panic!("Expected Hello message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_hello_defaults() {
        let json = r#"{"type":"hello","seq":1,"ts":0,"client":{"name":"a","version":"0"},"protocol_version":"1.0.0"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Hello(msg) => assert!(msg.requested.stream_observations),
            other => panic!("Expected Hello message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_command_actions() {
        let json = r#"{"type":"command","seq":2,"ts":1,"actions":["pause",{"select":5},"togglePause","restart","resume"]}"#;

        match parse_message(json).unwrap() {
            ParsedMessage::Command(msg) => {
                let a = msg.actions.unwrap();
                assert_eq!(
                    a.0.as_slice(),
                    &[
                        GameAction::Pause,
                        GameAction::Select(5),
                        GameAction::TogglePause,
                        GameAction::Restart,
                        GameAction::Resume,
                    ]
                );
            }
            other => panic!("Expected Command message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_command_rejects_bad_actions() {
        let out_of_range = r#"{"type":"command","seq":2,"ts":1,"actions":[{"select":16}]}"#;
        assert!(parse_message(out_of_range).is_err());

        let unknown = r#"{"type":"command","seq":2,"ts":1,"actions":["shuffle"]}"#;
        assert!(parse_message(unknown).is_err());
    }

    #[test]
    fn test_parse_control() {
        let json = r#"{"type":"control","seq":3,"ts":1234567910,"action":"claim"}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Control(msg) => assert_eq!(msg.action, ControlAction::Claim),
            other => panic!("Expected Control message, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_unknown_type() {
        let json = r#"{"type":"dance","seq":9}"#;
        match parse_message(json).unwrap() {
            ParsedMessage::Unknown(m) => assert_eq!(m.seq, 9),
            other => panic!("Expected Unknown message, got {other:?}"),
        }
    }

    #[test]
    fn test_extract_seq_best_effort() {
        assert_eq!(extract_seq_best_effort(r#"{"seq": 42, oops"#), Some(42));
        assert_eq!(extract_seq_best_effort("garbage"), None);
    }

    #[test]
    fn test_welcome_line_has_type() {
        let welcome = create_welcome(1, PROTOCOL_VERSION, 7, AssignedRole::Controller, Some(7));
        let line = ServerMessage::Welcome(welcome).to_line().unwrap();
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["type"], "welcome");
        assert_eq!(v["role"], "controller");
        assert_eq!(v["client_id"], 7);
        assert_eq!(v["game_id"], GAME_ID);
        assert_eq!(v["capabilities"]["formats"][0], "json");
        assert_eq!(v["capabilities"]["board_side"], 4);
    }

    #[test]
    fn test_error_codes_snake_case() {
        let err = create_error(5, ErrorCode::NotController, "Only controller may send commands");
        let line = ServerMessage::Error(err).to_line().unwrap();
        let v: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(v["type"], "error");
        assert_eq!(v["code"], "not_controller");
    }

    #[test]
    fn test_observation_cells() {
        let mut snap = GameSnapshot::default();
        snap.slots[0] = Slot::Number(8);
        snap.slots[5] = Slot::Bonus;
        snap.phase = SessionPhase::Running;

        let obs = build_observation(&snap, 3);
        let v: serde_json::Value =
            serde_json::from_str(&ServerMessage::Observation(obs).to_line().unwrap()).unwrap();
        assert_eq!(v["type"], "observation");
        assert_eq!(v["board"]["cells"][0][0], 8);
        assert_eq!(v["board"]["cells"][1][1], "bonus");
        assert_eq!(v["board"]["cells"][3][3], 0);
        assert_eq!(v["phase"], "running");
        assert_eq!(v["playable"], true);
        assert_eq!(v["state_hash"].as_str().unwrap().len(), 16);
    }

    #[test]
    fn test_state_hash_tracks_board() {
        let mut snap = GameSnapshot::default();
        let before = state_hash(&snap);
        snap.slots[3] = Slot::Number(1);
        assert_ne!(before, state_hash(&snap));
        assert_eq!(state_hash(&snap), state_hash(&snap.clone()));
    }

    #[test]
    fn test_state_hash_hex_roundtrip() {
        let h = StateHash(0x00ab_cdef_0123_4567);
        let s = serde_json::to_string(&h).unwrap();
        assert_eq!(s, "\"00abcdef01234567\"");
        assert_eq!(serde_json::from_str::<StateHash>(&s).unwrap(), h);
    }
}
