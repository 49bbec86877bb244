//! Core game logic module - pure, deterministic, and testable
//!
//! This module contains all the game rules, state management, and simulation logic.
//! It has **no dependencies** on UI, networking, or I/O, making it:
//!
//! - **Deterministic**: Same seed and inputs produce identical games
//! - **Testable**: The clock is advanced explicitly, so timing rules are exact in tests
//! - **Portable**: Can run in any environment (terminal, headless, remote-controlled)
//!
//! # Module Structure
//!
//! - [`board`]: 4x4 slot grid
//! - [`spawner`]: spawn value ladder, seeded placement and bonus cadence
//! - [`match_engine`]: pair eligibility and merging
//! - [`scoring`]: per-match points, combo and streak tracking
//! - [`timers`]: deterministic scheduler keyed by timer kind
//! - [`game_state`]: the session lifecycle tying it all together
//! - [`achievements`]: end-of-game achievement rules
//!
//! # Game Rules
//!
//! - A tile spawns 500ms after the start, then once per difficulty interval
//! - Spawned values follow the running maximum tile (1 until 64, 2 until 128, ...)
//! - Every 50th spawn is a bonus marker that matches any number
//! - Equal numbers merge into their sum; the merge lands on the second selection
//! - Each match scores 35, multiplied by the combo count from 2 upward
//! - The game ends when a spawn finds no empty slot
//!
//! # Example
//!
//! ```
//! use tile_merge_core::{GameSession, SessionConfig};
//! use tile_merge_types::{Difficulty, SessionPhase};
//!
//! let mut game = GameSession::new(SessionConfig::new(Difficulty::Normal), 12345);
//! game.start();
//!
//! // First tile after 500ms
//! game.advance(500);
//! assert_eq!(game.spawned(), 1);
//! assert_eq!(game.phase(), SessionPhase::Running);
//! ```

pub mod achievements;
pub mod board;
pub mod game_state;
pub mod match_engine;
pub mod rng;
pub mod scoring;
pub mod snapshot;
pub mod spawner;
pub mod timers;

pub use tile_merge_types as types;

// Re-export commonly used types for convenience
pub use achievements::{earned, Achievement};
pub use board::Board;
pub use game_state::{GameSession, PowerUps, SelectOutcome, SessionConfig};
pub use match_engine::{can_match, merged_value, MatchEngine, MatchOutcome, MergeResult};
pub use rng::SimpleRng;
pub use scoring::{calculate_match_score, ComboState, MatchScore, ScoreTracker, StreakState};
pub use snapshot::GameSnapshot;
pub use spawner::{is_bonus_spawn, spawn_value, Spawn, Spawner};
pub use timers::{Scheduler, TimerKind};
