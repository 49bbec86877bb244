//! Core types module - shared data structures and constants
//!
//! This module defines the fundamental types used throughout the application.
//! All types are pure data structures with no external dependencies, making them
//! usable in any context (core logic, terminal rendering, remote control protocol).
//!
//! # Board Dimensions
//!
//! The board is a 4x4 grid stored as 16 slots in row-major order
//! (index = row * 4 + column).
//!
//! # Timing Constants
//!
//! Timing values are in milliseconds:
//!
//! | Constant | Value | Description |
//! |----------|-------|-------------|
//! | `FIRST_SPAWN_DELAY_MS` | 500 | Delay before the first tile of a game |
//! | `COMBO_WINDOW_MS` | 2000 | Combo resets when no match lands in this window |
//! | `STREAK_WINDOW_MS` | 3000 | Max gap between matches that keeps a streak alive |
//! | `END_GAME_DELAY_MS` | 500 | Settle delay before ending after a merge fills the board |
//! | `COUNTDOWN_STEP_MS` | 1000 | Countdown step before a game starts |
//! | `COUNTDOWN_GO_MS` | 500 | Pause between "go" and the first tick |
//!
//! # Spawn Intervals by Difficulty
//!
//! | Difficulty | Interval |
//! |------------|----------|
//! | Easy | 2000ms |
//! | Normal | 1300ms |
//! | Hard | 800ms |
//!
//! # Examples
//!
//! ```
//! use tile_merge_types::{Difficulty, GameAction, Slot, BOARD_SLOTS};
//!
//! assert_eq!(BOARD_SLOTS, 16);
//!
//! let difficulty = Difficulty::from_str("HARD").unwrap();
//! assert_eq!(difficulty.spawn_interval_ms(), 800);
//!
//! assert_eq!(GameAction::from_str("togglePause"), Some(GameAction::TogglePause));
//!
//! assert!(Slot::Number(4).matches(Slot::Number(4)));
//! assert!(!Slot::Bonus.matches(Slot::Bonus));
//! ```

/// Board side length (4 columns, 4 rows)
pub const BOARD_SIDE: usize = 4;

/// Total number of slots on the board
pub const BOARD_SLOTS: usize = BOARD_SIDE * BOARD_SIDE;

/// Delay before the first spawn of a game
pub const FIRST_SPAWN_DELAY_MS: u32 = 500;

/// Combo window: the combo resets this long after the last match
pub const COMBO_WINDOW_MS: u32 = 2000;

/// Streak window: a match within this long of the previous one extends the streak
pub const STREAK_WINDOW_MS: u32 = 3000;

/// Delay between a merge that fills the board and the end of the game
pub const END_GAME_DELAY_MS: u32 = 500;

/// Countdown step length
pub const COUNTDOWN_STEP_MS: u32 = 1000;

/// Pause between the "go" step and the session start
pub const COUNTDOWN_GO_MS: u32 = 500;

/// Number of countdown steps shown before a game (3, 2, 1)
pub const COUNTDOWN_STEPS: u8 = 3;

/// Every Nth successful spawn places a bonus marker
pub const BONUS_SPAWN_PERIOD: u32 = 50;

/// Base points for a successful match
pub const MATCH_BASE_SCORE: u64 = 5;

/// Time bonus window; the bonus shrinks as the gap since the last match grows
pub const TIME_BONUS_WINDOW_MS: u64 = 3000;

/// One time-bonus point per this many milliseconds left in the window
pub const TIME_BONUS_DIVISOR: u64 = 100;

/// Combo multipliers apply from this combo count upward
pub const COMBO_MULTIPLIER_MIN: u32 = 2;

/// Spawn value ladder: `(threshold, value)`
///
/// The spawned value is the first `value` whose `threshold` is strictly greater
/// than the running maximum tile value.
pub const SPAWN_LADDER: [(u64, u64); 15] = [
    (64, 1),
    (128, 2),
    (256, 4),
    (512, 8),
    (1024, 16),
    (2048, 32),
    (4096, 64),
    (8192, 128),
    (16384, 256),
    (32768, 512),
    (65536, 1024),
    (131072, 2048),
    (262144, 4096),
    (524288, 8192),
    (1048576, 16384),
];

/// Spawn value once the running maximum passes the top of the ladder
pub const SPAWN_LADDER_CAP: u64 = 32768;

/// Number of leaderboard entries shown
pub const LEADERBOARD_SIZE: usize = 10;

/// Most games kept in the stored score history
pub const LEADERBOARD_HISTORY_LIMIT: usize = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timing_defaults() {
        assert_eq!(FIRST_SPAWN_DELAY_MS, 500);
        assert_eq!(COMBO_WINDOW_MS, 2000);
        assert_eq!(STREAK_WINDOW_MS, 3000);
        assert_eq!(BONUS_SPAWN_PERIOD, 50);
    }

    #[test]
    fn ladder_is_doubling() {
        for pair in SPAWN_LADDER.windows(2) {
            assert_eq!(pair[1].0, pair[0].0 * 2);
            assert_eq!(pair[1].1, pair[0].1 * 2);
        }
        assert_eq!(SPAWN_LADDER[SPAWN_LADDER.len() - 1].0, 1_048_576);
        assert_eq!(SPAWN_LADDER_CAP, 32768);
    }

    #[test]
    fn difficulty_round_trips_names() {
        for d in Difficulty::ALL {
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
        assert_eq!(Difficulty::from_str("nightmare"), None);
        assert_eq!(Difficulty::default(), Difficulty::Normal);
    }

    #[test]
    fn slot_eligibility() {
        assert!(Slot::Number(8).matches(Slot::Number(8)));
        assert!(!Slot::Number(8).matches(Slot::Number(4)));
        assert!(Slot::Bonus.matches(Slot::Number(3)));
        assert!(Slot::Number(3).matches(Slot::Bonus));
        assert!(!Slot::Bonus.matches(Slot::Bonus));
        assert!(!Slot::Empty.matches(Slot::Empty));
        assert!(!Slot::Empty.matches(Slot::Bonus));
    }
}

/// Content of a single board slot
///
/// - **Empty**: nothing placed
/// - **Number**: a numeric tile
/// - **Bonus**: wildcard that matches any numeric tile and resolves to the
///   session's current maximum tile value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slot {
    #[default]
    Empty,
    Number(u64),
    Bonus,
}

impl Slot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    pub fn is_bonus(&self) -> bool {
        matches!(self, Slot::Bonus)
    }

    /// Numeric value, if this slot holds a number
    pub fn value(&self) -> Option<u64> {
        match self {
            Slot::Number(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether two slots may be merged
    ///
    /// Equal numbers match; a bonus matches any number; nothing matches an
    /// empty slot and two bonuses never match each other.
    pub fn matches(&self, other: Slot) -> bool {
        match (*self, other) {
            (Slot::Number(a), Slot::Number(b)) => a == b,
            (Slot::Bonus, Slot::Number(_)) | (Slot::Number(_), Slot::Bonus) => true,
            _ => false,
        }
    }
}

/// Difficulty tiers, each with a fixed spawn interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    /// Milliseconds between spawn ticks
    pub fn spawn_interval_ms(&self) -> u32 {
        match self {
            Difficulty::Easy => 2000,
            Difficulty::Normal => 1300,
            Difficulty::Hard => 800,
        }
    }

    /// Parse difficulty from string (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_merge_types::Difficulty;
    ///
    /// assert_eq!(Difficulty::from_str("easy"), Some(Difficulty::Easy));
    /// assert_eq!(Difficulty::from_str("Normal"), Some(Difficulty::Normal));
    /// assert_eq!(Difficulty::from_str("unknown"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    /// Lowercase name, also used as the persisted value
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Normal => "normal",
            Difficulty::Hard => "hard",
        }
    }
}

/// Session lifecycle phase
///
/// `Idle -> Running <-> Paused -> Ended`; only a restart leaves `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Running,
    Paused,
    Ended,
}

impl SessionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Running => "running",
            SessionPhase::Paused => "paused",
            SessionPhase::Ended => "ended",
        }
    }
}

/// Game actions that can be applied to a session
///
/// These actions are used by both human input and remote control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameAction {
    /// Select the slot at the given index (the "cell selected" input)
    Select(usize),
    /// Pause if running, resume if paused
    TogglePause,
    /// Pause a running game
    Pause,
    /// Resume a paused game
    Resume,
    /// Start a fresh game, from any phase
    Restart,
}

impl GameAction {
    /// Parse a named action (for the remote protocol)
    ///
    /// `Select` carries an index and has no plain name.
    ///
    /// # Examples
    ///
    /// ```
    /// use tile_merge_types::GameAction;
    ///
    /// assert_eq!(GameAction::from_str("pause"), Some(GameAction::Pause));
    /// assert_eq!(GameAction::from_str("Restart"), Some(GameAction::Restart));
    /// assert_eq!(GameAction::from_str("select"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "togglepause" => Some(GameAction::TogglePause),
            "pause" => Some(GameAction::Pause),
            "resume" => Some(GameAction::Resume),
            "restart" => Some(GameAction::Restart),
            _ => None,
        }
    }

    /// camelCase name for the remote protocol
    pub fn as_str(&self) -> &'static str {
        match self {
            GameAction::Select(_) => "select",
            GameAction::TogglePause => "togglePause",
            GameAction::Pause => "pause",
            GameAction::Resume => "resume",
            GameAction::Restart => "restart",
        }
    }
}

/// Final figures of an ended game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GameSummary {
    pub score: u64,
    pub max_number: u64,
    pub matches: u32,
    pub max_combo: u32,
}

/// Core-side event, queued by the session and drained by the shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PhaseChanged(SessionPhase),
    SlotChanged { index: usize, slot: Slot },
    SelectionChanged { selected: Option<usize> },
    ScoreChanged { total: u64 },
    /// Emitted for matches that apply a combo multiplier (count >= 2)
    ComboTriggered { multiplier: u32 },
    StreakChanged { streak: u32 },
    Mismatch { first: usize, second: usize },
    Spawned { index: usize, value: u64, bonus: bool },
    GameEnded(GameSummary),
}
