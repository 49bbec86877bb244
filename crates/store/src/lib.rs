//! Persistence for preferences, lifetime stats and the leaderboard
//!
//! Everything is JSON under a small set of well-known keys. The typed
//! [`Storage`] wrapper never fails outward: reads fall back to defaults and
//! writes report success as a bool, with the cause logged via `tracing`.
//!
//! # Example
//!
//! ```
//! use tile_merge_store::{GameStats, MemoryStore, Storage};
//! use tile_merge_types::GameSummary;
//!
//! let mut storage = Storage::new(MemoryStore::new());
//! let mut stats = GameStats::load(&storage);
//! stats.record(&GameSummary { score: 40, max_number: 8, matches: 1, max_combo: 1 });
//! assert!(stats.save(&mut storage));
//! assert_eq!(GameStats::load(&storage).total_games, 1);
//! ```

pub mod error;
pub mod kv;
pub mod leaderboard;
pub mod settings;
pub mod stats;
pub mod storage;

pub use tile_merge_types as types;

pub use error::{StoreError, StoreResult};
pub use kv::{FileStore, KeyValueStore, MemoryStore};
pub use leaderboard::{Leaderboard, LeaderboardEntry};
pub use settings::Settings;
pub use stats::GameStats;
pub use storage::Storage;

/// Well-known storage keys
pub mod keys {
    pub const DIFFICULTY: &str = "difficulty";
    pub const SOUND_ENABLED: &str = "soundEnabled";
    pub const HAPTIC_ENABLED: &str = "hapticEnabled";
    pub const DARK_THEME: &str = "darkTheme";
    pub const TUTORIAL_SHOWN: &str = "tutorialShown";
    pub const GAME_STATS: &str = "gameStats";
    pub const LEADERBOARD: &str = "leaderboard";
}
