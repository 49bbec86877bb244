//! Score history and the top-N view

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use tile_merge_types::{LEADERBOARD_HISTORY_LIMIT, LEADERBOARD_SIZE};

use crate::keys;
use crate::kv::KeyValueStore;
use crate::storage::Storage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub score: u64,
    /// Unix milliseconds; older records call this `date`
    #[serde(alias = "date")]
    pub timestamp: i64,
}

impl LeaderboardEntry {
    pub fn new(score: u64, timestamp: i64) -> Self {
        Self { score, timestamp }
    }

    /// Entry stamped with the current wall-clock time
    pub fn now(score: u64) -> Self {
        Self::new(score, Utc::now().timestamp_millis())
    }

    /// Local calendar date, or `-` for an out-of-range timestamp
    pub fn date_label(&self) -> String {
        DateTime::<Utc>::from_timestamp_millis(self.timestamp)
            .map(|t| t.with_timezone(&Local).format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string())
    }
}

/// Recorded games in insertion order, at most `LEADERBOARD_HISTORY_LIMIT`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Leaderboard {
    entries: Vec<LeaderboardEntry>,
}

impl Leaderboard {
    pub fn load<S: KeyValueStore>(storage: &Storage<S>) -> Self {
        let mut board: Self = storage.get(keys::LEADERBOARD, Self::default());
        board.trim();
        board
    }

    pub fn save<S: KeyValueStore>(&self, storage: &mut Storage<S>) -> bool {
        storage.set(keys::LEADERBOARD, self)
    }

    pub fn push(&mut self, entry: LeaderboardEntry) {
        self.entries.push(entry);
        self.trim();
    }

    /// Drop the lowest scores past the history limit
    ///
    /// Among equal lowest scores the newest goes first, so `top` is unchanged.
    fn trim(&mut self) {
        while self.entries.len() > LEADERBOARD_HISTORY_LIMIT {
            let Some(lowest) = self.entries.iter().map(|e| e.score).min() else {
                break;
            };
            if let Some(index) = self.entries.iter().rposition(|e| e.score == lowest) {
                self.entries.remove(index);
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best `LEADERBOARD_SIZE` entries, highest score first
    ///
    /// Equal scores keep their insertion order.
    pub fn top(&self) -> Vec<LeaderboardEntry> {
        let mut sorted = self.entries.clone();
        sorted.sort_by(|a, b| b.score.cmp(&a.score));
        sorted.truncate(LEADERBOARD_SIZE);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn test_top_sorted_and_capped() {
        let mut board = Leaderboard::default();
        for score in [5, 90, 40, 12, 77, 3, 61, 8, 150, 29, 44, 1] {
            board.push(LeaderboardEntry::new(score, score as i64));
        }
        let top = board.top();
        assert_eq!(top.len(), LEADERBOARD_SIZE);
        assert_eq!(top[0].score, 150);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        assert!(!top.iter().any(|e| e.score == 1 || e.score == 3));
        assert_eq!(board.len(), 12);
    }

    #[test]
    fn test_history_is_bounded() {
        let mut board = Leaderboard::default();
        for game in 0..(LEADERBOARD_HISTORY_LIMIT as u64 + 25) {
            board.push(LeaderboardEntry::new(game % 37, game as i64));
        }
        assert_eq!(board.len(), LEADERBOARD_HISTORY_LIMIT);

        let top = board.top();
        assert_eq!(top[0].score, 36);
        // Oldest of the tied best scores still ranks first.
        assert_eq!(top[0].timestamp, 36);

        board.push(LeaderboardEntry::new(1000, 0));
        assert_eq!(board.len(), LEADERBOARD_HISTORY_LIMIT);
        assert_eq!(board.top()[0].score, 1000);
    }

    #[test]
    fn test_oversized_history_trimmed_on_load() {
        let mut storage = Storage::new(MemoryStore::new());
        let entries: Vec<_> = (0..150u64).map(|s| LeaderboardEntry::new(s, 0)).collect();
        assert!(storage.set(keys::LEADERBOARD, &entries));

        let board = Leaderboard::load(&storage);
        assert_eq!(board.len(), LEADERBOARD_HISTORY_LIMIT);
        assert_eq!(board.top()[LEADERBOARD_SIZE - 1].score, 140);
    }

    #[test]
    fn test_persists_as_plain_list() {
        let mut storage = Storage::new(MemoryStore::new());
        let mut board = Leaderboard::default();
        board.push(LeaderboardEntry::new(10, 1_700_000_000_000));
        assert!(board.save(&mut storage));

        let raw = storage.inner().load(keys::LEADERBOARD).unwrap().unwrap();
        assert_eq!(raw, r#"[{"score":10,"timestamp":1700000000000}]"#);
        assert_eq!(Leaderboard::load(&storage), board);
    }

    #[test]
    fn test_reads_legacy_date_field() {
        let mut store = MemoryStore::new();
        store
            .save(keys::LEADERBOARD, r#"[{"score":300,"date":1600000000000}]"#)
            .unwrap();
        let board = Leaderboard::load(&Storage::new(store));
        assert_eq!(board.top(), vec![LeaderboardEntry::new(300, 1_600_000_000_000)]);
    }

    #[test]
    fn test_date_label() {
        assert_eq!(LeaderboardEntry::new(1, i64::MAX).date_label(), "-");
        assert_eq!(LeaderboardEntry::now(1).date_label().len(), 10);
    }
}
