//! Lifetime statistics, written once per ended game

use serde::{Deserialize, Serialize};
use tile_merge_types::GameSummary;

use crate::keys;
use crate::kv::KeyValueStore;
use crate::storage::Storage;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameStats {
    pub total_games: u32,
    pub high_score: u64,
    pub max_number: u64,
    pub total_matches: u64,
    pub total_score: u64,
    pub max_combo: u32,
    pub achievements: Vec<String>,
}

impl GameStats {
    pub fn load<S: KeyValueStore>(storage: &Storage<S>) -> Self {
        storage.get(keys::GAME_STATS, Self::default())
    }

    pub fn save<S: KeyValueStore>(&self, storage: &mut Storage<S>) -> bool {
        storage.set(keys::GAME_STATS, self)
    }

    /// Fold one finished game into the totals
    pub fn record(&mut self, summary: &GameSummary) {
        self.total_games += 1;
        self.total_score = self.total_score.saturating_add(summary.score);
        self.total_matches = self.total_matches.saturating_add(summary.matches as u64);
        self.high_score = self.high_score.max(summary.score);
        self.max_number = self.max_number.max(summary.max_number);
        self.max_combo = self.max_combo.max(summary.max_combo);
    }

    /// Append achievement ids not already held; returns how many were new
    pub fn grant<'a>(&mut self, ids: impl IntoIterator<Item = &'a str>) -> usize {
        let mut added = 0;
        for id in ids {
            if !self.achievements.iter().any(|held| held == id) {
                self.achievements.push(id.to_string());
                added += 1;
            }
        }
        added
    }

    pub fn has_achievement(&self, id: &str) -> bool {
        self.achievements.iter().any(|held| held == id)
    }

    /// Floored mean score, 0 before the first game
    pub fn average_score(&self) -> u64 {
        if self.total_games == 0 {
            0
        } else {
            self.total_score / self.total_games as u64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::MemoryStore;

    #[test]
    fn test_record_updates_totals_and_bests() {
        let mut stats = GameStats::default();
        stats.record(&GameSummary {
            score: 120,
            max_number: 32,
            matches: 4,
            max_combo: 2,
        });
        stats.record(&GameSummary {
            score: 80,
            max_number: 64,
            matches: 1,
            max_combo: 1,
        });

        assert_eq!(stats.total_games, 2);
        assert_eq!(stats.total_score, 200);
        assert_eq!(stats.total_matches, 5);
        assert_eq!(stats.high_score, 120);
        assert_eq!(stats.max_number, 64);
        assert_eq!(stats.max_combo, 2);
        assert_eq!(stats.average_score(), 100);
    }

    #[test]
    fn test_average_floors() {
        let stats = GameStats {
            total_games: 3,
            total_score: 10,
            ..GameStats::default()
        };
        assert_eq!(stats.average_score(), 3);
        assert_eq!(GameStats::default().average_score(), 0);
    }

    #[test]
    fn test_grant_skips_duplicates() {
        let mut stats = GameStats::default();
        assert_eq!(stats.grant(["first_game", "score_100"]), 2);
        assert_eq!(stats.grant(["score_100", "combo_5"]), 1);
        assert_eq!(stats.achievements, vec!["first_game", "score_100", "combo_5"]);
        assert!(stats.has_achievement("combo_5"));
    }

    #[test]
    fn test_camel_case_json() {
        let mut storage = Storage::new(MemoryStore::new());
        let stats = GameStats {
            total_games: 1,
            high_score: 42,
            ..GameStats::default()
        };
        assert!(stats.save(&mut storage));

        let raw = storage.inner().load(keys::GAME_STATS).unwrap().unwrap();
        let json: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(json["totalGames"], 1);
        assert_eq!(json["highScore"], 42);
        assert!(json["achievements"].is_array());

        assert_eq!(GameStats::load(&storage), stats);
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let mut store = MemoryStore::new();
        store
            .save(keys::GAME_STATS, r#"{"totalGames":3,"highScore":90}"#)
            .unwrap();
        let stats = GameStats::load(&Storage::new(store));
        assert_eq!(stats.total_games, 3);
        assert_eq!(stats.high_score, 90);
        assert!(stats.achievements.is_empty());
    }
}
