//! Achievement rules evaluated when a game ends

use arrayvec::ArrayVec;

use crate::types::GameSummary;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Achievement {
    FirstGame,
    Score100,
    Score500,
    Score1000,
    Number64,
    Number256,
    Number1024,
    Combo5,
}

impl Achievement {
    pub const ALL: [Achievement; 8] = [
        Achievement::FirstGame,
        Achievement::Score100,
        Achievement::Score500,
        Achievement::Score1000,
        Achievement::Number64,
        Achievement::Number256,
        Achievement::Number1024,
        Achievement::Combo5,
    ];

    /// Stable id, as persisted in the stats record
    pub fn id(&self) -> &'static str {
        match self {
            Achievement::FirstGame => "first_game",
            Achievement::Score100 => "score_100",
            Achievement::Score500 => "score_500",
            Achievement::Score1000 => "score_1000",
            Achievement::Number64 => "number_64",
            Achievement::Number256 => "number_256",
            Achievement::Number1024 => "number_1024",
            Achievement::Combo5 => "combo_5",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.id() == id)
    }

    pub fn title(&self) -> &'static str {
        match self {
            Achievement::FirstGame => "First Game",
            Achievement::Score100 => "Hundreds",
            Achievement::Score500 => "Five Hundred",
            Achievement::Score1000 => "Thousands",
            Achievement::Number64 => "Sixty-Four",
            Achievement::Number256 => "Two Fifty-Six",
            Achievement::Number1024 => "Ten Twenty-Four",
            Achievement::Combo5 => "Combo Master",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Achievement::FirstGame => "Finish your first game",
            Achievement::Score100 => "Score 100 points",
            Achievement::Score500 => "Score 500 points",
            Achievement::Score1000 => "Score 1000 points",
            Achievement::Number64 => "Reach the number 64",
            Achievement::Number256 => "Reach the number 256",
            Achievement::Number1024 => "Reach the number 1024",
            Achievement::Combo5 => "Land a 5x combo",
        }
    }

    fn is_met(&self, summary: &GameSummary, total_games: u32) -> bool {
        match self {
            Achievement::FirstGame => total_games == 1,
            Achievement::Score100 => summary.score >= 100,
            Achievement::Score500 => summary.score >= 500,
            Achievement::Score1000 => summary.score >= 1000,
            Achievement::Number64 => summary.max_number >= 64,
            Achievement::Number256 => summary.max_number >= 256,
            Achievement::Number1024 => summary.max_number >= 1024,
            Achievement::Combo5 => summary.max_combo >= 5,
        }
    }
}

/// Achievements met by one game
///
/// `total_games` is the lifetime game count *including* this game.
pub fn earned(summary: &GameSummary, total_games: u32) -> ArrayVec<Achievement, 8> {
    Achievement::ALL
        .into_iter()
        .filter(|a| a.is_met(summary, total_games))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_game_only_once() {
        let summary = GameSummary::default();
        assert_eq!(earned(&summary, 1).as_slice(), &[Achievement::FirstGame]);
        assert!(earned(&summary, 2).is_empty());
    }

    #[test]
    fn test_thresholds() {
        let summary = GameSummary {
            score: 520,
            max_number: 256,
            matches: 12,
            max_combo: 5,
        };
        let got = earned(&summary, 3);
        assert_eq!(
            got.as_slice(),
            &[
                Achievement::Score100,
                Achievement::Score500,
                Achievement::Number64,
                Achievement::Number256,
                Achievement::Combo5,
            ]
        );
    }

    #[test]
    fn test_ids_round_trip() {
        for a in Achievement::ALL {
            assert_eq!(Achievement::from_id(a.id()), Some(a));
        }
        assert_eq!(Achievement::from_id("perfect_match"), None);
    }
}
