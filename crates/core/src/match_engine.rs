//! Match engine - validates a selected pair and performs the merge
//!
//! The merged value always lands on the second slot and the first slot is
//! cleared. A bonus marker merges into the session's current maximum tile
//! value; two equal numbers merge into their sum.

use tracing::debug;

use crate::board::Board;
use crate::scoring::{MatchScore, ScoreTracker};
use crate::types::{Slot, BOARD_SLOTS};

/// Details of a successful merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeResult {
    pub first: usize,
    pub second: usize,
    pub value: u64,
    pub score: MatchScore,
    pub combo: u32,
    pub streak: u32,
    pub board_full: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Merged(MergeResult),
    /// Both slots hold tiles but they are not eligible; nothing changed
    Mismatch { first: usize, second: usize },
    /// Same index or an empty slot; nothing changed
    NoMatch,
}

/// Whether two slots may merge
pub fn can_match(a: Slot, b: Slot) -> bool {
    a.matches(b)
}

/// Resulting value of merging two eligible slots
pub fn merged_value(a: Slot, b: Slot, max_number: u64) -> Option<u64> {
    match (a, b) {
        (Slot::Number(x), Slot::Number(y)) if x == y => Some(x.saturating_add(y)),
        (Slot::Bonus, Slot::Number(_)) | (Slot::Number(_), Slot::Bonus) => Some(max_number),
        _ => None,
    }
}

/// Match counter plus combo/streak scoring state
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    tracker: ScoreTracker,
    matches: u32,
}

impl MatchEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Try to merge `first` into `second`
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    pub fn attempt(
        &mut self,
        board: &mut Board,
        first: usize,
        second: usize,
        max_number: &mut u64,
        now_ms: u64,
    ) -> MatchOutcome {
        assert!(first < BOARD_SLOTS && second < BOARD_SLOTS, "slot index out of range");

        let a = board.slot_at(first);
        let b = board.slot_at(second);
        if first == second || a.is_empty() || b.is_empty() {
            return MatchOutcome::NoMatch;
        }

        let Some(value) = merged_value(a, b, *max_number) else {
            debug!(first, second, "mismatch");
            return MatchOutcome::Mismatch { first, second };
        };

        board.set_slot(second, Slot::Number(value));
        board.clear_slot(first);
        *max_number = (*max_number).max(value);
        self.matches += 1;

        let score = self.tracker.record_match(now_ms);
        let result = MergeResult {
            first,
            second,
            value,
            score,
            combo: self.tracker.combo(),
            streak: self.tracker.streak(),
            board_full: board.is_full(),
        };
        debug!(first, second, value, points = score.total, combo = result.combo, "merged");
        MatchOutcome::Merged(result)
    }

    pub fn matches(&self) -> u32 {
        self.matches
    }

    pub fn tracker(&self) -> &ScoreTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ScoreTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(pairs: &[(usize, Slot)]) -> Board {
        let mut board = Board::new();
        for &(i, slot) in pairs {
            board.set_slot(i, slot);
        }
        board
    }

    #[test]
    fn test_equal_values_merge_into_second() {
        let mut board = board_with(&[(0, Slot::Number(4)), (5, Slot::Number(4))]);
        let mut max_number = 4;
        let mut engine = MatchEngine::new();

        let outcome = engine.attempt(&mut board, 0, 5, &mut max_number, 1000);
        let MatchOutcome::Merged(result) = outcome else {
            panic!("expected merge, got {outcome:?}");
        };
        assert_eq!(result.value, 8);
        assert_eq!(result.score.total, 35);
        assert!(!result.board_full);
        assert_eq!(board.slot_at(0), Slot::Empty);
        assert_eq!(board.slot_at(5), Slot::Number(8));
        assert_eq!(max_number, 8);
        assert_eq!(engine.matches(), 1);
    }

    #[test]
    fn test_bonus_takes_max_number() {
        let mut board = board_with(&[(2, Slot::Bonus), (3, Slot::Number(2))]);
        let mut max_number = 16;
        let mut engine = MatchEngine::new();

        let outcome = engine.attempt(&mut board, 2, 3, &mut max_number, 0);
        assert!(matches!(outcome, MatchOutcome::Merged(r) if r.value == 16));
        assert_eq!(board.slot_at(3), Slot::Number(16));
        assert_eq!(board.slot_at(2), Slot::Empty);

        let mut board = board_with(&[(2, Slot::Number(2)), (3, Slot::Bonus)]);
        engine.attempt(&mut board, 2, 3, &mut max_number, 10);
        assert_eq!(board.slot_at(3), Slot::Number(16));
    }

    #[test]
    fn test_mismatch_changes_nothing() {
        let mut board = board_with(&[(0, Slot::Number(4)), (1, Slot::Number(8))]);
        let before = board.clone();
        let mut max_number = 8;
        let mut engine = MatchEngine::new();

        let outcome = engine.attempt(&mut board, 0, 1, &mut max_number, 0);
        assert_eq!(outcome, MatchOutcome::Mismatch { first: 0, second: 1 });
        assert_eq!(board, before);
        assert_eq!(engine.matches(), 0);
        assert_eq!(engine.tracker().combo(), 0);
    }

    #[test]
    fn test_two_bonuses_do_not_match() {
        let mut board = board_with(&[(0, Slot::Bonus), (1, Slot::Bonus)]);
        let mut max_number = 32;
        let mut engine = MatchEngine::new();
        assert_eq!(
            engine.attempt(&mut board, 0, 1, &mut max_number, 0),
            MatchOutcome::Mismatch { first: 0, second: 1 }
        );
    }

    #[test]
    fn test_precondition_violations() {
        let mut board = board_with(&[(0, Slot::Number(4))]);
        let mut max_number = 4;
        let mut engine = MatchEngine::new();
        assert_eq!(engine.attempt(&mut board, 0, 0, &mut max_number, 0), MatchOutcome::NoMatch);
        assert_eq!(engine.attempt(&mut board, 0, 1, &mut max_number, 0), MatchOutcome::NoMatch);
        assert_eq!(board.slot_at(0), Slot::Number(4));
    }

    #[test]
    fn test_combo_builds_across_quick_matches() {
        let mut board = board_with(&[
            (0, Slot::Number(1)),
            (1, Slot::Number(1)),
            (2, Slot::Number(2)),
            (3, Slot::Number(2)),
        ]);
        let mut max_number = 2;
        let mut engine = MatchEngine::new();

        engine.attempt(&mut board, 0, 1, &mut max_number, 0);
        let outcome = engine.attempt(&mut board, 2, 3, &mut max_number, 500);
        let MatchOutcome::Merged(result) = outcome else {
            panic!("expected merge");
        };
        assert_eq!(result.combo, 2);
        assert_eq!(result.streak, 2);
        assert_eq!(result.score.total, 70);
    }
}
