use tile_merge_core::Achievement;
use tile_merge_types::{GameSummary, SessionPhase, Slot};

use crate::countdown::CountdownStep;

/// Everything shown when a game ends
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameReport {
    pub summary: GameSummary,
    /// Achievements this game met (already-held ones included)
    pub achievements: Vec<Achievement>,
    /// Score reached the lifetime best (ties count)
    pub new_record: bool,
    pub high_score: u64,
    pub total_games: u32,
}

/// Presentation side of the game: board, score, feedback and end screen
///
/// Required hooks carry the game itself; the rest default to no-ops.
pub trait Presenter {
    fn on_board_changed(&mut self, index: usize, slot: Slot);
    fn on_score_changed(&mut self, total: u64);
    fn on_combo_triggered(&mut self, multiplier: u32);
    fn on_match_mismatch(&mut self, first: usize, second: usize);
    fn on_game_ended(&mut self, report: &GameReport);

    fn on_selection_changed(&mut self, _selected: Option<usize>) {}
    fn on_streak_changed(&mut self, _streak: u32) {}
    fn on_phase_changed(&mut self, _phase: SessionPhase) {}
    fn on_spawned(&mut self, _index: usize, _value: u64, _bonus: bool) {}
    fn on_countdown(&mut self, _step: CountdownStep) {}
}

/// Presenter that ignores everything (headless runs)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn on_board_changed(&mut self, _index: usize, _slot: Slot) {}
    fn on_score_changed(&mut self, _total: u64) {}
    fn on_combo_triggered(&mut self, _multiplier: u32) {}
    fn on_match_mismatch(&mut self, _first: usize, _second: usize) {}
    fn on_game_ended(&mut self, _report: &GameReport) {}
}
