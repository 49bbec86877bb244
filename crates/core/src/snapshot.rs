use crate::types::{Difficulty, SessionPhase, Slot, BOARD_SLOTS};

/// Read-only copy of everything a view or remote observer needs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GameSnapshot {
    pub slots: [Slot; BOARD_SLOTS],
    pub phase: SessionPhase,
    pub selected: Option<usize>,
    pub difficulty: Difficulty,
    pub episode_id: u32,
    pub seed: u32,
    pub now_ms: u64,
    pub score: u64,
    pub max_number: u64,
    pub matches: u32,
    pub combo: u32,
    pub max_combo: u32,
    pub streak: u32,
    pub spawned: u32,
    pub bonus_progress: u32,
}

impl GameSnapshot {
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn playable(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    pub fn game_over(&self) -> bool {
        self.phase == SessionPhase::Ended
    }

    pub fn paused(&self) -> bool {
        self.phase == SessionPhase::Paused
    }

    pub fn filled(&self) -> usize {
        self.slots.iter().filter(|s| !s.is_empty()).count()
    }
}

impl Default for GameSnapshot {
    fn default() -> Self {
        Self {
            slots: [Slot::Empty; BOARD_SLOTS],
            phase: SessionPhase::Idle,
            selected: None,
            difficulty: Difficulty::Normal,
            episode_id: 0,
            seed: 0,
            now_ms: 0,
            score: 0,
            max_number: 0,
            matches: 0,
            combo: 0,
            max_combo: 0,
            streak: 0,
            spawned: 0,
            bonus_progress: 0,
        }
    }
}
