//! Game state module - one game's lifecycle
//!
//! `GameSession` ties together the board, spawner, match engine and scheduler.
//! It is driven by [`GameSession::advance`] (clock deltas) and
//! [`GameSession::select`] / [`GameSession::apply_action`] (player input), and
//! never performs I/O: everything observable is queued as a [`GameEvent`].

use std::mem;

use tracing::{debug, info};

use crate::board::Board;
use crate::match_engine::{MatchEngine, MatchOutcome};
use crate::snapshot::GameSnapshot;
use crate::spawner::{Spawn, Spawner};
use crate::timers::{Scheduler, TimerKind};
use crate::types::{
    Difficulty, GameAction, GameEvent, GameSummary, SessionPhase, Slot, BOARD_SLOTS,
    END_GAME_DELAY_MS, FIRST_SPAWN_DELAY_MS, COMBO_WINDOW_MS,
};

/// Per-game settings, fixed once the game starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionConfig {
    pub difficulty: Difficulty,
}

impl SessionConfig {
    pub fn new(difficulty: Difficulty) -> Self {
        Self { difficulty }
    }

    pub fn spawn_interval_ms(&self) -> u32 {
        self.difficulty.spawn_interval_ms()
    }
}

/// Power-up inventory
///
/// Counters only; nothing grants or spends them yet, and the freeze gate is
/// never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PowerUps {
    pub bomb: u32,
    pub freeze: u32,
    pub double: u32,
    frozen: bool,
}

impl PowerUps {
    /// Spawn ticks are skipped while this is set
    pub fn freeze_active(&self) -> bool {
        self.frozen
    }
}

/// Result of a player selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// Not running, or the slot is empty
    Ignored,
    Selected(usize),
    Deselected(usize),
    Matched { first: usize, second: usize, value: u64 },
    Mismatched { first: usize, second: usize },
}

/// Complete state of one game
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    seed: u32,
    episode_id: u32,
    phase: SessionPhase,
    board: Board,
    spawner: Spawner,
    engine: MatchEngine,
    scheduler: Scheduler,
    selected: Option<usize>,
    score: u64,
    max_number: u64,
    power_ups: PowerUps,
    summary: Option<GameSummary>,
    events: Vec<GameEvent>,
}

impl GameSession {
    /// Create an idle session with the given RNG seed
    pub fn new(config: SessionConfig, seed: u32) -> Self {
        Self {
            config,
            seed,
            episode_id: 0,
            phase: SessionPhase::Idle,
            board: Board::new(),
            spawner: Spawner::new(seed),
            engine: MatchEngine::new(),
            scheduler: Scheduler::new(),
            selected: None,
            score: 0,
            max_number: 0,
            power_ups: PowerUps::default(),
            summary: None,
            events: Vec::with_capacity(BOARD_SLOTS * 2),
        }
    }

    /// Start from Idle; false in any other phase
    pub fn start(&mut self) -> bool {
        if self.phase != SessionPhase::Idle {
            return false;
        }
        self.begin(self.seed);
        true
    }

    /// Start a fresh game from any phase
    ///
    /// The next game's seed continues the current RNG sequence so consecutive
    /// games differ yet stay reproducible from the first seed.
    pub fn restart(&mut self) {
        let seed = self.spawner.rng_state();
        self.restart_with_seed(seed);
    }

    pub fn restart_with_seed(&mut self, seed: u32) {
        self.episode_id = self.episode_id.wrapping_add(1);
        self.begin(seed);
    }

    /// Change difficulty; takes effect at the next start/restart
    pub fn set_config(&mut self, config: SessionConfig) {
        self.config = config;
    }

    fn begin(&mut self, seed: u32) {
        for index in 0..BOARD_SLOTS {
            if !self.board.slot_at(index).is_empty() {
                self.events.push(GameEvent::SlotChanged {
                    index,
                    slot: Slot::Empty,
                });
            }
        }
        if self.selected.take().is_some() {
            self.events
                .push(GameEvent::SelectionChanged { selected: None });
        }

        self.seed = seed;
        self.board.clear();
        self.spawner = Spawner::new(seed);
        self.engine = MatchEngine::new();
        self.scheduler.reset();
        self.score = 0;
        self.max_number = 0;
        self.power_ups = PowerUps::default();
        self.summary = None;

        self.set_phase(SessionPhase::Running);
        self.events.push(GameEvent::ScoreChanged { total: 0 });

        self.scheduler
            .schedule_once(TimerKind::FirstSpawn, FIRST_SPAWN_DELAY_MS);
        self.scheduler
            .schedule_repeating(TimerKind::SpawnTick, self.config.spawn_interval_ms());

        info!(
            seed,
            episode = self.episode_id,
            difficulty = self.config.difficulty.as_str(),
            "game started"
        );
    }

    /// Running -> Paused; cancels the spawn tick
    pub fn pause(&mut self) -> bool {
        if self.phase != SessionPhase::Running {
            return false;
        }
        self.scheduler.cancel(TimerKind::SpawnTick);
        self.set_phase(SessionPhase::Paused);
        debug!(now_ms = self.now_ms(), "paused");
        true
    }

    /// Paused -> Running; the next tick is a full interval away
    pub fn resume(&mut self) -> bool {
        if self.phase != SessionPhase::Paused {
            return false;
        }
        self.scheduler
            .schedule_repeating(TimerKind::SpawnTick, self.config.spawn_interval_ms());
        self.set_phase(SessionPhase::Running);
        debug!(now_ms = self.now_ms(), "resumed");
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            SessionPhase::Running => self.pause(),
            SessionPhase::Paused => self.resume(),
            _ => false,
        }
    }

    /// Player selected the slot at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= 16`.
    pub fn select(&mut self, index: usize) -> SelectOutcome {
        let slot = self.board.slot_at(index);
        if self.phase != SessionPhase::Running || slot.is_empty() {
            return SelectOutcome::Ignored;
        }

        let Some(first) = self.selected else {
            self.set_selected(Some(index));
            return SelectOutcome::Selected(index);
        };
        if first == index {
            self.set_selected(None);
            return SelectOutcome::Deselected(index);
        }

        let now = self.now_ms();
        match self
            .engine
            .attempt(&mut self.board, first, index, &mut self.max_number, now)
        {
            MatchOutcome::Merged(merge) => {
                self.events.push(GameEvent::SlotChanged {
                    index: merge.first,
                    slot: Slot::Empty,
                });
                self.events.push(GameEvent::SlotChanged {
                    index: merge.second,
                    slot: Slot::Number(merge.value),
                });
                self.set_selected(None);

                self.score = self.score.saturating_add(merge.score.total);
                self.events
                    .push(GameEvent::ScoreChanged { total: self.score });
                if merge.score.multiplier > 1 {
                    self.events.push(GameEvent::ComboTriggered {
                        multiplier: merge.combo,
                    });
                }
                self.events
                    .push(GameEvent::StreakChanged { streak: merge.streak });

                self.scheduler
                    .schedule_once(TimerKind::ComboReset, COMBO_WINDOW_MS);
                if merge.board_full {
                    self.scheduler
                        .schedule_once(TimerKind::EndGame, END_GAME_DELAY_MS);
                }

                SelectOutcome::Matched {
                    first: merge.first,
                    second: merge.second,
                    value: merge.value,
                }
            }
            MatchOutcome::Mismatch { first, second } => {
                self.set_selected(Some(second));
                self.events.push(GameEvent::Mismatch { first, second });
                SelectOutcome::Mismatched { first, second }
            }
            // Both slots were checked non-empty and distinct above.
            MatchOutcome::NoMatch => SelectOutcome::Ignored,
        }
    }

    /// Move the session clock forward, firing due timers in deadline order
    pub fn advance(&mut self, elapsed_ms: u32) {
        let target = self.now_ms() + elapsed_ms as u64;
        while let Some(kind) = self.scheduler.pop_due(target) {
            self.fire(kind);
        }
        self.scheduler.set_now(target);
    }

    fn fire(&mut self, kind: TimerKind) {
        match kind {
            // The opening tile lands even if the player paused before it.
            TimerKind::FirstSpawn => {
                if matches!(self.phase, SessionPhase::Running | SessionPhase::Paused) {
                    self.place_tile();
                }
            }
            TimerKind::SpawnTick => {
                self.spawn_tick();
            }
            TimerKind::ComboReset => {
                self.engine.tracker_mut().reset_combo();
                debug!(now_ms = self.now_ms(), "combo reset");
            }
            TimerKind::EndGame => self.end(),
        }
    }

    /// One spawn attempt
    ///
    /// No-op unless running with the freeze gate down. A full board ends the
    /// game.
    pub fn spawn_tick(&mut self) -> Option<Spawn> {
        if self.phase != SessionPhase::Running || self.power_ups.freeze_active() {
            return None;
        }
        self.place_tile()
    }

    fn place_tile(&mut self) -> Option<Spawn> {
        match self.spawner.spawn(&mut self.board, &mut self.max_number) {
            Some(spawn) => {
                self.score = self.score.saturating_add(spawn.value);
                self.events.push(GameEvent::SlotChanged {
                    index: spawn.index,
                    slot: spawn.slot,
                });
                self.events.push(GameEvent::Spawned {
                    index: spawn.index,
                    value: spawn.value,
                    bonus: spawn.is_bonus(),
                });
                self.events
                    .push(GameEvent::ScoreChanged { total: self.score });
                Some(spawn)
            }
            None => {
                self.end();
                None
            }
        }
    }

    /// End the game; idempotent
    pub fn end(&mut self) {
        if matches!(self.phase, SessionPhase::Ended | SessionPhase::Idle) {
            return;
        }
        self.scheduler.cancel_all();
        self.set_selected(None);

        let summary = GameSummary {
            score: self.score,
            max_number: self.max_number,
            matches: self.engine.matches(),
            max_combo: self.engine.tracker().max_combo(),
        };
        self.summary = Some(summary);
        self.set_phase(SessionPhase::Ended);
        self.events.push(GameEvent::GameEnded(summary));

        info!(
            score = summary.score,
            max_number = summary.max_number,
            matches = summary.matches,
            max_combo = summary.max_combo,
            "game ended"
        );
    }

    /// Apply a game action
    ///
    /// Returns true if the action changed anything.
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        match action {
            GameAction::Select(index) if index < BOARD_SLOTS => {
                self.select(index) != SelectOutcome::Ignored
            }
            GameAction::Select(_) => false,
            GameAction::TogglePause => self.toggle_pause(),
            GameAction::Pause => self.pause(),
            GameAction::Resume => self.resume(),
            GameAction::Restart => {
                self.restart();
                true
            }
        }
    }

    /// Take queued events
    pub fn take_events(&mut self) -> Vec<GameEvent> {
        mem::take(&mut self.events)
    }

    /// Take queued events into `out`, keeping both buffers' capacity
    pub fn drain_events_into(&mut self, out: &mut Vec<GameEvent>) {
        out.append(&mut self.events);
    }

    /// Replace the board wholesale, raising the max tile to match
    ///
    /// Scenario setup for tests and benchmarks; emits one `SlotChanged` per slot.
    pub fn load_board(&mut self, board: Board) {
        self.board = board;
        self.max_number = self.max_number.max(self.board.max_value());
        for index in 0..BOARD_SLOTS {
            self.events.push(GameEvent::SlotChanged {
                index,
                slot: self.board.slot_at(index),
            });
        }
        if let Some(selected) = self.selected {
            if self.board.slot_at(selected).is_empty() {
                self.set_selected(None);
            }
        }
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            self.phase = phase;
            self.events.push(GameEvent::PhaseChanged(phase));
        }
    }

    fn set_selected(&mut self, selected: Option<usize>) {
        if self.selected != selected {
            self.selected = selected;
            self.events.push(GameEvent::SelectionChanged { selected });
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn max_number(&self) -> u64 {
        self.max_number
    }

    pub fn matches(&self) -> u32 {
        self.engine.matches()
    }

    pub fn combo(&self) -> u32 {
        self.engine.tracker().combo()
    }

    pub fn max_combo(&self) -> u32 {
        self.engine.tracker().max_combo()
    }

    pub fn streak(&self) -> u32 {
        self.engine.tracker().streak()
    }

    pub fn spawned(&self) -> u32 {
        self.spawner.spawned()
    }

    pub fn bonus_progress(&self) -> u32 {
        self.spawner.bonus_progress()
    }

    pub fn power_ups(&self) -> PowerUps {
        self.power_ups
    }

    pub fn summary(&self) -> Option<GameSummary> {
        self.summary
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    pub fn seed(&self) -> u32 {
        self.seed
    }

    pub fn episode_id(&self) -> u32 {
        self.episode_id
    }

    pub fn timer_deadline(&self, kind: TimerKind) -> Option<u64> {
        self.scheduler.deadline(kind)
    }

    pub fn snapshot(&self) -> GameSnapshot {
        let mut out = GameSnapshot::default();
        self.snapshot_into(&mut out);
        out
    }

    /// Fill an existing snapshot (no allocation)
    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        out.slots = *self.board.slots();
        out.phase = self.phase;
        out.selected = self.selected;
        out.difficulty = self.config.difficulty;
        out.episode_id = self.episode_id;
        out.seed = self.seed;
        out.now_ms = self.now_ms();
        out.score = self.score;
        out.max_number = self.max_number;
        out.matches = self.matches();
        out.combo = self.combo();
        out.max_combo = self.max_combo();
        out.streak = self.streak();
        out.spawned = self.spawned();
        out.bonus_progress = self.bonus_progress();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(difficulty: Difficulty) -> GameSession {
        let mut game = GameSession::new(SessionConfig::new(difficulty), 12345);
        assert!(game.start());
        game.take_events();
        game
    }

    #[test]
    fn test_start_only_from_idle() {
        let mut game = GameSession::new(SessionConfig::default(), 1);
        assert_eq!(game.phase(), SessionPhase::Idle);
        assert!(game.start());
        assert_eq!(game.phase(), SessionPhase::Running);
        assert!(!game.start());
    }

    #[test]
    fn test_first_spawn_after_delay() {
        let mut game = running(Difficulty::Easy);
        game.advance(499);
        assert_eq!(game.spawned(), 0);
        game.advance(1);
        assert_eq!(game.spawned(), 1);
        assert_eq!(game.score(), 1);
        assert_eq!(game.board().count_empty(), BOARD_SLOTS - 1);

        // Easy ticks every 2000ms from the start instant.
        game.advance(1499);
        assert_eq!(game.spawned(), 1);
        game.advance(1);
        assert_eq!(game.spawned(), 2);
    }

    #[test]
    fn test_pause_stops_spawns_and_resume_waits_full_interval() {
        let mut game = running(Difficulty::Normal);
        game.advance(500);
        assert!(game.pause());
        game.advance(10_000);
        assert_eq!(game.spawned(), 1);

        assert!(game.resume());
        game.advance(1299);
        assert_eq!(game.spawned(), 1);
        game.advance(1);
        assert_eq!(game.spawned(), 2);
    }

    #[test]
    fn test_first_spawn_lands_while_paused() {
        let mut game = running(Difficulty::Easy);
        game.advance(100);
        assert!(game.pause());
        game.advance(1000);
        assert_eq!(game.spawned(), 1);
        assert_eq!(game.board().count_empty(), BOARD_SLOTS - 1);

        assert!(game.resume());
        game.advance(1999);
        assert_eq!(game.spawned(), 1);
        game.advance(1);
        assert_eq!(game.spawned(), 2);
    }

    #[test]
    fn test_first_spawn_skipped_after_end() {
        let mut game = running(Difficulty::Normal);
        game.end();
        game.advance(1000);
        assert_eq!(game.spawned(), 0);
    }

    #[test]
    fn test_toggle_pause() {
        let mut game = running(Difficulty::Hard);
        assert!(game.toggle_pause());
        assert_eq!(game.phase(), SessionPhase::Paused);
        assert!(game.toggle_pause());
        assert_eq!(game.phase(), SessionPhase::Running);

        let mut idle = GameSession::new(SessionConfig::default(), 1);
        assert!(!idle.toggle_pause());
    }

    #[test]
    fn test_select_ignored_when_empty_or_paused() {
        let mut game = running(Difficulty::Normal);
        assert_eq!(game.select(0), SelectOutcome::Ignored);

        let mut board = Board::new();
        board.set_slot(0, Slot::Number(2));
        game.load_board(board);
        game.pause();
        assert_eq!(game.select(0), SelectOutcome::Ignored);
        game.resume();
        assert_eq!(game.select(0), SelectOutcome::Selected(0));
        assert_eq!(game.select(0), SelectOutcome::Deselected(0));
        assert_eq!(game.selected(), None);
    }

    #[test]
    fn test_select_pair_merges_and_scores() {
        let mut game = running(Difficulty::Normal);
        let mut board = Board::new();
        board.set_slot(1, Slot::Number(4));
        board.set_slot(6, Slot::Number(4));
        game.load_board(board);
        game.take_events();

        game.select(1);
        let outcome = game.select(6);
        assert_eq!(
            outcome,
            SelectOutcome::Matched {
                first: 1,
                second: 6,
                value: 8
            }
        );
        assert_eq!(game.board().slot_at(1), Slot::Empty);
        assert_eq!(game.board().slot_at(6), Slot::Number(8));
        assert_eq!(game.selected(), None);
        assert_eq!(game.score(), 35);
        assert_eq!(game.matches(), 1);
        assert_eq!(game.max_number(), 8);

        let events = game.take_events();
        assert!(events.contains(&GameEvent::ScoreChanged { total: 35 }));
        assert!(events.contains(&GameEvent::SelectionChanged { selected: None }));
        assert!(!events
            .iter()
            .any(|e| matches!(e, GameEvent::ComboTriggered { .. })));
    }

    #[test]
    fn test_mismatch_narrows_selection() {
        let mut game = running(Difficulty::Normal);
        let mut board = Board::new();
        board.set_slot(0, Slot::Number(4));
        board.set_slot(1, Slot::Number(8));
        game.load_board(board);

        game.select(0);
        assert_eq!(
            game.select(1),
            SelectOutcome::Mismatched { first: 0, second: 1 }
        );
        assert_eq!(game.selected(), Some(1));
        assert_eq!(game.board().slot_at(0), Slot::Number(4));
        assert_eq!(game.board().slot_at(1), Slot::Number(8));
        assert_eq!(game.score(), 0);
    }

    #[test]
    fn test_combo_resets_after_window() {
        let mut game = running(Difficulty::Easy);
        let mut board = Board::new();
        for i in 0..4 {
            board.set_slot(i, Slot::Number(2));
        }
        game.load_board(board);

        game.select(0);
        game.select(1);
        assert_eq!(game.combo(), 1);
        game.advance(1999);
        assert_eq!(game.combo(), 1);
        game.advance(501);
        assert_eq!(game.combo(), 0);

        let before = game.score();
        game.select(2);
        game.select(3);
        assert_eq!(game.combo(), 1);
        assert_eq!(game.score() - before, 35);
    }

    #[test]
    fn test_quick_matches_trigger_combo() {
        let mut game = running(Difficulty::Easy);
        let mut board = Board::new();
        for i in 0..4 {
            board.set_slot(i, Slot::Number(2));
        }
        game.load_board(board);
        game.take_events();

        game.select(0);
        game.select(1);
        game.advance(100);
        game.select(2);
        game.select(3);
        assert_eq!(game.combo(), 2);
        assert_eq!(game.score(), 35 + 70);
        assert!(game
            .take_events()
            .contains(&GameEvent::ComboTriggered { multiplier: 2 }));
    }

    #[test]
    fn test_full_board_ends_on_next_spawn() {
        let mut game = running(Difficulty::Hard);
        game.load_board(Board::from_slots([Slot::Number(1); BOARD_SLOTS]));
        game.take_events();

        assert!(game.spawn_tick().is_none());
        assert_eq!(game.phase(), SessionPhase::Ended);
        let ended: Vec<_> = game
            .take_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::GameEnded(_)))
            .collect();
        assert_eq!(ended.len(), 1);

        game.end();
        game.advance(10_000);
        assert!(game.take_events().is_empty());
    }

    #[test]
    fn test_restart_resets_everything() {
        let mut game = running(Difficulty::Normal);
        game.advance(5000);
        assert!(game.spawned() > 0);
        game.restart();
        assert_eq!(game.phase(), SessionPhase::Running);
        assert_eq!(game.spawned(), 0);
        assert_eq!(game.score(), 0);
        assert_eq!(game.now_ms(), 0);
        assert_eq!(game.board().count_empty(), BOARD_SLOTS);
        assert_eq!(game.episode_id(), 1);
        assert_eq!(game.timer_deadline(TimerKind::FirstSpawn), Some(500));
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let mut game = running(Difficulty::Normal);
        game.advance(500);
        let snap = game.snapshot();
        assert_eq!(snap.filled(), 1);
        assert_eq!(snap.score, 1);
        assert_eq!(snap.spawned, 1);
        assert!(snap.playable());
        assert_eq!(snap.difficulty, Difficulty::Normal);
    }
}
