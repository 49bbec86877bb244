//! Imperative shell around a [`GameSession`]
//!
//! The runner owns the session, the persisted preferences and stats, and a
//! presenter. It feeds the session clock deltas and actions, forwards the
//! session's events to the presenter, and does the once-per-game bookkeeping
//! (stats, achievements, leaderboard) when a game ends.

use tracing::{debug, info};

use tile_merge_core::{earned, GameSession, GameSnapshot, SessionConfig};
use tile_merge_store::{
    GameStats, KeyValueStore, Leaderboard, LeaderboardEntry, Settings, Storage,
};
use tile_merge_types::{Difficulty, GameAction, GameEvent, GameSummary, SessionPhase};

use crate::countdown::{Countdown, CountdownStep};
use crate::presenter::{GameReport, Presenter};

pub struct GameRunner<S: KeyValueStore, P: Presenter> {
    session: GameSession,
    storage: Storage<S>,
    presenter: P,
    settings: Settings,
    stats: GameStats,
    leaderboard: Leaderboard,
    countdown: Option<Countdown>,
    last_report: Option<GameReport>,
    events: Vec<GameEvent>,
}

impl<S: KeyValueStore, P: Presenter> GameRunner<S, P> {
    /// Load preferences and stats and build an idle session
    pub fn new(storage: Storage<S>, presenter: P, seed: u32) -> Self {
        let settings = Settings::load(&storage);
        let stats = GameStats::load(&storage);
        let leaderboard = Leaderboard::load(&storage);
        debug!(
            difficulty = settings.difficulty.as_str(),
            total_games = stats.total_games,
            high_score = stats.high_score,
            "loaded saved state"
        );
        Self {
            session: GameSession::new(SessionConfig::new(settings.difficulty), seed),
            storage,
            presenter,
            settings,
            stats,
            leaderboard,
            countdown: None,
            last_report: None,
            events: Vec::new(),
        }
    }

    /// Start a game now (restarting any game in progress)
    pub fn start(&mut self) {
        self.countdown = None;
        self.begin_game();
    }

    /// Start a game after the 3-2-1 countdown
    ///
    /// Only from Idle or Ended; false while a game is in progress.
    pub fn start_with_countdown(&mut self) -> bool {
        if matches!(
            self.session.phase(),
            SessionPhase::Running | SessionPhase::Paused
        ) || self.countdown.is_some()
        {
            return false;
        }
        self.countdown = Some(Countdown::new());
        self.advance(0);
        true
    }

    fn begin_game(&mut self) {
        self.last_report = None;
        self.session
            .set_config(SessionConfig::new(self.settings.difficulty));
        if !self.session.start() {
            self.session.restart();
        }
        self.dispatch();
    }

    /// Move time forward by `elapsed_ms`
    pub fn advance(&mut self, elapsed_ms: u32) {
        if let Some(mut countdown) = self.countdown.take() {
            let mut started = false;
            for step in countdown.advance(elapsed_ms) {
                match step {
                    CountdownStep::Start => started = true,
                    step => self.presenter.on_countdown(step),
                }
            }
            if !started {
                self.countdown = Some(countdown);
                return;
            }
            self.presenter.on_countdown(CountdownStep::Start);
            self.begin_game();
            let overshoot = countdown.overshoot_ms().min(u32::MAX as u64) as u32;
            self.session.advance(overshoot);
        } else {
            self.session.advance(elapsed_ms);
        }
        self.dispatch();
    }

    /// Apply a player or remote action; true if it changed anything
    pub fn apply_action(&mut self, action: GameAction) -> bool {
        let changed = match action {
            GameAction::Restart => {
                self.start();
                true
            }
            _ if self.countdown.is_some() => false,
            action => self.session.apply_action(action),
        };
        self.dispatch();
        changed
    }

    /// Change difficulty; a game in progress keeps its own
    pub fn set_difficulty(&mut self, difficulty: Difficulty) -> bool {
        self.settings.set_difficulty(&mut self.storage, difficulty)
    }

    pub fn set_sound(&mut self, on: bool) -> bool {
        self.settings.set_sound(&mut self.storage, on)
    }

    pub fn set_haptic(&mut self, on: bool) -> bool {
        self.settings.set_haptic(&mut self.storage, on)
    }

    pub fn set_dark_theme(&mut self, on: bool) -> bool {
        self.settings.set_dark_theme(&mut self.storage, on)
    }

    pub fn mark_tutorial_shown(&mut self) -> bool {
        self.settings.mark_tutorial_shown(&mut self.storage)
    }

    fn dispatch(&mut self) {
        self.session.drain_events_into(&mut self.events);
        let mut events = std::mem::take(&mut self.events);
        for event in events.drain(..) {
            match event {
                GameEvent::PhaseChanged(phase) => self.presenter.on_phase_changed(phase),
                GameEvent::SlotChanged { index, slot } => {
                    self.presenter.on_board_changed(index, slot)
                }
                GameEvent::SelectionChanged { selected } => {
                    self.presenter.on_selection_changed(selected)
                }
                GameEvent::ScoreChanged { total } => self.presenter.on_score_changed(total),
                GameEvent::ComboTriggered { multiplier } => {
                    self.presenter.on_combo_triggered(multiplier)
                }
                GameEvent::StreakChanged { streak } => self.presenter.on_streak_changed(streak),
                GameEvent::Mismatch { first, second } => {
                    self.presenter.on_match_mismatch(first, second)
                }
                GameEvent::Spawned { index, value, bonus } => {
                    self.presenter.on_spawned(index, value, bonus)
                }
                GameEvent::GameEnded(summary) => self.finish_game(summary),
            }
        }
        // Keep the allocation for the next round.
        self.events = events;
    }

    fn finish_game(&mut self, summary: GameSummary) {
        self.stats.record(&summary);
        let achievements: Vec<_> = earned(&summary, self.stats.total_games).into_iter().collect();
        let newly = self.stats.grant(achievements.iter().map(|a| a.id()));
        self.stats.save(&mut self.storage);

        self.leaderboard.push(LeaderboardEntry::now(summary.score));
        self.leaderboard.save(&mut self.storage);

        let report = GameReport {
            summary,
            achievements,
            new_record: summary.score >= self.stats.high_score,
            high_score: self.stats.high_score,
            total_games: self.stats.total_games,
        };
        info!(
            score = summary.score,
            new_record = report.new_record,
            new_achievements = newly,
            total_games = report.total_games,
            "game recorded"
        );
        self.presenter.on_game_ended(&report);
        self.last_report = Some(report);
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn snapshot(&self) -> GameSnapshot {
        self.session.snapshot()
    }

    pub fn snapshot_into(&self, out: &mut GameSnapshot) {
        self.session.snapshot_into(out);
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub fn countdown_active(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    pub fn leaderboard(&self) -> &Leaderboard {
        &self.leaderboard
    }

    pub fn last_report(&self) -> Option<&GameReport> {
        self.last_report.as_ref()
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn presenter_mut(&mut self) -> &mut P {
        &mut self.presenter
    }

    pub fn storage(&self) -> &Storage<S> {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tile_merge_core::Board;
    use tile_merge_store::MemoryStore;
    use tile_merge_types::{Slot, BOARD_SLOTS};

    #[derive(Default)]
    struct Recorder {
        board_changes: usize,
        scores: Vec<u64>,
        combos: Vec<u32>,
        mismatches: Vec<(usize, usize)>,
        countdown: Vec<CountdownStep>,
        reports: Vec<GameReport>,
    }

    impl Presenter for Recorder {
        fn on_board_changed(&mut self, _index: usize, _slot: Slot) {
            self.board_changes += 1;
        }
        fn on_score_changed(&mut self, total: u64) {
            self.scores.push(total);
        }
        fn on_combo_triggered(&mut self, multiplier: u32) {
            self.combos.push(multiplier);
        }
        fn on_match_mismatch(&mut self, first: usize, second: usize) {
            self.mismatches.push((first, second));
        }
        fn on_game_ended(&mut self, report: &GameReport) {
            self.reports.push(report.clone());
        }
        fn on_countdown(&mut self, step: CountdownStep) {
            self.countdown.push(step);
        }
    }

    fn runner() -> GameRunner<MemoryStore, Recorder> {
        GameRunner::new(Storage::new(MemoryStore::new()), Recorder::default(), 42)
    }

    #[test]
    fn test_countdown_then_first_spawn() {
        let mut r = runner();
        assert!(r.start_with_countdown());
        assert!(!r.start_with_countdown());
        assert_eq!(r.presenter().countdown, vec![CountdownStep::Count(3)]);
        assert_eq!(r.phase(), SessionPhase::Idle);

        r.advance(3000);
        assert_eq!(r.phase(), SessionPhase::Idle);
        r.advance(500);
        assert_eq!(r.phase(), SessionPhase::Running);
        assert!(!r.countdown_active());
        assert_eq!(
            r.presenter().countdown,
            vec![
                CountdownStep::Count(3),
                CountdownStep::Count(2),
                CountdownStep::Count(1),
                CountdownStep::Go,
                CountdownStep::Start,
            ]
        );

        r.advance(500);
        assert_eq!(r.session().spawned(), 1);
    }

    #[test]
    fn test_actions_ignored_during_countdown() {
        let mut r = runner();
        r.start_with_countdown();
        assert!(!r.apply_action(GameAction::Pause));
        assert!(r.apply_action(GameAction::Restart));
        assert!(!r.countdown_active());
        assert_eq!(r.phase(), SessionPhase::Running);
    }

    #[test]
    fn test_game_end_records_everything_once() {
        let mut r = runner();
        r.start();
        r.advance(500 + 1300 * 15);
        assert_eq!(r.session().spawned(), BOARD_SLOTS as u32);
        assert!(r.presenter().reports.is_empty());

        r.advance(1300);
        assert_eq!(r.phase(), SessionPhase::Ended);
        assert_eq!(r.presenter().reports.len(), 1);

        let report = &r.presenter().reports[0];
        assert_eq!(report.summary.matches, 0);
        assert_eq!(report.summary.score, BOARD_SLOTS as u64);
        assert!(report.new_record);
        assert_eq!(report.total_games, 1);
        assert_eq!(r.stats().total_games, 1);
        assert!(r.stats().has_achievement("first_game"));
        assert_eq!(r.leaderboard().len(), 1);

        r.advance(60_000);
        assert_eq!(r.presenter().reports.len(), 1);

        let saved = GameStats::load(r.storage());
        assert_eq!(saved.total_games, 1);
        assert_eq!(Leaderboard::load(r.storage()).len(), 1);
    }

    #[test]
    fn test_difficulty_applies_on_next_start() {
        let mut r = runner();
        r.start();
        assert!(r.set_difficulty(Difficulty::Hard));
        assert_eq!(r.session().config().difficulty, Difficulty::Normal);
        r.apply_action(GameAction::Restart);
        assert_eq!(r.session().config().difficulty, Difficulty::Hard);
        assert_eq!(Settings::load(r.storage()).difficulty, Difficulty::Hard);
    }

    #[test]
    fn test_presenter_sees_mismatch() {
        let mut r = runner();
        r.start();
        let mut board = Board::new();
        board.set_slot(0, Slot::Number(4));
        board.set_slot(1, Slot::Number(8));
        r.session.load_board(board);

        r.apply_action(GameAction::Select(0));
        r.apply_action(GameAction::Select(1));
        assert_eq!(r.presenter().mismatches, vec![(0, 1)]);
        assert_eq!(r.session().selected(), Some(1));
    }
}
