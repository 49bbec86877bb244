//! Presenter that turns game events into short-lived terminal feedback.

use std::io::Write;

use crate::engine::{CountdownStep, GameReport, Presenter};
use crate::types::{SessionPhase, Slot};

/// How long a flash message stays up
pub const FLASH_MS: u32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    Combo(u32),
    Mismatch { first: usize, second: usize },
    Spawned { index: usize, bonus: bool },
}

/// Feedback state read by the game view each frame
#[derive(Debug, Default)]
pub struct TermPresenter {
    flash: Option<(Flash, u32)>,
    countdown: Option<CountdownStep>,
    report: Option<GameReport>,
    dirty: bool,
    bell: bool,
    bells_pending: u32,
}

impl TermPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring the terminal bell on matches and game end
    pub fn set_bell(&mut self, on: bool) {
        self.bell = on;
        if !on {
            self.bells_pending = 0;
        }
    }

    /// Age flash messages; true if anything visible changed
    pub fn tick(&mut self, elapsed_ms: u32) -> bool {
        let mut changed = std::mem::take(&mut self.dirty);
        if let Some((_, left)) = &mut self.flash {
            *left = left.saturating_sub(elapsed_ms);
            if *left == 0 {
                self.flash = None;
                changed = true;
            }
        }
        changed
    }

    pub fn flash(&self) -> Option<Flash> {
        self.flash.map(|(f, _)| f)
    }

    pub fn countdown(&self) -> Option<CountdownStep> {
        self.countdown
    }

    pub fn report(&self) -> Option<&GameReport> {
        self.report.as_ref()
    }

    /// Write pending bells to `out`
    pub fn flush_bells<W: Write>(&mut self, out: &mut W) -> std::io::Result<()> {
        for _ in 0..std::mem::take(&mut self.bells_pending) {
            out.write_all(b"\x07")?;
        }
        if self.bell {
            out.flush()?;
        }
        Ok(())
    }

    fn set_flash(&mut self, flash: Flash) {
        self.flash = Some((flash, FLASH_MS));
        self.dirty = true;
    }

    fn ring(&mut self) {
        if self.bell {
            self.bells_pending += 1;
        }
    }
}

impl Presenter for TermPresenter {
    fn on_board_changed(&mut self, _index: usize, _slot: Slot) {
        self.dirty = true;
    }

    fn on_score_changed(&mut self, _total: u64) {
        self.dirty = true;
    }

    fn on_combo_triggered(&mut self, multiplier: u32) {
        self.set_flash(Flash::Combo(multiplier));
        self.ring();
    }

    fn on_match_mismatch(&mut self, first: usize, second: usize) {
        self.set_flash(Flash::Mismatch { first, second });
    }

    fn on_game_ended(&mut self, report: &GameReport) {
        self.report = Some(report.clone());
        self.flash = None;
        self.dirty = true;
        self.ring();
    }

    fn on_selection_changed(&mut self, _selected: Option<usize>) {
        self.dirty = true;
    }

    fn on_spawned(&mut self, index: usize, _value: u64, bonus: bool) {
        if bonus {
            self.set_flash(Flash::Spawned { index, bonus });
        }
        self.dirty = true;
    }

    fn on_countdown(&mut self, step: CountdownStep) {
        self.countdown = match step {
            CountdownStep::Start => None,
            step => Some(step),
        };
        // A new game is on its way; the old report goes.
        self.report = None;
        self.dirty = true;
    }

    fn on_phase_changed(&mut self, phase: SessionPhase) {
        if phase == SessionPhase::Running {
            self.countdown = None;
            self.report = None;
        }
        self.dirty = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GameSummary;

    #[test]
    fn test_flash_expires() {
        let mut p = TermPresenter::new();
        p.on_combo_triggered(3);
        assert_eq!(p.flash(), Some(Flash::Combo(3)));
        assert!(p.tick(100));
        assert!(p.flash().is_some());
        assert!(!p.tick(100));
        assert!(p.tick(FLASH_MS));
        assert_eq!(p.flash(), None);
    }

    #[test]
    fn test_bells_only_when_enabled() {
        let mut p = TermPresenter::new();
        p.on_combo_triggered(2);
        let mut out = Vec::new();
        p.flush_bells(&mut out).unwrap();
        assert!(out.is_empty());

        p.set_bell(true);
        p.on_combo_triggered(2);
        p.on_combo_triggered(3);
        p.flush_bells(&mut out).unwrap();
        assert_eq!(out, b"\x07\x07");
    }

    #[test]
    fn test_report_cleared_by_new_game() {
        let mut p = TermPresenter::new();
        p.on_game_ended(&GameReport {
            summary: GameSummary::default(),
            achievements: Vec::new(),
            new_record: false,
            high_score: 0,
            total_games: 1,
        });
        assert!(p.report().is_some());
        p.on_countdown(CountdownStep::Count(3));
        assert!(p.report().is_none());
        assert_eq!(p.countdown(), Some(CountdownStep::Count(3)));
        p.on_phase_changed(SessionPhase::Running);
        assert_eq!(p.countdown(), None);
    }
}
