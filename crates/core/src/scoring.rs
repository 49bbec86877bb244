//! Scoring module - per-match points with combo and streak tracking
//!
//! Scoring rules:
//! - A match scores `5 + floor(max(0, 3000 - elapsed) / 100)`.
//! - `elapsed` is measured against the last match time *after* it has been
//!   updated for the current match, so it is always 0 and every match earns
//!   the full 30 point time bonus.
//! - From a combo of 2 upward the match score is multiplied by the combo count.
//! - A combo resets when 2000ms pass without a match.
//! - A streak counts matches that land within 3000ms of the previous one.

use crate::types::{
    COMBO_MULTIPLIER_MIN, COMBO_WINDOW_MS, MATCH_BASE_SCORE, STREAK_WINDOW_MS,
    TIME_BONUS_DIVISOR, TIME_BONUS_WINDOW_MS,
};

/// Score calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchScore {
    pub base: u64,
    pub time_bonus: u64,
    /// 1 when no combo multiplier applies
    pub multiplier: u64,
    pub total: u64,
}

/// Points for one match given the elapsed time and the combo count
pub fn calculate_match_score(elapsed_ms: u64, combo: u32) -> MatchScore {
    let time_bonus = TIME_BONUS_WINDOW_MS.saturating_sub(elapsed_ms) / TIME_BONUS_DIVISOR;
    let multiplier = if combo >= COMBO_MULTIPLIER_MIN {
        combo as u64
    } else {
        1
    };
    let total = (MATCH_BASE_SCORE + time_bonus).saturating_mul(multiplier);
    MatchScore {
        base: MATCH_BASE_SCORE,
        time_bonus,
        multiplier,
        total,
    }
}

/// Combo counter with its reset deadline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ComboState {
    pub count: u32,
    pub deadline_ms: Option<u64>,
}

impl ComboState {
    pub fn reset(&mut self) {
        self.count = 0;
        self.deadline_ms = None;
    }
}

/// Streak counter with the last match time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreakState {
    pub count: u32,
    pub last_match_ms: Option<u64>,
}

/// Combo, streak and best combo for one session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreTracker {
    combo: ComboState,
    streak: StreakState,
    max_combo: u32,
}

impl ScoreTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop a combo whose deadline has passed; true if it was reset
    pub fn expire(&mut self, now_ms: u64) -> bool {
        match self.combo.deadline_ms {
            Some(deadline) if now_ms >= deadline => {
                self.combo.reset();
                true
            }
            _ => false,
        }
    }

    /// Reset the combo unconditionally (the combo-reset timer fired)
    pub fn reset_combo(&mut self) {
        self.combo.reset();
    }

    /// Record a successful match at `now_ms` and return its points
    pub fn record_match(&mut self, now_ms: u64) -> MatchScore {
        self.expire(now_ms);

        self.streak.count = match self.streak.last_match_ms {
            Some(last) if now_ms.saturating_sub(last) < STREAK_WINDOW_MS as u64 => {
                self.streak.count + 1
            }
            _ => 1,
        };
        self.streak.last_match_ms = Some(now_ms);

        self.combo.count += 1;
        self.combo.deadline_ms = Some(now_ms + COMBO_WINDOW_MS as u64);
        self.max_combo = self.max_combo.max(self.combo.count);

        let elapsed = now_ms.saturating_sub(self.streak.last_match_ms.unwrap_or(now_ms));
        calculate_match_score(elapsed, self.combo.count)
    }

    pub fn combo(&self) -> u32 {
        self.combo.count
    }

    pub fn combo_deadline(&self) -> Option<u64> {
        self.combo.deadline_ms
    }

    pub fn streak(&self) -> u32 {
        self.streak.count
    }

    pub fn last_match_ms(&self) -> Option<u64> {
        self.streak.last_match_ms
    }

    pub fn max_combo(&self) -> u32 {
        self.max_combo
    }
}
