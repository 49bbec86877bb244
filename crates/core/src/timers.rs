//! Deterministic timer scheduler driven by explicit clock advances
//!
//! One slot per timer kind: scheduling a kind that is already pending replaces
//! it, so there is never more than one pending first spawn, spawn tick, combo
//! reset or end-of-game.

/// Timer kinds owned by a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    FirstSpawn,
    SpawnTick,
    ComboReset,
    EndGame,
}

impl TimerKind {
    pub const ALL: [TimerKind; 4] = [
        TimerKind::FirstSpawn,
        TimerKind::SpawnTick,
        TimerKind::ComboReset,
        TimerKind::EndGame,
    ];

    fn slot(self) -> usize {
        match self {
            TimerKind::FirstSpawn => 0,
            TimerKind::SpawnTick => 1,
            TimerKind::ComboReset => 2,
            TimerKind::EndGame => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Timer {
    deadline_ms: u64,
    period_ms: Option<u64>,
}

/// Session clock plus pending timers
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    now_ms: u64,
    timers: [Option<Timer>; 4],
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Fire once, `delay_ms` from now
    pub fn schedule_once(&mut self, kind: TimerKind, delay_ms: u32) {
        self.schedule_at(kind, self.now_ms + delay_ms as u64);
    }

    /// Fire once at an absolute session time
    pub fn schedule_at(&mut self, kind: TimerKind, at_ms: u64) {
        self.timers[kind.slot()] = Some(Timer {
            deadline_ms: at_ms.max(self.now_ms),
            period_ms: None,
        });
    }

    /// Fire every `period_ms`, first one a full period from now
    pub fn schedule_repeating(&mut self, kind: TimerKind, period_ms: u32) {
        let period = (period_ms as u64).max(1);
        self.timers[kind.slot()] = Some(Timer {
            deadline_ms: self.now_ms + period,
            period_ms: Some(period),
        });
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        self.timers[kind.slot()] = None;
    }

    pub fn cancel_all(&mut self) {
        self.timers = [None; 4];
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.timers[kind.slot()].is_some()
    }

    pub fn deadline(&self, kind: TimerKind) -> Option<u64> {
        self.timers[kind.slot()].map(|t| t.deadline_ms)
    }

    /// Pop the earliest timer due at or before `until_ms`
    ///
    /// Moves the clock to the fired deadline. Repeating timers are re-armed one
    /// period later; one-shot timers are removed. Ties fire in `TimerKind::ALL`
    /// order. Returns `None` (leaving the clock alone) when nothing is due.
    pub fn pop_due(&mut self, until_ms: u64) -> Option<TimerKind> {
        let (kind, timer) = TimerKind::ALL
            .iter()
            .filter_map(|&kind| self.timers[kind.slot()].map(|t| (kind, t)))
            .filter(|(_, t)| t.deadline_ms <= until_ms)
            .min_by_key(|(_, t)| t.deadline_ms)?;

        self.now_ms = self.now_ms.max(timer.deadline_ms);
        self.timers[kind.slot()] = timer.period_ms.map(|period| Timer {
            deadline_ms: timer.deadline_ms + period,
            period_ms: Some(period),
        });
        Some(kind)
    }

    /// Move the clock forward without firing anything
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Cancel everything and rewind the clock to zero
    pub fn reset(&mut self) {
        self.now_ms = 0;
        self.cancel_all();
    }
}
