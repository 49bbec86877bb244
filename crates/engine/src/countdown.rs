//! Pre-game countdown: 3, 2, 1, go, then start

use arrayvec::ArrayVec;

use tile_merge_types::{COUNTDOWN_GO_MS, COUNTDOWN_STEPS, COUNTDOWN_STEP_MS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    Count(u8),
    Go,
    /// The game should start now
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Countdown {
    elapsed_ms: u64,
    /// Steps already reported
    emitted: u8,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    fn step(n: u8) -> Option<(u64, CountdownStep)> {
        let step_ms = COUNTDOWN_STEP_MS as u64;
        let go_at = COUNTDOWN_STEPS as u64 * step_ms;
        match n {
            n if n < COUNTDOWN_STEPS => {
                Some((n as u64 * step_ms, CountdownStep::Count(COUNTDOWN_STEPS - n)))
            }
            n if n == COUNTDOWN_STEPS => Some((go_at, CountdownStep::Go)),
            n if n == COUNTDOWN_STEPS + 1 => {
                Some((go_at + COUNTDOWN_GO_MS as u64, CountdownStep::Start))
            }
            _ => None,
        }
    }

    /// Total length from the first count to the start
    pub fn duration_ms() -> u64 {
        COUNTDOWN_STEPS as u64 * COUNTDOWN_STEP_MS as u64 + COUNTDOWN_GO_MS as u64
    }

    /// Advance and return the steps that became due, in order
    ///
    /// `advance(0)` on a fresh countdown yields the first count.
    pub fn advance(&mut self, elapsed_ms: u32) -> ArrayVec<CountdownStep, 5> {
        self.elapsed_ms += elapsed_ms as u64;
        let mut due = ArrayVec::new();
        while let Some((at, step)) = Self::step(self.emitted) {
            if at > self.elapsed_ms {
                break;
            }
            due.push(step);
            self.emitted += 1;
        }
        due
    }

    pub fn finished(&self) -> bool {
        Self::step(self.emitted).is_none()
    }

    /// Time past the start instant (0 until finished)
    pub fn overshoot_ms(&self) -> u64 {
        if self.finished() {
            self.elapsed_ms.saturating_sub(Self::duration_ms())
        } else {
            0
        }
    }
}
