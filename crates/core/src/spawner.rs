//! Spawner module - what to place next and where
//!
//! The value follows a ladder keyed on the running maximum tile value, the slot
//! is a uniform pick among empty slots, and every 50th successful spawn places a
//! bonus marker instead of the number.

use tracing::debug;

use crate::board::Board;
use crate::rng::SimpleRng;
use crate::types::{Slot, BONUS_SPAWN_PERIOD, SPAWN_LADDER, SPAWN_LADDER_CAP};

/// A successful spawn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spawn {
    pub index: usize,
    /// Numeric value credited to score and max tile, even for a bonus spawn
    pub value: u64,
    /// What was actually placed on the board
    pub slot: Slot,
}

impl Spawn {
    pub fn is_bonus(&self) -> bool {
        self.slot.is_bonus()
    }
}

/// Value to spawn for the given running maximum
///
/// # Examples
///
/// ```
/// use tile_merge_core::spawner::spawn_value;
///
/// assert_eq!(spawn_value(0), 1);
/// assert_eq!(spawn_value(64), 2);
/// assert_eq!(spawn_value(2_000_000), 32768);
/// ```
pub fn spawn_value(max_number: u64) -> u64 {
    SPAWN_LADDER
        .iter()
        .find(|(threshold, _)| max_number < *threshold)
        .map(|&(_, value)| value)
        .unwrap_or(SPAWN_LADDER_CAP)
}

/// Whether the `count`-th successful spawn (1-indexed) is a bonus
pub fn is_bonus_spawn(count: u32) -> bool {
    count > 0 && count % BONUS_SPAWN_PERIOD == 0
}

/// Per-session spawner: seeded placement plus the spawn counter
#[derive(Debug, Clone)]
pub struct Spawner {
    rng: SimpleRng,
    spawned: u32,
}

impl Spawner {
    pub fn new(seed: u32) -> Self {
        Self {
            rng: SimpleRng::new(seed),
            spawned: 0,
        }
    }

    /// Try to place one tile
    ///
    /// Returns `None` when the board has no empty slot; nothing changes then.
    /// On success the board holds the new slot and `max_number` is raised to
    /// the spawned value.
    pub fn spawn(&mut self, board: &mut Board, max_number: &mut u64) -> Option<Spawn> {
        let empty = board.empty_slot_indices();
        let index = self.rng.pick(&empty)?;

        let value = spawn_value(*max_number);
        self.spawned += 1;
        let slot = if is_bonus_spawn(self.spawned) {
            Slot::Bonus
        } else {
            Slot::Number(value)
        };

        board.set_slot(index, slot);
        *max_number = (*max_number).max(value);

        debug!(index, value, bonus = slot.is_bonus(), count = self.spawned, "spawned tile");
        Some(Spawn { index, value, slot })
    }

    /// Successful spawns so far
    pub fn spawned(&self) -> u32 {
        self.spawned
    }

    /// Position within the current bonus cycle, 0..50
    pub fn bonus_progress(&self) -> u32 {
        self.spawned % BONUS_SPAWN_PERIOD
    }

    /// RNG state, for reproducing the rest of a session
    pub fn rng_state(&self) -> u32 {
        self.rng.state()
    }
}
