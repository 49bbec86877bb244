//! Board module - manages the 4x4 slot grid
//!
//! The board is 16 slots stored in a flat array, row-major (index = row * 4 + column).
//! Each slot is empty, a numeric tile or a bonus marker.
//! Indices outside 0..16 are a caller bug and panic.

use arrayvec::ArrayVec;

use crate::types::{Slot, BOARD_SIDE, BOARD_SLOTS};

/// The game board - 16 slots using flat array storage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    slots: [Slot; BOARD_SLOTS],
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            slots: [Slot::Empty; BOARD_SLOTS],
        }
    }

    /// Flat index from (column, row), `None` if out of bounds
    #[inline(always)]
    pub fn index(column: usize, row: usize) -> Option<usize> {
        if column >= BOARD_SIDE || row >= BOARD_SIDE {
            return None;
        }
        Some(row * BOARD_SIDE + column)
    }

    /// Slot at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= 16`.
    pub fn slot_at(&self, index: usize) -> Slot {
        self.slots[index]
    }

    /// Replace the slot at `index`
    ///
    /// # Panics
    ///
    /// Panics if `index >= 16`.
    pub fn set_slot(&mut self, index: usize, slot: Slot) {
        self.slots[index] = slot;
    }

    /// Empty the slot at `index`
    pub fn clear_slot(&mut self, index: usize) {
        self.set_slot(index, Slot::Empty);
    }

    pub fn is_full(&self) -> bool {
        self.slots.iter().all(|slot| !slot.is_empty())
    }

    pub fn count_empty(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_empty()).count()
    }

    /// Indices of empty slots, ascending
    ///
    /// Stack-only; the fixed order keeps seeded picks reproducible.
    pub fn empty_slot_indices(&self) -> ArrayVec<usize, BOARD_SLOTS> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.is_empty())
            .map(|(i, _)| i)
            .collect()
    }

    /// Largest numeric value on the board (0 when none)
    pub fn max_value(&self) -> u64 {
        self.slots
            .iter()
            .filter_map(Slot::value)
            .max()
            .unwrap_or(0)
    }

    pub fn slots(&self) -> &[Slot; BOARD_SLOTS] {
        &self.slots
    }

    /// Clear the entire board
    pub fn clear(&mut self) {
        self.slots = [Slot::Empty; BOARD_SLOTS];
    }

    /// Build a board from a full slot array
    pub fn from_slots(slots: [Slot; BOARD_SLOTS]) -> Self {
        Self { slots }
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
