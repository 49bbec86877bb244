//! Board cursor for keyboard play.

use crate::types::{BOARD_SIDE, BOARD_SLOTS};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

/// Highlighted board position; clamps at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    col: usize,
    row: usize,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cursor on a row-major slot index; None if out of range
    pub fn at_index(index: usize) -> Option<Self> {
        (index < BOARD_SLOTS).then_some(Self {
            col: index % BOARD_SIDE,
            row: index / BOARD_SIDE,
        })
    }

    pub fn col(&self) -> usize {
        self.col
    }

    pub fn row(&self) -> usize {
        self.row
    }

    pub fn index(&self) -> usize {
        self.row * BOARD_SIDE + self.col
    }

    pub fn step(&mut self, dir: Direction) {
        let last = BOARD_SIDE - 1;
        match dir {
            Direction::Left => self.col = self.col.saturating_sub(1),
            Direction::Right => self.col = (self.col + 1).min(last),
            Direction::Up => self.row = self.row.saturating_sub(1),
            Direction::Down => self.row = (self.row + 1).min(last),
        }
    }
}
