//! Terminal input module (engine-facing).
//!
//! Maps `crossterm` key events into [`KeyCommand`]s and tracks the board
//! cursor that keyboard players use in place of tapping a tile.

pub mod cursor;
pub mod map;

pub use tile_merge_types as types;

pub use cursor::{Cursor, Direction};
pub use map::{handle_key_event, should_quit, KeyCommand};
