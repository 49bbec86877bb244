//! Terminal "game renderer" module.
//!
//! A small, game-oriented rendering layer for terminal play. It skips widget
//! toolkits and renders into a plain framebuffer that is diffed and flushed
//! to the terminal.

pub mod fb;
pub mod format;
pub mod game_view;
pub mod presenter;
pub mod renderer;

pub use tile_merge_core as core;
pub use tile_merge_engine as engine;
pub use tile_merge_types as types;

pub use fb::{Cell, CellStyle, FrameBuffer, Rgb};
pub use format::{format_number, format_slot, number_color, slot_color};
pub use game_view::{AdapterStatusView, AnchorY, GameView, ViewModel, Viewport};
pub use presenter::{Flash, TermPresenter};
pub use renderer::{encode_diff_into, encode_full_into, TerminalRenderer};
