//! Tile Merge (workspace facade crate).
//!
//! Re-exports the member crates under short names
//! (`tile_merge::{core, store, engine, adapter, input, term, types}`) and
//! holds the binary's startup configuration.

pub mod config;

pub use tile_merge_adapter as adapter;
pub use tile_merge_core as core;
pub use tile_merge_engine as engine;
pub use tile_merge_input as input;
pub use tile_merge_store as store;
pub use tile_merge_term as term;
pub use tile_merge_types as types;
