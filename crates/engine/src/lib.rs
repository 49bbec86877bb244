//! Game shell: drives a session, persists results, talks to a presenter
//!
//! [`GameRunner`] is the only place where the pure core meets storage and
//! presentation. Front ends (terminal, remote control) feed it clock deltas and
//! [`GameAction`](tile_merge_types::GameAction)s.

pub mod countdown;
pub mod presenter;
pub mod runner;

pub use countdown::{Countdown, CountdownStep};
pub use presenter::{GameReport, NullPresenter, Presenter};
pub use runner::GameRunner;
