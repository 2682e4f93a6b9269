//! Employee time ledger
//!
//! - [`ShiftTracker`] - login/logout intervals
//! - [`ledger`] - monthly and trailing-window worked time
//! - [`close_all_open_sessions`] - force-close every open interval
//! - [`ShiftAutoCloseScheduler`] - daily force-close at a fixed local time

mod closer;
pub mod ledger;
mod scheduler;
mod tracker;

pub use closer::close_all_open_sessions;
pub use scheduler::ShiftAutoCloseScheduler;
pub use tracker::ShiftTracker;
