//! End of Day
//!
//! - [`aggregator`] - metrics of one business day (pure)
//! - [`orchestrator`] - close state machine: claim → report → archive → reset
//! - [`reports`] - report lookups and summaries

pub mod aggregator;
pub mod orchestrator;
pub mod reports;

pub use aggregator::{EodMetrics, MethodTotal, aggregate};
pub use orchestrator::{DayCloseError, DayCloseOrchestrator, RetryPolicy};
