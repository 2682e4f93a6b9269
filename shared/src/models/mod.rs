//! Data models
//!
//! Shared between pos-server and its clients (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY); employees are referenced
//! by the string id issued by the auth service.

pub mod catalog;
pub mod eod_report;
pub mod order;
pub mod receipt;
pub mod time_ledger;

// Re-exports
pub use catalog::*;
pub use eod_report::*;
pub use order::*;
pub use receipt::*;
pub use time_ledger::*;
