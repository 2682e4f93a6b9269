//! Shared types for the POS back office
//!
//! Models, the unified error system and small utilities used by
//! `pos-server` and by API clients.

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};
