//! Services - narrow interfaces to external collaborators
//!
//! - [`Catalog`] - menu item resolution used by checkout

pub mod catalog;

pub use catalog::{Catalog, SqliteCatalog};
