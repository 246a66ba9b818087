//! XRViewer Storage Layer
//!
//! SQLite-based persistence for viewer settings and per-site consent.
//! Multi-key writes go through a single transaction.

mod database;
mod error;
mod migrations;

pub use database::{write_bool, Database};
pub use error::StorageError;

pub type Result<T> = std::result::Result<T, StorageError>;
