//! Permission error types

use thiserror::Error;

use crate::tier::Tier;

#[derive(Error, Debug)]
pub enum PermissionError {
    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),

    #[error("Tier {0} has no per-site allow-list")]
    NoAllowList(Tier),

    #[error("Storage error: {0}")]
    Storage(#[from] xrviewer_storage::StorageError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DialogError {
    #[error("Row {index} out of range ({count} rows)")]
    RowOutOfRange { index: usize, count: usize },

    #[error("Row {0} is not a toggle")]
    NotAToggle(usize),

    #[error("Row {0} is not a per-site choice")]
    NotAChoice(usize),

    #[error("Row {0} is disabled")]
    RowDisabled(usize),
}
