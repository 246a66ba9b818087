//! Core error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Storage error: {0}")]
    Storage(#[from] xrviewer_storage::StorageError),

    #[error("Permission error: {0}")]
    Permission(#[from] xrviewer_permissions::PermissionError),

    #[error("Authorization error: {0}")]
    Authorization(#[from] xrviewer_session::AuthorizationError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}
