//! Authorization error types

use thiserror::Error;

use xrviewer_permissions::{PermissionError, Tier};

#[derive(Error, Debug)]
pub enum AuthorizationError {
    #[error("Invalid origin: {0}")]
    InvalidOrigin(String),

    #[error("Another permission dialog is already pending")]
    SessionBusy,

    #[error("Invalid session transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Failed to persist consent: {0}")]
    Persistence(#[source] PermissionError),

    #[error("Confirmed dialog was built for {dialog}, session requested {requested}")]
    DialogMismatch { requested: Tier, dialog: Tier },
}
