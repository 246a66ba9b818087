//! XRViewer Authorization Sessions
//!
//! Drives a site's sensing request from arrival to grant:
//! - `AuthorizationSession`: per-request state machine
//! - `Authorizer`: fast path, dialog slot, persistence
//! - `MessageCenter`: alerts outside the authorization flow

mod authorizer;
mod error;
mod messages;
mod presenter;
mod session;

#[cfg(test)]
mod testing;

pub use authorizer::{Authorization, Authorizer, BusyPolicy, GrantPath};
pub use error::AuthorizationError;
pub use messages::{
    Alert, AlertAction, AlertKind, AlertStyle, MessageCenter, ResetTrackingOption,
};
pub use presenter::{DeviceAccess, NegativeAction, Presenter};
pub use session::{
    AuthorizationRequest, AuthorizationSession, ConsentSnapshot, PendingWrites, SessionOutcome,
    SessionState, Step, UserDecision,
};

pub type Result<T> = std::result::Result<T, AuthorizationError>;
