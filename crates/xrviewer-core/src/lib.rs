//! XRViewer Core
//!
//! Coordination layer for the viewer's sensing permissions.
//! Consent is owned here; the presentation layer only renders what it is
//! handed and reports user events back.

mod config;
mod error;
mod viewer;

pub use config::Config;
pub use error::CoreError;
pub use viewer::Viewer;

// Re-export the crate stack
pub use xrviewer_permissions::{
    AuthorizationDialogModel, ConsentExport, ConsentStore, DialogError, DialogRow, Grant,
    GlobalToggles, PermissionError, RowKind, SiteAllowances, SiteOrigin, Tier,
};
pub use xrviewer_session::{
    Alert, AlertAction, AlertKind, AlertStyle, Authorization, AuthorizationError, BusyPolicy,
    DeviceAccess, GrantPath, MessageCenter, NegativeAction, Presenter, ResetTrackingOption,
    UserDecision,
};
pub use xrviewer_storage::{Database, StorageError};

pub type Result<T> = std::result::Result<T, CoreError>;

/// Initialize logging
pub fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt().with_env_filter(filter).with_target(true).init();
}
