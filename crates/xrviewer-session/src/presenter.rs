//! Collaborator seams: the presentation layer and OS device permissions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use xrviewer_permissions::AuthorizationDialogModel;

use crate::messages::{Alert, AlertKind};
use crate::session::UserDecision;

/// Left-hand button of the permission dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NegativeAction {
    /// Normal prompt: refuse for this request
    Deny,
    /// Forced re-prompt: close without changing anything
    Dismiss,
}

/// Renders dialogs and alerts.
///
/// The presenter owns the dialog model while it is on screen, routes switch
/// and choice events through `on_toggle` / `on_choice`, and hands the model
/// back inside `UserDecision::Confirm`.
#[async_trait]
pub trait Presenter: Send + Sync {
    /// Show the permission dialog and wait, without timeout, for a decision
    async fn present_dialog(
        &self,
        dialog: AuthorizationDialogModel,
        negative: NegativeAction,
    ) -> UserDecision;

    /// Show an alert with actions; returns the chosen action index, `None`
    /// when it was dismissed without one
    async fn present_alert(&self, alert: Alert) -> Option<usize>;

    /// Show an alert without waiting for it
    fn show_alert(&self, alert: Alert);

    fn dismiss_alert(&self, kind: AlertKind);
}

/// OS-level location and camera prompts, requested only after a grant that
/// needs them
pub trait DeviceAccess: Send + Sync {
    fn request_location_access(&self);

    fn request_camera_access(&self);
}
