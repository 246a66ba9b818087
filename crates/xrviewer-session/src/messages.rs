//! Viewer messages
//!
//! Pass-through alerts for conditions outside the authorization flow: page
//! load errors, AR interruptions and failures, memory pressure, lost
//! connectivity, tracking resets and camera image access.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::presenter::Presenter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    WebError,
    ArInterruption,
    SessionFailed,
    MemoryWarning,
    ConnectionRequired,
    ResetTracking,
    CapturedImageAccess,
    LiteModeInfo,
    Notice,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertStyle {
    Default,
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertAction {
    pub title: String,
    pub style: AlertStyle,
}

impl AlertAction {
    fn new(title: &str, style: AlertStyle) -> Self {
        Self {
            title: title.to_string(),
            style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
    pub actions: Vec<AlertAction>,
}

impl Alert {
    fn new(kind: AlertKind, title: &str, message: &str, actions: Vec<AlertAction>) -> Self {
        Self {
            kind,
            title: title.to_string(),
            message: message.to_string(),
            actions,
        }
    }

    fn ok(kind: AlertKind, title: &str, message: &str) -> Self {
        Self::new(kind, title, message, vec![AlertAction::new("Ok", AlertStyle::Default)])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetTrackingOption {
    ResetTracking,
    RemoveExistingAnchors,
    SaveWorldMap,
    LoadSavedWorldMap,
}

impl ResetTrackingOption {
    /// In the order the options are offered
    pub const ALL: [ResetTrackingOption; 4] = [
        ResetTrackingOption::ResetTracking,
        ResetTrackingOption::RemoveExistingAnchors,
        ResetTrackingOption::SaveWorldMap,
        ResetTrackingOption::LoadSavedWorldMap,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            ResetTrackingOption::ResetTracking => "Completely restart tracking",
            ResetTrackingOption::RemoveExistingAnchors => "Remove known anchors",
            ResetTrackingOption::SaveWorldMap => "Save World Map",
            ResetTrackingOption::LoadSavedWorldMap => "Load previously saved World Map",
        }
    }
}

pub struct MessageCenter {
    presenter: Arc<dyn Presenter>,
    /// Whether the AR interruption alert is on screen
    ar_interruption: Arc<Mutex<bool>>,
}

impl MessageCenter {
    pub fn new(presenter: Arc<dyn Presenter>) -> Self {
        Self {
            presenter,
            ar_interruption: Arc::new(Mutex::new(false)),
        }
    }

    pub fn ar_message_showing(&self) -> bool {
        *self.ar_interruption.lock()
    }

    /// Hide anything this center is tracking
    pub fn clean(&self) {
        let mut showing = self.ar_interruption.lock();
        if *showing {
            self.presenter.dismiss_alert(AlertKind::ArInterruption);
            *showing = false;
        }
    }

    /// Returns `true` when the user asked to reload the page
    pub async fn show_web_error(&self) -> bool {
        let alert = Alert::new(
            AlertKind::WebError,
            "Cannot Open the Page",
            "Please check the URL and try again",
            vec![
                AlertAction::new("Ok", AlertStyle::Cancel),
                AlertAction::new("Reload", AlertStyle::Default),
            ],
        );

        let reload = self.present(alert).await == Some(1);
        tracing::debug!(reload, "Web error alert closed");
        reload
    }

    /// Show the interruption alert once while interrupted, hide it when the
    /// interruption ends. Repeated calls with the same value are no-ops.
    pub fn show_ar_interruption(&self, interrupted: bool) {
        let mut showing = self.ar_interruption.lock();

        if interrupted && !*showing {
            self.presenter.show_alert(Alert::new(
                AlertKind::ArInterruption,
                "AR Interruption Occurred",
                "Please wait, it should be fixed automatically",
                Vec::new(),
            ));
            *showing = true;
            tracing::info!("AR interruption alert shown");
        } else if !interrupted && *showing {
            self.presenter.dismiss_alert(AlertKind::ArInterruption);
            *showing = false;
            tracing::info!("AR interruption alert hidden");
        }
    }

    /// Resolves once the user acknowledged the failure
    pub async fn show_session_failed(&self, message: &str) {
        self.present(Alert::ok(AlertKind::SessionFailed, "AR Session Failed", message))
            .await;
    }

    pub async fn show_memory_warning(&self) {
        self.present(Alert::ok(
            AlertKind::MemoryWarning,
            "Memory Issue Occurred",
            "There was not enough memory for the application to keep working",
        ))
        .await;
    }

    pub async fn show_connection_required(&self) {
        self.present(Alert::ok(
            AlertKind::ConnectionRequired,
            "Internet Connection is Unavailable",
            "Application will restart automatically when a connection becomes available",
        ))
        .await;
    }

    /// `None` when the user cancelled
    pub async fn show_reset_tracking(&self) -> Option<ResetTrackingOption> {
        let mut actions: Vec<AlertAction> = ResetTrackingOption::ALL
            .iter()
            .map(|option| AlertAction::new(option.title(), AlertStyle::Default))
            .collect();
        actions.push(AlertAction::new("Cancel", AlertStyle::Cancel));

        let alert = Alert::new(
            AlertKind::ResetTracking,
            "Reset Tracking",
            "Please select one of the options below",
            actions,
        );

        self.present(alert)
            .await
            .and_then(|index| ResetTrackingOption::ALL.get(index).copied())
    }

    /// Ask before handing captured camera images to the page
    pub async fn show_captured_image_access(&self) -> bool {
        let alert = Alert::new(
            AlertKind::CapturedImageAccess,
            "Video Camera Image Access",
            "WebXR Viewer displays video from your camera without giving the web page access to the video.\n\nThis page is requesting access to images from the video camera. Allow?",
            vec![
                AlertAction::new("YES", AlertStyle::Default),
                AlertAction::new("NO", AlertStyle::Cancel),
            ],
        );

        let granted = self.present(alert).await == Some(0);
        tracing::info!(granted, "Captured image access decided");
        granted
    }

    /// Explainer behind the Lite Mode row's "learn more" button
    pub async fn show_lite_mode_info(&self) {
        self.present(Alert::ok(
            AlertKind::LiteModeInfo,
            "What's Lite Mode?",
            "Lite Mode is privacy-focused and sends less information to WebXR sites.\n\nWhen Lite Mode is on, only one real world plane is shared.\nLite Mode enables face-based experiences, but will not recognize images nor share camera access.",
        ))
        .await;
    }

    /// Show a notice and hide it again after `hide_after`
    pub async fn show_timed_message(&self, title: &str, message: &str, hide_after: Duration) {
        self.presenter
            .show_alert(Alert::new(AlertKind::Notice, title, message, Vec::new()));
        tokio::time::sleep(hide_after).await;
        self.presenter.dismiss_alert(AlertKind::Notice);
    }

    async fn present(&self, alert: Alert) -> Option<usize> {
        let kind = alert.kind;
        tracing::debug!(?kind, "Showing message");
        let choice = self.presenter.present_alert(alert).await;
        tracing::debug!(?kind, ?choice, "Message hidden by user");
        choice
    }
}

impl Clone for MessageCenter {
    fn clone(&self) -> Self {
        Self {
            presenter: Arc::clone(&self.presenter),
            ar_interruption: Arc::clone(&self.ar_interruption),
        }
    }
}
