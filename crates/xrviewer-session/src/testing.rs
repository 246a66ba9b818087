//! Test doubles for the presentation and device seams

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::{oneshot, Notify};

use xrviewer_permissions::{AuthorizationDialogModel, Tier};

use crate::messages::{Alert, AlertKind};
use crate::presenter::{DeviceAccess, NegativeAction, Presenter};
use crate::session::UserDecision;

pub(crate) type DialogScript = Box<dyn FnOnce(AuthorizationDialogModel) -> UserDecision + Send>;

/// Presenter that answers dialogs from a queue of scripts (Deny once empty)
/// and alerts from a queue of choices.
#[derive(Default)]
pub(crate) struct ScriptedPresenter {
    dialogs: Mutex<VecDeque<DialogScript>>,
    alert_choices: Mutex<VecDeque<Option<usize>>>,
    presented_dialogs: Mutex<Vec<(Tier, NegativeAction)>>,
    presented_alerts: Mutex<Vec<Alert>>,
    shown: Mutex<Vec<AlertKind>>,
    dismissed: Mutex<Vec<AlertKind>>,
    gate: Mutex<Option<oneshot::Receiver<()>>>,
    pub(crate) dialog_shown: Notify,
}

impl ScriptedPresenter {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push_dialog<F>(&self, script: F)
    where
        F: FnOnce(AuthorizationDialogModel) -> UserDecision + Send + 'static,
    {
        self.dialogs.lock().push_back(Box::new(script));
    }

    pub(crate) fn push_alert_choice(&self, choice: Option<usize>) {
        self.alert_choices.lock().push_back(choice);
    }

    /// Keep the next dialog on screen until the returned sender fires
    pub(crate) fn hold_next_dialog(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        *self.gate.lock() = Some(rx);
        tx
    }

    pub(crate) fn presented_dialogs(&self) -> Vec<(Tier, NegativeAction)> {
        self.presented_dialogs.lock().clone()
    }

    pub(crate) fn presented_alerts(&self) -> Vec<Alert> {
        self.presented_alerts.lock().clone()
    }

    pub(crate) fn shown_alerts(&self) -> Vec<AlertKind> {
        self.shown.lock().clone()
    }

    pub(crate) fn dismissed_alerts(&self) -> Vec<AlertKind> {
        self.dismissed.lock().clone()
    }
}

#[async_trait]
impl Presenter for ScriptedPresenter {
    async fn present_dialog(
        &self,
        dialog: AuthorizationDialogModel,
        negative: NegativeAction,
    ) -> UserDecision {
        self.presented_dialogs
            .lock()
            .push((dialog.requested(), negative));

        let gate = self.gate.lock().take();
        self.dialog_shown.notify_one();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let script = self.dialogs.lock().pop_front();
        match script {
            Some(script) => script(dialog),
            None => UserDecision::Deny,
        }
    }

    async fn present_alert(&self, alert: Alert) -> Option<usize> {
        self.presented_alerts.lock().push(alert);
        self.alert_choices.lock().pop_front().flatten()
    }

    fn show_alert(&self, alert: Alert) {
        self.shown.lock().push(alert.kind);
    }

    fn dismiss_alert(&self, kind: AlertKind) {
        self.dismissed.lock().push(kind);
    }
}

#[derive(Default)]
pub(crate) struct RecordingDeviceAccess {
    pub(crate) requests: Mutex<Vec<&'static str>>,
}

impl DeviceAccess for RecordingDeviceAccess {
    fn request_location_access(&self) {
        self.requests.lock().push("location");
    }

    fn request_camera_access(&self) {
        self.requests.lock().push("camera");
    }
}
