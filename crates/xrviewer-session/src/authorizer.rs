//! Authorization orchestration
//!
//! Runs one `AuthorizationSession` per request: reads consent, takes the
//! fast path when policy allows, otherwise shows the dialog through the
//! `Presenter`, persists confirmed choices and reports the grant.
//!
//! At most one dialog is on screen at a time. With `BusyPolicy::Queue`
//! later requests wait in arrival order and are re-evaluated once they get
//! the dialog slot, so a choice remembered by the previous dialog can
//! satisfy them without prompting again.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use xrviewer_permissions::{ConsentStore, Grant, PermissionError, SiteOrigin, Tier};

use crate::error::AuthorizationError;
use crate::presenter::{DeviceAccess, NegativeAction, Presenter};
use crate::session::{
    AuthorizationRequest, AuthorizationSession, ConsentSnapshot, PendingWrites, Step,
};
use crate::Result;

/// What to do with a request that needs a dialog while another is open
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BusyPolicy {
    /// Fail fast with `SessionBusy`
    Reject,
    /// Wait for the open dialog, first come first served
    #[default]
    Queue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantPath {
    FastPath,
    Dialog,
}

/// Result handed back to the page
#[derive(Debug)]
pub struct Authorization {
    pub session_id: Uuid,
    pub origin: SiteOrigin,
    pub requested: Tier,
    pub grant: Grant,
    pub path: GrantPath,
    /// Set when a confirmed choice could not be saved. The grant still
    /// stands for this request.
    pub persistence_error: Option<AuthorizationError>,
}

#[derive(Clone)]
pub struct Authorizer {
    store: Arc<dyn ConsentStore>,
    presenter: Arc<dyn Presenter>,
    device_access: Option<Arc<dyn DeviceAccess>>,
    busy_policy: BusyPolicy,
    dialog_slot: Arc<Mutex<()>>,
}

impl Authorizer {
    pub fn new(store: Arc<dyn ConsentStore>, presenter: Arc<dyn Presenter>) -> Self {
        Self {
            store,
            presenter,
            device_access: None,
            busy_policy: BusyPolicy::default(),
            dialog_slot: Arc::new(Mutex::new(())),
        }
    }

    pub fn with_busy_policy(mut self, busy_policy: BusyPolicy) -> Self {
        self.busy_policy = busy_policy;
        self
    }

    pub fn with_device_access(mut self, device_access: Arc<dyn DeviceAccess>) -> Self {
        self.device_access = Some(device_access);
        self
    }

    pub fn busy_policy(&self) -> BusyPolicy {
        self.busy_policy
    }

    /// Whether a permission dialog is currently on screen
    pub fn is_busy(&self) -> bool {
        self.dialog_slot.try_lock().is_err()
    }

    /// Authorize `requested` for the page at `url`.
    ///
    /// `force_show_dialog` skips the fast path so the user can change an
    /// earlier decision; the dialog then offers Dismiss instead of Deny.
    pub async fn request_authorization(
        &self,
        requested: Tier,
        url: &str,
        force_show_dialog: bool,
    ) -> Result<Authorization> {
        let origin = SiteOrigin::parse(url)
            .map_err(|_| AuthorizationError::InvalidOrigin(url.to_string()))?;
        let request = AuthorizationRequest::new(requested, origin, force_show_dialog);

        let mut session = AuthorizationSession::new(request.clone());
        tracing::debug!(
            session_id = %session.id(),
            requested = %requested,
            origin = %request.origin,
            force_show_dialog,
            "Authorization requested"
        );

        let dialog = match session.evaluate(&self.snapshot(&request.origin))? {
            Step::Granted(grant) => return Ok(self.fast_path(&session, grant)),
            Step::ShowDialog(dialog) => dialog,
        };

        let (_slot, waited) = self.acquire_dialog_slot(&session).await?;

        let (mut session, dialog) = if waited {
            // Consent may have changed while the previous dialog was open
            let snapshot = self.snapshot(&request.origin);
            let mut fresh = AuthorizationSession::new(request);
            match fresh.evaluate(&snapshot)? {
                Step::Granted(grant) => return Ok(self.fast_path(&fresh, grant)),
                Step::ShowDialog(dialog) => (fresh, dialog),
            }
        } else {
            (session, dialog)
        };

        let negative = if force_show_dialog {
            NegativeAction::Dismiss
        } else {
            NegativeAction::Deny
        };

        tracing::info!(
            session_id = %session.id(),
            requested = %requested,
            origin = %session.request().origin,
            "Showing permission dialog"
        );

        let decision = self.presenter.present_dialog(dialog, negative).await;
        let outcome = session.resolve(decision)?;

        let persistence_error = match &outcome.writes {
            Some(writes) => self.persist(writes).err().map(|e| {
                tracing::error!(
                    session_id = %session.id(),
                    error = %e,
                    "Failed to save consent"
                );
                AuthorizationError::Persistence(e)
            }),
            None => None,
        };

        tracing::info!(
            session_id = %session.id(),
            origin = %session.request().origin,
            grant = %outcome.grant,
            "Permission dialog resolved"
        );

        self.request_device_access(outcome.grant);

        Ok(Authorization {
            session_id: session.id(),
            origin: session.request().origin.clone(),
            requested,
            grant: outcome.grant,
            path: GrantPath::Dialog,
            persistence_error,
        })
    }

    /// Returns the slot guard and whether the request had to wait for it
    async fn acquire_dialog_slot(
        &self,
        session: &AuthorizationSession,
    ) -> Result<(MutexGuard<'_, ()>, bool)> {
        if let Ok(guard) = self.dialog_slot.try_lock() {
            return Ok((guard, false));
        }

        match self.busy_policy {
            BusyPolicy::Reject => {
                tracing::warn!(
                    session_id = %session.id(),
                    origin = %session.request().origin,
                    "Permission dialog already open, rejecting request"
                );
                Err(AuthorizationError::SessionBusy)
            }
            BusyPolicy::Queue => {
                tracing::debug!(
                    session_id = %session.id(),
                    "Waiting for open permission dialog"
                );
                Ok((self.dialog_slot.lock().await, true))
            }
        }
    }

    fn fast_path(&self, session: &AuthorizationSession, grant: Grant) -> Authorization {
        tracing::info!(
            session_id = %session.id(),
            origin = %session.request().origin,
            grant = %grant,
            "Granted from stored consent"
        );

        self.request_device_access(grant);

        Authorization {
            session_id: session.id(),
            origin: session.request().origin.clone(),
            requested: session.request().requested,
            grant,
            path: GrantPath::FastPath,
            persistence_error: None,
        }
    }

    /// Read consent for `origin`. An unreadable store counts as no consent,
    /// so the user gets asked.
    fn snapshot(&self, origin: &SiteOrigin) -> ConsentSnapshot {
        let read = || -> std::result::Result<ConsentSnapshot, PermissionError> {
            Ok(ConsentSnapshot {
                toggles: self.store.toggles()?,
                allowances: self.store.allowances(origin)?,
                always_allow_world_sensing: self.store.always_allow_world_sensing()?,
            })
        };

        read().unwrap_or_else(|e| {
            tracing::warn!(origin = %origin, error = %e, "Failed to read consent, asking the user");
            ConsentSnapshot::default()
        })
    }

    fn persist(&self, writes: &PendingWrites) -> std::result::Result<(), PermissionError> {
        self.store.save_toggles(&writes.toggles)?;
        if let Some(change) = &writes.allow_list {
            self.store
                .set_allowed(change.tier, &change.origin, change.allowed)?;
        }
        Ok(())
    }

    fn request_device_access(&self, grant: Grant) {
        let Some(device) = &self.device_access else {
            return;
        };

        match grant {
            Grant::WorldSensing => device.request_location_access(),
            Grant::VideoCameraAccess => {
                device.request_location_access();
                device.request_camera_access();
            }
            _ => {}
        }
    }
}
