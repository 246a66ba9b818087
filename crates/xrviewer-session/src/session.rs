//! Authorization session state machine
//!
//! ```text
//! Idle
//!   ├─ fast grant ─────────────→ FastPathGranted
//!   └─ dialog required
//!        ↓
//!   AwaitingUserInput
//!        ↓ confirm / deny / dismiss
//!   Resolved(grant)
//! ```
//!
//! A session resolves exactly once and is discarded afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use xrviewer_permissions::{
    decide, resolve_from_dialog, AllowListChange, AuthorizationDialogModel, GlobalToggles, Grant,
    SiteAllowances, SiteOrigin, Tier,
};

use crate::error::AuthorizationError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    pub requested: Tier,
    pub origin: SiteOrigin,
    /// Explicit "change permissions": skip the fast path, offer Dismiss
    /// instead of Deny
    pub force_show_dialog: bool,
}

impl AuthorizationRequest {
    pub fn new(requested: Tier, origin: SiteOrigin, force_show_dialog: bool) -> Self {
        Self {
            requested,
            origin,
            force_show_dialog,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    FastPathGranted(Grant),
    AwaitingUserInput,
    Resolved(Grant),
}

impl SessionState {
    pub fn can_transition_to(&self, target: SessionState) -> bool {
        matches!(
            (self, target),
            (SessionState::Idle, SessionState::FastPathGranted(_))
                | (SessionState::Idle, SessionState::AwaitingUserInput)
                | (SessionState::AwaitingUserInput, SessionState::Resolved(_))
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::FastPathGranted(_) | SessionState::Resolved(_)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::FastPathGranted(_) => "fast_path_granted",
            SessionState::AwaitingUserInput => "awaiting_user_input",
            SessionState::Resolved(_) => "resolved",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Consent state for one origin, read once per evaluation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsentSnapshot {
    pub toggles: GlobalToggles,
    pub allowances: SiteAllowances,
    pub always_allow_world_sensing: bool,
}

/// What the user did with the dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserDecision {
    /// Confirm with the dialog as the user left it
    Confirm(AuthorizationDialogModel),
    Deny,
    /// Closed a forced re-prompt without choosing
    Dismiss,
}

#[derive(Debug)]
pub enum Step {
    Granted(Grant),
    ShowDialog(AuthorizationDialogModel),
}

/// Store writes produced by a confirmed dialog
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingWrites {
    pub toggles: GlobalToggles,
    pub allow_list: Option<AllowListChange>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub grant: Grant,
    pub writes: Option<PendingWrites>,
}

#[derive(Debug)]
pub struct AuthorizationSession {
    id: Uuid,
    request: AuthorizationRequest,
    state: SessionState,
    created_at: DateTime<Utc>,
}

impl AuthorizationSession {
    pub fn new(request: AuthorizationRequest) -> Self {
        Self {
            id: Uuid::new_v4(),
            request,
            state: SessionState::Idle,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn request(&self) -> &AuthorizationRequest {
        &self.request
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Run the fast-path policy; build the dialog when the user must be asked
    pub fn evaluate(&mut self, snapshot: &ConsentSnapshot) -> Result<Step> {
        let requested = self.request.requested;
        let fast_grant = decide(
            requested,
            &snapshot.allowances,
            snapshot.always_allow_world_sensing,
            snapshot.toggles.lite_mode_enabled,
        );

        match fast_grant {
            Some(grant) if !self.request.force_show_dialog => {
                self.transition(SessionState::FastPathGranted(grant))?;
                Ok(Step::Granted(grant))
            }
            _ => {
                self.transition(SessionState::AwaitingUserInput)?;
                Ok(Step::ShowDialog(AuthorizationDialogModel::new(
                    requested,
                    snapshot.toggles,
                    snapshot.allowances.contains(requested),
                )))
            }
        }
    }

    /// Apply the user's decision. Only a confirm produces store writes.
    pub fn resolve(&mut self, decision: UserDecision) -> Result<SessionOutcome> {
        if self.state != SessionState::AwaitingUserInput {
            return Err(AuthorizationError::InvalidTransition {
                from: self.state.to_string(),
                to: "resolved".to_string(),
            });
        }

        let outcome = match decision {
            UserDecision::Confirm(dialog) => self.confirm(&dialog)?,
            UserDecision::Deny => SessionOutcome {
                grant: Grant::Denied,
                writes: None,
            },
            UserDecision::Dismiss => {
                if !self.request.force_show_dialog {
                    tracing::warn!(
                        session_id = %self.id,
                        "Dismiss on a non-forced dialog, treating as deny"
                    );
                }
                SessionOutcome {
                    grant: Grant::Denied,
                    writes: None,
                }
            }
        };

        self.transition(SessionState::Resolved(outcome.grant))?;
        Ok(outcome)
    }

    /// A dialog built for another tier is refused and the session stays open
    fn confirm(&self, dialog: &AuthorizationDialogModel) -> Result<SessionOutcome> {
        let requested = self.request.requested;
        if dialog.requested() != requested {
            tracing::warn!(
                session_id = %self.id,
                requested = %requested,
                dialog = %dialog.requested(),
                "Confirmed dialog was built for another tier"
            );
            return Err(AuthorizationError::DialogMismatch {
                requested,
                dialog: dialog.requested(),
            });
        }

        let resolution = resolve_from_dialog(
            requested,
            &dialog.effective_toggles(),
            dialog.remember(),
            &self.request.origin,
        );

        // Informational dialogs never persist anything
        let writes = (requested != Tier::None).then(|| PendingWrites {
            toggles: dialog.toggles(),
            allow_list: resolution.allow_list,
        });

        Ok(SessionOutcome {
            grant: resolution.grant,
            writes,
        })
    }

    fn transition(&mut self, target: SessionState) -> Result<()> {
        if !self.state.can_transition_to(target) {
            return Err(AuthorizationError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        self.state = target;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(tier: Tier, force: bool) -> AuthorizationRequest {
        AuthorizationRequest::new(tier, SiteOrigin::from_key("example.com").unwrap(), force)
    }

    fn dialog(step: Step) -> AuthorizationDialogModel {
        match step {
            Step::ShowDialog(dialog) => dialog,
            Step::Granted(grant) => panic!("expected dialog, got {grant}"),
        }
    }

    #[test]
    fn test_valid_transitions() {
        assert!(SessionState::Idle.can_transition_to(SessionState::AwaitingUserInput));
        assert!(SessionState::Idle
            .can_transition_to(SessionState::FastPathGranted(Grant::Minimal)));
        assert!(SessionState::AwaitingUserInput
            .can_transition_to(SessionState::Resolved(Grant::Denied)));
    }

    #[test]
    fn test_invalid_transitions() {
        assert!(!SessionState::Idle.can_transition_to(SessionState::Resolved(Grant::Lite)));
        assert!(!SessionState::FastPathGranted(Grant::Minimal)
            .can_transition_to(SessionState::AwaitingUserInput));
        assert!(!SessionState::Resolved(Grant::Denied)
            .can_transition_to(SessionState::Resolved(Grant::Lite)));
    }

    #[test]
    fn test_fast_path() {
        let snapshot = ConsentSnapshot {
            allowances: SiteAllowances {
                minimal: true,
                ..Default::default()
            },
            ..Default::default()
        };

        let mut session = AuthorizationSession::new(request(Tier::Minimal, false));
        assert!(matches!(
            session.evaluate(&snapshot).unwrap(),
            Step::Granted(Grant::Minimal)
        ));
        assert!(session.state().is_terminal());

        // Terminal sessions never resolve again
        assert!(matches!(
            session.resolve(UserDecision::Deny),
            Err(AuthorizationError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_force_skips_fast_path_and_seeds_choice() {
        let snapshot = ConsentSnapshot {
            toggles: GlobalToggles::default()
                .with(Tier::Minimal, true)
                .with(Tier::WorldSensing, true),
            allowances: SiteAllowances {
                world_sensing: true,
                ..Default::default()
            },
            always_allow_world_sensing: false,
        };

        let mut session = AuthorizationSession::new(request(Tier::WorldSensing, true));
        let dialog = dialog(session.evaluate(&snapshot).unwrap());

        assert_eq!(session.state(), SessionState::AwaitingUserInput);
        assert_eq!(dialog.row_count(), 4);
        assert!(dialog.row(3).unwrap().value);
    }

    #[test]
    fn test_deny_and_dismiss_write_nothing() {
        for decision in [UserDecision::Deny, UserDecision::Dismiss] {
            let mut session = AuthorizationSession::new(request(Tier::WorldSensing, true));
            session.evaluate(&ConsentSnapshot::default()).unwrap();

            let outcome = session.resolve(decision).unwrap();
            assert_eq!(outcome.grant, Grant::Denied);
            assert_eq!(outcome.writes, None);
            assert_eq!(session.state(), SessionState::Resolved(Grant::Denied));
        }
    }

    #[test]
    fn test_confirm_all_off_persists_toggles_only() {
        let mut session = AuthorizationSession::new(request(Tier::WorldSensing, false));
        let dialog = dialog(session.evaluate(&ConsentSnapshot::default()).unwrap());

        let outcome = session.resolve(UserDecision::Confirm(dialog)).unwrap();
        assert_eq!(outcome.grant, Grant::Denied);
        assert_eq!(
            outcome.writes,
            Some(PendingWrites {
                toggles: GlobalToggles::default(),
                allow_list: None,
            })
        );
    }

    #[test]
    fn test_confirm_with_remember() {
        let mut session = AuthorizationSession::new(request(Tier::Minimal, false));
        let mut dialog = dialog(session.evaluate(&ConsentSnapshot::default()).unwrap());
        dialog.on_toggle(0, true).unwrap();
        dialog.on_choice(2, true).unwrap();

        let outcome = session.resolve(UserDecision::Confirm(dialog)).unwrap();
        assert_eq!(outcome.grant, Grant::Minimal);

        let writes = outcome.writes.unwrap();
        assert!(writes.toggles.minimal_enabled);
        assert_eq!(
            writes.allow_list.map(|c| (c.tier, c.allowed)),
            Some((Tier::Minimal, true))
        );
    }

    #[test]
    fn test_informational_dialog_always_denied() {
        let snapshot = ConsentSnapshot {
            toggles: GlobalToggles::all_on(),
            ..Default::default()
        };

        let mut session = AuthorizationSession::new(request(Tier::None, false));
        let dialog = dialog(session.evaluate(&snapshot).unwrap());
        assert_eq!(dialog.row_count(), 1);

        let outcome = session.resolve(UserDecision::Confirm(dialog)).unwrap();
        assert_eq!(outcome.grant, Grant::Denied);
        assert_eq!(outcome.writes, None);
    }

    #[test]
    fn test_confirm_rejects_dialog_for_other_tier() {
        let mut session = AuthorizationSession::new(request(Tier::Minimal, false));
        session.evaluate(&ConsentSnapshot::default()).unwrap();

        let foreign =
            AuthorizationDialogModel::new(Tier::VideoCameraAccess, GlobalToggles::all_on(), true);
        let err = session.resolve(UserDecision::Confirm(foreign)).unwrap_err();
        assert!(matches!(
            err,
            AuthorizationError::DialogMismatch {
                requested: Tier::Minimal,
                dialog: Tier::VideoCameraAccess,
            }
        ));

        // Still open; nothing was written
        assert_eq!(session.state(), SessionState::AwaitingUserInput);
        let outcome = session.resolve(UserDecision::Deny).unwrap();
        assert_eq!(outcome.writes, None);
    }

    #[test]
    fn test_resolves_once() {
        let mut session = AuthorizationSession::new(request(Tier::Lite, false));
        session.evaluate(&ConsentSnapshot::default()).unwrap();
        session.resolve(UserDecision::Deny).unwrap();

        assert!(session.resolve(UserDecision::Deny).is_err());
    }
}
