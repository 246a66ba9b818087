//! Authorization dialog model
//!
//! Derived form state for the permission dialog: which rows are shown, what
//! each one holds, and which are editable. The presentation layer renders
//! rows and feeds user events back through `on_toggle` / `on_choice`, then
//! applies the returned row diffs to its widgets.
//!
//! Rows per requested tier:
//! ```text
//! none               Info
//! minimal            Device Motion, Lite Mode, Choice(minimal)
//! lite               Device Motion, Lite Mode, World Sensing
//! worldSensing       Device Motion, Lite Mode, World Sensing, Choice(worldSensing)
//! videoCameraAccess  Device Motion, Lite Mode, World Sensing, Video Camera Access,
//!                    Choice(videoCameraAccess)
//! ```

use serde::Serialize;

use crate::error::DialogError;
use crate::tier::Tier;
use crate::toggles::GlobalToggles;

/// One switch in the dependency chain
struct SwitchRule {
    tier: Tier,
    label: &'static str,
    /// Switches that must be on for this one to be editable
    requires_on: &'static [Tier],
    /// Switches that must be off for this one to be editable
    requires_off: &'static [Tier],
    /// Values forced on other switches when this one is turned on
    when_on: &'static [(Tier, bool)],
    /// Values forced on other switches when this one is turned off
    when_off: &'static [(Tier, bool)],
}

const SWITCH_RULES: [SwitchRule; 4] = [
    SwitchRule {
        tier: Tier::Minimal,
        label: "Device Motion",
        requires_on: &[],
        requires_off: &[],
        when_on: &[],
        when_off: &[
            (Tier::Lite, false),
            (Tier::WorldSensing, false),
            (Tier::VideoCameraAccess, false),
        ],
    },
    SwitchRule {
        tier: Tier::Lite,
        label: "Lite Mode",
        requires_on: &[Tier::Minimal],
        requires_off: &[],
        when_on: &[(Tier::WorldSensing, true), (Tier::VideoCameraAccess, false)],
        when_off: &[],
    },
    SwitchRule {
        tier: Tier::WorldSensing,
        label: "World Sensing",
        requires_on: &[Tier::Minimal],
        requires_off: &[Tier::Lite],
        when_on: &[],
        when_off: &[(Tier::VideoCameraAccess, false)],
    },
    SwitchRule {
        tier: Tier::VideoCameraAccess,
        label: "Video Camera Access",
        requires_on: &[Tier::Minimal, Tier::WorldSensing],
        requires_off: &[Tier::Lite],
        when_on: &[],
        when_off: &[],
    },
];

fn switch_rule(tier: Tier) -> Option<&'static SwitchRule> {
    SWITCH_RULES.iter().find(|rule| rule.tier == tier)
}

/// Lite never remembers per-site choices
const CHOICE_REQUIRES_OFF: &[Tier] = &[Tier::Lite];

const CHOICE_LABEL: &str = "Remember for This Site";
const INFO_LABEL: &str = "No sensing data will be shared";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// Read-only text
    Info,
    /// On/off switch for one tier
    Toggle,
    /// Per-site "remember my choice" segmented control
    Choice,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DialogRow {
    pub label: &'static str,
    pub kind: RowKind,
    /// Tier the row controls (`None` for the info row)
    pub subject: Tier,
    /// Switch position, or "remember" for choice rows
    pub value: bool,
    pub enabled: bool,
    /// Row offers a "learn more" explainer
    pub learn_more: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Info,
    Switch(Tier),
    Choice(Tier),
}

fn layout(requested: Tier) -> Vec<Slot> {
    use Slot::*;

    match requested {
        Tier::None => vec![Info],
        Tier::Minimal => vec![Switch(Tier::Minimal), Switch(Tier::Lite), Choice(Tier::Minimal)],
        Tier::Lite => vec![
            Switch(Tier::Minimal),
            Switch(Tier::Lite),
            Switch(Tier::WorldSensing),
        ],
        Tier::WorldSensing => vec![
            Switch(Tier::Minimal),
            Switch(Tier::Lite),
            Switch(Tier::WorldSensing),
            Choice(Tier::WorldSensing),
        ],
        Tier::VideoCameraAccess => vec![
            Switch(Tier::Minimal),
            Switch(Tier::Lite),
            Switch(Tier::WorldSensing),
            Switch(Tier::VideoCameraAccess),
            Choice(Tier::VideoCameraAccess),
        ],
    }
}

/// Title and explanation shown above the rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DialogContent {
    pub title: &'static str,
    pub message: &'static str,
}

impl DialogContent {
    pub fn for_tier(requested: Tier) -> Self {
        match requested {
            Tier::Minimal => Self {
                title: "Allow usage of Device Motion?",
                message: "WebXR displays video from your camera without giving this web page access to the video.",
            },
            Tier::Lite => Self {
                title: "Allow Lite Mode?",
                message: "Lite Mode:\n-Uses a single real world plane\n-Looks for faces",
            },
            Tier::WorldSensing => Self {
                title: "Allow World Sensing?",
                message: "World Sensing:\n-Uses real world planes & lighting\n-Looks for faces & images",
            },
            Tier::VideoCameraAccess => Self {
                title: "Allow Video Camera Access?",
                message: "Video Camera Access:\n-Accesses your camera's live image\n-Uses real world planes & lighting\n-Looks for faces & images",
            },
            Tier::None => Self {
                title: "This site is not requesting WebXR authorization",
                message: "No video from your camera, planes, faces, or things in the real world will be shared with this site.",
            },
        }
    }
}

/// Row state for one permission dialog.
///
/// Switch values live in one `GlobalToggles`, seeded from the last confirmed
/// dialog; rows are projections of it. A disabled switch keeps its value
/// but does not count toward the grant (see `effective_toggles`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationDialogModel {
    requested: Tier,
    toggles: GlobalToggles,
    remember: bool,
    slots: Vec<Slot>,
}

impl AuthorizationDialogModel {
    /// `remembered` is whether the site is already on the requested tier's
    /// allow-list; it seeds the choice row.
    pub fn new(requested: Tier, toggles: GlobalToggles, remembered: bool) -> Self {
        Self {
            requested,
            toggles,
            remember: remembered,
            slots: layout(requested),
        }
    }

    pub fn requested(&self) -> Tier {
        self.requested
    }

    pub fn content(&self) -> DialogContent {
        DialogContent::for_tier(self.requested)
    }

    pub fn row_count(&self) -> usize {
        self.slots.len()
    }

    pub fn row(&self, index: usize) -> Result<DialogRow, DialogError> {
        let slot = self.slot(index)?;
        Ok(self.render(slot))
    }

    pub fn rows(&self) -> Vec<DialogRow> {
        self.slots.iter().map(|slot| self.render(*slot)).collect()
    }

    /// Raw switch values, persisted on confirm as the next dialog's defaults
    pub fn toggles(&self) -> GlobalToggles {
        self.toggles
    }

    /// Switch values that count toward a grant: shown and editable
    pub fn effective_toggles(&self) -> GlobalToggles {
        let mut effective = GlobalToggles::default();
        for rule in &SWITCH_RULES {
            let counts = self.shows_switch(rule.tier) && self.switch_enabled(rule);
            effective.set(rule.tier, counts && self.toggles.get(rule.tier));
        }
        effective
    }

    /// Per-site choice, only meaningful while the choice row is enabled
    pub fn remember(&self) -> bool {
        self.remember
            && self
                .slots
                .iter()
                .any(|slot| matches!(slot, Slot::Choice(_)) && self.slot_enabled(*slot))
    }

    /// Flip a switch row and apply its cascade.
    ///
    /// Returns `(index, row)` for every row whose state changed.
    pub fn on_toggle(
        &mut self,
        index: usize,
        value: bool,
    ) -> Result<Vec<(usize, DialogRow)>, DialogError> {
        let slot = self.slot(index)?;
        let Slot::Switch(tier) = slot else {
            return Err(DialogError::NotAToggle(index));
        };
        if !self.slot_enabled(slot) {
            return Err(DialogError::RowDisabled(index));
        }
        let Some(rule) = switch_rule(tier) else {
            return Err(DialogError::NotAToggle(index));
        };

        let before = self.rows();

        self.toggles.set(tier, value);
        let forced = if value { rule.when_on } else { rule.when_off };
        for (dependent, forced_value) in forced {
            if self.shows_switch(*dependent) {
                self.toggles.set(*dependent, *forced_value);
            }
        }

        tracing::trace!(row = index, tier = %tier, value, "Dialog toggle");

        Ok(self.diff(&before))
    }

    /// Set the per-site "remember my choice" row
    pub fn on_choice(
        &mut self,
        index: usize,
        remember: bool,
    ) -> Result<Vec<(usize, DialogRow)>, DialogError> {
        let slot = self.slot(index)?;
        if !matches!(slot, Slot::Choice(_)) {
            return Err(DialogError::NotAChoice(index));
        }
        if !self.slot_enabled(slot) {
            return Err(DialogError::RowDisabled(index));
        }

        let before = self.rows();
        self.remember = remember;
        Ok(self.diff(&before))
    }

    fn slot(&self, index: usize) -> Result<Slot, DialogError> {
        self.slots
            .get(index)
            .copied()
            .ok_or(DialogError::RowOutOfRange {
                index,
                count: self.slots.len(),
            })
    }

    fn shows_switch(&self, tier: Tier) -> bool {
        self.slots.contains(&Slot::Switch(tier))
    }

    fn switch_enabled(&self, rule: &SwitchRule) -> bool {
        rule.requires_on.iter().all(|t| self.toggles.get(*t))
            && rule.requires_off.iter().all(|t| !self.toggles.get(*t))
    }

    fn slot_enabled(&self, slot: Slot) -> bool {
        match slot {
            Slot::Info => false,
            Slot::Switch(tier) => switch_rule(tier).is_some_and(|rule| self.switch_enabled(rule)),
            Slot::Choice(tier) => {
                self.slot_enabled(Slot::Switch(tier))
                    && self.toggles.get(tier)
                    && CHOICE_REQUIRES_OFF.iter().all(|t| !self.toggles.get(*t))
            }
        }
    }

    fn render(&self, slot: Slot) -> DialogRow {
        let enabled = self.slot_enabled(slot);
        match slot {
            Slot::Info => DialogRow {
                label: INFO_LABEL,
                kind: RowKind::Info,
                subject: Tier::None,
                value: false,
                enabled,
                learn_more: false,
            },
            Slot::Switch(tier) => DialogRow {
                label: switch_rule(tier).map(|rule| rule.label).unwrap_or_default(),
                kind: RowKind::Toggle,
                subject: tier,
                value: self.toggles.get(tier),
                enabled,
                learn_more: tier == Tier::Lite,
            },
            Slot::Choice(tier) => DialogRow {
                label: CHOICE_LABEL,
                kind: RowKind::Choice,
                subject: tier,
                value: self.remember,
                enabled,
                learn_more: false,
            },
        }
    }

    fn diff(&self, before: &[DialogRow]) -> Vec<(usize, DialogRow)> {
        self.rows()
            .into_iter()
            .enumerate()
            .filter(|(i, row)| before.get(*i) != Some(row))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(requested: Tier, toggles: GlobalToggles) -> AuthorizationDialogModel {
        AuthorizationDialogModel::new(requested, toggles, false)
    }

    #[test]
    fn test_row_counts() {
        let toggles = GlobalToggles::default();
        assert_eq!(model(Tier::None, toggles).row_count(), 1);
        assert_eq!(model(Tier::Minimal, toggles).row_count(), 3);
        assert_eq!(model(Tier::Lite, toggles).row_count(), 3);
        assert_eq!(model(Tier::WorldSensing, toggles).row_count(), 4);
        assert_eq!(model(Tier::VideoCameraAccess, toggles).row_count(), 5);
    }

    #[test]
    fn test_row_kinds() {
        let rows = model(Tier::VideoCameraAccess, GlobalToggles::default()).rows();
        let kinds: Vec<RowKind> = rows.iter().map(|r| r.kind).collect();
        assert_eq!(
            kinds,
            vec![
                RowKind::Toggle,
                RowKind::Toggle,
                RowKind::Toggle,
                RowKind::Toggle,
                RowKind::Choice
            ]
        );
        assert_eq!(rows[0].label, "Device Motion");
        assert!(rows[1].learn_more);

        let lite = model(Tier::Lite, GlobalToggles::default()).rows();
        assert_eq!(lite[2].kind, RowKind::Toggle);
        assert_eq!(lite[2].subject, Tier::WorldSensing);

        let info = model(Tier::None, GlobalToggles::all_on()).rows();
        assert_eq!(info[0].kind, RowKind::Info);
        assert!(!info[0].enabled);
    }

    #[test]
    fn test_everything_off_only_root_enabled() {
        let rows = model(Tier::VideoCameraAccess, GlobalToggles::default()).rows();
        assert!(rows[0].enabled);
        assert!(!rows[0].value);
        assert!(rows[1..].iter().all(|r| !r.enabled));
    }

    #[test]
    fn test_root_off_forces_dependents_off() {
        let mut dialog = model(
            Tier::VideoCameraAccess,
            GlobalToggles::default()
                .with(Tier::Minimal, true)
                .with(Tier::WorldSensing, true)
                .with(Tier::VideoCameraAccess, true),
        );
        dialog.on_choice(4, true).unwrap();

        let changed = dialog.on_toggle(0, false).unwrap();
        let changed_rows: Vec<usize> = changed.iter().map(|(i, _)| *i).collect();
        assert_eq!(changed_rows, vec![0, 1, 2, 3, 4]);

        let rows = dialog.rows();
        assert!(rows[1..].iter().all(|r| !r.enabled));
        assert!(!rows[2].value);
        assert!(!rows[3].value);
        assert_eq!(dialog.effective_toggles(), GlobalToggles::default());
        assert!(!dialog.remember());
    }

    #[test]
    fn test_toggle_on_reenables_without_turning_on() {
        let mut dialog = model(Tier::WorldSensing, GlobalToggles::default());

        let changed = dialog.on_toggle(0, true).unwrap();
        let rows = dialog.rows();

        assert!(rows[1].enabled && !rows[1].value);
        assert!(rows[2].enabled && !rows[2].value);
        // Choice row waits for its own switch
        assert!(!rows[3].enabled);
        assert!(changed.iter().any(|(i, _)| *i == 2));
    }

    #[test]
    fn test_lite_forces_world_on_and_video_off() {
        let mut dialog = model(
            Tier::VideoCameraAccess,
            GlobalToggles::default()
                .with(Tier::Minimal, true)
                .with(Tier::WorldSensing, true)
                .with(Tier::VideoCameraAccess, true),
        );

        dialog.on_toggle(1, true).unwrap();
        let rows = dialog.rows();

        assert!(rows[2].value && !rows[2].enabled);
        assert!(!rows[3].value && !rows[3].enabled);
        assert!(!rows[4].enabled);

        // Turning lite back off re-enables world sensing with its value kept
        dialog.on_toggle(1, false).unwrap();
        let rows = dialog.rows();
        assert!(rows[2].value && rows[2].enabled);
        assert!(!rows[3].value && rows[3].enabled);
    }

    #[test]
    fn test_world_off_forces_video_off() {
        let mut dialog = model(
            Tier::VideoCameraAccess,
            GlobalToggles::default()
                .with(Tier::Minimal, true)
                .with(Tier::WorldSensing, true)
                .with(Tier::VideoCameraAccess, true),
        );

        dialog.on_toggle(2, false).unwrap();
        let rows = dialog.rows();
        assert!(!rows[3].value && !rows[3].enabled);

        dialog.on_toggle(2, true).unwrap();
        let rows = dialog.rows();
        assert!(!rows[3].value && rows[3].enabled);
    }

    #[test]
    fn test_disabled_and_invalid_rows_rejected() {
        let mut dialog = model(Tier::WorldSensing, GlobalToggles::default());

        assert_eq!(dialog.on_toggle(2, true), Err(DialogError::RowDisabled(2)));
        assert_eq!(dialog.on_toggle(3, true), Err(DialogError::NotAToggle(3)));
        assert_eq!(dialog.on_choice(0, true), Err(DialogError::NotAChoice(0)));
        assert_eq!(
            dialog.on_toggle(9, true),
            Err(DialogError::RowOutOfRange { index: 9, count: 4 })
        );
        assert_eq!(dialog.on_choice(3, true), Err(DialogError::RowDisabled(3)));

        let mut info = model(Tier::None, GlobalToggles::all_on());
        assert_eq!(info.on_toggle(0, true), Err(DialogError::NotAToggle(0)));
    }

    #[test]
    fn test_stale_values_are_ineffective() {
        // Last dialog left world sensing on but device motion off
        let dialog = model(
            Tier::WorldSensing,
            GlobalToggles::default()
                .with(Tier::WorldSensing, true)
                .with(Tier::Lite, true),
        );

        let rows = dialog.rows();
        assert!(rows[1].value && !rows[1].enabled);
        assert!(rows[2].value && !rows[2].enabled);
        assert_eq!(dialog.effective_toggles(), GlobalToggles::default());
        assert!(dialog.toggles().world_sensing_enabled);
    }

    #[test]
    fn test_hidden_rows_untouched() {
        let seeded = GlobalToggles::default()
            .with(Tier::Minimal, true)
            .with(Tier::WorldSensing, true)
            .with(Tier::VideoCameraAccess, true);
        let mut dialog = model(Tier::Minimal, seeded);

        dialog.on_toggle(0, false).unwrap();

        let toggles = dialog.toggles();
        assert!(!toggles.minimal_enabled);
        assert!(toggles.world_sensing_enabled);
        assert!(toggles.video_camera_access_enabled);
        assert!(!dialog.effective_toggles().world_sensing_enabled);
    }

    #[test]
    fn test_choice_seeded_from_allow_list() {
        let toggles = GlobalToggles::default().with(Tier::Minimal, true);
        let dialog = AuthorizationDialogModel::new(Tier::Minimal, toggles, true);

        let rows = dialog.rows();
        assert!(rows[2].value && rows[2].enabled);
        assert!(dialog.remember());

        // Lite disables the minimal choice
        let mut dialog = dialog;
        dialog.on_toggle(1, true).unwrap();
        assert!(!dialog.row(2).unwrap().enabled);
        assert!(!dialog.remember());
    }

    #[test]
    fn test_content_per_tier() {
        assert_eq!(
            model(Tier::WorldSensing, GlobalToggles::default()).content().title,
            "Allow World Sensing?"
        );
        assert!(DialogContent::for_tier(Tier::None)
            .title
            .contains("not requesting"));
    }
}
