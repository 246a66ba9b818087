//! Global sensing toggles and per-site allowances

use serde::{Deserialize, Serialize};

use crate::tier::Tier;

/// Switch positions from the last confirmed dialog.
///
/// These seed the next dialog's defaults; they never grant anything on
/// their own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalToggles {
    pub minimal_enabled: bool,
    pub lite_mode_enabled: bool,
    pub world_sensing_enabled: bool,
    pub video_camera_access_enabled: bool,
}

impl GlobalToggles {
    pub fn all_on() -> Self {
        Self {
            minimal_enabled: true,
            lite_mode_enabled: true,
            world_sensing_enabled: true,
            video_camera_access_enabled: true,
        }
    }

    /// Value of the switch governing `tier` (`None` has no switch)
    pub fn get(&self, tier: Tier) -> bool {
        match tier {
            Tier::None => false,
            Tier::Minimal => self.minimal_enabled,
            Tier::Lite => self.lite_mode_enabled,
            Tier::WorldSensing => self.world_sensing_enabled,
            Tier::VideoCameraAccess => self.video_camera_access_enabled,
        }
    }

    pub fn set(&mut self, tier: Tier, value: bool) {
        match tier {
            Tier::None => {}
            Tier::Minimal => self.minimal_enabled = value,
            Tier::Lite => self.lite_mode_enabled = value,
            Tier::WorldSensing => self.world_sensing_enabled = value,
            Tier::VideoCameraAccess => self.video_camera_access_enabled = value,
        }
    }

    pub fn with(mut self, tier: Tier, value: bool) -> Self {
        self.set(tier, value);
        self
    }
}

/// Which allow-lists currently contain one origin
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteAllowances {
    pub minimal: bool,
    pub world_sensing: bool,
    pub video_camera_access: bool,
}

impl SiteAllowances {
    pub fn contains(&self, tier: Tier) -> bool {
        match tier {
            Tier::Minimal => self.minimal,
            Tier::WorldSensing => self.world_sensing,
            Tier::VideoCameraAccess => self.video_camera_access,
            Tier::None | Tier::Lite => false,
        }
    }

    pub fn set(&mut self, tier: Tier, allowed: bool) {
        match tier {
            Tier::Minimal => self.minimal = allowed,
            Tier::WorldSensing => self.world_sensing = allowed,
            Tier::VideoCameraAccess => self.video_camera_access = allowed,
            Tier::None | Tier::Lite => {}
        }
    }

    pub fn is_empty(&self) -> bool {
        !(self.minimal || self.world_sensing || self.video_camera_access)
    }
}
