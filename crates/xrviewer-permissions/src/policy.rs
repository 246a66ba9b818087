//! Tier policy
//!
//! Pure decisions over consent state. Nothing here touches a store; callers
//! read the inputs and apply the returned changes.

use serde::{Deserialize, Serialize};

use crate::origin::SiteOrigin;
use crate::tier::{Grant, Tier};
use crate::toggles::{GlobalToggles, SiteAllowances};

/// Dependency chain walked when resolving a dialog. Each tier implies the
/// ones before it.
pub const TIER_CHAIN: [Tier; 3] = [Tier::Minimal, Tier::WorldSensing, Tier::VideoCameraAccess];

/// Fast-path decision. `None` means the user has to be asked.
///
/// Rules, first match wins:
/// 1. minimal request for an allow-listed site
/// 2. world sensing request with the global always-allow flag or an
///    allow-listed site
/// 3. video camera request for an allow-listed site
///
/// Lite mode caps any fast grant above `Lite` down to `Lite`.
pub fn decide(
    requested: Tier,
    allowances: &SiteAllowances,
    always_allow_world_sensing: bool,
    lite_mode: bool,
) -> Option<Grant> {
    let grant = match requested {
        Tier::Minimal if allowances.minimal => Grant::Minimal,
        Tier::WorldSensing if always_allow_world_sensing || allowances.world_sensing => {
            Grant::WorldSensing
        }
        Tier::VideoCameraAccess if allowances.video_camera_access => Grant::VideoCameraAccess,
        _ => return None,
    };

    if lite_mode && grant > Grant::Lite {
        Some(Grant::Lite)
    } else {
        Some(grant)
    }
}

/// Allow-list edit produced by a confirmed dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowListChange {
    pub tier: Tier,
    pub origin: SiteOrigin,
    /// `true` inserts the origin, `false` removes it
    pub allowed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub grant: Grant,
    pub allow_list: Option<AllowListChange>,
}

impl Resolution {
    fn denied() -> Self {
        Self {
            grant: Grant::Denied,
            allow_list: None,
        }
    }

    fn granted(grant: Grant) -> Self {
        Self {
            grant,
            allow_list: None,
        }
    }
}

/// Resolve a confirmed dialog.
///
/// `toggles` must be the effective switch values (disabled rows count as
/// off). `remember` is the per-site choice shown for the requested tier.
pub fn resolve_from_dialog(
    requested: Tier,
    toggles: &GlobalToggles,
    remember: bool,
    origin: &SiteOrigin,
) -> Resolution {
    match requested {
        Tier::None => return Resolution::denied(),
        Tier::Lite => {
            return if toggles.lite_mode_enabled {
                Resolution::granted(Grant::Lite)
            } else {
                Resolution::denied()
            };
        }
        _ => {}
    }

    // Lite is the privacy ceiling for every chained request
    if toggles.lite_mode_enabled {
        return Resolution::granted(Grant::Lite);
    }

    let mut satisfied = None;
    for tier in TIER_CHAIN.iter().copied().filter(|t| *t <= requested) {
        if !toggles.get(tier) {
            break;
        }
        satisfied = Some(tier);
    }

    let Some(tier) = satisfied else {
        return Resolution::denied();
    };

    let allow_list = (tier == requested && tier.has_allow_list()).then(|| AllowListChange {
        tier,
        origin: origin.clone(),
        allowed: remember,
    });

    Resolution {
        grant: Grant::from(tier),
        allow_list,
    }
}
