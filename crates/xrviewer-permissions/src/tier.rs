//! Sensing tiers and grants
//!
//! ```text
//! None < Minimal < Lite < WorldSensing < VideoCameraAccess
//! ```
//!
//! Lite is a reduced-disclosure substitute for the Minimal → WorldSensing →
//! VideoCameraAccess chain; it ranks above Minimal only for escalation order.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Tier {
    /// Page is not requesting sensing access
    None,
    /// Device motion only
    Minimal,
    /// A single real world plane and faces
    Lite,
    /// Real world planes, lighting, faces and images
    WorldSensing,
    /// Everything above plus the live camera image
    VideoCameraAccess,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::None,
        Tier::Minimal,
        Tier::Lite,
        Tier::WorldSensing,
        Tier::VideoCameraAccess,
    ];

    /// Tiers that keep a per-site allow-list. Lite is a global flag only.
    pub const ALLOW_LISTED: [Tier; 3] =
        [Tier::Minimal, Tier::WorldSensing, Tier::VideoCameraAccess];

    /// Parse a tier name; anything unrecognised is treated as `None`
    pub fn from_name(name: &str) -> Tier {
        match name.trim() {
            "minimal" => Tier::Minimal,
            "lite" => Tier::Lite,
            "worldSensing" | "world_sensing" => Tier::WorldSensing,
            "videoCameraAccess" | "video_camera_access" => Tier::VideoCameraAccess,
            _ => Tier::None,
        }
    }

    pub fn has_allow_list(&self) -> bool {
        Self::ALLOW_LISTED.contains(self)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::None => "none",
            Tier::Minimal => "minimal",
            Tier::Lite => "lite",
            Tier::WorldSensing => "worldSensing",
            Tier::VideoCameraAccess => "videoCameraAccess",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<&str> for Tier {
    fn from(name: &str) -> Self {
        Tier::from_name(name)
    }
}

/// Outcome of an authorization request
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Grant {
    Denied,
    Minimal,
    Lite,
    WorldSensing,
    VideoCameraAccess,
}

impl Grant {
    /// The tier this grant corresponds to, `None` when denied
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Grant::Denied => None,
            Grant::Minimal => Some(Tier::Minimal),
            Grant::Lite => Some(Tier::Lite),
            Grant::WorldSensing => Some(Tier::WorldSensing),
            Grant::VideoCameraAccess => Some(Tier::VideoCameraAccess),
        }
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, Grant::Denied)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Grant::Denied => "denied",
            Grant::Minimal => "minimal",
            Grant::Lite => "lite",
            Grant::WorldSensing => "worldSensing",
            Grant::VideoCameraAccess => "videoCameraAccess",
        }
    }
}

impl From<Tier> for Grant {
    fn from(tier: Tier) -> Self {
        match tier {
            Tier::None => Grant::Denied,
            Tier::Minimal => Grant::Minimal,
            Tier::Lite => Grant::Lite,
            Tier::WorldSensing => Grant::WorldSensing,
            Tier::VideoCameraAccess => Grant::VideoCameraAccess,
        }
    }
}

impl std::fmt::Display for Grant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
