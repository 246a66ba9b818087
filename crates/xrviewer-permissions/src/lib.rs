//! XRViewer Sensing Permissions
//!
//! Sites ask for one of five escalating sensing tiers:
//! - None: nothing is shared
//! - Minimal: device motion
//! - Lite: one real world plane and faces (global reduced-disclosure mode)
//! - WorldSensing: planes, lighting, faces and images
//! - VideoCameraAccess: everything plus the live camera image
//!
//! Consent model:
//! - Global toggles remember the last dialog's switch positions
//! - Minimal, WorldSensing and VideoCameraAccess keep per-site allow-lists
//! - Lite is global only and caps every other tier when on
//!
//! Policy and dialog logic are pure; persistence goes through `ConsentStore`.

mod dialog;
mod error;
mod export;
mod origin;
mod policy;
mod store;
mod tier;
mod toggles;

pub use dialog::{AuthorizationDialogModel, DialogContent, DialogRow, RowKind};
pub use error::{DialogError, PermissionError};
pub use export::{export_consent, import_consent, AllowListEntry, ConsentExport};
pub use origin::SiteOrigin;
pub use policy::{decide, resolve_from_dialog, AllowListChange, Resolution, TIER_CHAIN};
pub use store::{
    ConsentStore, MemoryConsentStore, SqliteConsentStore, ALWAYS_ALLOW_WORLD_SENSING_KEY,
    LITE_MODE_ENABLED_KEY, MINIMAL_ENABLED_KEY, VIDEO_CAMERA_ACCESS_ENABLED_KEY,
    WORLD_SENSING_ENABLED_KEY,
};
pub use tier::{Grant, Tier};
pub use toggles::{GlobalToggles, SiteAllowances};

pub type Result<T> = std::result::Result<T, PermissionError>;
