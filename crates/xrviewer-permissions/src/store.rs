//! Consent persistence
//!
//! | Record                     | Scope    | Storage                  |
//! | Sensing toggles (4)        | Global   | settings table           |
//! | Always allow world sensing | Global   | settings table           |
//! | Allow-lists (3 tiers)      | Per-site | site_allowances table    |

use chrono::Utc;
use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use xrviewer_storage::{write_bool, Database};

use crate::error::PermissionError;
use crate::export::ConsentExport;
use crate::origin::SiteOrigin;
use crate::tier::Tier;
use crate::toggles::{GlobalToggles, SiteAllowances};
use crate::Result;

pub const MINIMAL_ENABLED_KEY: &str = "xr.minimal_enabled";
pub const LITE_MODE_ENABLED_KEY: &str = "xr.lite_mode_enabled";
pub const WORLD_SENSING_ENABLED_KEY: &str = "xr.world_sensing_enabled";
pub const VIDEO_CAMERA_ACCESS_ENABLED_KEY: &str = "xr.video_camera_access_enabled";
pub const ALWAYS_ALLOW_WORLD_SENSING_KEY: &str = "xr.always_allow_world_sensing";

const CONSENT_KEYS: [&str; 5] = [
    MINIMAL_ENABLED_KEY,
    LITE_MODE_ENABLED_KEY,
    WORLD_SENSING_ENABLED_KEY,
    VIDEO_CAMERA_ACCESS_ENABLED_KEY,
    ALWAYS_ALLOW_WORLD_SENSING_KEY,
];

/// Durable, process-wide consent state.
///
/// Reads are synchronous. Every write is atomic per key; multi-key writes
/// (`save_toggles`, `reset`, `replace_all`) are atomic as a whole.
pub trait ConsentStore: Send + Sync {
    fn toggles(&self) -> Result<GlobalToggles>;

    fn save_toggles(&self, toggles: &GlobalToggles) -> Result<()>;

    fn always_allow_world_sensing(&self) -> Result<bool>;

    fn set_always_allow_world_sensing(&self, value: bool) -> Result<()>;

    fn is_allowed(&self, tier: Tier, origin: &SiteOrigin) -> Result<bool>;

    /// Add (`true`) or remove (`false`) `origin` from the tier's allow-list
    fn set_allowed(&self, tier: Tier, origin: &SiteOrigin, allowed: bool) -> Result<()>;

    /// Sorted origins in one tier's allow-list
    fn allowed_sites(&self, tier: Tier) -> Result<Vec<SiteOrigin>>;

    /// Forget every toggle, flag and allow-list entry
    fn reset(&self) -> Result<()>;

    /// Replace everything with `export` in one atomic step. Readers see the
    /// old state or the new one, never a mix; on failure the old state stays.
    /// Entries for tiers without an allow-list are ignored.
    fn replace_all(&self, export: &ConsentExport) -> Result<()>;

    fn allowances(&self, origin: &SiteOrigin) -> Result<SiteAllowances> {
        let mut allowances = SiteAllowances::default();
        for tier in Tier::ALLOW_LISTED {
            allowances.set(tier, self.is_allowed(tier, origin)?);
        }
        Ok(allowances)
    }

    /// Remove `origin` from every allow-list
    fn forget_site(&self, origin: &SiteOrigin) -> Result<()> {
        for tier in Tier::ALLOW_LISTED {
            self.set_allowed(tier, origin, false)?;
        }
        Ok(())
    }
}

fn ensure_allow_list(tier: Tier) -> Result<()> {
    if tier.has_allow_list() {
        Ok(())
    } else {
        Err(PermissionError::NoAllowList(tier))
    }
}

/// SQLite-backed store sharing the viewer database
pub struct SqliteConsentStore {
    db: Database,
}

impl SqliteConsentStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl ConsentStore for SqliteConsentStore {
    fn toggles(&self) -> Result<GlobalToggles> {
        Ok(GlobalToggles {
            minimal_enabled: self.db.get_bool(MINIMAL_ENABLED_KEY)?.unwrap_or(false),
            lite_mode_enabled: self.db.get_bool(LITE_MODE_ENABLED_KEY)?.unwrap_or(false),
            world_sensing_enabled: self
                .db
                .get_bool(WORLD_SENSING_ENABLED_KEY)?
                .unwrap_or(false),
            video_camera_access_enabled: self
                .db
                .get_bool(VIDEO_CAMERA_ACCESS_ENABLED_KEY)?
                .unwrap_or(false),
        })
    }

    fn save_toggles(&self, toggles: &GlobalToggles) -> Result<()> {
        self.db.set_bools(&[
            (MINIMAL_ENABLED_KEY, toggles.minimal_enabled),
            (LITE_MODE_ENABLED_KEY, toggles.lite_mode_enabled),
            (WORLD_SENSING_ENABLED_KEY, toggles.world_sensing_enabled),
            (
                VIDEO_CAMERA_ACCESS_ENABLED_KEY,
                toggles.video_camera_access_enabled,
            ),
        ])?;
        Ok(())
    }

    fn always_allow_world_sensing(&self) -> Result<bool> {
        Ok(self
            .db
            .get_bool(ALWAYS_ALLOW_WORLD_SENSING_KEY)?
            .unwrap_or(false))
    }

    fn set_always_allow_world_sensing(&self, value: bool) -> Result<()> {
        self.db.set_bool(ALWAYS_ALLOW_WORLD_SENSING_KEY, value)?;
        Ok(())
    }

    fn is_allowed(&self, tier: Tier, origin: &SiteOrigin) -> Result<bool> {
        if !tier.has_allow_list() {
            return Ok(false);
        }

        let count: i64 = self.db.with_connection(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM site_allowances WHERE tier = ?1 AND origin = ?2",
                [tier.as_str(), origin.as_str()],
                |row| row.get(0),
            )?)
        })?;

        Ok(count > 0)
    }

    fn set_allowed(&self, tier: Tier, origin: &SiteOrigin, allowed: bool) -> Result<()> {
        ensure_allow_list(tier)?;

        self.db.with_connection(|conn| {
            if allowed {
                conn.execute(
                    "INSERT OR REPLACE INTO site_allowances (tier, origin, granted_at)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![tier.as_str(), origin.as_str(), Utc::now().to_rfc3339()],
                )?;
            } else {
                conn.execute(
                    "DELETE FROM site_allowances WHERE tier = ?1 AND origin = ?2",
                    [tier.as_str(), origin.as_str()],
                )?;
            }
            Ok(())
        })?;

        tracing::debug!(tier = %tier, origin = %origin, allowed, "Updated site allow-list");

        Ok(())
    }

    fn allowed_sites(&self, tier: Tier) -> Result<Vec<SiteOrigin>> {
        if !tier.has_allow_list() {
            return Ok(Vec::new());
        }

        let keys: Vec<String> = self.db.with_connection(|conn| {
            let mut stmt = conn.prepare(
                "SELECT origin FROM site_allowances WHERE tier = ?1 ORDER BY origin",
            )?;
            let keys = stmt
                .query_map([tier.as_str()], |row| row.get(0))?
                .collect::<std::result::Result<Vec<String>, _>>()?;
            Ok(keys)
        })?;

        keys.into_iter().map(SiteOrigin::from_key).collect()
    }

    fn reset(&self) -> Result<()> {
        self.db.transaction(|conn| {
            conn.execute("DELETE FROM site_allowances", [])?;
            for key in CONSENT_KEYS {
                conn.execute("DELETE FROM settings WHERE key = ?1", [key])?;
            }
            Ok(())
        })?;

        tracing::info!("Reset all sensing consent");

        Ok(())
    }

    fn replace_all(&self, export: &ConsentExport) -> Result<()> {
        let toggles = &export.toggles;
        let granted_at = Utc::now().to_rfc3339();

        self.db.transaction(|conn| {
            conn.execute("DELETE FROM site_allowances", [])?;

            for (key, value) in [
                (MINIMAL_ENABLED_KEY, toggles.minimal_enabled),
                (LITE_MODE_ENABLED_KEY, toggles.lite_mode_enabled),
                (WORLD_SENSING_ENABLED_KEY, toggles.world_sensing_enabled),
                (
                    VIDEO_CAMERA_ACCESS_ENABLED_KEY,
                    toggles.video_camera_access_enabled,
                ),
                (
                    ALWAYS_ALLOW_WORLD_SENSING_KEY,
                    export.always_allow_world_sensing,
                ),
            ] {
                write_bool(conn, key, value)?;
            }

            for entry in export
                .allow_lists
                .iter()
                .filter(|e| e.tier.has_allow_list())
            {
                conn.execute(
                    "INSERT OR REPLACE INTO site_allowances (tier, origin, granted_at)
                     VALUES (?1, ?2, ?3)",
                    rusqlite::params![entry.tier.as_str(), entry.origin.as_str(), granted_at],
                )?;
            }
            Ok(())
        })?;

        Ok(())
    }
}

#[derive(Debug, Default)]
struct MemoryState {
    toggles: GlobalToggles,
    always_allow_world_sensing: bool,
    allow_lists: HashMap<Tier, BTreeSet<SiteOrigin>>,
}

/// Process-local store, used when no database is configured and in tests
#[derive(Debug, Clone, Default)]
pub struct MemoryConsentStore {
    state: Arc<RwLock<MemoryState>>,
}

impl MemoryConsentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ConsentStore for MemoryConsentStore {
    fn toggles(&self) -> Result<GlobalToggles> {
        Ok(self.state.read().toggles)
    }

    fn save_toggles(&self, toggles: &GlobalToggles) -> Result<()> {
        self.state.write().toggles = *toggles;
        Ok(())
    }

    fn always_allow_world_sensing(&self) -> Result<bool> {
        Ok(self.state.read().always_allow_world_sensing)
    }

    fn set_always_allow_world_sensing(&self, value: bool) -> Result<()> {
        self.state.write().always_allow_world_sensing = value;
        Ok(())
    }

    fn is_allowed(&self, tier: Tier, origin: &SiteOrigin) -> Result<bool> {
        Ok(self
            .state
            .read()
            .allow_lists
            .get(&tier)
            .is_some_and(|sites| sites.contains(origin)))
    }

    fn set_allowed(&self, tier: Tier, origin: &SiteOrigin, allowed: bool) -> Result<()> {
        ensure_allow_list(tier)?;

        let mut state = self.state.write();
        let sites = state.allow_lists.entry(tier).or_default();
        if allowed {
            sites.insert(origin.clone());
        } else {
            sites.remove(origin);
        }
        Ok(())
    }

    fn allowed_sites(&self, tier: Tier) -> Result<Vec<SiteOrigin>> {
        Ok(self
            .state
            .read()
            .allow_lists
            .get(&tier)
            .map(|sites| sites.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn reset(&self) -> Result<()> {
        *self.state.write() = MemoryState::default();
        Ok(())
    }

    fn replace_all(&self, export: &ConsentExport) -> Result<()> {
        let mut next = MemoryState {
            toggles: export.toggles,
            always_allow_world_sensing: export.always_allow_world_sensing,
            allow_lists: HashMap::new(),
        };
        for entry in export
            .allow_lists
            .iter()
            .filter(|e| e.tier.has_allow_list())
        {
            next.allow_lists
                .entry(entry.tier)
                .or_default()
                .insert(entry.origin.clone());
        }

        *self.state.write() = next;
        Ok(())
    }
}
