//! Consent export and import

use serde::{Deserialize, Serialize};

use crate::origin::SiteOrigin;
use crate::store::ConsentStore;
use crate::tier::Tier;
use crate::toggles::GlobalToggles;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowListEntry {
    pub tier: Tier,
    pub origin: SiteOrigin,
}

/// Everything a `ConsentStore` holds, in a stable order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsentExport {
    pub toggles: GlobalToggles,
    pub always_allow_world_sensing: bool,
    pub allow_lists: Vec<AllowListEntry>,
}

pub fn export_consent(store: &dyn ConsentStore) -> Result<ConsentExport> {
    let mut allow_lists = Vec::new();
    for tier in Tier::ALLOW_LISTED {
        for origin in store.allowed_sites(tier)? {
            allow_lists.push(AllowListEntry { tier, origin });
        }
    }

    allow_lists.sort_by(|a, b| a.origin.cmp(&b.origin).then(a.tier.cmp(&b.tier)));

    Ok(ConsentExport {
        toggles: store.toggles()?,
        always_allow_world_sensing: store.always_allow_world_sensing()?,
        allow_lists,
    })
}

/// Replace the store's contents with `export` in one atomic write
pub fn import_consent(store: &dyn ConsentStore, export: &ConsentExport) -> Result<()> {
    let skipped = export
        .allow_lists
        .iter()
        .filter(|e| !e.tier.has_allow_list())
        .count();

    store.replace_all(export)?;

    if skipped > 0 {
        tracing::warn!(skipped, "Ignored allow-list entries for tiers without allow-lists");
    }

    tracing::info!(
        entries = export.allow_lists.len() - skipped,
        "Imported sensing consent"
    );

    Ok(())
}
