//! Main viewer state container
//!
//! Owns the consent store and wires it to the authorizer and the message
//! center. Page-facing calls go through here.

use std::sync::Arc;

use xrviewer_permissions::{
    export_consent, import_consent, ConsentExport, ConsentStore, GlobalToggles,
    MemoryConsentStore, SiteAllowances, SiteOrigin, SqliteConsentStore, Tier,
};
use xrviewer_session::{Authorization, Authorizer, DeviceAccess, MessageCenter, Presenter};
use xrviewer_storage::Database;

use crate::config::Config;
use crate::Result;

pub struct Viewer {
    config: Config,
    store: Arc<dyn ConsentStore>,
    authorizer: Authorizer,
    messages: MessageCenter,
}

impl Viewer {
    pub fn new(
        config: Config,
        presenter: Arc<dyn Presenter>,
        device_access: Option<Arc<dyn DeviceAccess>>,
    ) -> Result<Self> {
        let store: Arc<dyn ConsentStore> = match &config.database_path {
            Some(path) => {
                if let Some(parent) = path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                Arc::new(SqliteConsentStore::new(Database::open(path)?))
            }
            None => Arc::new(MemoryConsentStore::new()),
        };

        let mut authorizer = Authorizer::new(Arc::clone(&store), Arc::clone(&presenter))
            .with_busy_policy(config.busy_policy);
        if let Some(device_access) = device_access {
            authorizer = authorizer.with_device_access(device_access);
        }

        tracing::info!(
            database = ?config.database_path,
            busy_policy = ?config.busy_policy,
            "Viewer initialized"
        );

        Ok(Self {
            config,
            store,
            authorizer,
            messages: MessageCenter::new(presenter),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn messages(&self) -> &MessageCenter {
        &self.messages
    }

    pub fn is_busy(&self) -> bool {
        self.authorizer.is_busy()
    }

    // === Authorization ===

    pub async fn request_authorization(
        &self,
        requested: Tier,
        url: &str,
        force_show_dialog: bool,
    ) -> Result<Authorization> {
        Ok(self
            .authorizer
            .request_authorization(requested, url, force_show_dialog)
            .await?)
    }

    /// Same as `request_authorization` with the tier named by the page.
    /// Unrecognized names request `Tier::None`.
    pub async fn request_authorization_by_name(
        &self,
        tier: &str,
        url: &str,
        force_show_dialog: bool,
    ) -> Result<Authorization> {
        self.request_authorization(Tier::from_name(tier), url, force_show_dialog)
            .await
    }

    // === Consent management ===

    pub fn toggles(&self) -> Result<GlobalToggles> {
        Ok(self.store.toggles()?)
    }

    pub fn site_allowances(&self, url: &str) -> Result<SiteAllowances> {
        let origin = SiteOrigin::parse(url)?;
        Ok(self.store.allowances(&origin)?)
    }

    pub fn allowed_sites(&self, tier: Tier) -> Result<Vec<SiteOrigin>> {
        Ok(self.store.allowed_sites(tier)?)
    }

    pub fn forget_site(&self, url: &str) -> Result<()> {
        let origin = SiteOrigin::parse(url)?;
        self.store.forget_site(&origin)?;
        tracing::info!(origin = %origin, "Forgot site permissions");
        Ok(())
    }

    pub fn always_allow_world_sensing(&self) -> Result<bool> {
        Ok(self.store.always_allow_world_sensing()?)
    }

    pub fn set_always_allow_world_sensing(&self, value: bool) -> Result<()> {
        self.store.set_always_allow_world_sensing(value)?;
        tracing::info!(value, "Always allow world sensing changed");
        Ok(())
    }

    /// Forget every toggle, flag and allow-list entry
    pub fn reset_permissions(&self) -> Result<()> {
        Ok(self.store.reset()?)
    }

    pub fn export_consent_json(&self) -> Result<String> {
        let export = export_consent(self.store.as_ref())?;
        Ok(serde_json::to_string_pretty(&export)?)
    }

    /// Replace all consent with a previous export
    pub fn import_consent_json(&self, json: &str) -> Result<()> {
        let export: ConsentExport = serde_json::from_str(json)?;
        import_consent(self.store.as_ref(), &export)?;
        tracing::info!(
            allow_list_entries = export.allow_lists.len(),
            "Imported consent"
        );
        Ok(())
    }
}
