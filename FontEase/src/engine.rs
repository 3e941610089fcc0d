//! Engine facade
//!
//! Wires the catalog, installer, state store, applier and restore manager
//! to one shared platform and one shared mutation lock. Front ends talk to
//! this type only.

use crate::applier::{ApplyOutcome, FontApplier};
use crate::catalog::FontCatalog;
use crate::error::Result;
use crate::installer::{CancelToken, FontInstaller};
use crate::platform::FontPlatform;
use crate::restore::{RestoreManager, RestoreOutcome};
use crate::state::{AppliedFontState, FontRecord};
use crate::store::SystemFontStore;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub struct FontEngine {
    platform: Arc<dyn FontPlatform>,
    store: Arc<SystemFontStore>,
}

impl FontEngine {
    pub fn new(platform: Arc<dyn FontPlatform>) -> Self {
        let store = Arc::new(SystemFontStore::new(platform.clone()));
        Self { platform, store }
    }

    /// Engine over the real Windows font configuration.
    #[cfg(windows)]
    pub fn system() -> Self {
        Self::new(Arc::new(
            crate::platform::registry::WindowsFontPlatform::new(),
        ))
    }

    pub fn catalog(&self) -> FontCatalog {
        FontCatalog::new(self.platform.clone())
    }

    pub fn installer(&self) -> FontInstaller {
        FontInstaller::new(self.platform.clone(), self.store.clone())
    }

    pub fn applier(&self) -> FontApplier {
        FontApplier::new(self.platform.clone(), self.store.clone())
    }

    pub fn restore_manager(&self) -> RestoreManager {
        RestoreManager::new(self.platform.clone(), self.store.clone())
    }

    pub fn store(&self) -> &SystemFontStore {
        &self.store
    }

    pub fn fonts_dir(&self) -> PathBuf {
        self.platform.fonts_dir()
    }

    // Convenience pass-throughs for front ends

    pub fn list_fonts(&self) -> Result<Vec<FontRecord>> {
        self.catalog().list_fonts()
    }

    pub fn current_font(&self) -> Result<AppliedFontState> {
        self.store.read_current()
    }

    pub fn apply(&self, font_name: &str) -> Result<ApplyOutcome> {
        self.applier().apply(font_name)
    }

    pub fn install(&self, path: &Path, cancel: &CancelToken) -> Result<FontRecord> {
        self.installer().install(path, cancel)
    }

    pub fn restore(&self) -> Result<RestoreOutcome> {
        self.restore_manager().restore()
    }
}
