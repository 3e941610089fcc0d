//! Font Applier
//!
//! Orchestrates changing the active system font: resolve the target
//! against the catalog, snapshot the current configuration, write the new
//! one, then nudge running applications to re-render. The refresh step is
//! best-effort; everything before it is transactional via the State Store.

use crate::catalog::FontCatalog;
use crate::error::Result;
use crate::platform::FontPlatform;
use crate::state::AppliedFontState;
use crate::store::SystemFontStore;
use std::sync::Arc;

/// Whether running applications picked the change up immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshStatus {
    /// The change notification was delivered; apps re-render now
    Completed,
    /// The OS refused the live refresh; the change persists and takes
    /// effect at next sign-in. A soft status, not a failure.
    Deferred,
}

/// Result of an apply request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The requested font was already active; nothing was changed and no
    /// new snapshot was created
    AlreadyActive { state: AppliedFontState },
    /// The configuration was changed
    Applied {
        state: AppliedFontState,
        refresh: RefreshStatus,
    },
}

impl ApplyOutcome {
    pub fn state(&self) -> &AppliedFontState {
        match self {
            Self::AlreadyActive { state } | Self::Applied { state, .. } => state,
        }
    }
}

pub struct FontApplier {
    platform: Arc<dyn FontPlatform>,
    catalog: FontCatalog,
    store: Arc<SystemFontStore>,
}

impl FontApplier {
    pub fn new(platform: Arc<dyn FontPlatform>, store: Arc<SystemFontStore>) -> Self {
        let catalog = FontCatalog::new(platform.clone());
        Self {
            platform,
            catalog,
            store,
        }
    }

    /// Make `font_name` the system's default UI font.
    ///
    /// Fails with `UnknownFontError` when the font is not installed.
    /// Applying the already-active font is an idempotent no-op.
    pub fn apply(&self, font_name: &str) -> Result<ApplyOutcome> {
        let record = self.catalog.resolve(font_name)?;

        let current = self.store.read_current()?;
        if current.active_font_name.eq_ignore_ascii_case(&record.name) {
            tracing::debug!("'{}' is already the active system font", record.name);
            return Ok(ApplyOutcome::AlreadyActive { state: current });
        }

        let state = self.store.apply_change(&record)?;

        let refresh = match self.platform.broadcast_font_change() {
            Ok(()) => RefreshStatus::Completed,
            Err(e) => {
                tracing::warn!(
                    "Live refresh refused ({}); '{}' takes effect at next sign-in",
                    e,
                    record.name
                );
                RefreshStatus::Deferred
            }
        };

        Ok(ApplyOutcome::Applied { state, refresh })
    }
}
