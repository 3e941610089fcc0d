//! Restore Manager
//!
//! Reverses the single most recent font change by replaying the persisted
//! snapshot. Restore is idempotent: the snapshot is cleared only after the
//! write is confirmed, so an interrupted restore can simply be retried.

use crate::applier::RefreshStatus;
use crate::error::Result;
use crate::platform::FontPlatform;
use crate::state::AppliedFontState;
use crate::store::SystemFontStore;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreOutcome {
    pub state: AppliedFontState,
    pub refresh: RefreshStatus,
}

pub struct RestoreManager {
    platform: Arc<dyn FontPlatform>,
    store: Arc<SystemFontStore>,
}

impl RestoreManager {
    pub fn new(platform: Arc<dyn FontPlatform>, store: Arc<SystemFontStore>) -> Self {
        Self { platform, store }
    }

    /// Revert to the configuration captured before the most recent apply.
    ///
    /// Fails with `NoSnapshotError` when no snapshot exists (first-run
    /// state); callers should fall back to `fallback_font_name()` instead
    /// of guessing at a restore.
    pub fn restore(&self) -> Result<RestoreOutcome> {
        let state = self.store.restore_change()?;

        let refresh = match self.platform.broadcast_font_change() {
            Ok(()) => RefreshStatus::Completed,
            Err(e) => {
                tracing::warn!(
                    "Live refresh refused ({}); restored font takes effect at next sign-in",
                    e
                );
                RefreshStatus::Deferred
            }
        };

        Ok(RestoreOutcome { state, refresh })
    }

    /// The documented default to fall back to when there is nothing to
    /// restore.
    pub fn fallback_font_name(&self) -> &str {
        self.platform.default_font_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applier::FontApplier;
    use crate::error::FontError;
    use crate::platform::memory::MemoryFontPlatform;
    use crate::platform::DEFAULT_SYSTEM_FONT;

    fn setup() -> (Arc<MemoryFontPlatform>, FontApplier, RestoreManager) {
        let platform = Arc::new(MemoryFontPlatform::new());
        platform.add_font("Segoe UI", "segoeui.ttf");
        platform.add_font("Consolas", "consola.ttf");

        let store = Arc::new(SystemFontStore::new(platform.clone()));
        let applier = FontApplier::new(platform.clone(), store.clone());
        let restore = RestoreManager::new(platform.clone(), store);
        (platform, applier, restore)
    }

    #[test]
    fn test_restore_without_snapshot() {
        let (_, _, restore) = setup();
        let result = restore.restore();
        assert!(matches!(result, Err(FontError::NoSnapshot)));
        assert_eq!(restore.fallback_font_name(), DEFAULT_SYSTEM_FONT);
    }

    #[test]
    fn test_restore_reverts_last_apply() {
        let (_, applier, restore) = setup();

        applier.apply("Consolas").unwrap();
        let outcome = restore.restore().unwrap();
        assert_eq!(outcome.state.active_font_name, DEFAULT_SYSTEM_FONT);
    }

    #[test]
    fn test_second_restore_fails_cleanly() {
        let (_, applier, restore) = setup();

        applier.apply("Consolas").unwrap();
        restore.restore().unwrap();

        // Snapshot was consumed; a second restore has nothing to do
        let result = restore.restore();
        assert!(matches!(result, Err(FontError::NoSnapshot)));
    }
}
