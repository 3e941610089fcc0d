//! System Font State Store
//!
//! Owns the OS-level font configuration and the snapshot that guards it.
//! The snapshot-then-write sequence is the engine's sole critical section:
//! an `RwLock` lets reads run concurrently with each other while mutations
//! hold the lock exclusively. The tool assumes a single writer (one local
//! desktop session); a reimplementation with concurrent writers must keep
//! the capture-before-write ordering or restore becomes unsound.

use crate::error::{FontError, Result};
use crate::platform::FontPlatform;
use crate::state::{AppliedFontState, FontRecord, SystemFontSnapshot};
use std::sync::{Arc, RwLock};

pub struct SystemFontStore {
    platform: Arc<dyn FontPlatform>,
    lock: RwLock<()>,
}

impl SystemFontStore {
    pub fn new(platform: Arc<dyn FontPlatform>) -> Self {
        Self {
            platform,
            lock: RwLock::new(()),
        }
    }

    fn read_guard(&self) -> Result<std::sync::RwLockReadGuard<'_, ()>> {
        self.lock
            .read()
            .map_err(|_| FontError::Persistence("state store lock poisoned".to_string()))
    }

    fn write_guard(&self) -> Result<std::sync::RwLockWriteGuard<'_, ()>> {
        self.lock
            .write()
            .map_err(|_| FontError::Persistence("state store lock poisoned".to_string()))
    }

    /// Read what the OS currently renders with, straight from live
    /// configuration (no cached copy is kept).
    pub fn read_current(&self) -> Result<AppliedFontState> {
        let _guard = self.read_guard()?;
        self.read_current_locked()
    }

    /// Load the persisted snapshot, if any.
    pub fn load_snapshot(&self) -> Result<Option<SystemFontSnapshot>> {
        let _guard = self.read_guard()?;
        self.platform.load_snapshot()
    }

    /// Capture and persist a snapshot of the current configuration.
    ///
    /// Exposed for callers that drive capture and write separately; they
    /// inherit the single-writer assumption. `apply_change` is the
    /// atomic capture-then-write used by the Font Applier.
    pub fn capture_snapshot(&self) -> Result<SystemFontSnapshot> {
        let _guard = self.write_guard()?;
        self.capture_snapshot_locked()
    }

    /// Point the OS configuration at `record` without touching the
    /// snapshot. Same caveat as `capture_snapshot`.
    pub fn write_current(&self, record: &FontRecord) -> Result<AppliedFontState> {
        let _guard = self.write_guard()?;
        self.platform.apply_substitute(&record.name)?;
        Ok(AppliedFontState {
            active_font_name: record.name.clone(),
        })
    }

    /// Snapshot the current configuration, then write the new one, as one
    /// exclusive section.
    ///
    /// The write is only attempted after the snapshot has been durably
    /// recorded. If the write then fails, the fresh snapshot is discarded
    /// so no snapshot dangles pointing at a state that was never left.
    pub(crate) fn apply_change(&self, record: &FontRecord) -> Result<AppliedFontState> {
        let _guard = self.write_guard()?;

        let snapshot = self.capture_snapshot_locked()?;

        if let Err(e) = self.platform.apply_substitute(&record.name) {
            if let Err(clear_err) = self.platform.clear_snapshot() {
                tracing::warn!(
                    "Could not discard snapshot after failed write: {}",
                    clear_err
                );
            }
            return Err(e);
        }

        tracing::info!(
            "Applied font '{}' (snapshot of '{}' retained for restore)",
            record.name,
            snapshot.previous_font_name
        );
        Ok(AppliedFontState {
            active_font_name: record.name.clone(),
        })
    }

    /// Replay the persisted snapshot, clearing it only once the write is
    /// confirmed. A crash mid-restore leaves the snapshot intact, so
    /// restore can simply be retried.
    pub(crate) fn restore_change(&self) -> Result<AppliedFontState> {
        let _guard = self.write_guard()?;

        let snapshot = self
            .platform
            .load_snapshot()?
            .ok_or(FontError::NoSnapshot)?;

        self.platform
            .restore_substitute(&snapshot.previous_raw_value)?;

        if let Err(e) = self.platform.clear_snapshot() {
            // State is already correct and restore is idempotent, so a
            // stale snapshot is harmless; it just allows a redundant retry
            tracing::warn!("Restore succeeded but snapshot was not cleared: {}", e);
        }

        tracing::info!("Restored system font to '{}'", snapshot.previous_font_name);
        Ok(AppliedFontState {
            active_font_name: snapshot.previous_font_name,
        })
    }

    /// Run `f` while holding the mutation lock. Used by the installer so
    /// only one mutating operation is ever in flight.
    pub(crate) fn exclusive<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        let _guard = self.write_guard()?;
        f()
    }

    fn read_current_locked(&self) -> Result<AppliedFontState> {
        let substitute = self.platform.read_substitute()?;
        let active_font_name = substitute
            .font_name
            .unwrap_or_else(|| self.platform.default_font_name().to_string());
        Ok(AppliedFontState { active_font_name })
    }

    fn capture_snapshot_locked(&self) -> Result<SystemFontSnapshot> {
        // A corrupt pre-existing snapshot must not block a new apply; the
        // fresh capture replaces it. Surface it, don't hide it.
        if let Err(e) = self.platform.load_snapshot() {
            tracing::warn!("Existing snapshot is unreadable and will be replaced: {}", e);
        }

        let current = self.platform.read_substitute()?;
        let previous_font_name = current
            .font_name
            .unwrap_or_else(|| self.platform.default_font_name().to_string());

        let snapshot = SystemFontSnapshot::capture(previous_font_name, current.raw);
        self.platform.save_snapshot(&snapshot)?;
        Ok(snapshot)
    }
}
