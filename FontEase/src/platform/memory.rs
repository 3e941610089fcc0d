//! In-memory platform implementation
//!
//! Backs the engine with plain process state instead of the Windows
//! registry. Used by the test suite and by development builds on other
//! platforms. Failure knobs let tests exercise the engine's error paths
//! (unreadable registry, failed configuration write, refused refresh).

use super::{blob, FontPlatform, SubstituteState};
use crate::error::{FontError, Result};
use crate::state::{FontRecord, SystemFontSnapshot};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Mutex;

const SUBSTITUTE_ENTRY: &str = "substitute";

#[derive(Default)]
struct MemoryState {
    fonts: Vec<FontRecord>,
    substitute: Option<String>,
    snapshot: Option<SystemFontSnapshot>,
}

/// In-memory stand-in for the OS font configuration.
pub struct MemoryFontPlatform {
    state: Mutex<MemoryState>,
    fonts_dir: PathBuf,
    fail_enumeration: AtomicBool,
    fail_config_write: AtomicBool,
    fail_snapshot_save: AtomicBool,
    refuse_refresh: AtomicBool,
    broadcasts: AtomicU32,
}

impl Default for MemoryFontPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryFontPlatform {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            fonts_dir: std::env::temp_dir(),
            fail_enumeration: AtomicBool::new(false),
            fail_config_write: AtomicBool::new(false),
            fail_snapshot_save: AtomicBool::new(false),
            refuse_refresh: AtomicBool::new(false),
            broadcasts: AtomicU32::new(0),
        }
    }

    /// Use `dir` as the font store directory (must exist for installs).
    pub fn with_fonts_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.fonts_dir = dir.into();
        self
    }

    /// Pre-register a font, as if it were already installed.
    pub fn add_font(&self, family: &str, file_name: &str) {
        let mut state = self.state();
        let record = FontRecord::new(family, self.fonts_dir.join(file_name));
        state.fonts.retain(|f| !f.name.eq_ignore_ascii_case(family));
        state.fonts.push(record);
    }

    pub fn set_fail_enumeration(&self, fail: bool) {
        self.fail_enumeration.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_config_write(&self, fail: bool) {
        self.fail_config_write.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_snapshot_save(&self, fail: bool) {
        self.fail_snapshot_save.store(fail, Ordering::SeqCst);
    }

    /// Make `broadcast_font_change` report failure (refresh deferred).
    pub fn set_refuse_refresh(&self, refuse: bool) {
        self.refuse_refresh.store(refuse, Ordering::SeqCst);
    }

    /// Number of change notifications delivered so far.
    pub fn broadcast_count(&self) -> u32 {
        self.broadcasts.load(Ordering::SeqCst)
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        // Test-support type: a poisoned lock means a test already panicked
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl FontPlatform for MemoryFontPlatform {
    fn enumerate_fonts(&self) -> Result<Vec<FontRecord>> {
        if self.fail_enumeration.load(Ordering::SeqCst) {
            return Err(FontError::Enumeration(
                "font registry is unreadable".to_string(),
            ));
        }
        Ok(self.state().fonts.clone())
    }

    fn fonts_dir(&self) -> PathBuf {
        self.fonts_dir.clone()
    }

    fn register_font(&self, family: &str, file_name: &str) -> Result<()> {
        let mut state = self.state();
        let record = FontRecord::new(family, self.fonts_dir.join(file_name));
        state.fonts.retain(|f| !f.name.eq_ignore_ascii_case(family));
        state.fonts.push(record);
        Ok(())
    }

    fn read_substitute(&self) -> Result<SubstituteState> {
        let state = self.state();
        let raw = blob::encode(&[(
            SUBSTITUTE_ENTRY.to_string(),
            state.substitute.as_ref().map(|s| s.as_bytes().to_vec()),
        )]);
        Ok(SubstituteState {
            font_name: state.substitute.clone(),
            raw,
        })
    }

    fn apply_substitute(&self, family: &str) -> Result<()> {
        if self.fail_config_write.load(Ordering::SeqCst) {
            return Err(FontError::Persistence(
                "writing font substitute failed".to_string(),
            ));
        }
        self.state().substitute = Some(family.to_string());
        Ok(())
    }

    fn restore_substitute(&self, raw: &[u8]) -> Result<()> {
        if self.fail_config_write.load(Ordering::SeqCst) {
            return Err(FontError::Persistence(
                "writing font substitute failed".to_string(),
            ));
        }

        let entries = blob::decode(raw)?;
        let mut state = self.state();
        for (name, value) in entries {
            if name == SUBSTITUTE_ENTRY {
                state.substitute = match value {
                    Some(bytes) => Some(
                        String::from_utf8(bytes)
                            .map_err(|_| FontError::Persistence("snapshot holds a non-UTF-8 font name".to_string()))?,
                    ),
                    None => None,
                };
            }
        }
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<SystemFontSnapshot>> {
        Ok(self.state().snapshot.clone())
    }

    fn save_snapshot(&self, snapshot: &SystemFontSnapshot) -> Result<()> {
        if self.fail_snapshot_save.load(Ordering::SeqCst) {
            return Err(FontError::Persistence(
                "snapshot could not be durably recorded".to_string(),
            ));
        }
        self.state().snapshot = Some(snapshot.clone());
        Ok(())
    }

    fn clear_snapshot(&self) -> Result<()> {
        self.state().snapshot = None;
        Ok(())
    }

    fn broadcast_font_change(&self) -> Result<()> {
        if self.refuse_refresh.load(Ordering::SeqCst) {
            return Err(FontError::Persistence(
                "change notification was not delivered".to_string(),
            ));
        }
        self.broadcasts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
