//! OS font configuration access
//!
//! `FontPlatform` is the opaque external contract the engine talks through:
//! the font registry, the font store directory, the default-UI-font
//! configuration value and the snapshot persistence location. The exact key
//! names are OS-version-dependent and live entirely inside the platform
//! implementation.
//!
//! Two implementations exist: `registry::WindowsFontPlatform` (the real
//! thing, Windows only) and `memory::MemoryFontPlatform` (in-memory, for
//! tests and non-Windows development builds).

use crate::error::Result;
use crate::state::{FontRecord, SystemFontSnapshot};
use std::path::PathBuf;

pub mod blob;
pub mod memory;
#[cfg(windows)]
pub mod registry;

/// The documented default system font, used when no substitute is
/// configured and as the restore fallback when no snapshot exists.
pub const DEFAULT_SYSTEM_FONT: &str = "Segoe UI";

/// Decoded view of the default-UI-font configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstituteState {
    /// Display name of the configured substitute; `None` means the OS
    /// default is in effect
    pub font_name: Option<String>,
    /// Opaque payload that `restore_substitute` can replay to put the
    /// configuration back exactly as it was
    pub raw: Vec<u8>,
}

/// OS access boundary for the engine.
///
/// All methods are local OS calls; implementations must be safe to call
/// from any thread. Serialization of mutations is the State Store's job,
/// not the platform's.
pub trait FontPlatform: Send + Sync {
    /// Enumerate fonts currently registered with the OS.
    ///
    /// Must fail (never return an empty list) when the font registry is
    /// unreadable, so "no fonts" is distinguishable from a read failure.
    fn enumerate_fonts(&self) -> Result<Vec<FontRecord>>;

    /// Directory installed font files are copied into.
    fn fonts_dir(&self) -> PathBuf;

    /// Register a font file (already copied into the font store) with the
    /// OS so enumeration and rendering pick it up.
    fn register_font(&self, family: &str, file_name: &str) -> Result<()>;

    /// Read the current default-UI-font configuration.
    fn read_substitute(&self) -> Result<SubstituteState>;

    /// Point the default UI font at `family`.
    ///
    /// Privilege failures must surface before any partial mutation.
    fn apply_substitute(&self, family: &str) -> Result<()>;

    /// Replay a raw payload previously captured by `read_substitute`,
    /// putting the configuration back exactly as it was.
    fn restore_substitute(&self, raw: &[u8]) -> Result<()>;

    /// Load the persisted snapshot, if one exists.
    fn load_snapshot(&self) -> Result<Option<SystemFontSnapshot>>;

    /// Durably persist a snapshot, replacing any previous one.
    fn save_snapshot(&self, snapshot: &SystemFontSnapshot) -> Result<()>;

    /// Remove the persisted snapshot.
    fn clear_snapshot(&self) -> Result<()>;

    /// Tell running applications the font configuration changed.
    ///
    /// Best-effort: an error here means the change takes effect at next
    /// sign-in, not that the change failed.
    fn broadcast_font_change(&self) -> Result<()>;

    /// Name of the system font when nothing has been configured.
    fn default_font_name(&self) -> &str {
        DEFAULT_SYSTEM_FONT
    }
}
