//! Data model for the system-font state-change engine
//!
//! Three records move through the engine: `FontRecord` (a font the OS knows
//! about), `AppliedFontState` (what the OS currently renders with) and
//! `SystemFontSnapshot` (the last-known-good configuration captured just
//! before the most recent change).

use std::path::PathBuf;
use std::time::SystemTime;

/// A font registered with the operating system.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRecord {
    /// Unique display name (font family, e.g. "Consolas")
    pub name: String,
    /// Path of the backing font file inside the OS font store
    pub file_path: PathBuf,
    /// Whether the font is currently registered with the OS
    pub installed: bool,
}

impl FontRecord {
    pub fn new(name: impl Into<String>, file_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            file_path: file_path.into(),
            installed: true,
        }
    }
}

/// The single source of truth for "what the OS currently renders with".
///
/// Mutated only by the Font Applier and the Restore Manager, behind the
/// State Store's write lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFontState {
    pub active_font_name: String,
}

/// Saved font configuration from immediately before a change.
///
/// At most one snapshot exists at a time; it is persisted outside process
/// memory so a restore remains possible after a restart or crash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemFontSnapshot {
    /// Display name of the font that was active before the change
    pub previous_font_name: String,
    /// Opaque platform payload; only the platform that produced it can
    /// interpret it (see `FontPlatform::restore_substitute`)
    pub previous_raw_value: Vec<u8>,
    /// Capture time, seconds since the Unix epoch
    pub captured_at: u64,
}

impl SystemFontSnapshot {
    /// Build a snapshot timestamped with the current time.
    pub fn capture(previous_font_name: impl Into<String>, previous_raw_value: Vec<u8>) -> Self {
        let captured_at = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);

        Self {
            previous_font_name: previous_font_name.into(),
            previous_raw_value,
            captured_at,
        }
    }
}
