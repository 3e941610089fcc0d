//! FontEase - Windows system font changer
//!
//! Core engine for previewing installed fonts, applying a chosen font as
//! the operating system's default UI font, installing new font files and
//! restoring the original configuration.
//!
//! Every change to the OS configuration is guarded by a persisted
//! snapshot captured immediately before the write, so a bad font choice
//! can always be reverted, even after a restart or crash. All OS access
//! goes through the [`platform::FontPlatform`] boundary; the Windows
//! implementation lives in `platform::registry`, and an in-memory
//! implementation backs the test suite.

pub mod applier;
pub mod catalog;
pub mod engine;
pub mod error;
pub mod font_file;
pub mod installer;
pub mod platform;
pub mod restore;
pub mod state;
pub mod store;

pub use applier::{ApplyOutcome, FontApplier, RefreshStatus};
pub use catalog::FontCatalog;
pub use engine::FontEngine;
pub use error::{FontError, Result};
pub use installer::{CancelToken, FontInstaller};
pub use platform::{FontPlatform, DEFAULT_SYSTEM_FONT};
pub use restore::{RestoreManager, RestoreOutcome};
pub use state::{AppliedFontState, FontRecord, SystemFontSnapshot};
pub use store::SystemFontStore;
