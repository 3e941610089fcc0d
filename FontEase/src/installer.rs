//! Font Installer
//!
//! Copies a validated font file into the OS font store and registers it.
//! Installs are idempotent: re-installing a font that is already present
//! from the same file returns the existing record. The copy is chunked and
//! cancellable; once OS registration starts the operation runs to
//! completion or fails outright.

use crate::catalog::FontCatalog;
use crate::error::{FontError, Result};
use crate::font_file;
use crate::platform::FontPlatform;
use crate::state::FontRecord;
use crate::store::SystemFontStore;
use std::fs::File;
use std::io::{ErrorKind, Read, Seek, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

const COPY_CHUNK_SIZE: usize = 64 * 1024;

/// Cooperative cancellation flag for long-running installs.
///
/// Cancelling before OS registration leaves no persisted state (the
/// partial copy is deleted). Cancellation is ignored once registration
/// has begun.
#[derive(Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

pub struct FontInstaller {
    platform: Arc<dyn FontPlatform>,
    catalog: FontCatalog,
    store: Arc<SystemFontStore>,
}

impl FontInstaller {
    pub fn new(platform: Arc<dyn FontPlatform>, store: Arc<SystemFontStore>) -> Self {
        let catalog = FontCatalog::new(platform.clone());
        Self {
            platform,
            catalog,
            store,
        }
    }

    /// Install a font file system-wide.
    ///
    /// Validates the container signature before anything is copied, then
    /// copies into the font store and registers with the OS. Fails with
    /// `InvalidFontFileError` for unsupported or misnamed files and
    /// `InsufficientPrivilegeError` when the font store is not writable.
    pub fn install(&self, path: &Path, cancel: &CancelToken) -> Result<FontRecord> {
        // Serialized with apply/restore: one mutating operation at a time
        self.store.exclusive(|| self.install_locked(path, cancel))
    }

    fn install_locked(&self, path: &Path, cancel: &CancelToken) -> Result<FontRecord> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .ok_or(FontError::InvalidPath)?;
        if !font_file::SUPPORTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(FontError::InvalidFontFile(format!(
                "'.{}' is not a supported font container",
                extension
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or(FontError::InvalidPath)?
            .to_string();

        let mut source = File::open(path)?;
        let container = {
            let mut header = [0u8; 4];
            source
                .read_exact(&mut header)
                .map_err(|_| FontError::InvalidFontFile("file too short".to_string()))?;
            font_file::detect_container(&header)?
        };

        let family = font_file::read_family_name(&mut source)?
            .or_else(|| path.file_stem().and_then(|s| s.to_str()).map(String::from))
            .ok_or(FontError::InvalidPath)?;

        // Duplicate handling: the identical font again is a no-op, the same
        // family from a different file is a conflict
        if let Some(existing) = self.catalog.find(&family)? {
            let same_file = existing
                .file_path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.eq_ignore_ascii_case(&file_name))
                .unwrap_or(false);
            if same_file {
                tracing::debug!("Font '{}' is already installed, returning existing record", family);
                return Ok(existing);
            }
            return Err(FontError::InvalidFontFile(format!(
                "font '{}' is already installed from {}",
                family,
                existing.file_path.display()
            )));
        }

        let dest = self.platform.fonts_dir().join(&file_name);
        copy_with_cancel(&mut source, &dest, cancel)?;

        // Point of no return: registration runs to completion or fails
        self.platform.register_font(&family, &file_name)?;

        tracing::info!(
            "Installed {} font '{}' from {}",
            container.as_str(),
            family,
            path.display()
        );
        Ok(FontRecord::new(family, dest))
    }
}

/// Chunked copy into the font store, checking for cancellation between
/// chunks and once more after the final write, so a cancel that lands
/// during the last chunk still takes effect before registration. Any
/// failure or cancellation removes the partial destination.
fn copy_with_cancel<R>(source: &mut R, dest: &Path, cancel: &CancelToken) -> Result<()>
where
    R: Read + Seek,
{
    source.seek(std::io::SeekFrom::Start(0))?;

    let mut writer = File::create(dest).map_err(|e| {
        if e.kind() == ErrorKind::PermissionDenied {
            FontError::InsufficientPrivilege(
                "writing to the font store requires administrator rights".to_string(),
            )
        } else {
            FontError::Io(e)
        }
    })?;

    let result = (|| -> Result<()> {
        let mut buffer = vec![0u8; COPY_CHUNK_SIZE];
        loop {
            if cancel.is_cancelled() {
                return Err(FontError::Cancelled);
            }
            let read = source.read(&mut buffer)?;
            if read == 0 {
                break;
            }
            writer.write_all(&buffer[..read])?;
        }
        writer.flush()?;
        if cancel.is_cancelled() {
            return Err(FontError::Cancelled);
        }
        Ok(())
    })();

    if result.is_err() {
        drop(writer);
        let _ = std::fs::remove_file(dest);
    }
    result
}
