//! Windows registry platform implementation
//!
//! Talks to the real OS font configuration:
//! - `HKLM\SOFTWARE\Microsoft\Windows NT\CurrentVersion\Fonts`: the font
//!   registry the catalog enumerates and the installer writes to
//! - `HKLM\...\FontSubstitutes`: the "Segoe UI" substitute value that
//!   determines the default UI font
//! - `HKCU\Software\FontEase`: snapshot persistence, outside the main
//!   configuration keys so it survives application restarts
//!
//! Changing the default font mirrors what the original registry script did:
//! blank the stock Segoe UI entries in the Fonts key and point the
//! "Segoe UI" substitute at the chosen family. Everything touched is
//! captured into the snapshot payload first so restore can replay it.

use super::{blob, FontPlatform, SubstituteState};
use crate::error::{FontError, Result};
use crate::state::{FontRecord, SystemFontSnapshot};
use once_cell::sync::Lazy;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use widestring::U16CString;
use winreg::enums::*;
use winreg::types::FromRegValue;
use winreg::{RegKey, RegValue};

const FONTS_KEY: &str = "SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion\\Fonts";
const SUBSTITUTES_KEY: &str = "SOFTWARE\\Microsoft\\Windows NT\\CurrentVersion\\FontSubstitutes";
const SUBSTITUTE_VALUE: &str = "Segoe UI";
const SNAPSHOT_KEY: &str = "Software\\FontEase";

const SUBSTITUTE_ENTRY: &str = "substitute";
const FONT_ENTRY_PREFIX: &str = "font:";

const SNAPSHOT_NAME_VALUE: &str = "PreviousFontName";
const SNAPSHOT_RAW_VALUE: &str = "PreviousRawValue";
const SNAPSHOT_TIME_VALUE: &str = "CapturedAt";

const BROADCAST_TIMEOUT_MS: u32 = 2000;

/// Stock Segoe UI entries blanked when a substitute takes over.
const SEGOE_VARIANTS: [&str; 7] = [
    "Segoe UI (TrueType)",
    "Segoe UI Bold (TrueType)",
    "Segoe UI Bold Italic (TrueType)",
    "Segoe UI Italic (TrueType)",
    "Segoe UI Light (TrueType)",
    "Segoe UI Semibold (TrueType)",
    "Segoe UI Symbol (TrueType)",
];

static FONTS_DIR: Lazy<PathBuf> = Lazy::new(|| {
    std::env::var_os("WINDIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("C:\\Windows"))
        .join("Fonts")
});

/// `FontPlatform` backed by the Windows registry and GDI.
#[derive(Debug, Default)]
pub struct WindowsFontPlatform;

impl WindowsFontPlatform {
    pub fn new() -> Self {
        Self
    }
}

/// Map a registry write failure, reporting missing elevation distinctly.
fn write_err(operation: &str, e: std::io::Error) -> FontError {
    if e.kind() == ErrorKind::PermissionDenied {
        FontError::InsufficientPrivilege(format!(
            "{} requires administrator rights",
            operation
        ))
    } else {
        FontError::Persistence(format!("{}: {}", operation, e))
    }
}

/// Decode a REG_SZ payload (UTF-16LE, possibly nul-terminated).
fn reg_sz_to_string(bytes: &[u8]) -> String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect();
    let mut s = String::from_utf16_lossy(&units);
    while s.ends_with('\0') {
        s.pop();
    }
    s
}

/// Strip the registration suffix from a Fonts key value name.
fn strip_font_suffix(name: &str) -> &str {
    name.strip_suffix(" (TrueType)")
        .or_else(|| name.strip_suffix(" (OpenType)"))
        .unwrap_or(name)
}

/// Read one registry value, treating "not found" as absent.
fn read_optional_value(key: &RegKey, value_name: &str, context: &str) -> Result<Option<RegValue>> {
    match key.get_raw_value(value_name) {
        Ok(value) => Ok(Some(value)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(FontError::Persistence(format!("{}: {}", context, e))),
    }
}

/// Serialize a captured value for the snapshot payload: the registry type
/// goes in front of the data so restore can write it back with the type it
/// had, not just its bytes.
fn pack_value(value: &RegValue) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + value.bytes.len());
    out.extend_from_slice(&(value.vtype.clone() as u32).to_le_bytes());
    out.extend_from_slice(&value.bytes);
    out
}

fn unpack_value(bytes: &[u8]) -> Result<RegValue> {
    if bytes.len() < 4 {
        return Err(FontError::Persistence(
            "snapshot value is missing its registry type".to_string(),
        ));
    }
    let (head, data) = bytes.split_at(4);
    let vtype = match u32::from_le_bytes([head[0], head[1], head[2], head[3]]) {
        0 => REG_NONE,
        1 => REG_SZ,
        2 => REG_EXPAND_SZ,
        3 => REG_BINARY,
        4 => REG_DWORD,
        5 => REG_DWORD_BIG_ENDIAN,
        6 => REG_LINK,
        7 => REG_MULTI_SZ,
        8 => REG_RESOURCE_LIST,
        9 => REG_FULL_RESOURCE_DESCRIPTOR,
        10 => REG_RESOURCE_REQUIREMENTS_LIST,
        11 => REG_QWORD,
        other => {
            return Err(FontError::Persistence(format!(
                "snapshot value has an unknown registry type ({})",
                other
            )))
        }
    };
    Ok(RegValue {
        bytes: data.to_vec(),
        vtype,
    })
}

/// Write back or delete a value captured in the snapshot payload.
fn replay_value(key: &RegKey, value_name: &str, previous: Option<Vec<u8>>) -> Result<()> {
    match previous {
        Some(bytes) => {
            let value = unpack_value(&bytes)?;
            key.set_raw_value(value_name, &value)
                .map_err(|e| write_err("restoring a font configuration value", e))
        }
        None => match key.delete_value(value_name) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(write_err("removing a font configuration value", e)),
        },
    }
}

impl FontPlatform for WindowsFontPlatform {
    fn enumerate_fonts(&self) -> Result<Vec<FontRecord>> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let fonts_key = hklm
            .open_subkey_with_flags(FONTS_KEY, KEY_READ)
            .map_err(|e| FontError::Enumeration(format!("opening the Fonts key: {}", e)))?;

        let mut fonts = Vec::new();
        for value in fonts_key.enum_values() {
            let (name, data) =
                value.map_err(|e| FontError::Enumeration(format!("reading the Fonts key: {}", e)))?;

            // Skip blanked entries and non-string values
            let Ok(file) = String::from_reg_value(&data) else {
                continue;
            };
            if file.is_empty() {
                continue;
            }

            let file_path = if Path::new(&file).is_absolute() {
                PathBuf::from(&file)
            } else {
                self.fonts_dir().join(&file)
            };

            fonts.push(FontRecord::new(strip_font_suffix(&name), file_path));
        }

        tracing::debug!("Enumerated {} fonts from the registry", fonts.len());
        Ok(fonts)
    }

    fn fonts_dir(&self) -> PathBuf {
        FONTS_DIR.clone()
    }

    fn register_font(&self, family: &str, file_name: &str) -> Result<()> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let fonts_key = hklm
            .open_subkey_with_flags(FONTS_KEY, KEY_SET_VALUE)
            .map_err(|e| write_err("registering a font", e))?;

        let value_name = format!("{} (TrueType)", family);
        fonts_key
            .set_value(&value_name, &file_name)
            .map_err(|e| write_err("registering a font", e))?;

        // Make the font available to the current session without a reboot.
        // A zero return persists the registration for next sign-in only.
        let full_path = self.fonts_dir().join(file_name);
        let wide_path =
            U16CString::from_os_str(full_path.as_os_str()).map_err(|_| FontError::InvalidPath)?;
        unsafe {
            use windows::core::PCWSTR;
            use windows::Win32::Graphics::Gdi::AddFontResourceW;

            let added = AddFontResourceW(PCWSTR(wide_path.as_ptr()));
            if added == 0 {
                tracing::warn!(
                    "AddFontResourceW loaded no fonts from {}; it will be available after next sign-in",
                    full_path.display()
                );
            }
        }

        tracing::info!("Registered font '{}' -> {}", family, file_name);
        Ok(())
    }

    fn read_substitute(&self) -> Result<SubstituteState> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let subs_key = hklm
            .open_subkey_with_flags(SUBSTITUTES_KEY, KEY_READ)
            .map_err(|e| {
                FontError::Persistence(format!("opening the FontSubstitutes key: {}", e))
            })?;
        let fonts_key = hklm
            .open_subkey_with_flags(FONTS_KEY, KEY_READ)
            .map_err(|e| FontError::Persistence(format!("opening the Fonts key: {}", e)))?;

        let substitute =
            read_optional_value(&subs_key, SUBSTITUTE_VALUE, "reading the font substitute")?;
        let font_name = substitute
            .as_ref()
            .map(|v| reg_sz_to_string(&v.bytes))
            .filter(|s| !s.is_empty());

        let mut entries: blob::Entries = vec![(
            SUBSTITUTE_ENTRY.to_string(),
            substitute.as_ref().map(pack_value),
        )];
        for variant in SEGOE_VARIANTS {
            let previous =
                read_optional_value(&fonts_key, variant, "reading a default font entry")?;
            entries.push((
                format!("{}{}", FONT_ENTRY_PREFIX, variant),
                previous.as_ref().map(pack_value),
            ));
        }

        Ok(SubstituteState {
            font_name,
            raw: blob::encode(&entries),
        })
    }

    fn apply_substitute(&self, family: &str) -> Result<()> {
        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);

        // Open everything for write before mutating anything, so a
        // privilege failure surfaces before any partial change
        let fonts_key = hklm
            .open_subkey_with_flags(FONTS_KEY, KEY_SET_VALUE)
            .map_err(|e| write_err("changing the system font", e))?;
        let subs_key = hklm
            .open_subkey_with_flags(SUBSTITUTES_KEY, KEY_SET_VALUE)
            .map_err(|e| write_err("changing the system font", e))?;

        for variant in SEGOE_VARIANTS {
            fonts_key
                .set_value(variant, &"")
                .map_err(|e| write_err("blanking a default font entry", e))?;
        }

        subs_key
            .set_value(SUBSTITUTE_VALUE, &family)
            .map_err(|e| write_err("writing the font substitute", e))?;

        tracing::info!("System font substitute set to '{}'", family);
        Ok(())
    }

    fn restore_substitute(&self, raw: &[u8]) -> Result<()> {
        let entries = blob::decode(raw)?;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let fonts_key = hklm
            .open_subkey_with_flags(FONTS_KEY, KEY_SET_VALUE)
            .map_err(|e| write_err("restoring the system font", e))?;
        let subs_key = hklm
            .open_subkey_with_flags(SUBSTITUTES_KEY, KEY_SET_VALUE)
            .map_err(|e| write_err("restoring the system font", e))?;

        for (name, previous) in entries {
            if name == SUBSTITUTE_ENTRY {
                replay_value(&subs_key, SUBSTITUTE_VALUE, previous)?;
            } else if let Some(value_name) = name.strip_prefix(FONT_ENTRY_PREFIX) {
                replay_value(&fonts_key, value_name, previous)?;
            } else {
                tracing::warn!("Ignoring unknown snapshot entry '{}'", name);
            }
        }

        tracing::info!("System font configuration restored from snapshot");
        Ok(())
    }

    fn load_snapshot(&self) -> Result<Option<SystemFontSnapshot>> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let key = match hkcu.open_subkey(SNAPSHOT_KEY) {
            Ok(key) => key,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FontError::Persistence(format!(
                    "opening the snapshot key: {}",
                    e
                )))
            }
        };

        let previous_font_name = match key.get_value::<String, _>(SNAPSHOT_NAME_VALUE) {
            Ok(name) => name,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(FontError::Persistence(format!(
                    "reading the snapshot font name: {}",
                    e
                )))
            }
        };

        let previous_raw_value = key
            .get_raw_value(SNAPSHOT_RAW_VALUE)
            .map(|v| v.bytes)
            .map_err(|e| {
                FontError::Persistence(format!("snapshot is missing its raw payload: {}", e))
            })?;

        let captured_at = key.get_value::<u64, _>(SNAPSHOT_TIME_VALUE).unwrap_or(0);

        Ok(Some(SystemFontSnapshot {
            previous_font_name,
            previous_raw_value,
            captured_at,
        }))
    }

    fn save_snapshot(&self, snapshot: &SystemFontSnapshot) -> Result<()> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        let (key, _) = hkcu
            .create_subkey(SNAPSHOT_KEY)
            .map_err(|e| FontError::Persistence(format!("creating the snapshot key: {}", e)))?;

        key.set_value(SNAPSHOT_NAME_VALUE, &snapshot.previous_font_name)
            .map_err(|e| FontError::Persistence(format!("recording the snapshot: {}", e)))?;
        key.set_raw_value(
            SNAPSHOT_RAW_VALUE,
            &RegValue {
                bytes: snapshot.previous_raw_value.clone(),
                vtype: REG_BINARY,
            },
        )
        .map_err(|e| FontError::Persistence(format!("recording the snapshot: {}", e)))?;
        key.set_value(SNAPSHOT_TIME_VALUE, &snapshot.captured_at)
            .map_err(|e| FontError::Persistence(format!("recording the snapshot: {}", e)))?;

        Ok(())
    }

    fn clear_snapshot(&self) -> Result<()> {
        let hkcu = RegKey::predef(HKEY_CURRENT_USER);
        match hkcu.delete_subkey_all(SNAPSHOT_KEY) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(FontError::Persistence(format!(
                "clearing the snapshot: {}",
                e
            ))),
        }
    }

    fn broadcast_font_change(&self) -> Result<()> {
        use windows::Win32::Foundation::{LPARAM, WPARAM};
        use windows::Win32::UI::WindowsAndMessaging::{
            SendMessageTimeoutW, HWND_BROADCAST, SMTO_ABORTIFHUNG, WM_FONTCHANGE, WM_SETTINGCHANGE,
        };

        let section: Vec<u16> = "fonts\0".encode_utf16().collect();

        // UNAVOIDABLE UNSAFE: SendMessageTimeoutW is a Windows FFI call
        // Safety guarantees:
        // - HWND_BROADCAST is a well-known pseudo-handle
        // - `section` outlives both calls and is null-terminated
        // - SMTO_ABORTIFHUNG bounds the wait on hung windows
        unsafe {
            let mut ignored = 0usize;
            let sent = SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_FONTCHANGE,
                WPARAM(0),
                LPARAM(0),
                SMTO_ABORTIFHUNG,
                BROADCAST_TIMEOUT_MS,
                Some(&mut ignored),
            );
            if sent.0 == 0 {
                return Err(FontError::Windows(windows::core::Error::from_win32()));
            }

            let sent = SendMessageTimeoutW(
                HWND_BROADCAST,
                WM_SETTINGCHANGE,
                WPARAM(0),
                LPARAM(section.as_ptr() as isize),
                SMTO_ABORTIFHUNG,
                BROADCAST_TIMEOUT_MS,
                Some(&mut ignored),
            );
            if sent.0 == 0 {
                return Err(FontError::Windows(windows::core::Error::from_win32()));
            }
        }

        tracing::debug!("Broadcast font change notifications");
        Ok(())
    }
}
