//! Installer behavior against real files
//!
//! Uses synthetic-but-valid TTF files in a temporary font store to cover
//! validation, idempotence, conflicts and cancellation.

use fontease::platform::memory::MemoryFontPlatform;
use fontease::{CancelToken, FontEngine, FontError};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Build a minimal valid TTF containing one `name` table with a Windows
/// family name record.
fn synthetic_ttf(family: &str) -> Vec<u8> {
    let name_bytes: Vec<u8> = family.encode_utf16().flat_map(|u| u.to_be_bytes()).collect();

    let mut name_table = Vec::new();
    name_table.extend_from_slice(&0u16.to_be_bytes()); // format
    name_table.extend_from_slice(&1u16.to_be_bytes()); // count
    name_table.extend_from_slice(&18u16.to_be_bytes()); // stringOffset
    name_table.extend_from_slice(&3u16.to_be_bytes()); // platformID (Windows)
    name_table.extend_from_slice(&1u16.to_be_bytes()); // encodingID
    name_table.extend_from_slice(&0x0409u16.to_be_bytes()); // languageID
    name_table.extend_from_slice(&1u16.to_be_bytes()); // nameID (family)
    name_table.extend_from_slice(&(name_bytes.len() as u16).to_be_bytes());
    name_table.extend_from_slice(&0u16.to_be_bytes()); // offset
    name_table.extend_from_slice(&name_bytes);

    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes()); // sfnt version
    font.extend_from_slice(&1u16.to_be_bytes()); // numTables
    font.extend_from_slice(&[0u8; 6]);
    font.extend_from_slice(b"name");
    font.extend_from_slice(&0u32.to_be_bytes()); // checksum
    font.extend_from_slice(&28u32.to_be_bytes()); // offset
    font.extend_from_slice(&(name_table.len() as u32).to_be_bytes());
    font.extend_from_slice(&name_table);
    font
}

struct Fixture {
    _dir: TempDir,
    source_dir: PathBuf,
    fonts_dir: PathBuf,
    engine: FontEngine,
}

fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let source_dir = dir.path().join("downloads");
    let fonts_dir = dir.path().join("Fonts");
    std::fs::create_dir_all(&source_dir).unwrap();
    std::fs::create_dir_all(&fonts_dir).unwrap();

    let platform = Arc::new(MemoryFontPlatform::new().with_fonts_dir(&fonts_dir));
    let engine = FontEngine::new(platform);

    Fixture {
        _dir: dir,
        source_dir,
        fonts_dir,
        engine,
    }
}

fn write_font(dir: &Path, file_name: &str, family: &str) -> PathBuf {
    let path = dir.join(file_name);
    std::fs::write(&path, synthetic_ttf(family)).unwrap();
    path
}

#[test]
fn installed_font_appears_in_the_catalog() {
    let fx = fixture();
    let path = write_font(&fx.source_dir, "cascadia.ttf", "Cascadia Mono");

    let record = fx.engine.install(&path, &CancelToken::new()).unwrap();
    assert_eq!(record.name, "Cascadia Mono");
    assert!(fx.fonts_dir.join("cascadia.ttf").exists());

    let fonts = fx.engine.list_fonts().unwrap();
    assert!(fonts.iter().any(|f| f.name == "Cascadia Mono"));
}

#[test]
fn duplicate_install_is_idempotent() {
    let fx = fixture();
    let path = write_font(&fx.source_dir, "cascadia.ttf", "Cascadia Mono");
    let token = CancelToken::new();

    let first = fx.engine.install(&path, &token).unwrap();
    let second = fx.engine.install(&path, &token).unwrap();

    assert_eq!(first.name, second.name);
    let count = fx
        .engine
        .list_fonts()
        .unwrap()
        .iter()
        .filter(|f| f.name == "Cascadia Mono")
        .count();
    assert_eq!(count, 1);
}

#[test]
fn conflicting_file_for_same_family_is_rejected() {
    let fx = fixture();
    let first = write_font(&fx.source_dir, "cascadia.ttf", "Cascadia Mono");
    let conflict = write_font(&fx.source_dir, "cascadia-copy.ttf", "Cascadia Mono");
    let token = CancelToken::new();

    fx.engine.install(&first, &token).unwrap();
    let result = fx.engine.install(&conflict, &token);
    assert!(matches!(result, Err(FontError::InvalidFontFile(_))));
}

#[test]
fn unsupported_extension_is_rejected() {
    let fx = fixture();
    let path = fx.source_dir.join("not-a-font.zip");
    std::fs::write(&path, b"PK\x03\x04").unwrap();

    let result = fx.engine.install(&path, &CancelToken::new());
    assert!(matches!(result, Err(FontError::InvalidFontFile(_))));
}

#[test]
fn bad_signature_is_rejected_before_copy() {
    let fx = fixture();
    let path = fx.source_dir.join("fake.ttf");
    std::fs::write(&path, b"\x89PNG\r\n\x1a\nnot a font at all").unwrap();

    let result = fx.engine.install(&path, &CancelToken::new());
    assert!(matches!(result, Err(FontError::InvalidFontFile(_))));
    assert!(!fx.fonts_dir.join("fake.ttf").exists());
}

#[test]
fn missing_file_is_an_io_error() {
    let fx = fixture();
    let path = fx.source_dir.join("absent.ttf");

    let result = fx.engine.install(&path, &CancelToken::new());
    assert!(matches!(result, Err(FontError::Io(_))));
}

#[test]
fn cancellation_before_registration_leaves_no_state() {
    let fx = fixture();
    let path = write_font(&fx.source_dir, "cascadia.ttf", "Cascadia Mono");

    let token = CancelToken::new();
    token.cancel();

    let result = fx.engine.install(&path, &token);
    assert!(matches!(result, Err(FontError::Cancelled)));

    // No partial copy, no registration
    assert!(!fx.fonts_dir.join("cascadia.ttf").exists());
    assert!(fx.engine.list_fonts().unwrap().is_empty());
}

#[test]
fn family_name_falls_back_to_file_stem() {
    let fx = fixture();

    // Valid signature but no name table
    let mut font = Vec::new();
    font.extend_from_slice(&0x0001_0000u32.to_be_bytes());
    font.extend_from_slice(&0u16.to_be_bytes()); // no tables
    font.extend_from_slice(&[0u8; 6]);
    let path = fx.source_dir.join("Mystery Font.ttf");
    std::fs::write(&path, font).unwrap();

    let record = fx.engine.install(&path, &CancelToken::new()).unwrap();
    assert_eq!(record.name, "Mystery Font");
}
