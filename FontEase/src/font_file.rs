//! Font container detection and family-name extraction
//!
//! Validates that a file is a supported font container by examining its
//! sfnt signature (magic bytes), and pulls the family name out of the
//! `name` table so installed fonts are registered under their real
//! display name instead of the file name.
//!
//! ## Supported Containers
//!
//! - **TrueType**: `00 01 00 00` (or legacy Apple `true`)
//! - **OpenType**: `4F 54 54 4F` ("OTTO", CFF outlines)
//! - **Collection**: `74 74 63 66` ("ttcf", TrueType collection)
//!
//! Signature verification catches misnamed files before anything is copied
//! into the OS font store; deeper validation (glyph data, checksums) is
//! delegated to the OS when the font is registered.

use crate::error::{FontError, Result};
use std::io::{Read, Seek, SeekFrom};

/// File extensions accepted by the installer (lowercase, no dot).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["ttf", "otf", "ttc"];

const SFNT_TRUETYPE: u32 = 0x0001_0000;
const SFNT_TRUE: u32 = 0x7472_7565; // "true" (legacy Apple TrueType)
const SFNT_OTTO: u32 = 0x4F54_544F; // "OTTO"
const SFNT_TTCF: u32 = 0x7474_6366; // "ttcf"

/// A recognized font container format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontContainer {
    /// TrueType outlines (.ttf)
    TrueType,
    /// OpenType with CFF outlines (.otf)
    OpenType,
    /// TrueType collection (.ttc)
    Collection,
}

impl FontContainer {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TrueType => "TrueType",
            Self::OpenType => "OpenType",
            Self::Collection => "TrueType Collection",
        }
    }
}

/// Detect the container format from the first bytes of a font file.
///
/// Returns `InvalidFontFile` if the signature is not a known sfnt tag.
pub fn detect_container(header: &[u8]) -> Result<FontContainer> {
    if header.len() < 4 {
        return Err(FontError::InvalidFontFile(
            "file too short for an sfnt header".to_string(),
        ));
    }

    let tag = u32::from_be_bytes([header[0], header[1], header[2], header[3]]);
    match tag {
        SFNT_TRUETYPE | SFNT_TRUE => Ok(FontContainer::TrueType),
        SFNT_OTTO => Ok(FontContainer::OpenType),
        SFNT_TTCF => Ok(FontContainer::Collection),
        other => Err(FontError::InvalidFontFile(format!(
            "unrecognized font signature 0x{:08X}",
            other
        ))),
    }
}

/// Read the family name (name table, nameID 1) from a font file.
///
/// For collections, the first face in the collection is used. Returns
/// `Ok(None)` when the font carries no usable family name record; the
/// caller is expected to fall back to the file stem.
///
/// Only the table directory and the `name` table are read, so this stays
/// cheap for large font files.
pub fn read_family_name<R: Read + Seek>(reader: &mut R) -> Result<Option<String>> {
    let mut header = [0u8; 12];
    reader.seek(SeekFrom::Start(0))?;
    read_exact_or_invalid(reader, &mut header)?;

    let container = detect_container(&header)?;
    let base = if container == FontContainer::Collection {
        // ttc header: tag, version, numFonts, then per-face offsets from file start
        let mut offset_bytes = [0u8; 4];
        read_exact_or_invalid(reader, &mut offset_bytes)?;
        let base = u32::from_be_bytes(offset_bytes) as u64;

        reader.seek(SeekFrom::Start(base))?;
        read_exact_or_invalid(reader, &mut header)?;
        detect_container(&header)?;
        base
    } else {
        0
    };

    let num_tables = u16::from_be_bytes([header[4], header[5]]) as usize;
    let mut directory = vec![0u8; num_tables * 16];
    reader.seek(SeekFrom::Start(base + 12))?;
    read_exact_or_invalid(reader, &mut directory)?;

    // Table record: tag(4) checksum(4) offset(4) length(4), offsets from file start
    let mut name_table = None;
    for record in directory.chunks_exact(16) {
        if &record[0..4] == b"name" {
            let offset = u32::from_be_bytes([record[8], record[9], record[10], record[11]]) as u64;
            let length = u32::from_be_bytes([record[12], record[13], record[14], record[15]]) as usize;
            name_table = Some((offset, length));
            break;
        }
    }

    let Some((offset, length)) = name_table else {
        return Ok(None);
    };
    if length < 6 {
        return Ok(None);
    }

    let mut table = vec![0u8; length];
    reader.seek(SeekFrom::Start(offset))?;
    read_exact_or_invalid(reader, &mut table)?;

    Ok(parse_family_name(&table))
}

fn read_exact_or_invalid<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    reader.read_exact(buf).map_err(|e| {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            FontError::InvalidFontFile("truncated font file".to_string())
        } else {
            FontError::Io(e)
        }
    })
}

/// Scan the name table for nameID 1 (font family).
///
/// Windows records (platform 3, UTF-16BE) win; a Macintosh record
/// (platform 1, effectively Latin-1) is kept as fallback.
fn parse_family_name(table: &[u8]) -> Option<String> {
    let count = be_u16(table, 2)? as usize;
    let string_offset = be_u16(table, 4)? as usize;

    let mut mac_fallback = None;
    for i in 0..count {
        let record = 6 + i * 12;
        let platform_id = be_u16(table, record)?;
        let name_id = be_u16(table, record + 6)?;
        if name_id != 1 {
            continue;
        }

        let length = be_u16(table, record + 8)? as usize;
        let offset = be_u16(table, record + 10)? as usize;
        let start = string_offset.checked_add(offset)?;
        let Some(bytes) = table.get(start..start + length) else {
            continue;
        };

        match platform_id {
            3 => {
                let units: Vec<u16> = bytes
                    .chunks_exact(2)
                    .map(|c| u16::from_be_bytes([c[0], c[1]]))
                    .collect();
                if let Ok(name) = String::from_utf16(&units) {
                    if !name.is_empty() {
                        return Some(name);
                    }
                }
            }
            1 if mac_fallback.is_none() => {
                let name: String = bytes.iter().map(|&b| b as char).collect();
                if !name.is_empty() {
                    mac_fallback = Some(name);
                }
            }
            _ => {}
        }
    }

    mac_fallback
}

fn be_u16(data: &[u8], pos: usize) -> Option<u16> {
    let bytes = data.get(pos..pos + 2)?;
    Some(u16::from_be_bytes([bytes[0], bytes[1]]))
}
