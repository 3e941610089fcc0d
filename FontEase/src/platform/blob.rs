//! Snapshot payload encoding
//!
//! A font change touches several registry values at once (the substitute
//! value plus the blanked default-font entries). The snapshot carries them
//! as one opaque byte payload: a versioned list of `(value name, previous
//! bytes-or-absent)` pairs. Absent means the value did not exist before the
//! change and must be deleted on restore.

use crate::error::{FontError, Result};

const MAGIC: &[u8; 4] = b"FESN";
const VERSION: u8 = 1;

/// Ordered list of captured values; `None` marks a value that was absent.
pub type Entries = Vec<(String, Option<Vec<u8>>)>;

/// Serialize captured values into the opaque snapshot payload.
pub fn encode(entries: &[(String, Option<Vec<u8>>)]) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(MAGIC);
    out.push(VERSION);
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());

    for (name, value) in entries {
        let name_bytes = name.as_bytes();
        out.extend_from_slice(&(name_bytes.len() as u16).to_le_bytes());
        out.extend_from_slice(name_bytes);
        match value {
            Some(data) => {
                out.push(1);
                out.extend_from_slice(&(data.len() as u32).to_le_bytes());
                out.extend_from_slice(data);
            }
            None => out.push(0),
        }
    }

    out
}

/// Decode a snapshot payload.
///
/// Fails with `PersistenceError` on any malformation; a restore must be
/// refused rather than guessed at when the payload cannot be trusted.
pub fn decode(data: &[u8]) -> Result<Entries> {
    let mut cursor = Cursor { data, pos: 0 };

    if cursor.take(4)? != MAGIC.as_slice() {
        return Err(malformed("bad magic"));
    }
    if cursor.take(1)?[0] != VERSION {
        return Err(malformed("unsupported version"));
    }

    let count = u32::from_le_bytes(cursor.take_array::<4>()?) as usize;
    // The count is untrusted; cap the allocation by what the payload could
    // actually hold (an entry takes at least 3 bytes)
    let mut entries = Vec::with_capacity(count.min(data.len() / 3));

    for _ in 0..count {
        let name_len = u16::from_le_bytes(cursor.take_array::<2>()?) as usize;
        let name = std::str::from_utf8(cursor.take(name_len)?)
            .map_err(|_| malformed("entry name is not UTF-8"))?
            .to_string();

        let value = match cursor.take(1)?[0] {
            0 => None,
            1 => {
                let data_len = u32::from_le_bytes(cursor.take_array::<4>()?) as usize;
                Some(cursor.take(data_len)?.to_vec())
            }
            _ => return Err(malformed("invalid presence marker")),
        };

        entries.push((name, value));
    }

    if cursor.pos != data.len() {
        return Err(malformed("trailing bytes"));
    }

    Ok(entries)
}

fn malformed(detail: &str) -> FontError {
    FontError::Persistence(format!("malformed snapshot payload: {}", detail))
}

struct Cursor<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8]> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| malformed("truncated"))?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }
}
