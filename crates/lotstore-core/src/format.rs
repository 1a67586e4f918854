//! On-disk format definitions for LotStore files
//!
//! Record files are sequences of fixed-width slots:
//!   serialized record (<= 500 bytes) + space padding + '\n' = 501 bytes
//!
//! Index files are newline-separated entries with no fixed width:
//!   <key><space><decimal byte offset>\n

use std::path::Path;

use crate::error::{LotError, LotResult};

/// Maximum serialized record size a slot can hold
pub const RECORD_MAX: usize = 500;

/// Full slot width: record budget + trailing newline
pub const SLOT_SIZE: usize = RECORD_MAX + 1;

/// Encode a serialized record into a full slot.
///
/// The record is right-padded with spaces to [`RECORD_MAX`] bytes and
/// terminated with a newline. Records over budget are rejected rather than
/// silently corrupting the slot grid.
pub fn encode_slot(record: &str, path: &Path) -> LotResult<Vec<u8>> {
    let bytes = record.as_bytes();
    if bytes.len() > RECORD_MAX {
        return Err(LotError::RecordTooLarge {
            len: bytes.len(),
            max: RECORD_MAX,
            path: path.to_path_buf(),
        });
    }

    let mut slot = Vec::with_capacity(SLOT_SIZE);
    slot.extend_from_slice(bytes);
    slot.resize(RECORD_MAX, b' ');
    slot.push(b'\n');
    Ok(slot)
}

/// Decode a raw slot back into its serialized record.
///
/// Trims the padding and newline. A tombstoned slot (all padding) decodes
/// to the empty string.
pub fn decode_slot(raw: &[u8], path: &Path, offset: u64) -> LotResult<String> {
    let text = std::str::from_utf8(raw).map_err(|e| LotError::InvalidOffset {
        path: path.to_path_buf(),
        offset,
        reason: format!("slot is not valid UTF-8: {}", e),
    })?;
    Ok(text.trim_end_matches(['\n', ' ']).to_string())
}

/// Render one index entry as a line (without trailing newline).
pub fn format_entry(key: &str, offset: u64) -> String {
    format!("{} {}", key, offset)
}

/// Parse one index line into `(key, offset)`.
///
/// The key is everything before the last space, so keys containing spaces
/// survive a round trip.
pub fn parse_entry(line: &str, path: &Path, line_number: usize) -> LotResult<(String, u64)> {
    let (key, offset_text) = line.rsplit_once(' ').ok_or_else(|| LotError::IndexCorrupted {
        path: path.to_path_buf(),
        line: line_number,
        reason: format!("no key/offset separator in {:?}", line),
    })?;

    let offset: u64 = offset_text.parse().map_err(|_| LotError::IndexCorrupted {
        path: path.to_path_buf(),
        line: line_number,
        reason: format!("offset is not a decimal integer: {:?}", offset_text),
    })?;

    Ok((key.to_string(), offset))
}
