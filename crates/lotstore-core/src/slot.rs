//! Slotted record store
//!
//! An append-only file of fixed-width slots. Every record occupies exactly
//! [`SLOT_SIZE`] bytes on disk, so a record is addressable by the byte
//! offset where its slot begins and can be rewritten in place without
//! shifting its neighbors.
//!
//! Every operation opens and closes the underlying file for the duration
//! of that call. `SlotFile` holds no file handle, only the path.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{LotError, LotResult};
use crate::format::{decode_slot, encode_slot, SLOT_SIZE};

/// Append-only file of fixed 501-byte slots, addressed by byte offset.
#[derive(Debug, Clone)]
pub struct SlotFile {
    path: PathBuf,
}

impl SlotFile {
    /// Create a handle for the record file at `path`. The file itself is
    /// created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying record file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record as a new slot at end-of-file.
    ///
    /// Returns the byte offset where the slot was written. Records over
    /// the 500-byte budget are rejected with `RecordTooLarge`.
    pub fn append(&self, record: &str) -> LotResult<u64> {
        let slot = encode_slot(record, &self.path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LotError::Io {
                path: Some(self.path.clone()),
                kind: e.kind(),
                message: format!("Failed to open record file for append: {}", e),
            })?;

        let offset = file
            .metadata()
            .map_err(|e| LotError::Io {
                path: Some(self.path.clone()),
                kind: e.kind(),
                message: format!("Failed to stat record file: {}", e),
            })?
            .len();

        file.write_all(&slot).map_err(|e| LotError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Record append failed: {}", e),
        })?;

        trace!("Appended slot to {} at offset {}", self.path.display(), offset);
        Ok(offset)
    }

    /// Read the slot at `offset` and return its trimmed record.
    ///
    /// A tombstoned slot reads as the empty string. Unaligned or
    /// out-of-bounds offsets are rejected.
    pub fn read_at(&self, offset: u64) -> LotResult<String> {
        let mut file = self.open_checked(offset, false)?;
        file.seek(SeekFrom::Start(offset))?;

        let mut raw = [0u8; SLOT_SIZE];
        file.read_exact(&mut raw).map_err(|e| LotError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Failed to read slot at offset {}: {}", offset, e),
        })?;

        decode_slot(&raw, &self.path, offset)
    }

    /// Overwrite the slot at `offset` in place.
    ///
    /// The new record must fit the same 500-byte budget; this routine
    /// never grows the file.
    pub fn rewrite_at(&self, offset: u64, record: &str) -> LotResult<()> {
        let slot = encode_slot(record, &self.path)?;

        let mut file = self.open_checked(offset, true)?;
        file.seek(SeekFrom::Start(offset))?;
        file.write_all(&slot).map_err(|e| LotError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Slot rewrite at offset {} failed: {}", offset, e),
        })?;

        trace!("Rewrote slot in {} at offset {}", self.path.display(), offset);
        Ok(())
    }

    /// Tombstone the slot at `offset`: overwrite it with pure padding.
    ///
    /// The slot stays allocated and keeps its offset; it just reads back
    /// as an empty record from then on.
    pub fn blank_at(&self, offset: u64) -> LotResult<()> {
        self.rewrite_at(offset, "")
    }

    /// Scan every slot in file order, tombstones included.
    ///
    /// Returns `(offset, record)` pairs; a tombstoned slot yields an empty
    /// record string. A missing file scans as empty, not as an error.
    pub fn scan(&self) -> LotResult<Vec<(u64, String)>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LotError::Io {
                    path: Some(self.path.clone()),
                    kind: e.kind(),
                    message: format!("Failed to open record file for scan: {}", e),
                })
            }
        };

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| LotError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Record file scan failed: {}", e),
        })?;

        let mut slots = Vec::with_capacity(contents.len() / SLOT_SIZE);
        for (i, raw) in contents.chunks_exact(SLOT_SIZE).enumerate() {
            let offset = (i * SLOT_SIZE) as u64;
            slots.push((offset, decode_slot(raw, &self.path, offset)?));
        }
        Ok(slots)
    }

    /// Number of slots currently allocated in the file.
    pub fn slot_count(&self) -> LotResult<u64> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() / SLOT_SIZE as u64),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(LotError::Io {
                path: Some(self.path.clone()),
                kind: e.kind(),
                message: format!("Failed to stat record file: {}", e),
            }),
        }
    }

    /// Open the file for a positioned access, validating that `offset`
    /// lands on a slot boundary inside the file.
    fn open_checked(&self, offset: u64, writable: bool) -> LotResult<File> {
        if offset % SLOT_SIZE as u64 != 0 {
            return Err(LotError::InvalidOffset {
                path: self.path.clone(),
                offset,
                reason: format!("offset is not a multiple of the {}-byte slot width", SLOT_SIZE),
            });
        }

        let file = OpenOptions::new()
            .read(true)
            .write(writable)
            .open(&self.path)
            .map_err(|e| LotError::Io {
                path: Some(self.path.clone()),
                kind: e.kind(),
                message: format!("Failed to open record file: {}", e),
            })?;

        let len = file
            .metadata()
            .map_err(|e| LotError::Io {
                path: Some(self.path.clone()),
                kind: e.kind(),
                message: format!("Failed to stat record file: {}", e),
            })?
            .len();

        if offset + SLOT_SIZE as u64 > len {
            return Err(LotError::InvalidOffset {
                path: self.path.clone(),
                offset,
                reason: format!("no full slot at offset (file is {} bytes)", len),
            });
        }

        Ok(file)
    }
}
