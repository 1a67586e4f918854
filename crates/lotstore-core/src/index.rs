//! Flat key/offset index
//!
//! A companion file mapping natural keys to byte offsets in a slotted
//! record file, one `<key> <offset>` entry per line. The whole index is
//! loaded into memory on each access; lookups return the first matching
//! entry in insertion order, so duplicate keys resolve first-match-wins.
//!
//! Like [`crate::slot::SlotFile`], this holds only a path and opens the
//! file per call.

use std::fs::{File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{LotError, LotResult};
use crate::format::{format_entry, parse_entry};

/// Flat file of `<key> <offset>` lines, fully reloaded on each access.
#[derive(Debug, Clone)]
pub struct FlatIndex {
    path: PathBuf,
}

impl FlatIndex {
    /// Create a handle for the index file at `path`. The file itself is
    /// created lazily on first append.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the underlying index file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse every entry in file order.
    ///
    /// A missing or empty index file yields an empty list, not an error.
    pub fn load_all(&self) -> LotResult<Vec<(String, u64)>> {
        let mut file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(LotError::Io {
                    path: Some(self.path.clone()),
                    kind: e.kind(),
                    message: format!("Failed to open index file: {}", e),
                })
            }
        };

        let mut contents = String::new();
        file.read_to_string(&mut contents).map_err(|e| LotError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Index file read failed: {}", e),
        })?;

        let mut entries = Vec::new();
        for (i, line) in contents.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            entries.push(parse_entry(line, &self.path, i + 1)?);
        }
        Ok(entries)
    }

    /// Append one entry. No duplicate-key check is performed.
    pub fn append_entry(&self, key: &str, offset: u64) -> LotResult<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| LotError::Io {
                path: Some(self.path.clone()),
                kind: e.kind(),
                message: format!("Failed to open index file for append: {}", e),
            })?;

        writeln!(file, "{}", format_entry(key, offset)).map_err(|e| LotError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Index append failed: {}", e),
        })?;

        trace!("Appended index entry {} -> {} to {}", key, offset, self.path.display());
        Ok(())
    }

    /// Replace the entire index file with the given entries, in order.
    ///
    /// Used when a key changes and the index is rebuilt sorted.
    pub fn rewrite_all(&self, entries: &[(String, u64)]) -> LotResult<()> {
        let mut contents = String::new();
        for (key, offset) in entries {
            contents.push_str(&format_entry(key, *offset));
            contents.push('\n');
        }

        std::fs::write(&self.path, contents).map_err(|e| LotError::Io {
            path: Some(self.path.clone()),
            kind: e.kind(),
            message: format!("Index rewrite failed: {}", e),
        })?;

        trace!("Rewrote index {} with {} entries", self.path.display(), entries.len());
        Ok(())
    }

    /// Offset of the first entry whose key equals `key`, in insertion order.
    pub fn lookup_exact(&self, key: &str) -> LotResult<Option<u64>> {
        let entries = self.load_all()?;
        Ok(entries.iter().find(|(k, _)| k.as_str() == key).map(|&(_, offset)| offset))
    }

    /// Offset of the first entry whose key contains `key` as a substring.
    ///
    /// Compatibility shim for stores whose keys embed a foreign key (for
    /// example a sale number carrying the VIN). Prone to false positives
    /// when one key is a substring of another; prefer [`lookup_exact`]
    /// where the key is known in full.
    ///
    /// [`lookup_exact`]: FlatIndex::lookup_exact
    pub fn lookup_contains(&self, key: &str) -> LotResult<Option<u64>> {
        let entries = self.load_all()?;
        Ok(entries.iter().find(|(k, _)| k.contains(key)).map(|&(_, offset)| offset))
    }
}
