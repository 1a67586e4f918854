//! Typed entity store: one slot file + one flat index per entity.
//!
//! `EntityStore<R>` is a thin composition of lotstore-core primitives with
//! the [`Record`] codec on top. One `parking_lot::Mutex` per store makes
//! that store's appends and in-place rewrites mutually exclusive, so two
//! callers cannot interleave inside a single 501-byte slot.
//!
//! There is deliberately no lock *across* stores: a facade operation that
//! writes the sales ledger and then rewrites a car is two separate
//! unguarded steps, and the two files can diverge if the process dies
//! between them.

use std::marker::PhantomData;
use std::path::Path;

use parking_lot::Mutex;

use lotstore_core::{FlatIndex, LotError, LotResult, SlotFile};

use crate::records::Record;

/// A record file and its companion index, keyed by the entity's natural key.
pub struct EntityStore<R: Record> {
    slots: SlotFile,
    index: FlatIndex,
    /// Covers append + rewrite together for this store.
    guard: Mutex<()>,
    /// Reject duplicate keys on append instead of allowing them.
    strict: bool,
    _record: PhantomData<R>,
}

impl<R: Record> EntityStore<R> {
    /// Wire up the store's files under the given root directory.
    pub fn open(root: &Path, strict: bool) -> Self {
        Self {
            slots: SlotFile::new(root.join(R::STORE_FILE)),
            index: FlatIndex::new(root.join(R::INDEX_FILE)),
            guard: Mutex::new(()),
            strict,
            _record: PhantomData,
        }
    }

    /// Append a record and one index entry for its key.
    ///
    /// Returns the slot offset. In permissive mode (the default) duplicate
    /// keys append without error and lookups resolve first-match-wins; in
    /// strict mode a duplicate key is rejected.
    pub fn add(&self, record: &R) -> LotResult<u64> {
        let _guard = self.guard.lock();

        let key = record.key();
        if self.strict && self.index.lookup_exact(&key)?.is_some() {
            return Err(LotError::DuplicateKey { entity: R::ENTITY, key });
        }

        let offset = self.slots.append(&record.to_line()?)?;
        self.index.append_entry(&key, offset)?;
        Ok(offset)
    }

    /// Exact-key lookup. `None` if the key is unindexed or its slot is
    /// tombstoned.
    pub fn get_by_key(&self, key: &str) -> LotResult<Option<R>> {
        let _guard = self.guard.lock();
        match self.index.lookup_exact(key)? {
            Some(offset) => self.read_slot(offset),
            None => Ok(None),
        }
    }

    /// Every live record in file (= insertion) order, tombstones skipped.
    /// No index is consulted.
    pub fn get_all(&self) -> LotResult<Vec<R>> {
        let _guard = self.guard.lock();

        let mut records = Vec::new();
        for (_, line) in self.slots.scan()? {
            if line.is_empty() {
                continue;
            }
            records.push(R::from_line(&line)?);
        }
        Ok(records)
    }

    /// Mutate the record for `key` in place at its unchanged offset.
    ///
    /// `mutate` must not change the record's key; use [`rekey`] for that.
    ///
    /// [`rekey`]: EntityStore::rekey
    pub fn update_by_key(&self, key: &str, mutate: impl FnOnce(&mut R)) -> LotResult<R> {
        let _guard = self.guard.lock();

        let offset = self
            .index
            .lookup_exact(key)?
            .ok_or_else(|| Self::not_found(key))?;
        let mut record = self.read_slot(offset)?.ok_or_else(|| Self::not_found(key))?;

        mutate(&mut record);
        self.slots.rewrite_at(offset, &record.to_line()?)?;
        Ok(record)
    }

    /// Mutate the record for `old_key` in place *and* move it to the key
    /// the mutated record reports.
    ///
    /// The record keeps its slot offset; the entire index is rebuilt
    /// sorted ascending by key and rewritten. Entries with equal keys keep
    /// their relative order, preserving first-match-wins.
    pub fn rekey(&self, old_key: &str, mutate: impl FnOnce(&mut R)) -> LotResult<R> {
        let _guard = self.guard.lock();

        let mut entries = self.index.load_all()?;
        let position = entries
            .iter()
            .position(|(k, _)| k.as_str() == old_key)
            .ok_or_else(|| Self::not_found(old_key))?;
        let offset = entries[position].1;

        let mut record = self
            .read_slot(offset)?
            .ok_or_else(|| Self::not_found(old_key))?;
        mutate(&mut record);

        self.slots.rewrite_at(offset, &record.to_line()?)?;

        entries[position].0 = record.key();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        self.index.rewrite_all(&entries)?;

        Ok(record)
    }

    /// Read the record for `key`, then tombstone its slot.
    ///
    /// The index entry is left in place pointing at the blank slot, so a
    /// second tombstone of the same key finds nothing to read and fails
    /// with `NotFound`.
    pub fn tombstone_by_key(&self, key: &str) -> LotResult<R> {
        let _guard = self.guard.lock();

        let offset = self
            .index
            .lookup_exact(key)?
            .ok_or_else(|| Self::not_found(key))?;
        // The record must be read before its slot is blanked.
        let record = self.read_slot(offset)?.ok_or_else(|| Self::not_found(key))?;
        self.slots.blank_at(offset)?;
        Ok(record)
    }

    /// Every index entry in file order. Used by the aggregation layer to
    /// replay the index against the record file.
    pub fn entries(&self) -> LotResult<Vec<(String, u64)>> {
        let _guard = self.guard.lock();
        self.index.load_all()
    }

    /// Read the record at a known slot offset. `None` for tombstones.
    pub fn read_at(&self, offset: u64) -> LotResult<Option<R>> {
        let _guard = self.guard.lock();
        self.read_slot(offset)
    }

    fn read_slot(&self, offset: u64) -> LotResult<Option<R>> {
        let line = self.slots.read_at(offset)?;
        if line.is_empty() {
            return Ok(None);
        }
        Ok(Some(R::from_line(&line)?))
    }

    fn not_found(key: &str) -> LotError {
        LotError::NotFound {
            entity: R::ENTITY,
            key: key.to_string(),
        }
    }
}
