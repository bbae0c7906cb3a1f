//! Memtable Module
//!
//! The in-memory write buffer of the storage engine: a sorted map from
//! key to value bound to a write-ahead log.
//!
//! ## Design Invariants
//!
//! - Every `set` appends to the WAL *before* updating the map, so the
//!   log is always a superset of the in-memory state.
//! - Construction replays an existing log in order; later writes of a
//!   key overwrite earlier ones.
//! - [`Memtable::write_sorted`] emits entries in strictly ascending key
//!   order — flushed SSTables inherit their sort order from here.
//!
//! ## Freeze Semantics
//!
//! When the engine freezes a memtable it assigns the freeze timestamp
//! (which names the frozen log and, later, the flushed SSTable) and
//! renames the log into the pending-flush directory. A frozen memtable
//! receives no further writes; it keeps serving reads from the flush
//! queue until the flusher persists it and deletes the log.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::{
    collections::BTreeMap,
    io::{self, Write},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, trace};

use crate::codec::Entry;
use crate::wal::{Wal, WalError};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors returned by [`Memtable`] operations.
#[derive(Debug, Error)]
pub enum MemtableError {
    /// Underlying WAL failure.
    #[error("WAL error: {0}")]
    Wal(#[from] WalError),

    /// Underlying filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

// ------------------------------------------------------------------------------------------------
// Memtable
// ------------------------------------------------------------------------------------------------

/// Sorted in-memory key-value buffer backed by an append-only log.
#[derive(Debug)]
pub struct Memtable {
    /// Sorted key → value map. Latest write per key wins.
    data: BTreeMap<Vec<u8>, Vec<u8>>,

    /// Durability log; written before every map update.
    wal: Wal,

    /// Freeze timestamp. Zero while the memtable is active; assigned
    /// when frozen (or recovered from the frozen log's filename) and
    /// used to name the flushed SSTable.
    timestamp: u64,
}

impl Memtable {
    /// Opens a memtable over the log at `wal_path`.
    ///
    /// An existing log is replayed entry by entry into the map — this
    /// is the crash-recovery path. A missing log is created empty.
    pub fn open(wal_path: impl Into<PathBuf>) -> Result<Self, MemtableError> {
        let wal = Wal::open(wal_path)?;

        let mut data = BTreeMap::new();
        for entry in wal.replay()? {
            data.insert(entry.key, entry.value);
        }

        if !data.is_empty() {
            debug!(
                restored = data.len(),
                path = %wal.path().display(),
                "restored memtable from log"
            );
        }

        Ok(Self {
            data,
            wal,
            timestamp: 0,
        })
    }

    /// Stores `value` under `key`, overwriting any previous value.
    ///
    /// The entry is appended to the log first; only after the append
    /// succeeds does the in-memory map change.
    pub fn set(&mut self, key: &[u8], value: &[u8]) -> Result<(), MemtableError> {
        let entry = Entry::new(key, value);
        self.wal.append(&entry)?;
        self.data.insert(entry.key, entry.value);
        Ok(())
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.data.get(key).cloned()
    }

    /// Number of distinct keys currently resident. This is the metric
    /// the engine compares against its freeze threshold.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// True when no key has been written yet.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Writes every `(key, value)` pair as an encoded entry, in
    /// ascending key order, to `sink`. Returns the byte count.
    pub fn write_sorted<W: Write>(&self, sink: &mut W) -> io::Result<usize> {
        let mut written = 0;
        for (key, value) in &self.data {
            written += Entry::new(key.clone(), value.clone()).write_to(sink)?;
        }
        trace!(entries = self.data.len(), bytes = written, "serialized memtable");
        Ok(written)
    }

    /// Freeze timestamp, zero while active.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Assigns the freeze timestamp. Called by the engine at freeze
    /// time, or during recovery with the value parsed from the frozen
    /// log's filename.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// Moves the backing log to `new_path` (freeze path migration).
    pub fn rename_wal(&mut self, new_path: impl Into<PathBuf>) -> Result<(), MemtableError> {
        self.wal.rename(new_path)?;
        Ok(())
    }

    /// Deletes the backing log. Called by the flusher after the
    /// memtable's contents are durable in an SSTable.
    pub fn remove_wal(&self) -> Result<(), MemtableError> {
        self.wal.remove()?;
        Ok(())
    }

    /// Path of the backing log file.
    pub fn wal_path(&self) -> &Path {
        self.wal.path()
    }
}
