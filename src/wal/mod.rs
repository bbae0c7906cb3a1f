//! Write-Ahead Log Module
//!
//! A durable, append-only log of [`Entry`] records backing the
//! memtable. Every write is appended here *before* the in-memory map
//! is touched, so the log on disk is always a superset (as a write
//! sequence) of the in-memory state, and replaying it reconstructs the
//! memtable after a crash or restart.
//!
//! # On-disk layout
//!
//! A flat concatenation of encoded entries (see [`crate::codec`]).
//! No header, separator, or trailer; an empty file is a valid empty
//! log.
//!
//! # Concurrency model
//!
//! Appends are serialized through an internal `Mutex<File>` so a
//! replay after restart always sees whole records (a torn final record
//! from a crash mid-write is dropped by the scanner).
//!
//! # Guarantees
//!
//! - **Durability contract:** an entry is durable once `append`
//!   returns — the write has been handed to the OS. No per-write
//!   fsync; [`Wal::sync`] and the `Drop` impl flush explicitly.
//! - **Replay:** [`Wal::replay`] streams entries in append order and
//!   terminates cleanly at a truncated tail.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::{
    fs::{self, File, OpenOptions},
    io::{self, BufReader},
    path::{Path, PathBuf},
    sync::Mutex,
};

use thiserror::Error;
use tracing::{debug, error, trace};

use crate::codec::{Entry, EntryScanner};

/// Chunk size used when replaying the log.
const REPLAY_READ_BUFFER_SIZE: usize = 4096;

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors returned by WAL operations.
#[derive(Debug, Error)]
pub enum WalError {
    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Internal consistency or locking error.
    #[error("internal error: {0}")]
    Internal(String),
}

// ------------------------------------------------------------------------------------------------
// Wal
// ------------------------------------------------------------------------------------------------

/// An append-only log of entries at a fixed path.
#[derive(Debug)]
pub struct Wal {
    /// Append handle, serialized across writers.
    file: Mutex<File>,

    /// Location of the log file on disk.
    path: PathBuf,
}

impl Wal {
    /// Opens the log at `path` for appending, creating it (and any
    /// missing parent directories) when absent.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, WalError> {
        let path = path.into();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!(path = %path.display(), "opened write-ahead log");

        Ok(Self {
            file: Mutex::new(file),
            path,
        })
    }

    /// Appends one encoded entry to the log.
    pub fn append(&self, entry: &Entry) -> Result<(), WalError> {
        trace!(
            key_len = entry.key.len(),
            value_len = entry.value.len(),
            "appending entry"
        );

        let mut file = self
            .file
            .lock()
            .map_err(|_| WalError::Internal("log mutex poisoned".into()))?;
        entry.write_to(&mut *file)?;
        Ok(())
    }

    /// Streams every complete entry from the start of the log, in
    /// append order. A truncated trailing record ends the stream.
    pub fn replay(&self) -> Result<EntryScanner<BufReader<File>>, WalError> {
        let file = File::open(&self.path)?;
        Ok(EntryScanner::new(
            BufReader::new(file),
            REPLAY_READ_BUFFER_SIZE,
        ))
    }

    /// Moves the log file to `new_path` and retargets this handle.
    ///
    /// Used when a memtable is frozen: its log migrates from the
    /// active-log path into the pending-flush directory. The open
    /// append handle stays valid across the rename.
    pub fn rename(&mut self, new_path: impl Into<PathBuf>) -> Result<(), WalError> {
        let new_path = new_path.into();
        debug!(from = %self.path.display(), to = %new_path.display(), "renaming log");

        fs::rename(&self.path, &new_path)?;
        self.path = new_path;
        Ok(())
    }

    /// Deletes the log file from disk. The flusher calls this once the
    /// memtable's contents are persisted in an SSTable.
    pub fn remove(&self) -> Result<(), WalError> {
        debug!(path = %self.path.display(), "removing log");
        fs::remove_file(&self.path)?;
        Ok(())
    }

    /// Flushes buffered writes to stable storage.
    pub fn sync(&self) -> Result<(), WalError> {
        let file = self
            .file
            .lock()
            .map_err(|_| WalError::Internal("log mutex poisoned".into()))?;
        file.sync_all()?;
        Ok(())
    }

    /// Path of the underlying log file.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for Wal {
    fn drop(&mut self) {
        match self.file.lock() {
            Ok(file) => {
                // The file may already be gone (flusher removed it).
                if self.path.exists()
                    && let Err(e) = file.sync_all()
                {
                    error!("failed to sync log on drop: {e}");
                }
            }
            Err(poisoned) => {
                let file = poisoned.into_inner();
                let _ = file.sync_all();
            }
        }
    }
}
