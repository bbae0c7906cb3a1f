//! Sorted String Table (SSTable) Module
//!
//! An SSTable is an **immutable**, sorted, on-disk table of entries:
//! a flat concatenation of encoded records (see [`crate::codec`]) in
//! strictly ascending key order, each key appearing at most once.
//! Tables are produced whole — by the flusher from a frozen memtable,
//! or by the compactor from a merge — and never modified in place.
//!
//! # Sparse index
//!
//! Opening a table streams it once to build a [`SparseIndex`]: the
//! first entry is always indexed, and thereafter an entry is indexed
//! whenever the byte distance from the last indexed offset exceeds the
//! configured read-buffer size. A point lookup seeks to the floor
//! offset for its probe key and scans forward at most one index gap,
//! so the index bounds lookup work without holding every key in
//! memory.
//!
//! # Concurrency model
//!
//! Tables are immutable once published and are shared across threads
//! as `Arc<SsTable>`; reads are lock-free. Each lookup opens its own
//! file handle, so concurrent lookups never contend on a seek
//! position.
//!
//! # File naming
//!
//! Table files are named `<timestamp>.sstable`, where the stem is the
//! freeze timestamp of the memtable they were flushed from. Recovery
//! and compaction order tables by this number, descending — a larger
//! stem always means fresher data.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::{
    fs::{self, File},
    io::{self, BufReader, Seek, SeekFrom},
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, error, trace, warn};

use crate::codec::EntryScanner;
use crate::index::SparseIndex;

/// File extension of persisted tables.
pub const SSTABLE_EXT: &str = "sstable";

/// Read-buffer granularity used when none is configured.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors returned by SSTable operations.
#[derive(Debug, Error)]
pub enum SsTableError {
    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Table filename stem does not parse as a timestamp.
    #[error("non-numeric sstable name: {}", .0.display())]
    NonNumericName(PathBuf),
}

// ------------------------------------------------------------------------------------------------
// SsTable
// ------------------------------------------------------------------------------------------------

/// Handle over one immutable table file plus its sparse index.
#[derive(Debug)]
pub struct SsTable {
    /// Location of the table file.
    path: PathBuf,

    /// Read-buffer granularity; governs both index density and the
    /// scanner chunk size for lookups.
    read_buffer_size: usize,

    /// Sparse key → offset index built at open time.
    index: SparseIndex,

    /// Timestamp parsed from the filename stem.
    timestamp: u64,
}

impl SsTable {
    /// Opens the table at `path`, streaming it once to build the
    /// sparse index. A `read_buffer_size` of zero selects
    /// [`DEFAULT_READ_BUFFER_SIZE`].
    pub fn open(path: impl Into<PathBuf>, read_buffer_size: usize) -> Result<Self, SsTableError> {
        let path = path.into();
        let read_buffer_size = if read_buffer_size == 0 {
            DEFAULT_READ_BUFFER_SIZE
        } else {
            read_buffer_size
        };

        let timestamp = parse_timestamp(&path).ok_or_else(|| SsTableError::NonNumericName(path.clone()))?;
        let index = build_index(&path, read_buffer_size)?;

        debug!(
            path = %path.display(),
            read_buffer_size,
            indexed = index.len(),
            "opened sstable"
        );

        Ok(Self {
            path,
            read_buffer_size,
            index,
            timestamp,
        })
    }

    /// Rebinds this handle (index included) to a new location.
    ///
    /// Compaction builds the merged table's index from the scratch file
    /// in `tmp/` before taking any lock, then renames the file into the
    /// table directory and rebinds the prebuilt handle here.
    pub(crate) fn moved_to(self, new_path: impl Into<PathBuf>) -> Result<Self, SsTableError> {
        let new_path = new_path.into();
        let timestamp =
            parse_timestamp(&new_path).ok_or_else(|| SsTableError::NonNumericName(new_path.clone()))?;

        Ok(Self {
            path: new_path,
            timestamp,
            ..self
        })
    }

    /// Point lookup.
    ///
    /// Probes the sparse index for the floor offset; no floor means the
    /// probe sorts before every key in the table. Otherwise seeks there
    /// and scans forward. Entries are sorted, so the scan stops as soon
    /// as a key greater than the probe appears.
    ///
    /// I/O failure while reading a published table is fatal.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        let offset = self.index.closest(key)?;

        let mut file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) => {
                error!(path = %self.path.display(), "can't read sstable file: {e}");
                panic!("sstable read failed: {}: {e}", self.path.display());
            }
        };
        if let Err(e) = file.seek(SeekFrom::Start(offset)) {
            error!(path = %self.path.display(), offset, "can't seek sstable file: {e}");
            panic!("sstable seek failed: {}: {e}", self.path.display());
        }

        let scanner = EntryScanner::new(BufReader::new(file), self.read_buffer_size);

        let mut scanned = 0usize;
        for entry in scanner {
            scanned += 1;
            if entry.key == key {
                trace!(scanned, offset, "key found in sstable");
                return Some(entry.value);
            }
            if entry.key.as_slice() > key {
                break;
            }
        }

        trace!(scanned, offset, "key not present in sstable");
        None
    }

    /// Timestamp parsed from the filename stem.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Location of the table file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current size of the table file in bytes.
    pub fn file_size(&self) -> u64 {
        fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
    }

    /// Number of keys held by the sparse index.
    pub fn index_len(&self) -> usize {
        self.index.len()
    }
}

// ------------------------------------------------------------------------------------------------
// Index construction
// ------------------------------------------------------------------------------------------------

/// Streams the table once, indexing the first entry and every entry
/// whose byte distance from the last indexed offset exceeds
/// `read_buffer_size`.
fn build_index(path: &Path, read_buffer_size: usize) -> Result<SparseIndex, SsTableError> {
    let file = File::open(path)?;
    let scanner = EntryScanner::new(BufReader::new(file), read_buffer_size);

    let mut index = SparseIndex::new();
    let mut offset: u64 = 0;
    let mut last_indexed: u64 = 0;

    for entry in scanner {
        let entry_len = entry.encoded_len() as u64;
        if index.is_empty() || offset - last_indexed > read_buffer_size as u64 {
            last_indexed = offset;
            index.insert(entry.key, offset);
        }
        offset += entry_len;
    }

    Ok(index)
}

// ------------------------------------------------------------------------------------------------
// Directory listing
// ------------------------------------------------------------------------------------------------

/// One table file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFile {
    /// Full path of the file.
    pub path: PathBuf,

    /// Timestamp parsed from the filename stem.
    pub timestamp: u64,

    /// File size in bytes.
    pub size: u64,
}

/// Lists every `*.sstable` file under `dir`, newest first
/// (timestamp descending). Files whose stem does not parse as an
/// integer are skipped with a warning.
pub fn list_tables(dir: &Path) -> Result<Vec<TableFile>, SsTableError> {
    let mut tables = Vec::new();

    for dir_entry in fs::read_dir(dir)? {
        let dir_entry = dir_entry?;
        let path = dir_entry.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(SSTABLE_EXT) {
            continue;
        }

        let Some(timestamp) = parse_timestamp(&path) else {
            warn!(path = %path.display(), "skipping sstable with non-numeric name");
            continue;
        };

        let size = dir_entry.metadata()?.len();
        tables.push(TableFile {
            path,
            timestamp,
            size,
        });
    }

    tables.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(tables)
}

/// Parses the numeric timestamp from a file stem like `1234.sstable`.
pub fn parse_timestamp(path: &Path) -> Option<u64> {
    path.file_stem()?.to_str()?.parse().ok()
}
