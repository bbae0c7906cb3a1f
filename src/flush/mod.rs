//! Flush Module
//!
//! Converts a frozen memtable into a persistent SSTable. The sequence
//! is fixed: recreate `<timestamp>.sstable` in the table directory,
//! stream the memtable's entries into it in sorted order, fsync, then
//! delete the memtable's write-ahead log — the data now lives in the
//! table, so the log has nothing left to recover.
//!
//! Persistence failures here are fatal: a flusher that cannot write a
//! table or retire a log leaves the store in a state no later
//! iteration can repair, so it logs and panics rather than continue.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------


// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use tracing::{debug, error};

use crate::memtable::Memtable;
use crate::sstable::SSTABLE_EXT;

// ------------------------------------------------------------------------------------------------
// Flusher
// ------------------------------------------------------------------------------------------------

/// Persists frozen memtables into a fixed SSTable directory.
#[derive(Debug)]
pub struct Flusher {
    /// Directory that receives the flushed tables.
    sstable_dir: PathBuf,
}

impl Flusher {
    /// Creates a flusher writing into `sstable_dir`.
    pub fn new(sstable_dir: impl Into<PathBuf>) -> Self {
        Self {
            sstable_dir: sstable_dir.into(),
        }
    }

    /// Flushes `memtable` to `<timestamp>.sstable` and deletes its
    /// write-ahead log. Returns the new table's path.
    ///
    /// # Panics
    ///
    /// On any I/O failure — see the module documentation.
    pub fn flush(&self, memtable: &Memtable) -> PathBuf {
        let path = self.table_path(memtable.timestamp());
        debug!(
            wal = %memtable.wal_path().display(),
            table = %path.display(),
            entries = memtable.len(),
            "flushing memtable"
        );

        if let Err(e) = self.write_table(memtable, &path) {
            error!(table = %path.display(), "can't write sstable: {e}");
            panic!("flush failed writing {}: {e}", path.display());
        }

        if let Err(e) = memtable.remove_wal() {
            error!(wal = %memtable.wal_path().display(), "can't remove flushed log: {e}");
            panic!(
                "flush failed removing {}: {e}",
                memtable.wal_path().display()
            );
        }

        debug!(table = %path.display(), "memtable persisted");
        path
    }

    /// Target path for a memtable frozen at `timestamp`.
    pub fn table_path(&self, timestamp: u64) -> PathBuf {
        self.sstable_dir.join(format!("{timestamp}.{SSTABLE_EXT}"))
    }

    fn write_table(&self, memtable: &Memtable, path: &Path) -> io::Result<()> {
        // Recreate from scratch: a partial table from an earlier crash
        // at the same timestamp must not survive underneath new data.
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        memtable.write_sorted(&mut writer)?;

        writer.flush()?;
        writer.get_ref().sync_all()?;
        Ok(())
    }
}
