//! Compaction Module
//!
//! Background merging of SSTables. Each round picks the two **oldest**
//! tables still small enough to be merge candidates and streams them
//! into one combined table, keeping the newest value of every key.
//! Nothing on disk is older than the selected pair, so no other table
//! can shadow the merge result.
//!
//! ## Selection
//!
//! List the table directory newest-first, drop every file at or above
//! the size ceiling, and require at least the configured minimum of
//! eligible files. The pair is the two at the tail of that ordering;
//! `older` and `newer` name their relative age.
//!
//! ## Merge
//!
//! Both inputs are sorted with unique keys, so a single forward pass
//! suffices: emit the smaller key and advance that stream; on equal
//! keys emit the newer table's entry and advance both. The output is
//! sorted and deduplicated by construction.
//!
//! ## Install
//!
//! The merged table is written to the scratch directory first and only
//! later renamed over the newer input (an atomic swap within one
//! filesystem) while the engine holds its table-list lock. The older
//! input is then deleted. The surviving file keeps the newer input's
//! timestamp name, so filename order continues to reflect data
//! recency. A crash at any point leaves either the original pair or
//! the completed swap — the scratch directory is wiped on startup.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::{
    fs::{self, File},
    io::{self, BufReader, BufWriter, Write},
    iter::Peekable,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::{debug, info};

use crate::codec::EntryScanner;
use crate::sstable::{self, SsTableError, TableFile};

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors returned by compaction selection and merging.
#[derive(Debug, Error)]
pub enum CompactionError {
    /// Underlying I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Failure listing the table directory.
    #[error("SSTable error: {0}")]
    SsTable(#[from] SsTableError),
}

// ------------------------------------------------------------------------------------------------
// Selection
// ------------------------------------------------------------------------------------------------

/// The two tables chosen for one merge round.
#[derive(Debug, Clone)]
pub struct CompactionPair {
    /// The older input — deleted after the merge is installed.
    pub older: TableFile,

    /// The newer input — the merge result replaces this file.
    pub newer: TableFile,
}

/// Picks the two oldest eligible tables under `sstable_dir`.
///
/// A table is eligible while its size is below `max_file_size`.
/// Returns `None` when fewer than `minimum_files` tables are eligible.
pub fn select_pair(
    sstable_dir: &Path,
    minimum_files: usize,
    max_file_size: u64,
) -> Result<Option<CompactionPair>, CompactionError> {
    let tables = sstable::list_tables(sstable_dir)?;

    // Newest-first listing; keep only files small enough to merge.
    let eligible: Vec<TableFile> = tables.into_iter().filter(|t| t.size < max_file_size).collect();

    if eligible.len() < minimum_files.max(2) {
        return Ok(None);
    }

    let older = eligible[eligible.len() - 1].clone();
    let newer = eligible[eligible.len() - 2].clone();

    debug!(
        older = %older.path.display(),
        newer = %newer.path.display(),
        eligible = eligible.len(),
        "selected compaction pair"
    );

    Ok(Some(CompactionPair { older, newer }))
}

// ------------------------------------------------------------------------------------------------
// Merge
// ------------------------------------------------------------------------------------------------

/// Streams `older` and `newer` into a combined sorted table at `out`,
/// keeping the newer table's value wherever a key appears in both.
pub fn merge_tables(
    older: &Path,
    newer: &Path,
    out: &Path,
    read_buffer_size: usize,
) -> Result<(), CompactionError> {
    debug!(
        older = %older.display(),
        newer = %newer.display(),
        out = %out.display(),
        "merging tables"
    );

    let mut older_scan =
        EntryScanner::new(BufReader::new(File::open(older)?), read_buffer_size).peekable();
    let mut newer_scan =
        EntryScanner::new(BufReader::new(File::open(newer)?), read_buffer_size).peekable();

    let mut writer = BufWriter::new(File::create(out)?);

    loop {
        match (older_scan.peek(), newer_scan.peek()) {
            (None, None) => break,
            (Some(_), None) => emit(&mut older_scan, &mut writer)?,
            (None, Some(_)) => emit(&mut newer_scan, &mut writer)?,
            (Some(o), Some(n)) => match o.key.cmp(&n.key) {
                std::cmp::Ordering::Less => emit(&mut older_scan, &mut writer)?,
                std::cmp::Ordering::Greater => emit(&mut newer_scan, &mut writer)?,
                std::cmp::Ordering::Equal => {
                    // Newest value wins; the older duplicate is dropped.
                    older_scan.next();
                    emit(&mut newer_scan, &mut writer)?;
                }
            },
        }
    }

    writer.flush()?;
    writer.get_ref().sync_all()?;
    Ok(())
}

/// Writes the next entry of `scan` to `writer`.
fn emit<R: io::Read, W: Write>(
    scan: &mut Peekable<EntryScanner<R>>,
    writer: &mut W,
) -> Result<(), CompactionError> {
    if let Some(entry) = scan.next() {
        entry.write_to(writer)?;
    }
    Ok(())
}

// ------------------------------------------------------------------------------------------------
// One round
// ------------------------------------------------------------------------------------------------

/// A completed merge awaiting installation by the engine.
#[derive(Debug)]
pub struct CompactionJob {
    /// The selected input pair.
    pub pair: CompactionPair,

    /// Merged output sitting in the scratch directory.
    pub merged_tmp: PathBuf,
}

/// Runs one selection + merge round.
///
/// Returns `Ok(None)` when there is nothing to compact. The caller
/// installs the returned job: rename the scratch file over the newer
/// input, drop the older input.
pub fn compact(
    sstable_dir: &Path,
    tmp_dir: &Path,
    minimum_files: usize,
    max_file_size: u64,
    read_buffer_size: usize,
) -> Result<Option<CompactionJob>, CompactionError> {
    let Some(pair) = select_pair(sstable_dir, minimum_files, max_file_size)? else {
        return Ok(None);
    };

    fs::create_dir_all(tmp_dir)?;
    let merged_tmp = tmp_dir.join(
        pair.newer
            .path
            .file_name()
            .expect("table path has a file name"),
    );

    merge_tables(&pair.older.path, &pair.newer.path, &merged_tmp, read_buffer_size)?;

    info!(
        older = %pair.older.path.display(),
        newer = %pair.newer.path.display(),
        merged = %merged_tmp.display(),
        "compaction merge complete"
    );

    Ok(Some(CompactionJob { pair, merged_tmp }))
}
