//! LSM Storage Engine
//!
//! The top-level coordinator tying the write buffer, flush pipeline,
//! on-disk tables, and background maintenance together behind a
//! four-call surface: [`Engine::start`], [`Engine::set`],
//! [`Engine::get`], [`Engine::stop`].
//!
//! ## Design Overview
//!
//! Data lives in three tiers, queried newest-first:
//!
//! 1. **Active memtable** — the sorted in-memory buffer backed by
//!    `log.aolog`.
//! 2. **Flush queue** — frozen memtables awaiting persistence, newest
//!    first, each backed by a log under `aolog_tf/`.
//! 3. **SSTables** — immutable sorted files under `sstables/`, newest
//!    first.
//!
//! A `set` freezes the active memtable once it holds more than
//! [`EngineConfig::max_memtable_size`] keys: the memtable gets a freeze
//! timestamp, its log is renamed into `aolog_tf/`, a fresh memtable
//! takes over `log.aolog`, and the frozen one joins the queue head. A
//! `get` probes the tiers in order and returns the first hit.
//!
//! ## Background loops
//!
//! The **flusher** drains the queue oldest-first every ~100 ms, turning
//! each frozen memtable into an SSTable and deleting its log. The
//! **compactor** (optional) repeatedly merges the two oldest
//! small-enough tables, sleeping only when there is nothing to merge.
//! Both loops watch a running flag and exit within one sleep interval
//! of [`Engine::stop`].
//!
//! ## Concurrency Model
//!
//! Per engine instance: one `RwLock` over the active memtable plus the
//! flush queue (so a freeze publishes the frozen memtable to readers
//! atomically), one `RwLock` over the table list (reads fan out under
//! the read guard; flush inserts and compaction swaps take the write
//! guard), and a mutex serializing compaction rounds. Engine instances
//! share nothing, so several stores can run in one process.
//!
//! ## Crash recovery
//!
//! `start` rebuilds everything from the directory: every
//! `sstables/*.sstable` is reopened (newest first), every
//! `aolog_tf/*.aolog` becomes a frozen memtable in the queue, and
//! `log.aolog` is replayed into the active memtable. The `tmp/`
//! scratch directory is wiped — a half-written merge never becomes
//! visible.
//!
//! ## Durability & errors
//!
//! A `set` is durable once it returns (the WAL append happened-before
//! the in-memory update). Infrastructure failures on the write path
//! are fatal by policy — the engine panics rather than acknowledge a
//! write it could not log. `set` and `get` return no errors; `get`
//! signals absence with `None`.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

pub(crate) mod utils;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::PathBuf,
    sync::{
        Arc, Mutex, RwLock,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    thread::{self, JoinHandle},
    time::Duration,
};

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::compaction::{self, CompactionJob};
use crate::flush::Flusher;
use crate::memtable::{Memtable, MemtableError};
use crate::sstable::{self, SsTable, SsTableError};

// ------------------------------------------------------------------------------------------------
// Constants
// ------------------------------------------------------------------------------------------------

/// Write-ahead log of the active memtable, directly under the work dir.
pub const ACTIVE_LOG_NAME: &str = "log.aolog";

/// Directory of frozen-but-not-yet-flushed memtable logs.
pub const PENDING_LOG_DIR: &str = "aolog_tf";

/// Directory of persisted tables.
pub const SSTABLE_DIR: &str = "sstables";

/// Scratch directory for in-flight compaction output; wiped on start.
pub const TMP_DIR: &str = "tmp";

/// Single-instance lock file.
pub const LOCK_FILE_NAME: &str = "mdb.pid";

/// Idle sleep between background loop iterations.
const LOOP_IDLE_SLEEP: Duration = Duration::from_millis(100);

const DEFAULT_MAX_MEMTABLE_SIZE: usize = 256;
const DEFAULT_MAX_COMPACT_FILE_SIZE: u64 = 10 * 1024 * 1024;
const DEFAULT_MINIMUM_FILES_TO_COMPACT: usize = 2;
const DEFAULT_SSTABLE_READ_BUFFER_SIZE: usize = 4096;

const LOCK_POISONED: &str = "engine lock poisoned";

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// Errors that can occur while starting an engine.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Underlying filesystem I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error restoring or creating a memtable.
    #[error("memtable error: {0}")]
    Memtable(#[from] MemtableError),

    /// Error opening an SSTable.
    #[error("SSTable error: {0}")]
    SsTable(#[from] SsTableError),

    /// Another engine instance owns the work directory.
    #[error("lock file already exists: {}", .0.display())]
    AlreadyLocked(PathBuf),

    /// Internal invariant violation (poisoned lock, unexpected state).
    #[error("internal error: {0}")]
    Internal(String),
}

// ------------------------------------------------------------------------------------------------
// Configuration
// ------------------------------------------------------------------------------------------------

/// Configuration for an [`Engine`] instance, passed to
/// [`Engine::start`]. Zero values for the numeric fields select the
/// documented defaults.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    /// Root directory for all engine state.
    pub work_dir: PathBuf,

    /// Whether to run the background compaction loop.
    pub compaction_enabled: bool,

    /// Minimum number of eligible tables before a merge runs.
    /// Zero selects the default of 2.
    pub minimum_files_to_compact: usize,

    /// Distinct-key count past which the active memtable is frozen.
    /// Zero selects the default of 256.
    pub max_memtable_size: usize,

    /// Tables at or above this many bytes are never merge inputs.
    /// Zero selects the default of 10 MiB.
    pub max_compact_file_size: u64,

    /// Read-buffer granularity for table scans and sparse-index
    /// density. Zero selects the default of 4096.
    pub sstable_read_buffer_size: usize,
}

/// Fully resolved configuration: defaults applied, paths derived.
#[derive(Debug)]
struct Settings {
    work_dir: PathBuf,
    compaction_enabled: bool,
    minimum_files_to_compact: usize,
    max_memtable_size: usize,
    max_compact_file_size: u64,
    sstable_read_buffer_size: usize,

    active_log_path: PathBuf,
    pending_log_dir: PathBuf,
    sstable_dir: PathBuf,
    tmp_dir: PathBuf,
    lock_file_path: PathBuf,
}

impl EngineConfig {
    fn resolve(self) -> Settings {
        let work_dir = self.work_dir;

        let defaulted = |value: usize, default: usize| if value == 0 { default } else { value };

        Settings {
            compaction_enabled: self.compaction_enabled,
            minimum_files_to_compact: defaulted(
                self.minimum_files_to_compact,
                DEFAULT_MINIMUM_FILES_TO_COMPACT,
            ),
            max_memtable_size: defaulted(self.max_memtable_size, DEFAULT_MAX_MEMTABLE_SIZE),
            max_compact_file_size: if self.max_compact_file_size == 0 {
                DEFAULT_MAX_COMPACT_FILE_SIZE
            } else {
                self.max_compact_file_size
            },
            sstable_read_buffer_size: defaulted(
                self.sstable_read_buffer_size,
                DEFAULT_SSTABLE_READ_BUFFER_SIZE,
            ),
            active_log_path: work_dir.join(ACTIVE_LOG_NAME),
            pending_log_dir: work_dir.join(PENDING_LOG_DIR),
            sstable_dir: work_dir.join(SSTABLE_DIR),
            tmp_dir: work_dir.join(TMP_DIR),
            lock_file_path: work_dir.join(LOCK_FILE_NAME),
            work_dir,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Engine state
// ------------------------------------------------------------------------------------------------

/// Snapshot of engine statistics returned by [`Engine::stats`].
#[derive(Debug)]
pub struct EngineStats {
    /// Frozen memtables awaiting flush.
    pub flush_queue_len: usize,

    /// Live tables on disk.
    pub sstables_count: usize,

    /// Per-table file sizes, newest first.
    pub table_sizes: Vec<u64>,

    /// Sum of all table file sizes.
    pub total_table_bytes: u64,
}

/// The memtable tiers, guarded together so a freeze swaps the active
/// slot and publishes to the flush queue under one write guard.
struct MemtableTiers {
    /// Accepts all writes.
    active: Memtable,

    /// Frozen memtables, newest first.
    flush_queue: Vec<Arc<Memtable>>,
}

struct EngineShared {
    settings: Settings,

    /// Active memtable + flush queue.
    tiers: RwLock<MemtableTiers>,

    /// Live tables, newest first.
    tables: RwLock<Vec<Arc<SsTable>>>,

    /// Cleared by [`Engine::stop`]; background loops watch it.
    running: AtomicBool,

    /// Highest freeze timestamp handed out; freezes in the same
    /// nanosecond get `previous + 1` so filenames never collide.
    last_freeze_ts: AtomicU64,

    /// Serializes compaction rounds.
    compaction_lock: Mutex<()>,

    /// Background thread handles, joined by [`Engine::stop`].
    workers: Mutex<Vec<JoinHandle<()>>>,
}

/// The storage engine handle.
///
/// Created by [`Engine::start`]; share it across threads behind an
/// `Arc` if needed. Dropping the handle stops the engine if
/// [`Engine::stop`] was not called.
pub struct Engine {
    shared: Arc<EngineShared>,
}

// ------------------------------------------------------------------------------------------------
// Lifecycle
// ------------------------------------------------------------------------------------------------

impl Engine {
    /// Starts an engine over `config.work_dir`.
    ///
    /// Creates the directory layout, acquires the single-instance lock
    /// file, wipes compaction scratch space, restores all persistent
    /// state (tables, frozen memtables, active log), and spawns the
    /// background loops.
    pub fn start(config: EngineConfig) -> Result<Self, EngineError> {
        let settings = config.resolve();
        info!(work_dir = %settings.work_dir.display(), "starting storage engine");

        for dir in [
            &settings.sstable_dir,
            &settings.pending_log_dir,
            &settings.tmp_dir,
        ] {
            fs::create_dir_all(dir)?;
        }

        Self::acquire_lock_file(&settings)?;

        // A crash can leave half-written merge output behind; none of
        // it is referenced by anything, so clear it wholesale.
        fs::remove_dir_all(&settings.tmp_dir)?;
        fs::create_dir_all(&settings.tmp_dir)?;

        let tables = Self::restore_tables(&settings)?;
        let flush_queue = Self::restore_flush_queue(&settings)?;
        let active = Memtable::open(&settings.active_log_path)?;

        // Never hand out a freeze timestamp at or below an existing
        // file's; restored state takes part in the monotonic order.
        let max_restored = flush_queue
            .iter()
            .map(|m| m.timestamp())
            .chain(tables.iter().map(|t| t.timestamp()))
            .max()
            .unwrap_or(0);

        let engine = Self {
            shared: Arc::new(EngineShared {
                settings,
                tiers: RwLock::new(MemtableTiers {
                    active,
                    flush_queue,
                }),
                tables: RwLock::new(tables),
                running: AtomicBool::new(true),
                last_freeze_ts: AtomicU64::new(max_restored),
                compaction_lock: Mutex::new(()),
                workers: Mutex::new(Vec::new()),
            }),
        };

        engine.spawn_workers();
        info!("storage engine ready");
        Ok(engine)
    }

    /// Stops the engine: releases the lock file, clears the running
    /// flag, and joins the background loops (each exits within one
    /// sleep interval). Pending un-flushed data stays in its logs and
    /// is recovered on the next start.
    pub fn stop(&self) {
        info!("stopping storage engine");

        match fs::remove_file(&self.shared.settings.lock_file_path) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!("lock file does not exist, can't remove it");
            }
            Err(e) => {
                error!(
                    path = %self.shared.settings.lock_file_path.display(),
                    "can't remove lock file: {e}"
                );
            }
        }

        self.shared.running.store(false, Ordering::SeqCst);

        let workers: Vec<JoinHandle<()>> = {
            let mut guard = self.shared.workers.lock().expect(LOCK_POISONED);
            guard.drain(..).collect()
        };
        for worker in workers {
            if let Err(panic) = worker.join() {
                std::panic::resume_unwind(panic);
            }
        }

        info!("storage engine stopped");
    }

    /// True until [`Engine::stop`] is called.
    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::SeqCst)
    }

    fn acquire_lock_file(settings: &Settings) -> Result<(), EngineError> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&settings.lock_file_path)
        {
            Ok(mut file) => {
                let _ = write!(file, "{}", std::process::id());
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                error!(
                    path = %settings.lock_file_path.display(),
                    "can't start: lock file already exists"
                );
                Err(EngineError::AlreadyLocked(settings.lock_file_path.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Reopens every table under `sstables/`, newest first. A table
    /// that fails to open is logged and skipped.
    fn restore_tables(settings: &Settings) -> Result<Vec<Arc<SsTable>>, EngineError> {
        let mut tables = Vec::new();

        for table_file in sstable::list_tables(&settings.sstable_dir)? {
            match SsTable::open(&table_file.path, settings.sstable_read_buffer_size) {
                Ok(table) => tables.push(Arc::new(table)),
                Err(e) => {
                    error!(
                        path = %table_file.path.display(),
                        "can't restore sstable, skipping: {e}"
                    );
                }
            }
        }

        debug!(count = tables.len(), "restored sstables");
        Ok(tables)
    }

    /// Rebuilds the flush queue from `aolog_tf/`, newest first, each
    /// memtable tagged with the timestamp from its filename.
    fn restore_flush_queue(settings: &Settings) -> Result<Vec<Arc<Memtable>>, EngineError> {
        let mut queue = Vec::new();

        for pending in utils::list_pending_logs(&settings.pending_log_dir)? {
            let mut memtable = Memtable::open(&pending.path)?;
            memtable.set_timestamp(pending.timestamp);
            queue.push(Arc::new(memtable));
        }

        debug!(count = queue.len(), "restored flush queue");
        Ok(queue)
    }

    fn spawn_workers(&self) {
        let mut workers = self.shared.workers.lock().expect(LOCK_POISONED);

        let shared = Arc::clone(&self.shared);
        workers.push(thread::spawn(move || Self::flusher_loop(&shared)));

        if self.shared.settings.compaction_enabled {
            let shared = Arc::clone(&self.shared);
            workers.push(thread::spawn(move || Self::compactor_loop(&shared)));
        } else {
            debug!("compaction disabled");
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Write path
// ------------------------------------------------------------------------------------------------

impl Engine {
    /// Stores `value` under `key`. Durable when this returns.
    ///
    /// # Panics
    ///
    /// On write-ahead log or freeze I/O failure — the engine never
    /// acknowledges a write it could not persist.
    pub fn set(&self, key: &[u8], value: &[u8]) {
        let mut tiers = self.shared.tiers.write().expect(LOCK_POISONED);

        if tiers.active.len() > self.shared.settings.max_memtable_size {
            debug!(
                keys = tiers.active.len(),
                "active memtable over threshold, freezing"
            );
            if let Err(e) = self.freeze_active(&mut tiers) {
                error!("can't freeze active memtable: {e}");
                panic!("memtable freeze failed: {e}");
            }
        }

        if let Err(e) = tiers.active.set(key, value) {
            error!("can't append to write-ahead log: {e}");
            panic!("write failed: {e}");
        }
    }

    /// Freezes the active memtable and swaps in a fresh one.
    ///
    /// Runs under the tier write guard, so the frozen memtable appears
    /// in the flush queue in the same instant the new active appears —
    /// no reader can observe it in neither tier.
    fn freeze_active(&self, tiers: &mut MemtableTiers) -> Result<(), EngineError> {
        let timestamp = self.next_freeze_timestamp();
        let pending_path = self
            .shared
            .settings
            .pending_log_dir
            .join(format!("{timestamp}.aolog"));

        tiers.active.rename_wal(&pending_path)?;
        tiers.active.set_timestamp(timestamp);

        let fresh = Memtable::open(&self.shared.settings.active_log_path)?;
        let frozen = std::mem::replace(&mut tiers.active, fresh);
        tiers.flush_queue.insert(0, Arc::new(frozen));

        info!(timestamp, queued = tiers.flush_queue.len(), "froze memtable");
        Ok(())
    }

    /// Next freeze timestamp: wall-clock nanoseconds, bumped past the
    /// previous one on clock ties or rewinds.
    fn next_freeze_timestamp(&self) -> u64 {
        let now = utils::unix_nanos();
        let last = self.shared.last_freeze_ts.load(Ordering::SeqCst);
        let next = now.max(last + 1);
        self.shared.last_freeze_ts.store(next, Ordering::SeqCst);
        next
    }
}

// ------------------------------------------------------------------------------------------------
// Read path
// ------------------------------------------------------------------------------------------------

impl Engine {
    /// Returns the most recent value written for `key`, or `None`.
    ///
    /// Probes the active memtable, then the flush queue newest-first,
    /// then every table concurrently with the newest match winning.
    pub fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        {
            let tiers = self.shared.tiers.read().expect(LOCK_POISONED);

            if let Some(value) = tiers.active.get(key) {
                return Some(value);
            }

            for frozen in &tiers.flush_queue {
                if let Some(value) = frozen.get(key) {
                    return Some(value);
                }
            }
        }

        self.get_from_tables(key)
    }

    /// Probes every live table in parallel; the hit with the smallest
    /// list index (the newest table) wins.
    fn get_from_tables(&self, key: &[u8]) -> Option<Vec<u8>> {
        let tables = self.shared.tables.read().expect(LOCK_POISONED);

        match tables.len() {
            0 => return None,
            1 => return tables[0].get(key),
            _ => {}
        }

        thread::scope(|scope| {
            let probes: Vec<_> = tables
                .iter()
                .map(|table| {
                    let table = Arc::clone(table);
                    scope.spawn(move || table.get(key))
                })
                .collect();

            // Joining in list order, the first hit is the newest.
            let mut result = None;
            for probe in probes {
                match probe.join() {
                    Ok(Some(value)) if result.is_none() => result = Some(value),
                    Ok(_) => {}
                    Err(panic) => std::panic::resume_unwind(panic),
                }
            }
            result
        })
    }

    /// Returns a snapshot of engine statistics.
    pub fn stats(&self) -> EngineStats {
        let flush_queue_len = {
            let tiers = self.shared.tiers.read().expect(LOCK_POISONED);
            tiers.flush_queue.len()
        };

        let tables = self.shared.tables.read().expect(LOCK_POISONED);
        let table_sizes: Vec<u64> = tables.iter().map(|t| t.file_size()).collect();
        let total_table_bytes = table_sizes.iter().sum();

        EngineStats {
            flush_queue_len,
            sstables_count: tables.len(),
            table_sizes,
            total_table_bytes,
        }
    }
}

// ------------------------------------------------------------------------------------------------
// Background loops
// ------------------------------------------------------------------------------------------------

impl Engine {
    fn flusher_loop(shared: &EngineShared) {
        debug!("flusher loop started");
        let flusher = Flusher::new(&shared.settings.sstable_dir);

        while shared.running.load(Ordering::SeqCst) {
            Self::drain_flush_queue(shared, &flusher);
            thread::sleep(LOOP_IDLE_SLEEP);
        }

        debug!("flusher loop stopped");
    }

    /// Flushes every queued memtable, oldest first, so inserting each
    /// new table at the list head keeps the list newest-first.
    fn drain_flush_queue(shared: &EngineShared, flusher: &Flusher) {
        loop {
            // Only this loop pops and only freezes prepend, so the tail
            // entry stays valid after the guard is released.
            let memtable = {
                let tiers = shared.tiers.read().expect(LOCK_POISONED);
                match tiers.flush_queue.last() {
                    Some(memtable) => Arc::clone(memtable),
                    None => return,
                }
            };

            let path = flusher.flush(&memtable);

            let table = match SsTable::open(&path, shared.settings.sstable_read_buffer_size) {
                Ok(table) => Arc::new(table),
                Err(e) => {
                    error!(path = %path.display(), "can't open flushed sstable: {e}");
                    panic!("flush produced unreadable table {}: {e}", path.display());
                }
            };

            // Publish the table before retiring the queue entry; a
            // concurrent reader finds the data in one tier or the
            // other, never in neither.
            {
                let mut tables = shared.tables.write().expect(LOCK_POISONED);
                // A crash between table write and log delete restores
                // the same timestamp as both a table and a queued
                // memtable; the re-flush supersedes the stale handle.
                tables.retain(|t| t.timestamp() != table.timestamp());
                tables.insert(0, table);
            }
            {
                let mut tiers = shared.tiers.write().expect(LOCK_POISONED);
                tiers.flush_queue.pop();
            }

            info!(table = %path.display(), "flushed memtable to sstable");
        }
    }

    fn compactor_loop(shared: &EngineShared) {
        debug!("compaction loop started");

        while shared.running.load(Ordering::SeqCst) {
            // After a successful merge, retry immediately: the result
            // may itself be mergeable with the next oldest table.
            if !Self::run_compaction_round(shared) {
                thread::sleep(LOOP_IDLE_SLEEP);
            }
        }

        debug!("compaction loop stopped");
    }

    /// Runs one selection + merge + install round. Returns whether a
    /// merge was installed.
    fn run_compaction_round(shared: &EngineShared) -> bool {
        let _round = shared.compaction_lock.lock().expect(LOCK_POISONED);
        let settings = &shared.settings;

        let job = match compaction::compact(
            &settings.sstable_dir,
            &settings.tmp_dir,
            settings.minimum_files_to_compact,
            settings.max_compact_file_size,
            settings.sstable_read_buffer_size,
        ) {
            Ok(Some(job)) => job,
            Ok(None) => return false,
            Err(e) => {
                error!("compaction round failed: {e}");
                return false;
            }
        };

        Self::install_compaction(shared, job)
    }

    /// Swaps a completed merge into the live table list: rename the
    /// scratch file over the newer input, rebind that list entry to
    /// the prebuilt merged index, drop the older input.
    fn install_compaction(shared: &EngineShared, job: CompactionJob) -> bool {
        // Index construction reads the whole merged file; do it before
        // taking the write guard.
        let staged = match SsTable::open(&job.merged_tmp, shared.settings.sstable_read_buffer_size)
        {
            Ok(staged) => staged,
            Err(e) => {
                error!(path = %job.merged_tmp.display(), "can't open merged table: {e}");
                let _ = fs::remove_file(&job.merged_tmp);
                return false;
            }
        };

        let mut tables = shared.tables.write().expect(LOCK_POISONED);

        let newer_idx = tables
            .iter()
            .position(|t| t.timestamp() == job.pair.newer.timestamp);
        let older_idx = tables
            .iter()
            .position(|t| t.timestamp() == job.pair.older.timestamp);
        let (Some(newer_idx), Some(older_idx)) = (newer_idx, older_idx) else {
            drop(tables);
            warn!("compaction inputs no longer live, discarding merge");
            let _ = fs::remove_file(&job.merged_tmp);
            return false;
        };

        if let Err(e) = fs::rename(&job.merged_tmp, &job.pair.newer.path) {
            drop(tables);
            error!(
                from = %job.merged_tmp.display(),
                to = %job.pair.newer.path.display(),
                "can't move merged table into place: {e}"
            );
            let _ = fs::remove_file(&job.merged_tmp);
            return false;
        }

        let merged = staged
            .moved_to(&job.pair.newer.path)
            .expect("merged table keeps its numeric name");
        tables[newer_idx] = Arc::new(merged);
        tables.remove(older_idx);
        drop(tables);

        if let Err(e) = fs::remove_file(&job.pair.older.path) {
            error!(path = %job.pair.older.path.display(), "can't remove merged input: {e}");
        }

        info!(
            kept = %job.pair.newer.path.display(),
            removed = %job.pair.older.path.display(),
            "compaction completed"
        );
        true
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.is_running() {
            self.stop();
        }
    }
}
