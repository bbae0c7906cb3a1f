use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing_subscriber::EnvFilter;

use crate::codec::Entry;
use crate::engine::{EngineConfig, PENDING_LOG_DIR, SSTABLE_DIR};

/// Initialize tracing subscriber controlled by `RUST_LOG` env var.
/// Safe to call multiple times — only the first call takes effect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Config that never freezes the memtable and never compacts.
pub fn memtable_only_config(work_dir: &Path) -> EngineConfig {
    init_tracing();
    EngineConfig {
        work_dir: work_dir.to_path_buf(),
        max_memtable_size: 1_000_000,
        ..EngineConfig::default()
    }
}

/// Tiny memtable threshold — freezes (and therefore flushes) after a
/// handful of keys. Compaction stays off.
pub fn small_memtable_config(work_dir: &Path) -> EngineConfig {
    init_tracing();
    EngineConfig {
        work_dir: work_dir.to_path_buf(),
        max_memtable_size: 2,
        ..EngineConfig::default()
    }
}

/// Compaction on, eager thresholds, memtable big enough to stay quiet.
pub fn compacting_config(work_dir: &Path) -> EngineConfig {
    init_tracing();
    EngineConfig {
        work_dir: work_dir.to_path_buf(),
        max_memtable_size: 1_000_000,
        compaction_enabled: true,
        minimum_files_to_compact: 2,
        ..EngineConfig::default()
    }
}

/// Polls `condition` every 10 ms until it holds or `timeout` elapses.
/// Background-loop effects land within one ~100 ms sleep interval, so
/// a couple of seconds is a generous bound.
pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    condition()
}

/// Writes a binary entry file at `path` holding `pairs` in order.
/// Table fixtures must be passed in ascending key order.
pub fn write_entries(path: &Path, pairs: &[(&[u8], &[u8])]) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    let mut file = File::create(path).unwrap();
    for (key, value) in pairs {
        Entry::new(key.to_vec(), value.to_vec())
            .write_to(&mut file)
            .unwrap();
    }
    file.sync_all().unwrap();
}

/// Path of a fixture table `<ts>.sstable` under the work dir.
pub fn table_path(work_dir: &Path, timestamp: u64) -> PathBuf {
    work_dir.join(SSTABLE_DIR).join(format!("{timestamp}.sstable"))
}

/// Path of a fixture pending log `<ts>.aolog` under the work dir.
pub fn pending_log_path(work_dir: &Path, timestamp: u64) -> PathBuf {
    work_dir
        .join(PENDING_LOG_DIR)
        .join(format!("{timestamp}.aolog"))
}
