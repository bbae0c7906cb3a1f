//! Small filesystem helpers shared by the engine's recovery path.

use std::{
    fs, io,
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};

use tracing::warn;

/// File extension of frozen memtable logs.
pub(crate) const PENDING_LOG_EXT: &str = "aolog";

/// One frozen memtable log found on disk.
#[derive(Debug)]
pub(crate) struct PendingLog {
    pub path: PathBuf,
    pub timestamp: u64,
}

/// Lists every `*.aolog` file under `dir`, newest first (timestamp
/// descending). Files whose stem does not parse as an integer are
/// skipped with a warning.
pub(crate) fn list_pending_logs(dir: &Path) -> io::Result<Vec<PendingLog>> {
    let mut logs = Vec::new();

    for dir_entry in fs::read_dir(dir)? {
        let path = dir_entry?.path();

        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(PENDING_LOG_EXT) {
            continue;
        }

        let parsed = path
            .file_stem()
            .and_then(|s| s.to_str())
            .and_then(|s| s.parse::<u64>().ok());
        let Some(timestamp) = parsed else {
            warn!(path = %path.display(), "skipping pending log with non-numeric name");
            continue;
        };

        logs.push(PendingLog { path, timestamp });
    }

    logs.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    Ok(logs)
}

/// Wall-clock nanoseconds since the UNIX epoch.
pub(crate) fn unix_nanos() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system clock before UNIX epoch")
        .as_nanos() as u64
}
