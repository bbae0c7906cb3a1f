use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing_subscriber::EnvFilter;

use crate::codec::Entry;

/// Initialize tracing subscriber controlled by `RUST_LOG` env var.
/// Safe to call multiple times — only the first call takes effect.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Writes a table file at `path` holding `pairs` in the given order.
/// Callers are responsible for passing pairs in ascending key order.
pub fn write_table(path: &Path, pairs: &[(&[u8], &[u8])]) {
    let mut file = File::create(path).unwrap();
    for (key, value) in pairs {
        Entry::new(key.to_vec(), value.to_vec())
            .write_to(&mut file)
            .unwrap();
    }
    file.sync_all().unwrap();
}
