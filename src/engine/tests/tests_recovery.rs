#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::engine::{ACTIVE_LOG_NAME, Engine};
    use crate::engine::tests::helpers::{
        memtable_only_config, table_path, write_entries,
    };

    #[test]
    fn test_active_log_replay_shadows_older_table() {
        let tmp = TempDir::new().unwrap();

        // An un-flushed active log from a previous run plus an older
        // table holding stale values for the same keys.
        write_entries(
            &tmp.path().join(ACTIVE_LOG_NAME),
            &[(b"k1", b"v1"), (b"k2", b"v2")],
        );
        write_entries(&table_path(tmp.path(), 0), &[(b"k1", b"0"), (b"k2", b"0")]);

        let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();

        assert_eq!(engine.get(b"k1"), Some(b"v1".to_vec()));
        assert_eq!(engine.get(b"k2"), Some(b"v2".to_vec()));

        engine.stop();
    }

    #[test]
    fn test_restart_preserves_memtable_writes() {
        let tmp = TempDir::new().unwrap();

        {
            let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();
            engine.set(b"k1", b"v1");
            engine.set(b"k2", b"v2");
            engine.set(b"k1", b"v1_final");
            engine.stop();
        }

        let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();
        assert_eq!(engine.get(b"k1"), Some(b"v1_final".to_vec()));
        assert_eq!(engine.get(b"k2"), Some(b"v2".to_vec()));

        engine.stop();
    }

    #[test]
    fn test_restart_after_torn_log_tail() {
        let tmp = TempDir::new().unwrap();

        {
            let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();
            engine.set(b"acknowledged", b"safe");
            engine.stop();
        }

        // Simulate a crash mid-append on the next run.
        let torn = crate::codec::Entry::new(b"never".to_vec(), b"acked".to_vec()).encode();
        let log_path = tmp.path().join(ACTIVE_LOG_NAME);
        let mut existing = std::fs::read(&log_path).unwrap();
        existing.extend_from_slice(&torn[..torn.len() - 4]);
        std::fs::write(&log_path, existing).unwrap();

        let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();
        assert_eq!(engine.get(b"acknowledged"), Some(b"safe".to_vec()));
        assert_eq!(engine.get(b"never"), None);

        engine.stop();
    }

    #[test]
    fn test_restart_skips_non_numeric_table() {
        let tmp = TempDir::new().unwrap();

        write_entries(&table_path(tmp.path(), 1), &[(b"k", b"v")]);
        // A table whose stem is not numeric cannot be ordered and is
        // skipped during restore.
        write_entries(
            &tmp.path().join("sstables").join("corrupt.sstable"),
            &[(b"x", b"y")],
        );

        let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();
        assert_eq!(engine.get(b"k"), Some(b"v".to_vec()));
        assert_eq!(engine.stats().sstables_count, 1);

        engine.stop();
    }

    #[test]
    fn test_restart_with_empty_work_dir_layout() {
        let tmp = TempDir::new().unwrap();

        {
            let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();
            engine.stop();
        }

        // Directory layout exists but holds no data; a second start is
        // a clean empty store.
        let engine = Engine::start(memtable_only_config(tmp.path())).unwrap();
        assert_eq!(engine.get(b"anything"), None);
        assert_eq!(engine.stats().sstables_count, 0);
        assert_eq!(engine.stats().flush_queue_len, 0);

        engine.stop();
    }
}
