#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use crate::compaction::select_pair;
    use crate::sstable::tests::helpers::write_table;

    #[test]
    fn test_no_pair_below_minimum_count() {
        let tmp = TempDir::new().unwrap();
        write_table(&tmp.path().join("1.sstable"), &[(b"k", b"v")]);

        let pair = select_pair(tmp.path(), 2, 1 << 20).unwrap();
        assert!(pair.is_none());
    }

    #[test]
    fn test_picks_the_two_oldest_tables() {
        let tmp = TempDir::new().unwrap();
        for ts in [10u64, 20, 30, 40] {
            write_table(&tmp.path().join(format!("{ts}.sstable")), &[(b"k", b"v")]);
        }

        let pair = select_pair(tmp.path(), 2, 1 << 20).unwrap().unwrap();
        assert_eq!(pair.older.timestamp, 10);
        assert_eq!(pair.newer.timestamp, 20);
    }

    #[test]
    fn test_oversized_tables_are_ineligible() {
        let tmp = TempDir::new().unwrap();

        // The two oldest tables are large; selection must skip them.
        let big_value = vec![b'x'; 256];
        write_table(&tmp.path().join("10.sstable"), &[(b"k", &big_value)]);
        write_table(&tmp.path().join("20.sstable"), &[(b"k", &big_value)]);
        write_table(&tmp.path().join("30.sstable"), &[(b"k", b"v")]);
        write_table(&tmp.path().join("40.sstable"), &[(b"k", b"v")]);

        let pair = select_pair(tmp.path(), 2, 100).unwrap().unwrap();
        assert_eq!(pair.older.timestamp, 30);
        assert_eq!(pair.newer.timestamp, 40);
    }

    #[test]
    fn test_oversized_tables_reduce_eligible_count() {
        let tmp = TempDir::new().unwrap();

        let big_value = vec![b'x'; 256];
        write_table(&tmp.path().join("10.sstable"), &[(b"k", &big_value)]);
        write_table(&tmp.path().join("20.sstable"), &[(b"k", b"v")]);

        // Two files on disk, only one eligible.
        let pair = select_pair(tmp.path(), 2, 100).unwrap();
        assert!(pair.is_none());
    }

    #[test]
    fn test_size_at_ceiling_is_ineligible() {
        let tmp = TempDir::new().unwrap();

        // 9 + 1 + 1 = 11 bytes exactly; ceiling of 11 excludes it.
        write_table(&tmp.path().join("10.sstable"), &[(b"k", b"v")]);
        write_table(&tmp.path().join("20.sstable"), &[(b"k", b"v")]);

        assert!(select_pair(tmp.path(), 2, 11).unwrap().is_none());
        assert!(select_pair(tmp.path(), 2, 12).unwrap().is_some());
    }
}
