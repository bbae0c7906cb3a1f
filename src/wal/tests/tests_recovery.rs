#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::io::Write;

    use tempfile::TempDir;

    use crate::codec::Entry;
    use crate::wal::Wal;

    #[test]
    fn test_replay_drops_truncated_tail() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.aolog");

        let wal = Wal::open(&path).unwrap();
        wal.append(&Entry::new(b"whole".to_vec(), b"record".to_vec()))
            .unwrap();
        wal.sync().unwrap();
        drop(wal);

        // Simulate a crash mid-append: write only part of the next record.
        let torn = Entry::new(b"torn".to_vec(), b"half-written".to_vec()).encode();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&torn[..torn.len() / 2]).unwrap();
        drop(file);

        let wal = Wal::open(&path).unwrap();
        let replayed: Vec<Entry> = wal.replay().unwrap().collect();
        assert_eq!(
            replayed,
            vec![Entry::new(b"whole".to_vec(), b"record".to_vec())],
            "only the intact prefix is replayed"
        );
    }

    #[test]
    fn test_replay_of_header_only_tail() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.aolog");

        // Exactly one header announcing a payload that never arrived.
        let encoded = Entry::new(b"k".to_vec(), b"v".to_vec()).encode();
        std::fs::write(&path, &encoded[..9]).unwrap();

        let wal = Wal::open(&path).unwrap();
        let replayed: Vec<Entry> = wal.replay().unwrap().collect();
        assert!(replayed.is_empty());
    }

    #[test]
    fn test_append_resumes_after_recovery() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.aolog");

        {
            let wal = Wal::open(&path).unwrap();
            wal.append(&Entry::new(b"a".to_vec(), b"1".to_vec())).unwrap();
        }

        // New writes after reopen land after the surviving records.
        let wal = Wal::open(&path).unwrap();
        wal.append(&Entry::new(b"b".to_vec(), b"2".to_vec())).unwrap();

        let keys: Vec<Vec<u8>> = wal.replay().unwrap().map(|e| e.key).collect();
        assert_eq!(keys, vec![b"a".to_vec(), b"b".to_vec()]);
    }
}
