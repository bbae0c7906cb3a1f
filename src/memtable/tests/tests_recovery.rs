#[cfg(test)]
mod tests {
    use std::fs::OpenOptions;
    use std::io::Write;

    use tempfile::TempDir;

    use crate::codec::Entry;
    use crate::memtable::Memtable;

    #[test]
    fn test_open_replays_existing_log() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.aolog");

        {
            let mut memtable = Memtable::open(&path).unwrap();
            memtable.set(b"k1", b"v1").unwrap();
            memtable.set(b"k2", b"v2").unwrap();
        }

        let recovered = Memtable::open(&path).unwrap();
        assert_eq!(recovered.len(), 2);
        assert_eq!(recovered.get(b"k1"), Some(b"v1".to_vec()));
        assert_eq!(recovered.get(b"k2"), Some(b"v2".to_vec()));
    }

    #[test]
    fn test_replay_applies_overwrites_in_order() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.aolog");

        {
            let mut memtable = Memtable::open(&path).unwrap();
            memtable.set(b"k", b"old").unwrap();
            memtable.set(b"k", b"new").unwrap();
        }

        let recovered = Memtable::open(&path).unwrap();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered.get(b"k"), Some(b"new".to_vec()));
    }

    #[test]
    fn test_replay_survives_torn_final_record() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.aolog");

        {
            let mut memtable = Memtable::open(&path).unwrap();
            memtable.set(b"safe", b"value").unwrap();
        }

        // Crash mid-append: half of the next record reaches disk.
        let torn = Entry::new(b"lost".to_vec(), b"never acknowledged".to_vec()).encode();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(&torn[..torn.len() - 5]).unwrap();
        drop(file);

        let recovered = Memtable::open(&path).unwrap();
        assert_eq!(recovered.len(), 1);
        assert_eq!(recovered.get(b"safe"), Some(b"value".to_vec()));
        assert_eq!(recovered.get(b"lost"), None);
    }

    #[test]
    fn test_writes_continue_after_recovery() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("log.aolog");

        {
            let mut memtable = Memtable::open(&path).unwrap();
            memtable.set(b"before", b"crash").unwrap();
        }

        let mut recovered = Memtable::open(&path).unwrap();
        recovered.set(b"after", b"restart").unwrap();
        drop(recovered);

        // A second recovery sees both generations of writes.
        let again = Memtable::open(&path).unwrap();
        assert_eq!(again.get(b"before"), Some(b"crash".to_vec()));
        assert_eq!(again.get(b"after"), Some(b"restart".to_vec()));
    }
}
