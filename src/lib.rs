//! # siltdb
//!
//! An embeddable, persistent key-value store built on a
//! **Log-Structured Merge Tree (LSM-tree)**. Keys and values are opaque
//! byte strings; later writes of a key overwrite earlier ones; every
//! acknowledged write survives a process crash.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       Engine                           │
//! │  ┌────────────┐   ┌──────────────┐   ┌─────────────┐   │
//! │  │  Active    │   │ Flush queue  │   │  SSTables   │   │
//! │  │  memtable  │   │  (frozen     │   │  (on disk,  │   │
//! │  │  + WAL     │   │  memtables)  │   │ newest 1st) │   │
//! │  └─────┬──────┘   └──────┬───────┘   └──────┬──────┘   │
//! │        │   freeze        │    flush         │          │
//! │        └──────────►      └─────────►        │          │
//! │                                             │          │
//! │  ┌──────────────────────────────────────────┘          │
//! │  │  Compaction (pairwise merge, newest value wins)     │
//! │  └─────────────────────────────────────────────────────┘
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! Writes land in the WAL first, then in the active memtable. When the
//! memtable grows past [`EngineConfig::max_memtable_size`] keys it is
//! frozen and queued; a background flusher persists queued memtables as
//! immutable sorted tables, and an optional background compactor merges
//! small tables pairwise. Reads probe the tiers newest-first and return
//! the first hit.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`engine`] | Top-level coordinator — start, stop, set, get, background loops |
//! | [`memtable`] | In-memory sorted write buffer backed by an append-only log |
//! | [`wal`] | Append-only entry log replayed on restart |
//! | [`sstable`] | Immutable sorted on-disk tables with a sparse in-memory index |
//! | [`flush`] | Frozen-memtable → SSTable conversion |
//! | [`compaction`] | Pairwise SSTable merge, newest value per key wins |
//! | [`codec`] | Bit-exact entry encoding and the streaming entry scanner |
//! | [`index`] | Sparse ordered-key index with floor lookup |
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use siltdb::engine::{Engine, EngineConfig};
//!
//! let engine = Engine::start(EngineConfig {
//!     work_dir: "/tmp/my_db".into(),
//!     compaction_enabled: true,
//!     ..EngineConfig::default()
//! })
//! .unwrap();
//!
//! engine.set(b"hello", b"world");
//! assert_eq!(engine.get(b"hello"), Some(b"world".to_vec()));
//!
//! engine.stop();
//! ```

pub mod codec;
pub mod compaction;
pub mod engine;
pub mod flush;
pub mod index;
pub mod memtable;
pub mod sstable;
pub mod wal;

pub use engine::{Engine, EngineConfig, EngineError};
