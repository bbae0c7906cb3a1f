//! Entry Codec Module
//!
//! The single on-disk record format shared by every file the store
//! writes: the write-ahead log, flushed SSTables, and compaction
//! output are all flat concatenations of encoded entries with no file
//! header, separator, or trailer. An empty file is a valid file holding
//! zero entries.
//!
//! # On-disk layout
//!
//! ```text
//! [1 byte kind][4 bytes key_len BE][4 bytes value_len BE][key][value]
//! ```
//!
//! Total length is `9 + key_len + value_len`. The kind byte is
//! reserved; the only kind currently written is `0` (plain value) and
//! [`Entry::decode`] never validates it.
//!
//! # Scanning
//!
//! [`EntryScanner`] turns any [`Read`] into a lazy sequence of entries.
//! It buffers progressively larger prefixes until a whole entry is
//! decodable, then advances by the entry's full length. A truncated
//! trailing record ends the sequence without error; crash recovery
//! relies on this to drop a half-written tail.

// ------------------------------------------------------------------------------------------------
// Unit tests
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod tests;

// ------------------------------------------------------------------------------------------------
// Includes
// ------------------------------------------------------------------------------------------------

use std::io::{self, Read, Write};

use thiserror::Error;
use tracing::{error, trace};

// ------------------------------------------------------------------------------------------------
// Constants
// ------------------------------------------------------------------------------------------------

/// Fixed header size: kind byte plus the two big-endian u32 lengths.
pub const ENTRY_HEADER_LEN: usize = 9;

/// Upper bound on the scanner's in-flight buffer. Bounds the largest
/// decodable entry; anything bigger terminates the scan.
pub const MAX_BUFFERED_ENTRY: usize = 64 * 1024;

// ------------------------------------------------------------------------------------------------
// Error Types
// ------------------------------------------------------------------------------------------------

/// The byte slice handed to [`Entry::decode`] does not hold a complete
/// entry. Not a corruption signal — callers feeding a stream simply
/// buffer more bytes and retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("incomplete entry")]
pub struct IncompleteEntry;

// ------------------------------------------------------------------------------------------------
// Entry
// ------------------------------------------------------------------------------------------------

/// A single `(kind, key, value)` record.
///
/// Keys and values are opaque byte strings compared with unsigned
/// lexicographic order (`Vec<u8>`'s `Ord`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Reserved record kind. Always [`Entry::KIND_VALUE`] today.
    pub kind: u8,

    /// Key bytes.
    pub key: Vec<u8>,

    /// Value bytes.
    pub value: Vec<u8>,
}

impl Entry {
    /// The only kind currently written: a plain value record.
    pub const KIND_VALUE: u8 = 0;

    /// Creates a plain value entry.
    pub fn new(key: impl Into<Vec<u8>>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            kind: Self::KIND_VALUE,
            key: key.into(),
            value: value.into(),
        }
    }

    /// Full encoded length, header included.
    pub fn encoded_len(&self) -> usize {
        ENTRY_HEADER_LEN + self.key.len() + self.value.len()
    }

    /// Encodes the entry into its binary representation.
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        buf.push(self.kind);
        buf.extend_from_slice(&(self.key.len() as u32).to_be_bytes());
        buf.extend_from_slice(&(self.value.len() as u32).to_be_bytes());
        buf.extend_from_slice(&self.key);
        buf.extend_from_slice(&self.value);
        buf
    }

    /// Writes the encoded entry to `w`, returning the byte count.
    pub fn write_to<W: Write>(&self, w: &mut W) -> io::Result<usize> {
        let buf = self.encode();
        w.write_all(&buf)?;
        Ok(buf.len())
    }

    /// Decodes one entry from the front of `data`.
    ///
    /// Returns [`IncompleteEntry`] when `data` is shorter than the
    /// 9-byte header or shorter than the header's declared payload.
    /// The kind byte is carried through unvalidated.
    pub fn decode(data: &[u8]) -> Result<Self, IncompleteEntry> {
        if data.len() < ENTRY_HEADER_LEN {
            return Err(IncompleteEntry);
        }

        let key_len = u32::from_be_bytes([data[1], data[2], data[3], data[4]]) as usize;
        let value_len = u32::from_be_bytes([data[5], data[6], data[7], data[8]]) as usize;

        let total = ENTRY_HEADER_LEN + key_len + value_len;
        if data.len() < total {
            return Err(IncompleteEntry);
        }

        Ok(Self {
            kind: data[0],
            key: data[ENTRY_HEADER_LEN..ENTRY_HEADER_LEN + key_len].to_vec(),
            value: data[ENTRY_HEADER_LEN + key_len..total].to_vec(),
        })
    }
}

// ------------------------------------------------------------------------------------------------
// EntryScanner
// ------------------------------------------------------------------------------------------------

/// Streaming entry decoder over any byte source.
///
/// Reads the source in `read_buffer_size` chunks and yields every
/// complete entry in order. Leftover bytes at end of stream (a
/// half-written record) are discarded silently; an entry larger than
/// [`MAX_BUFFERED_ENTRY`] terminates the scan with an error log.
pub struct EntryScanner<R: Read> {
    reader: R,

    /// Bytes read from the source but not yet decoded.
    buf: Vec<u8>,

    /// Chunk size for each refill of `buf`.
    read_buffer_size: usize,

    /// Source has reported end-of-stream.
    eof: bool,

    /// Scan has terminated (EOF, oversized entry, or read error).
    done: bool,
}

impl<R: Read> EntryScanner<R> {
    /// Creates a scanner reading `read_buffer_size` bytes per refill.
    pub fn new(reader: R, read_buffer_size: usize) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(read_buffer_size),
            read_buffer_size: read_buffer_size.max(1),
            eof: false,
            done: false,
        }
    }

    /// Reads one more chunk from the source into the buffer.
    fn fill(&mut self) -> bool {
        let start = self.buf.len();
        self.buf.resize(start + self.read_buffer_size, 0);

        match self.reader.read(&mut self.buf[start..]) {
            Ok(0) => {
                self.buf.truncate(start);
                self.eof = true;
                false
            }
            Ok(n) => {
                self.buf.truncate(start + n);
                true
            }
            Err(e) if e.kind() == io::ErrorKind::Interrupted => {
                self.buf.truncate(start);
                true
            }
            Err(e) => {
                self.buf.truncate(start);
                error!("entry scan aborted by read error: {e}");
                self.done = true;
                false
            }
        }
    }
}

/// Full length an entry claims for itself, once its header is buffered.
fn declared_len(buf: &[u8]) -> Option<usize> {
    if buf.len() < ENTRY_HEADER_LEN {
        return None;
    }
    let key_len = u32::from_be_bytes([buf[1], buf[2], buf[3], buf[4]]) as usize;
    let value_len = u32::from_be_bytes([buf[5], buf[6], buf[7], buf[8]]) as usize;
    Some(ENTRY_HEADER_LEN + key_len + value_len)
}

impl<R: Read> Iterator for EntryScanner<R> {
    type Item = Entry;

    fn next(&mut self) -> Option<Entry> {
        if self.done {
            return None;
        }

        loop {
            match Entry::decode(&self.buf) {
                Ok(entry) => {
                    self.buf.drain(..entry.encoded_len());
                    return Some(entry);
                }
                Err(IncompleteEntry) => {
                    if self.eof {
                        if !self.buf.is_empty() {
                            trace!(
                                trailing = self.buf.len(),
                                "discarding truncated trailing record"
                            );
                        }
                        self.done = true;
                        return None;
                    }
                    if let Some(required) = declared_len(&self.buf)
                        && required > MAX_BUFFERED_ENTRY
                    {
                        error!(
                            required,
                            limit = MAX_BUFFERED_ENTRY,
                            "entry exceeds scan buffer limit, terminating scan"
                        );
                        self.done = true;
                        return None;
                    }
                    if !self.fill() && self.done {
                        return None;
                    }
                }
            }
        }
    }
}
