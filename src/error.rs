//! Scan error taxonomy
//!
//! Fatal conditions abort the whole run: a malformed container record,
//! an unreadable input file, or a parent-hash cycle. Ordering
//! violations in test mode are diagnostics, not errors, and live in
//! the export layer.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    /// Non-zero magic that matches neither recognized network.
    #[error("unrecognized magic 0x{magic:08x} in {} at offset {offset}", file.display())]
    BadMagic {
        file: PathBuf,
        offset: u64,
        magic: u32,
    },

    /// EOF in the middle of an 8-byte record prefix.
    #[error("truncated record prefix in {} at offset {offset}", file.display())]
    TruncatedPrefix { file: PathBuf, offset: u64 },

    /// EOF before the full 80-byte header could be read.
    #[error("truncated block header in {} at offset {offset}", file.display())]
    TruncatedHeader { file: PathBuf, offset: u64 },

    /// Declared record length cannot hold the fixed header.
    #[error("record length {len} below header minimum in {} at offset {offset}", file.display())]
    ShortRecord {
        file: PathBuf,
        offset: u64,
        len: u32,
    },

    /// A recorded region could not be re-read in full (dump mode).
    #[error("short read of {len} bytes from {} at offset {offset}", file.display())]
    TruncatedRecord {
        file: PathBuf,
        offset: u64,
        len: u64,
    },

    /// The parent-hash graph loops back on itself.
    #[error("parent-hash cycle detected at block {hash}")]
    CycleDetected { hash: String },

    #[error("cannot read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
