//! blkscan - chain indexer for raw block container files
//!
//! Reads the length-prefixed block container format written by a
//! reference node (blk*.dat), rebuilds the parent-linked chain from
//! each header's embedded parent hash, selects the longest chain, and
//! exports a metadata index, a canonical-order raw dump, or an on-disk
//! ordering verdict.

/// Container file scanning and header parsing
pub mod block_file_reader;

/// Height resolution and longest-chain selection
pub mod chain;

/// The in-memory hash-to-record table
pub mod chain_index;

/// Fatal error taxonomy
pub mod error;

/// Index, dump, and order-check outputs
pub mod export;
