//! Shared helpers for the integration tests
//!
//! Builders for synthetic container files: recognized magic values,
//! real double-SHA-256 header hashes, opaque payload bytes.

#![allow(dead_code)]

use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

pub const MAGIC_MAINNET: [u8; 4] = [0xf9, 0xbe, 0xb4, 0xd9];
pub const MAGIC_TESTNET: [u8; 4] = [0x0b, 0x11, 0x09, 0x07];

/// One synthetic record: its on-disk bytes plus the display-order hash
/// the reader is expected to compute for it.
#[derive(Clone)]
pub struct TestRecord {
    pub bytes: Vec<u8>,
    pub hash: [u8; 32],
}

pub fn make_record(prev_display: [u8; 32], nonce: u32, payload_len: usize) -> TestRecord {
    make_record_with_magic(MAGIC_MAINNET, prev_display, nonce, payload_len)
}

pub fn make_record_with_magic(
    magic: [u8; 4],
    prev_display: [u8; 32],
    nonce: u32,
    payload_len: usize,
) -> TestRecord {
    let mut header = [0u8; 80];
    header[0..4].copy_from_slice(&1u32.to_le_bytes());
    let mut prev = prev_display;
    prev.reverse(); // headers store the parent hash byte-reversed
    header[4..36].copy_from_slice(&prev);
    header[36..40].copy_from_slice(&nonce.to_be_bytes()); // arbitrary merkle bytes
    header[68..72].copy_from_slice(&1_231_006_505u32.to_le_bytes());
    header[72..76].copy_from_slice(&0x1d00ffffu32.to_le_bytes());
    header[76..80].copy_from_slice(&nonce.to_le_bytes());

    let digest = Sha256::digest(Sha256::digest(header));
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    hash.reverse();

    let mut bytes = Vec::with_capacity(8 + 80 + payload_len);
    bytes.extend_from_slice(&magic);
    bytes.extend_from_slice(&((80 + payload_len) as u32).to_le_bytes());
    bytes.extend_from_slice(&header);
    bytes.extend(std::iter::repeat(0xab).take(payload_len));

    TestRecord { bytes, hash }
}

/// Linear chain of `n` records whose first parent is absent from any
/// index (a virtual genesis).
pub fn make_chain(n: usize, seed: u32) -> Vec<TestRecord> {
    make_chain_from([0u8; 32], n, seed)
}

/// Linear chain of `n` records extending the given parent hash.
pub fn make_chain_from(parent: [u8; 32], n: usize, seed: u32) -> Vec<TestRecord> {
    let mut prev = parent;
    let mut records = Vec::with_capacity(n);
    for i in 0..n {
        let record = make_record(prev, seed.wrapping_add(i as u32), 20 + i);
        prev = record.hash;
        records.push(record);
    }
    records
}

/// Concatenate the given records into a container file on disk.
pub fn write_container(dir: &Path, name: &str, records: &[&TestRecord]) -> PathBuf {
    let mut bytes = Vec::new();
    for record in records {
        bytes.extend_from_slice(&record.bytes);
    }
    write_container_bytes(dir, name, &bytes)
}

pub fn write_container_bytes(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, bytes).unwrap();
    path
}
