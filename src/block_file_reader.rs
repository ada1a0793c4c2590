//! Container file reader
//!
//! Scans raw block container files (the blk*.dat layout written by a
//! reference node) and populates the in-memory chain index. Each
//! record is an 8-byte prefix (4-byte network magic + 4-byte
//! little-endian length), an 80-byte fixed header, and an opaque
//! payload. Only the header is parsed; payload bytes are skipped and
//! never retained.

use crate::chain_index::{BlockRecord, ChainIndex, Membership, SourceLocation};
use crate::error::ScanError;
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

/// Main-network record magic (0xf9beb4d9 big-endian).
const BLOCK_MAGIC_MAINNET: [u8; 4] = [0xf9, 0xbe, 0xb4, 0xd9];
/// Test-network record magic (0x0b110907 big-endian).
const BLOCK_MAGIC_TESTNET: [u8; 4] = [0x0b, 0x11, 0x09, 0x07];

/// Magic + length prefix in front of every record.
const PREFIX_SIZE: u64 = 8;

/// Fixed header every non-padding record must carry.
const HEADER_SIZE: u32 = 80;

/// Scan the given container files in order and build the chain index.
///
/// Fatal on the first malformed record or unreadable file; the
/// returned error names the offending file and byte offset.
pub fn read_container_files<P: AsRef<Path>>(paths: &[P]) -> Result<ChainIndex, ScanError> {
    let mut index = ChainIndex::new();
    for path in paths {
        read_container_file(path.as_ref(), &mut index)?;
    }
    Ok(index)
}

/// Scan one file into an existing index. The file handle is scoped to
/// this call; nothing stays open once the scan completes.
pub fn read_container_file(path: &Path, index: &mut ChainIndex) -> Result<(), ScanError> {
    let file = File::open(path).map_err(|e| ScanError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    let file_index = index.add_file(path);
    let mut reader = BufReader::new(file);

    let mut offset: u64 = 0;
    let mut records = 0usize;
    let mut padding = 0usize;

    loop {
        let mut prefix = [0u8; PREFIX_SIZE as usize];
        match read_up_to(&mut reader, &mut prefix).map_err(|e| ScanError::Io {
            path: path.to_path_buf(),
            source: e,
        })? {
            0 => break, // clean end of file
            n if n < prefix.len() => {
                return Err(ScanError::TruncatedPrefix {
                    file: path.to_path_buf(),
                    offset,
                });
            }
            _ => {}
        }

        let magic = [prefix[0], prefix[1], prefix[2], prefix[3]];
        if magic == [0, 0, 0, 0] {
            // Zero magic marks the 8 prefix bytes as padding; no body
            // follows. Keep scanning at the next 8-byte boundary.
            offset += PREFIX_SIZE;
            padding += 1;
            continue;
        }
        if magic != BLOCK_MAGIC_MAINNET && magic != BLOCK_MAGIC_TESTNET {
            return Err(ScanError::BadMagic {
                file: path.to_path_buf(),
                offset,
                magic: u32::from_be_bytes(magic),
            });
        }

        let len = u32::from_le_bytes([prefix[4], prefix[5], prefix[6], prefix[7]]);
        if len < HEADER_SIZE {
            return Err(ScanError::ShortRecord {
                file: path.to_path_buf(),
                offset,
                len,
            });
        }

        let mut header = [0u8; HEADER_SIZE as usize];
        reader.read_exact(&mut header).map_err(|e| {
            if e.kind() == std::io::ErrorKind::UnexpectedEof {
                ScanError::TruncatedHeader {
                    file: path.to_path_buf(),
                    offset,
                }
            } else {
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: e,
                }
            }
        })?;

        let source = SourceLocation {
            file_index,
            offset,
            len: PREFIX_SIZE + len as u64,
        };
        index.insert(parse_header(&header, source));
        records += 1;

        // Skip the remaining L - 80 payload bytes unparsed. Seeking
        // past EOF is not an error; the next prefix read reports it.
        reader
            .seek_relative((len - HEADER_SIZE) as i64)
            .map_err(|e| ScanError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;
        offset += PREFIX_SIZE + len as u64;
    }

    if padding > 0 {
        eprintln!(
            "{}: {} records indexed, {} padding prefixes skipped",
            path.display(),
            records,
            padding
        );
    } else {
        eprintln!("{}: {} records indexed", path.display(), records);
    }
    Ok(())
}

/// Fill as much of `buf` as the stream allows. Returns the byte count
/// actually read, so a caller can tell clean EOF (0) from a truncated
/// prefix (1..len).
fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Parse the fixed 80-byte header into a record.
///
/// The block hash is the double SHA-256 of the raw header bytes with
/// the digest reversed into display order. The parent hash and merkle
/// root are stored byte-reversed on disk relative to that display
/// order, so both are reversed here as well; no other conversion
/// happens anywhere else.
fn parse_header(header: &[u8; 80], source: SourceLocation) -> BlockRecord {
    let digest = Sha256::digest(Sha256::digest(header));
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&digest);
    hash.reverse();

    let mut prev_hash = [0u8; 32];
    prev_hash.copy_from_slice(&header[4..36]);
    prev_hash.reverse();

    let mut merkle_root = [0u8; 32];
    merkle_root.copy_from_slice(&header[36..68]);
    merkle_root.reverse();

    BlockRecord {
        hash,
        prev_hash,
        merkle_root,
        version: u32::from_le_bytes([header[0], header[1], header[2], header[3]]),
        timestamp: u32::from_le_bytes([header[68], header[69], header[70], header[71]]),
        bits: u32::from_le_bytes([header[72], header[73], header[74], header[75]]),
        nonce: u32::from_le_bytes([header[76], header[77], header[78], header[79]]),
        source,
        height: None,
        membership: Membership::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Raw genesis block header, exactly as stored on disk.
    const GENESIS_HEADER_HEX: &str = "0100000000000000000000000000000000000000000000000000000000000000000000003ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a29ab5f49ffff001d1dac2b7c";

    #[test]
    fn parse_header_matches_known_genesis() {
        let bytes = hex::decode(GENESIS_HEADER_HEX).unwrap();
        let mut header = [0u8; 80];
        header.copy_from_slice(&bytes);

        let source = SourceLocation {
            file_index: 0,
            offset: 0,
            len: 88,
        };
        let record = parse_header(&header, source);

        assert_eq!(
            hex::encode(record.hash),
            "000000000019d6689c085ae165831e934ff763ae46a2a6c172b3f1b60a8ce26f"
        );
        assert_eq!(record.prev_hash, [0u8; 32]);
        assert_eq!(
            hex::encode(record.merkle_root),
            "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b"
        );
        assert_eq!(record.version, 1);
        assert_eq!(record.timestamp, 1_231_006_505);
        assert_eq!(record.bits, 0x1d00ffff);
        assert_eq!(record.nonce, 2_083_236_893);
        assert_eq!(record.height, None);
        assert_eq!(record.membership, Membership::Unknown);
    }
}
