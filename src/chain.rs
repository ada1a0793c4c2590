//! Chain reconstruction
//!
//! Height resolution via memoized parent traversal, and longest-chain
//! selection over the populated index. Heights are resolved with an
//! explicit pending stack, never recursion, so arbitrarily long chains
//! cannot exhaust the call stack. Each record is resolved at most once
//! per run regardless of call order.

use crate::chain_index::{BlockHash, ChainIndex, Membership};
use crate::error::ScanError;
use std::collections::HashSet;

/// Resolve the height of `hash`: its distance from the nearest known
/// or virtual genesis via parent links.
///
/// Walks `prev_hash` pointers, pushing each unresolved hash onto a
/// pending list, until it reaches either a record with a cached height
/// or a hash absent from the index (virtual genesis, base height -1).
/// The pending list is then unwound in reverse, each entry one higher
/// than its parent. A hash met twice within one walk is a parent-graph
/// cycle and fails instead of looping forever.
pub fn resolve_height(index: &mut ChainIndex, hash: &BlockHash) -> Result<u64, ScanError> {
    if let Some(height) = index.get(hash).and_then(|r| r.height) {
        return Ok(height);
    }

    let mut pending: Vec<BlockHash> = Vec::new();
    let mut walked: HashSet<BlockHash> = HashSet::new();
    let mut cursor = *hash;

    let base: i64 = loop {
        match index.get(&cursor) {
            None => break -1,
            Some(record) => {
                if let Some(height) = record.height {
                    break height as i64;
                }
                if !walked.insert(cursor) {
                    return Err(ScanError::CycleDetected {
                        hash: hex::encode(cursor),
                    });
                }
                pending.push(cursor);
                cursor = record.prev_hash;
            }
        }
    };

    if pending.is_empty() {
        // `hash` itself is absent from the index: a virtual-genesis child.
        return Ok(0);
    }

    let mut height = base;
    while let Some(entry) = pending.pop() {
        height += 1;
        if let Some(record) = index.get_mut(&entry) {
            record.height = Some(height as u64);
        }
    }
    Ok(height as u64)
}

/// Resolve every record, pick the tip, and return the ordered chain.
///
/// The tip is the record with maximum height; equal-height ties go to
/// the lexicographically smallest hash, so the result is a pure
/// function of the index contents rather than of map iteration order.
/// The main chain is returned oldest-first, each member marked `Main`.
/// With `include_side` set, all remaining records follow, marked
/// `Side`, ordered by source position (file, then offset).
pub fn select_chain(
    index: &mut ChainIndex,
    include_side: bool,
) -> Result<Vec<BlockHash>, ScanError> {
    let all: Vec<BlockHash> = index.hashes().copied().collect();
    for hash in &all {
        resolve_height(index, hash)?;
    }

    let mut tip: Option<(u64, BlockHash)> = None;
    for hash in &all {
        let height = index.get(hash).and_then(|r| r.height).unwrap_or(0);
        let better = match tip {
            None => true,
            Some((best_height, best_hash)) => {
                height > best_height || (height == best_height && *hash < best_hash)
            }
        };
        if better {
            tip = Some((height, *hash));
        }
    }
    let Some((_, tip_hash)) = tip else {
        return Ok(Vec::new());
    };

    // Walk tip -> genesis, then flip to oldest-first. Heights strictly
    // decrease along parent links, so this walk always terminates.
    let mut order: Vec<BlockHash> = Vec::new();
    let mut cursor = Some(tip_hash);
    while let Some(hash) = cursor {
        let prev = match index.get_mut(&hash) {
            Some(record) => {
                record.membership = Membership::Main;
                record.prev_hash
            }
            None => break,
        };
        order.push(hash);
        cursor = index.contains(&prev).then_some(prev);
    }
    order.reverse();

    if include_side {
        let mut side: Vec<(usize, u64, BlockHash)> = index
            .records()
            .filter(|r| r.membership != Membership::Main)
            .map(|r| (r.source.file_index, r.source.offset, r.hash))
            .collect();
        side.sort();
        for (_, _, hash) in side {
            if let Some(record) = index.get_mut(&hash) {
                record.membership = Membership::Side;
            }
            order.push(hash);
        }
    }

    Ok(order)
}
