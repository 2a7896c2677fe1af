//! Decode free-space bitmaps into ranges of free IDs.
//!
//! Bit `j` of byte `i` describes the entity `base + i * 8 + j`. A set bit
//! marks the entity as used.

use alloc::{vec, vec::Vec};
use ap_storage::{check, Error, Read, ReadExt};
use serde::Serialize;

/// A maximal run of free IDs, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FreeRange {
    pub first: u64,
    pub last: u64,
}

impl FreeRange {
    /// A lone free ID between two used ones.
    pub fn is_single(&self) -> bool {
        self.first == self.last
    }

    pub fn len(&self) -> u64 {
        self.last - self.first + 1
    }
}

/// Single IDs are printed without an end.
impl core::fmt::Display for FreeRange {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        if self.is_single() {
            write!(fmt, "{}", self.first)
        } else {
            write!(fmt, "{}-{}", self.first, self.last)
        }
    }
}

/// Scan the bits LSB-first and collect the runs of zero bits.
pub fn scan_bitmap(bits: &[u8], base: u64) -> Vec<FreeRange> {
    let mut res = Vec::new();
    // the start of the current run; none means the previous bit was set
    let mut open: Option<u64> = None;

    for (i, &byte) in bits.iter().enumerate() {
        // nothing changes inside a fully used or fully free byte
        match (byte, open) {
            (0xff, None) | (0x00, Some(_)) => continue,
            _ => {}
        }
        for j in 0..8 {
            let pos = (i * 8 + j) as u64;
            let used = byte & (1 << j) != 0;
            match (used, open) {
                (false, None) => open = Some(pos),
                (true, Some(start)) => {
                    res.push(FreeRange {
                        first: base + start,
                        last: base + pos - 1,
                    });
                    open = None;
                }
                _ => {}
            }
        }
    }

    // a run reaching the final bit closes there
    if let Some(start) = open {
        res.push(FreeRange {
            first: base + start,
            last: base + bits.len() as u64 * 8 - 1,
        });
    }
    res
}

/// Read the bitmap stored in `block` and return its free ranges.
pub fn free_ranges(disk: &dyn Read, block: u64, block_size: u64, base: u64) -> Result<Vec<FreeRange>, Error> {
    let mut bits = vec![0u8; block_size as usize];
    check!(disk.read_exact(block * block_size, &mut bits));
    let res = scan_bitmap(&bits, base);
    log::trace!("bitmap in block {block}: {} free ranges from {base}", res.len());
    Ok(res)
}
