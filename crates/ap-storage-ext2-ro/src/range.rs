//! The IDs owned by each block group.
//!
//! Group `i` starts right after the end of group `i - 1`, so the ranges are
//! produced by a single forward pass instead of a closed formula.

use ap_storage_ext2::superblock::SuperBlock;
use serde::Serialize;

/// An inclusive range of block or inode IDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GroupRange {
    pub first: u64,
    pub last: u64,
}

impl GroupRange {
    /// The number of IDs in the range.
    pub fn len(&self) -> u64 {
        (self.last + 1).saturating_sub(self.first)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cut the range at the last valid ID.
    ///
    /// The nominal end of the last group may exceed the size of the filesystem.
    pub fn clamp(&self, max: u64) -> GroupRange {
        GroupRange {
            first: self.first,
            last: core::cmp::min(self.last, max),
        }
    }
}

impl core::fmt::Display for GroupRange {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(fmt, "{}-{}", self.first, self.last)
    }
}

/// Accumulates the ranges of consecutive groups.
#[derive(Debug, Clone)]
pub struct GroupRanges {
    start: u64,
    first_last: u64,
    per_group: u64,
    prev_end: Option<u64>,
    left: u64,
}

impl GroupRanges {
    /// Group zero is `start..=first_last`, every following group adds `per_group` IDs.
    pub fn new(start: u64, first_last: u64, per_group: u64, count: u64) -> Self {
        Self {
            start,
            first_last,
            per_group,
            prev_end: None,
            left: count,
        }
    }

    /// Block IDs start at the first data block.
    pub fn blocks(sb: &SuperBlock) -> Self {
        let start = sb.first_data_block as u64;
        let total = sb.blocks_count as u64;
        let per_group = sb.blocks_per_group as u64;
        let first_last = if total < per_group { total - 1 } else { start + per_group - 1 };
        Self::new(start, first_last, per_group, sb.group_count())
    }

    /// Inode IDs start at one.
    pub fn inodes(sb: &SuperBlock) -> Self {
        let per_group = sb.inodes_per_group as u64;
        let first_last = core::cmp::min(sb.inodes_count as u64, per_group);
        Self::new(1, first_last, per_group, sb.group_count())
    }
}

impl Iterator for GroupRanges {
    type Item = GroupRange;

    fn next(&mut self) -> Option<GroupRange> {
        if self.left == 0 {
            return None;
        }
        self.left -= 1;
        let range = match self.prev_end {
            None => GroupRange {
                first: self.start,
                last: self.first_last,
            },
            Some(end) => GroupRange {
                first: end + 1,
                last: end + self.per_group,
            },
        };
        self.prev_end = Some(range.last);
        Some(range)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.left as usize;
        (n, Some(n))
    }
}

impl ExactSizeIterator for GroupRanges {}
