//! Everything the decoder knows about an image, as plain data.

use super::{Error, Ext2Image};
use crate::{bitmap::FreeRange, dir::DirEntry, range::GroupRange};
use alloc::{string::String, vec::Vec};
use ap_storage_ext2::{group::GroupDesc, superblock::SuperBlock};
use serde::Serialize;

/// Filesystem wide numbers derived from the superblock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FsSummary {
    pub block_size: u64,
    pub blocks_count: u64,
    pub disk_size: u64,
    pub blocks_per_group: u64,
    pub inode_size: u64,
    pub inodes_per_group: u64,
    pub inode_table_blocks: u64,
    pub group_count: u64,
    pub inodes_count: u64,
    pub free_inodes_count: u64,
    pub free_blocks_count: u64,
    pub volume_name: String,
}

impl FsSummary {
    pub fn new(sb: &SuperBlock) -> Self {
        let block_size = sb.block_size();
        Self {
            block_size,
            blocks_count: sb.blocks_count as u64,
            disk_size: sb.blocks_count as u64 * block_size,
            blocks_per_group: sb.blocks_per_group as u64,
            inode_size: sb.inode_size(),
            inodes_per_group: sb.inodes_per_group as u64,
            inode_table_blocks: (sb.inodes_per_group as u64 * sb.inode_size()).div_ceil(block_size),
            group_count: sb.group_count(),
            inodes_count: sb.inodes_count as u64,
            free_inodes_count: sb.free_inodes_count as u64,
            free_blocks_count: sb.free_blocks_count as u64,
            volume_name: String::from_utf8_lossy(sb.volume_name()).into_owned(),
        }
    }
}

/// One block group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupReport {
    pub index: u64,
    pub blocks: GroupRange,
    pub inodes: GroupRange,
    pub desc: GroupDesc,
    pub free_blocks: Vec<FreeRange>,
    pub free_inodes: Vec<FreeRange>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub summary: FsSummary,
    pub groups: Vec<GroupReport>,
    pub root: Vec<DirEntry>,
}

impl Ext2Image<'_> {
    /// Decode the bitmaps of every group and the root directory.
    pub fn report(&self) -> Result<Report, Error> {
        self.report_with(true)
    }

    /// Like [`Ext2Image::report`], optionally leaving out the root directory.
    pub fn report_with(&self, root: bool) -> Result<Report, Error> {
        let groups = self
            .groups()
            .iter()
            .zip(self.block_ranges())
            .zip(self.inode_ranges())
            .enumerate()
            .map(|(index, ((desc, blocks), inodes))| {
                log::trace!("group {index}: blocks {blocks}, inodes {inodes}");
                Ok(GroupReport {
                    index: index as u64,
                    blocks,
                    inodes,
                    desc: *desc,
                    free_blocks: self.free_blocks(desc, blocks.first)?,
                    free_inodes: self.free_inodes(desc, inodes.first)?,
                })
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let root = if root {
            self.root_dir()?.collect::<Result<Vec<_>, Error>>()?
        } else {
            Vec::new()
        };

        Ok(Report {
            summary: FsSummary::new(self.superblock()),
            groups,
            root,
        })
    }
}
