//! Read-only decoding of ext2 metadata.
//!
//! The decoder reads the superblock, the group descriptor table, the free
//! block and inode bitmaps of every group and the entries of the root
//! directory. Every step either returns a complete result or an error.

#![no_std]

extern crate alloc;

pub mod bitmap;
pub mod dir;
mod error;
pub mod range;
pub mod report;

pub use error::*;

use alloc::{vec, vec::Vec};
use ap_storage::{check, msg2err, Error, Read, ReadExt};
use ap_storage_ext2::{group::GroupDesc, inode::Inode, superblock::SuperBlock, superblock::EXT2_MAGIC};
use bitmap::FreeRange;
use dir::DirWalk;
use range::GroupRanges;

/// Read and validate the superblock.
pub fn read_superblock(disk: &dyn Read) -> Result<SuperBlock, Error> {
    let raw = check!(disk.read_array::<{ SuperBlock::SIZE }>(SuperBlock::OFFSET));
    let sb = SuperBlock::parse(&raw);

    if sb.magic != EXT2_MAGIC {
        return Err(msg2err!(Malformed::new("bad magic", sb.magic as u64)));
    }
    if sb.log_block_size > 6 {
        return Err(msg2err!(Malformed::new("block size too large", sb.log_block_size as u64)));
    }
    if sb.blocks_count == 0 {
        return Err(msg2err!(Malformed::new("no blocks", 0)));
    }
    if sb.blocks_per_group == 0 {
        return Err(msg2err!(Malformed::new("zero blocks per group", 0)));
    }
    if sb.inodes_per_group == 0 {
        return Err(msg2err!(Malformed::new("zero inodes per group", 0)));
    }
    // a group is described by a single bitmap block
    let bits = sb.block_size() * 8;
    if sb.blocks_per_group as u64 > bits {
        return Err(msg2err!(Malformed::new("blocks per group exceed bitmap", sb.blocks_per_group as u64)));
    }
    if sb.inodes_per_group as u64 > bits {
        return Err(msg2err!(Malformed::new("inodes per group exceed bitmap", sb.inodes_per_group as u64)));
    }
    if sb.inode_size() < Inode::SIZE as u64 || sb.inode_size() > sb.block_size() {
        return Err(msg2err!(Malformed::new("invalid inode size", sb.inode_size())));
    }
    log::debug!(
        "superblock: {} blocks of {} bytes, {} inodes, {} blocks and {} inodes per group",
        sb.blocks_count,
        sb.block_size(),
        sb.inodes_count,
        sb.blocks_per_group,
        sb.inodes_per_group
    );
    Ok(sb)
}

/// Read the whole group descriptor table in one go.
///
/// The index in the result is the group number.
pub fn read_group_table(disk: &dyn Read, sb: &SuperBlock) -> Result<Vec<GroupDesc>, Error> {
    let count = sb.group_count();
    let offset = sb.group_desc_offset();
    log::debug!("{count} groups, descriptor table at {offset:#x}");

    let len = count * GroupDesc::SIZE as u64;
    if len > sb.blocks_per_group as u64 * sb.block_size() {
        return Err(msg2err!(Malformed::new("descriptor table larger than a group", count)));
    }
    let mut raw = vec![0u8; len as usize];
    check!(disk.read_exact(offset, &mut raw));
    Ok(raw
        .chunks_exact(GroupDesc::SIZE)
        .map(|chunk| {
            let mut rec = [0u8; GroupDesc::SIZE];
            rec.copy_from_slice(chunk);
            GroupDesc::parse(&rec)
        })
        .collect())
}

/// A decoded ext2 image.
///
/// The superblock and the descriptor table are read once by [`Ext2Image::new`]
/// and never change afterwards. Bitmaps and directory blocks are read on demand.
#[derive(Clone)]
pub struct Ext2Image<'a> {
    disk: &'a dyn Read,
    sb: SuperBlock,
    groups: Vec<GroupDesc>,
}

impl<'a> Ext2Image<'a> {
    /// Decode the superblock and the group descriptors.
    pub fn new(disk: &'a dyn Read) -> Result<Ext2Image<'a>, Error> {
        let sb = read_superblock(disk)?;
        let groups = read_group_table(disk, &sb)?;
        Ok(Self { disk, sb, groups })
    }

    pub fn superblock(&self) -> &SuperBlock {
        &self.sb
    }

    pub fn groups(&self) -> &[GroupDesc] {
        &self.groups
    }

    /// The block ID ranges of all groups.
    pub fn block_ranges(&self) -> GroupRanges {
        GroupRanges::blocks(&self.sb)
    }

    /// The inode ID ranges of all groups.
    pub fn inode_ranges(&self) -> GroupRanges {
        GroupRanges::inodes(&self.sb)
    }

    /// Free block IDs of a group whose block range starts at `base`.
    pub fn free_blocks(&self, group: &GroupDesc, base: u64) -> Result<Vec<FreeRange>, Error> {
        bitmap::free_ranges(self.disk, group.block_bitmap as u64, self.sb.block_size(), base)
    }

    /// Free inode IDs of a group whose inode range starts at `base`.
    pub fn free_inodes(&self, group: &GroupDesc, base: u64) -> Result<Vec<FreeRange>, Error> {
        bitmap::free_ranges(self.disk, group.inode_bitmap as u64, self.sb.block_size(), base)
    }

    /// Read the root inode from the inode table of group zero.
    pub fn root_inode(&self) -> Result<Inode, Error> {
        let group = self
            .groups
            .first()
            .ok_or_else(|| msg2err!(Malformed::new("no block groups", 0)))?;
        let offset = group.inode_table as u64 * self.sb.block_size() + (Inode::ROOT - 1) * self.sb.inode_size();
        let raw = check!(self.disk.read_array::<{ Inode::SIZE }>(offset));
        Ok(Inode::parse(&raw))
    }

    /// Walk the entries in the first block of the root directory.
    pub fn root_dir(&self) -> Result<DirWalk, Error> {
        let inode = self.root_inode()?;
        if !inode.is_dir() {
            log::warn!("root inode has mode {:o}, not a directory", inode.mode);
            return Ok(DirWalk::empty());
        }
        let block_size = self.sb.block_size();
        let mut block = vec![0u8; block_size as usize];
        check!(self.disk.read_exact(inode.first_block() as u64 * block_size, &mut block));
        Ok(DirWalk::new(block, inode.size()))
    }
}
