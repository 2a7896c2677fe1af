//! Superblock definition.

use crate::le::{u16_at, u32_at};
use serde::Serialize;

/// The magic value of all ext{2,3,4} filesystems.
pub const EXT2_MAGIC: u16 = 0xef53;

/// Sparse superblock definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuperBlock {
    pub inodes_count: u32,
    pub blocks_count: u32,
    pub free_blocks_count: u32,
    pub free_inodes_count: u32,
    pub first_data_block: u32,
    pub log_block_size: u32,
    pub blocks_per_group: u32,
    pub inodes_per_group: u32,
    pub magic: u16,
    pub rev_level: u32,
    s_inode_size: u16,
    pub feature_compat: u32,
    pub feature_incompat: u32,
    pub feature_ro_compat: u32,
    pub volume_name: [u8; 16],
}

impl SuperBlock {
    /// The superblock lives at this offset regardless of the block size.
    pub const OFFSET: u64 = 1024;
    /// The on-disk size of the superblock.
    pub const SIZE: usize = 1024;

    /// Decode the raw superblock.
    ///
    /// Nothing is validated here. The derived geometry below saturates
    /// instead of panicking on garbage, but is only meaningful for a
    /// superblock with a sane block size and non-zero counts.
    pub fn parse(raw: &[u8; Self::SIZE]) -> Self {
        let mut volume_name = [0u8; 16];
        volume_name.copy_from_slice(&raw[0x78..0x88]);
        Self {
            inodes_count: u32_at(raw, 0x00),
            blocks_count: u32_at(raw, 0x04),
            free_blocks_count: u32_at(raw, 0x0c),
            free_inodes_count: u32_at(raw, 0x10),
            first_data_block: u32_at(raw, 0x14),
            log_block_size: u32_at(raw, 0x18),
            blocks_per_group: u32_at(raw, 0x20),
            inodes_per_group: u32_at(raw, 0x28),
            magic: u16_at(raw, 0x38),
            rev_level: u32_at(raw, 0x4c),
            s_inode_size: u16_at(raw, 0x58),
            feature_compat: u32_at(raw, 0x5c),
            feature_incompat: u32_at(raw, 0x60),
            feature_ro_compat: u32_at(raw, 0x64),
            volume_name,
        }
    }

    /// The blocksize in bytes.
    ///
    /// Zero if the shift leaves the 64-bit range.
    pub fn block_size(&self) -> u64 {
        match 1024u64.checked_shl(self.log_block_size) {
            Some(size) if self.log_block_size <= 53 => size,
            _ => 0,
        }
    }

    /// The inode record size in bytes.
    ///
    /// Revision 0 filesystems always use 128 byte inodes.
    pub fn inode_size(&self) -> u64 {
        if self.rev_level == 0 {
            128
        } else {
            self.s_inode_size as u64
        }
    }

    /// The number of block groups.
    ///
    /// Zero without blocks or with zero blocks per group.
    pub fn group_count(&self) -> u64 {
        match (self.blocks_count as u64).checked_sub(1) {
            Some(last) if self.blocks_per_group != 0 => last / self.blocks_per_group as u64 + 1,
            _ => 0,
        }
    }

    /// The disk offset of the group descriptor table in bytes.
    ///
    /// The table starts in the block following the one holding the superblock.
    pub fn group_desc_offset(&self) -> u64 {
        (self.first_data_block as u64 + 1).saturating_mul(self.block_size())
    }

    /// The volume label without the NUL padding.
    pub fn volume_name(&self) -> &[u8] {
        let end = self.volume_name.iter().position(|c| *c == 0).unwrap_or(16);
        &self.volume_name[..end]
    }
}
