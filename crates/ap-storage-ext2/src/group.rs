//! Block group descriptor.

use crate::le::{u16_at, u32_at};
use serde::Serialize;

/// A 32-byte ext2 group descriptor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GroupDesc {
    pub block_bitmap: u32,
    pub inode_bitmap: u32,
    pub inode_table: u32,
    pub free_blocks_count: u16,
    pub free_inodes_count: u16,
    pub used_dirs_count: u16,
}

impl GroupDesc {
    pub const SIZE: usize = 32;

    pub fn parse(raw: &[u8; Self::SIZE]) -> Self {
        Self {
            block_bitmap: u32_at(raw, 0x00),
            inode_bitmap: u32_at(raw, 0x04),
            inode_table: u32_at(raw, 0x08),
            free_blocks_count: u16_at(raw, 0x0c),
            free_inodes_count: u16_at(raw, 0x0e),
            used_dirs_count: u16_at(raw, 0x10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_descriptor() {
        let mut raw = [0xffu8; GroupDesc::SIZE];
        raw[0x00..0x04].copy_from_slice(&3u32.to_le_bytes());
        raw[0x04..0x08].copy_from_slice(&4u32.to_le_bytes());
        raw[0x08..0x0c].copy_from_slice(&5u32.to_le_bytes());
        raw[0x0c..0x0e].copy_from_slice(&7000u16.to_le_bytes());
        raw[0x0e..0x10].copy_from_slice(&2037u16.to_le_bytes());
        raw[0x10..0x12].copy_from_slice(&2u16.to_le_bytes());
        assert_eq!(
            GroupDesc::parse(&raw),
            GroupDesc {
                block_bitmap: 3,
                inode_bitmap: 4,
                inode_table: 5,
                free_blocks_count: 7000,
                free_inodes_count: 2037,
                used_dirs_count: 2,
            }
        );
    }
}
