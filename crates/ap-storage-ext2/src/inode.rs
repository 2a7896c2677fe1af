//! Sparse inode definition.

use crate::le::{u16_at, u32_at};

/// The leading part of an inode that every revision shares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inode {
    pub mode: u16,
    pub size_lo: u32,
    pub links_count: u16,
    pub flags: u32,
    pub block: [u32; 15],
}

impl Inode {
    /// Bytes needed to decode the fields above. Larger records are truncated.
    pub const SIZE: usize = 128;

    /// Inode numbers start at one, the root directory is always the second.
    pub const ROOT: u64 = 2;

    pub fn parse(raw: &[u8; Self::SIZE]) -> Self {
        Self {
            mode: u16_at(raw, 0x00),
            size_lo: u32_at(raw, 0x04),
            links_count: u16_at(raw, 0x1a),
            flags: u32_at(raw, 0x20),
            block: core::array::from_fn(|i| u32_at(raw, 0x28 + 4 * i)),
        }
    }

    /// The format bits of the mode.
    pub fn format(&self) -> u16 {
        self.mode & 0xf000
    }

    pub fn is_dir(&self) -> bool {
        self.format() == 0x4000
    }

    /// The size of the file in bytes.
    pub fn size(&self) -> u64 {
        self.size_lo as u64
    }

    /// The first direct data block.
    pub fn first_block(&self) -> u32 {
        self.block[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_directory_inode() {
        let mut raw = [0u8; Inode::SIZE];
        raw[0x00..0x02].copy_from_slice(&0o40755u16.to_le_bytes());
        raw[0x04..0x08].copy_from_slice(&1024u32.to_le_bytes());
        raw[0x1a..0x1c].copy_from_slice(&3u16.to_le_bytes());
        raw[0x28..0x2c].copy_from_slice(&21u32.to_le_bytes());
        raw[0x2c..0x30].copy_from_slice(&22u32.to_le_bytes());
        let inode = Inode::parse(&raw);
        assert!(inode.is_dir());
        assert_eq!(inode.size(), 1024);
        assert_eq!(inode.links_count, 3);
        assert_eq!(inode.first_block(), 21);
        assert_eq!(inode.block[1], 22);
    }

    #[test]
    fn regular_file_is_not_a_directory() {
        let mut raw = [0u8; Inode::SIZE];
        raw[0x00..0x02].copy_from_slice(&0o100644u16.to_le_bytes());
        assert!(!Inode::parse(&raw).is_dir());
    }
}
