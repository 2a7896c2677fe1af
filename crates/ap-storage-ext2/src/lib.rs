//! On-disk structures for ext2.
//!
//! Every record is decoded field by field from little-endian bytes, so the
//! result does not depend on the host's layout or padding rules.

#![no_std]

pub mod dir;
pub mod group;
pub mod inode;
pub mod superblock;

/// Little-endian field accessors.
pub(crate) mod le {
    pub fn u8_at(b: &[u8], ofs: usize) -> u8 {
        b[ofs]
    }

    pub fn u16_at(b: &[u8], ofs: usize) -> u16 {
        u16::from_le_bytes([b[ofs], b[ofs + 1]])
    }

    pub fn u32_at(b: &[u8], ofs: usize) -> u32 {
        u32::from_le_bytes([b[ofs], b[ofs + 1], b[ofs + 2], b[ofs + 3]])
    }
}
