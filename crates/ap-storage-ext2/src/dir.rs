//! On-disk directory entry.

use crate::le::{u16_at, u32_at, u8_at};
use serde::Serialize;

/// The fixed part in front of the name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirEntryHeader {
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    pub file_type: u8,
}

impl DirEntryHeader {
    pub const SIZE: usize = 8;

    pub fn parse(raw: &[u8; Self::SIZE]) -> Self {
        Self {
            inode: u32_at(raw, 0),
            rec_len: u16_at(raw, 4),
            name_len: u8_at(raw, 6),
            file_type: u8_at(raw, 7),
        }
    }

    pub fn kind(&self) -> FileKind {
        FileKind::from(self.file_type)
    }
}

/// The file-type tag stored in a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FileKind {
    Unknown,
    Regular,
    Directory,
    CharDevice,
    BlockDevice,
    Fifo,
    Socket,
    SymLink,
}

impl From<u8> for FileKind {
    fn from(tag: u8) -> Self {
        match tag {
            1 => FileKind::Regular,
            2 => FileKind::Directory,
            3 => FileKind::CharDevice,
            4 => FileKind::BlockDevice,
            5 => FileKind::Fifo,
            6 => FileKind::Socket,
            7 => FileKind::SymLink,
            _ => FileKind::Unknown,
        }
    }
}
