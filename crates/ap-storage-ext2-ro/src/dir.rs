//! Walk the entries of a directory block.
use super::{msg2err, Error, Malformed};
use alloc::{borrow::Cow, string::String, vec::Vec};
use ap_storage_ext2::dir::{DirEntryHeader, FileKind};
use serde::Serialize;

/// A decoded directory entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub inode: u32,
    pub rec_len: u16,
    pub name_len: u8,
    pub file_type: u8,
    #[serde(serialize_with = "lossy")]
    pub name: Vec<u8>,
}

impl DirEntry {
    pub fn kind(&self) -> FileKind {
        FileKind::from(self.file_type)
    }

    pub fn name_lossy(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }
}

#[allow(clippy::ptr_arg)]
fn lossy<S: serde::Serializer>(name: &Vec<u8>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(name))
}

/// A single pass over the entries of one directory block.
///
/// The walk ends at the first unused entry or once the entries cover the
/// size of the directory. After an error nothing more is returned.
pub struct DirWalk {
    block: Vec<u8>,
    offset: usize,
    consumed: u64,
    size: u64,
    done: bool,
}

impl DirWalk {
    /// Walk `block`, a directory holding `size` bytes.
    pub fn new(block: Vec<u8>, size: u64) -> Self {
        Self {
            block,
            offset: 0,
            consumed: 0,
            size,
            done: false,
        }
    }

    /// A walk without entries.
    pub fn empty() -> Self {
        Self::new(Vec::new(), 0)
    }

    fn step(&mut self) -> Result<Option<DirEntry>, Error> {
        if self.consumed >= self.size || self.offset >= self.block.len() {
            return Ok(None);
        }
        let ofs = self.offset;
        let header = self
            .block
            .get(ofs..ofs + DirEntryHeader::SIZE)
            .and_then(|raw| <&[u8; DirEntryHeader::SIZE]>::try_from(raw).ok())
            .map(DirEntryHeader::parse)
            .ok_or_else(|| msg2err!(Malformed::new("entry crosses block end", ofs as u64)))?;

        if header.inode == 0 {
            return Ok(None);
        }
        if header.rec_len == 0 {
            return Err(msg2err!(Malformed::new("zero record length", ofs as u64)));
        }
        if header.name_len == 0 {
            return Err(msg2err!(Malformed::new("empty name", ofs as u64)));
        }
        let name_end = ofs + DirEntryHeader::SIZE + header.name_len as usize;
        if (header.rec_len as usize) < DirEntryHeader::SIZE + header.name_len as usize {
            return Err(msg2err!(Malformed::new("record shorter than its name", ofs as u64)));
        }
        let name = self
            .block
            .get(ofs + DirEntryHeader::SIZE..name_end)
            .ok_or_else(|| msg2err!(Malformed::new("name crosses block end", ofs as u64)))?;
        // a record may end exactly at the block end, but not behind it
        if ofs + header.rec_len as usize > self.block.len() {
            return Err(msg2err!(Malformed::new("record crosses block end", ofs as u64)));
        }

        let entry = DirEntry {
            inode: header.inode,
            rec_len: header.rec_len,
            name_len: header.name_len,
            file_type: header.file_type,
            name: name.to_vec(),
        };
        log::trace!("dir entry at {ofs}: inode {} {:?}", entry.inode, entry.name_lossy());
        self.offset += header.rec_len as usize;
        self.consumed += header.rec_len as u64;
        Ok(Some(entry))
    }
}

impl Iterator for DirWalk {
    type Item = Result<DirEntry, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.step() {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

impl core::iter::FusedIterator for DirWalk {}
