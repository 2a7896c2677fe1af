//! Linux specific storage interface.

use ap_storage::{Error, Offset, Read};
use std::fs::File;
use std::os::fd::AsRawFd;

/// A disk image backed by a file in Linux.
///
/// Reads go through `pread`, so the file position is never touched and
/// every read is independent of the previous one.
pub struct LinuxDisk {
    file: File,
    offset: u64,
}

impl LinuxDisk {
    /// Open a read-only disk starting `offset` bytes into the file.
    pub fn new(filename: &str, offset: u64) -> Result<Self, Error> {
        let file = File::open(filename).map_err(|e| anyhow::anyhow!("open {filename}: {e}"))?;
        log::debug!("opened {filename} at offset {offset:#x}");
        Ok(Self { file, offset })
    }
}

impl Read for LinuxDisk {
    fn read_bytes(&self, offset: Offset, buf: &mut [u8]) -> Result<usize, Error> {
        let pos = libc::off_t::try_from(self.offset + offset)?;
        loop {
            let res = unsafe { libc::pread(self.file.as_raw_fd(), buf.as_mut_ptr() as *mut libc::c_void, buf.len(), pos) };
            if res >= 0 {
                return Ok(res as usize);
            }
            let err = std::io::Error::last_os_error();
            if err.kind() != std::io::ErrorKind::Interrupted {
                return Err(err.into());
            }
        }
    }
}
