use super::{Error, Offset, Read};

/// Read from a slice of memory, e.g. a disk image loaded into RAM.
#[derive(Clone, Copy)]
pub struct ReadSlice<'a>(pub &'a [u8]);

impl Read for ReadSlice<'_> {
    fn read_bytes(&self, ofs: Offset, buf: &mut [u8]) -> Result<usize, Error> {
        let Ok(ofs) = usize::try_from(ofs) else {
            return Ok(0);
        };
        let Some(rest) = self.0.get(ofs..) else {
            return Ok(0);
        };
        let n = core::cmp::min(rest.len(), buf.len());
        buf[..n].copy_from_slice(&rest[..n]);
        Ok(n)
    }
}
