//! Traits for reading.
use crate::{msg2err, Error, Offset};

/// Read from a certain offset into a buffer.
pub trait Read {
    /// Read into some byte buffer. Returning zero means EOF.
    fn read_bytes(&self, offset: Offset, buf: &mut [u8]) -> Result<usize, Error>;
}

/// Extension methods to make implementations easier.
pub trait ReadExt {
    /// Fill the buffer or fail with a [`PartialReadError`].
    fn read_exact(&self, offset: Offset, buf: &mut [u8]) -> Result<(), Error>;

    /// Read a fixed number of bytes.
    fn read_array<const N: usize>(&self, offset: Offset) -> Result<[u8; N], Error>;
}

impl<T: Read + ?Sized> ReadExt for T {
    fn read_exact(&self, offset: Offset, buf: &mut [u8]) -> Result<(), Error> {
        let mut n = 0;
        while n != buf.len() {
            match self.read_bytes(offset + n as Offset, &mut buf[n..])? {
                0 => {
                    return Err(msg2err!(PartialReadError {
                        offset,
                        wanted: buf.len(),
                        got: n,
                    }))
                }
                c => n += c,
            }
        }
        Ok(())
    }

    fn read_array<const N: usize>(&self, offset: Offset) -> Result<[u8; N], Error> {
        let mut res = [0u8; N];
        self.read_exact(offset, &mut res)?;
        Ok(res)
    }
}

/// An exact read could only be partially done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartialReadError {
    /// Where the read started.
    pub offset: Offset,
    /// The number of bytes requested.
    pub wanted: usize,
    /// The number of bytes available before EOF.
    pub got: usize,
}

impl core::fmt::Display for PartialReadError {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(
            fmt,
            "partial read at {:#x}: wanted {} bytes, got {}",
            self.offset, self.wanted, self.got
        )
    }
}
