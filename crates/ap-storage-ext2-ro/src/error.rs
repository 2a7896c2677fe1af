//! Classification of decoder errors.

use ap_storage::{Error, PartialReadError};

/// The metadata on disk is inconsistent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Malformed {
    pub reason: &'static str,
    pub value: u64,
}

impl Malformed {
    pub fn new(reason: &'static str, value: u64) -> Self {
        Self { reason, value }
    }
}

impl core::fmt::Display for Malformed {
    fn fmt(&self, fmt: &mut core::fmt::Formatter<'_>) -> Result<(), core::fmt::Error> {
        write!(fmt, "malformed filesystem: {} ({:#x})", self.reason, self.value)
    }
}

/// What went wrong while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The underlying disk failed.
    Io,
    /// The disk ended before a fixed-size structure was complete.
    TruncatedRead,
    /// A decoded count or offset makes no sense.
    MalformedLayout,
}

impl ErrorKind {
    /// Classify an error returned by this crate.
    pub fn of(err: &Error) -> Self {
        if err.is::<PartialReadError>() {
            ErrorKind::TruncatedRead
        } else if err.is::<Malformed>() {
            ErrorKind::MalformedLayout
        } else {
            ErrorKind::Io
        }
    }
}
