// src/common/error.rs

/// Errors returned by [`Pms7003::read`](crate::Pms7003::read).
///
/// Every variant is recoverable by calling `read` again. The driver does not
/// retry on its own, and none of these is marked transient or permanent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ReadError<E = ()>
where
    E: core::fmt::Debug,
{
    /// Underlying I/O error from the capability implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// The serial port had no data pending.
    #[error("no frame pending on the serial port")]
    NotReadable,

    /// One of the two framing bytes did not match (value received).
    #[error("bad start marker: {0:#04x}")]
    BadStartMarker(u8),

    /// The internal length field was not 28 (value received).
    #[error("bad frame length field: {0}")]
    BadLength(u16),

    /// The trailing checksum disagrees with the sum of bytes 0..30.
    #[error("checksum mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    ChecksumMismatch { expected: u16, calculated: u16 },
}

/// Errors from validating a complete 32-byte frame without any I/O.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FrameError {
    #[error("bad start marker: {0:#04x}")]
    BadStartMarker(u8),

    #[error("bad frame length field: {0}")]
    BadLength(u16),

    #[error("checksum mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    ChecksumMismatch { expected: u16, calculated: u16 },
}

impl<E: core::fmt::Debug> From<FrameError> for ReadError<E> {
    fn from(e: FrameError) -> Self {
        match e {
            FrameError::BadStartMarker(b) => ReadError::BadStartMarker(b),
            FrameError::BadLength(len) => ReadError::BadLength(len),
            FrameError::ChecksumMismatch {
                expected,
                calculated,
            } => ReadError::ChecksumMismatch {
                expected,
                calculated,
            },
        }
    }
}

// HAL errors are mapped explicitly with `map_err(ReadError::Io)`. A blanket
// `From<E>` would overlap with the `FrameError` conversion above.

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_error_maps_onto_read_error() {
        let e: ReadError<()> = FrameError::BadLength(29).into();
        assert_eq!(e, ReadError::BadLength(29));

        let e: ReadError<()> = FrameError::BadStartMarker(0x00).into();
        assert_eq!(e, ReadError::BadStartMarker(0x00));

        let e: ReadError<()> = FrameError::ChecksumMismatch {
            expected: 1,
            calculated: 2,
        }
        .into();
        assert_eq!(
            e,
            ReadError::ChecksumMismatch {
                expected: 1,
                calculated: 2
            }
        );
    }
}
