// src/common/frame.rs

//! Layout and validation of the 32-byte data frame.
//!
//! ```text
//! [0]=0x42 [1]=0x4D [2..4]=length (28) [4..28]=12 x u16 data
//! [28..30]=reserved [30..32]=checksum
//! ```
//! Multi-byte fields are big-endian.

use super::error::FrameError;
use super::measurement::Measurement;

/// Total frame length in bytes.
pub const FRAME_LEN: usize = 32;
/// First framing byte.
pub const START_1: u8 = 0x42;
/// Second framing byte.
pub const START_2: u8 = 0x4D;
/// Value carried in bytes 2..4: bytes following the length field.
pub const DATA_FRAME_LEN: u16 = 28;
/// Offset of the big-endian checksum; it covers every byte before it.
pub const CHECKSUM_OFFSET: usize = FRAME_LEN - 2;

const DATA_OFFSET: usize = 4;
const DATA_WORDS: usize = 12;

/// Arithmetic sum of `bytes`, modulo 65536.
#[inline]
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(u16::from(b)))
}

#[inline]
fn be_u16(frame: &[u8; FRAME_LEN], offset: usize) -> u16 {
    u16::from_be_bytes([frame[offset], frame[offset + 1]])
}

/// Checks the length field, then the checksum.
///
/// The framing bytes are assumed to have been checked already (they are
/// still covered by the checksum).
pub fn validate(frame: &[u8; FRAME_LEN]) -> Result<(), FrameError> {
    let len = be_u16(frame, 2);
    if len != DATA_FRAME_LEN {
        return Err(FrameError::BadLength(len));
    }

    let calculated = checksum(&frame[..CHECKSUM_OFFSET]);
    let expected = be_u16(frame, CHECKSUM_OFFSET);
    if calculated != expected {
        return Err(FrameError::ChecksumMismatch {
            expected,
            calculated,
        });
    }
    Ok(())
}

/// Decodes the data words without validating anything.
pub fn decode_unchecked(frame: &[u8; FRAME_LEN]) -> Measurement {
    let mut words = [0u16; DATA_WORDS];
    for (i, word) in words.iter_mut().enumerate() {
        *word = be_u16(frame, DATA_OFFSET + 2 * i);
    }
    Measurement::from_words(words)
}

/// Fully checks a buffered frame (markers, length, checksum) and decodes it.
///
/// For callers that collect the 32 bytes themselves, e.g. from a DMA buffer
/// or a log capture, instead of going through [`Pms7003::read`](crate::Pms7003::read).
pub fn parse(frame: &[u8; FRAME_LEN]) -> Result<Measurement, FrameError> {
    for &(idx, expected) in &[(0usize, START_1), (1, START_2)] {
        if frame[idx] != expected {
            return Err(FrameError::BadStartMarker(frame[idx]));
        }
    }
    validate(frame)?;
    Ok(decode_unchecked(frame))
}

/// Builds a valid frame around `measurement`. Used to script test doubles.
pub fn encode(measurement: &Measurement) -> [u8; FRAME_LEN] {
    let m = measurement;
    let words = [
        m.pm1_0_cf1,
        m.pm2_5_cf1,
        m.pm10_cf1,
        m.pm1_0_atm,
        m.pm2_5_atm,
        m.pm10_atm,
        m.count_0_3,
        m.count_0_5,
        m.count_1_0,
        m.count_2_5,
        m.count_5_0,
        m.count_10,
    ];
    let mut frame = [0u8; FRAME_LEN];
    frame[0] = START_1;
    frame[1] = START_2;
    frame[2..4].copy_from_slice(&DATA_FRAME_LEN.to_be_bytes());
    for (i, word) in words.iter().enumerate() {
        let at = DATA_OFFSET + 2 * i;
        frame[at..at + 2].copy_from_slice(&word.to_be_bytes());
    }
    let sum = checksum(&frame[..CHECKSUM_OFFSET]);
    frame[CHECKSUM_OFFSET..].copy_from_slice(&sum.to_be_bytes());
    frame
}
