// src/platform/mock.rs

//! Recording test double for the sensor capabilities.
//!
//! Storage is fixed-capacity so the mock works in `no_std` test builds.

use crate::common::hal_traits::{
    Direction, ErrorType, Level, PinFunction, PinId, SensorPins, SensorSerial,
};
use arrayvec::ArrayVec;

const CALL_LOG_CAPACITY: usize = 128;
const RX_CAPACITY: usize = 512;
const TX_CAPACITY: usize = 128;
const FAILURE_CAPACITY: usize = 8;

/// One recorded capability invocation.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Call {
    Open(u32),
    HasPendingData,
    /// Number of bytes requested.
    ReadExact(usize),
    /// Number of bytes written.
    WriteAll(usize),
    Configure(PinId),
    SetDirection(PinId, Direction),
    Write(PinId, Level),
    SetAlternateFunction(PinId, PinFunction),
}

/// Errors produced by the mock itself.
#[derive(Debug, Copy, Clone, Eq, PartialEq, thiserror::Error)]
pub enum MockError {
    /// A read asked for more bytes than were staged. Real hardware would
    /// block here.
    #[error("staged receive data exhausted")]
    Exhausted,
    /// Call log, receive script or transmit log is full.
    #[error("mock capacity exceeded")]
    LogFull,
    /// The call was scripted to fail with [`MockInterface::fail_on`].
    #[error("scripted failure")]
    Injected,
}

#[derive(Debug, Clone, Default)]
pub struct MockInterface {
    pending: bool,
    baud_rate: Option<u32>,
    rx: ArrayVec<u8, RX_CAPACITY>,
    rx_pos: usize,
    tx: ArrayVec<u8, TX_CAPACITY>,
    calls: ArrayVec<Call, CALL_LOG_CAPACITY>,
    failures: ArrayVec<Call, FAILURE_CAPACITY>,
}

impl MockInterface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the answer of `has_pending_data`.
    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    /// Makes every later invocation equal to `call` fail with
    /// [`MockError::Injected`]. The call is still recorded; its side effect
    /// (cursor move, written bytes) is not applied.
    pub fn fail_on(&mut self, call: Call) -> Result<(), MockError> {
        self.failures.try_push(call).map_err(|_| MockError::LogFull)
    }

    /// Appends bytes to the receive script. Consumed in order by `read_exact`.
    pub fn stage_read_data(&mut self, data: &[u8]) -> Result<(), MockError> {
        self.rx
            .try_extend_from_slice(data)
            .map_err(|_| MockError::LogFull)
    }

    /// Staged bytes not yet consumed.
    pub fn remaining(&self) -> usize {
        self.rx.len() - self.rx_pos
    }

    /// Every call made so far, oldest first.
    pub fn calls(&self) -> &[Call] {
        &self.calls
    }

    /// Concatenation of all bytes passed to `write_all`.
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Baud rate from the last `open`, if any.
    pub fn baud_rate(&self) -> Option<u32> {
        self.baud_rate
    }

    /// Forgets recorded calls and written bytes; the receive script is kept.
    pub fn clear_log(&mut self) {
        self.calls.clear();
        self.tx.clear();
    }

    fn record(&mut self, call: Call) -> Result<(), MockError> {
        self.calls.try_push(call).map_err(|_| MockError::LogFull)?;
        if self.failures.contains(&call) {
            return Err(MockError::Injected);
        }
        Ok(())
    }
}

impl ErrorType for MockInterface {
    type Error = MockError;
}

impl SensorSerial for MockInterface {
    fn open(&mut self, baud_rate: u32) -> Result<(), MockError> {
        self.record(Call::Open(baud_rate))?;
        self.baud_rate = Some(baud_rate);
        Ok(())
    }

    fn has_pending_data(&mut self) -> Result<bool, MockError> {
        self.record(Call::HasPendingData)?;
        Ok(self.pending)
    }

    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), MockError> {
        self.record(Call::ReadExact(buffer.len()))?;
        let end = self.rx_pos + buffer.len();
        if end > self.rx.len() {
            return Err(MockError::Exhausted);
        }
        buffer.copy_from_slice(&self.rx[self.rx_pos..end]);
        self.rx_pos = end;
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), MockError> {
        self.record(Call::WriteAll(bytes.len()))?;
        self.tx
            .try_extend_from_slice(bytes)
            .map_err(|_| MockError::LogFull)
    }
}

impl SensorPins for MockInterface {
    fn configure(&mut self, pin: PinId) -> Result<(), MockError> {
        self.record(Call::Configure(pin))
    }

    fn set_direction(&mut self, pin: PinId, direction: Direction) -> Result<(), MockError> {
        self.record(Call::SetDirection(pin, direction))
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), MockError> {
        self.record(Call::Write(pin, level))
    }

    fn set_alternate_function(
        &mut self,
        pin: PinId,
        function: PinFunction,
    ) -> Result<(), MockError> {
        self.record(Call::SetAlternateFunction(pin, function))
    }
}
