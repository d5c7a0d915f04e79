// src/platform/native.rs

//! Capability implementation backed by a board HAL.
//!
//! Board HALs fix pin muxing and direction through type-state when the UART
//! and output pins are constructed. The pin operations here check requests
//! against that state and only the level writes reach the hardware.

use crate::common::{
    config::PinConfig,
    hal_traits::{Direction, ErrorType, Level, PinFunction, PinId, SensorPins, SensorSerial},
};
use embedded_hal::digital::{OutputPin, PinState};
use embedded_hal_nb::serial::{Read, Write};

/// Errors from [`NativeInterface`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum NativeError<SE, PE>
where
    SE: core::fmt::Debug,
    PE: core::fmt::Debug,
{
    #[error("serial error: {0:?}")]
    Serial(SE),

    #[error("pin error: {0:?}")]
    Pin(PE),

    /// The UART was built for a different rate than the one requested.
    #[error("UART runs at {configured} baud, {requested} requested")]
    BaudMismatch { configured: u32, requested: u32 },

    /// Pin is not wired to the sensor.
    #[error("pin {0} is not wired to the sensor")]
    UnknownPin(PinId),

    /// Request conflicts with the HAL-fixed configuration of the pin.
    #[error("unsupported configuration for pin {0}")]
    Unsupported(PinId),
}

/// UART plus the SET and RESET output pins of one sensor.
pub struct NativeInterface<U, P> {
    uart: U,
    baud_rate: u32,
    pins: PinConfig,
    mode_select: P,
    reset: P,
    // Byte taken off the UART by `has_pending_data`, handed out first by `read_exact`.
    lookahead: Option<u8>,
}

impl<U, P> NativeInterface<U, P>
where
    U: Read<u8> + Write<u8>,
    P: OutputPin,
{
    /// Wraps a UART already configured at `baud_rate` and the two output pins
    /// named by `pins.mode_select` and `pins.reset`.
    pub fn new(uart: U, baud_rate: u32, pins: PinConfig, mode_select: P, reset: P) -> Self {
        NativeInterface {
            uart,
            baud_rate,
            pins,
            mode_select,
            reset,
            lookahead: None,
        }
    }

    /// Returns the wrapped peripherals.
    pub fn release(self) -> (U, P, P) {
        (self.uart, self.mode_select, self.reset)
    }

    fn output_pin(&mut self, pin: PinId) -> Result<&mut P, <Self as ErrorType>::Error> {
        if pin == self.pins.mode_select {
            Ok(&mut self.mode_select)
        } else if pin == self.pins.reset {
            Ok(&mut self.reset)
        } else if self.pins.is_uart_pin(pin) {
            Err(NativeError::Unsupported(pin))
        } else {
            Err(NativeError::UnknownPin(pin))
        }
    }
}

impl<U, P> ErrorType for NativeInterface<U, P>
where
    U: Read<u8> + Write<u8>,
    P: OutputPin,
{
    type Error = NativeError<U::Error, P::Error>;
}

impl<U, P> SensorSerial for NativeInterface<U, P>
where
    U: Read<u8> + Write<u8>,
    P: OutputPin,
{
    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        if baud_rate != self.baud_rate {
            return Err(NativeError::BaudMismatch {
                configured: self.baud_rate,
                requested: baud_rate,
            });
        }
        Ok(())
    }

    fn has_pending_data(&mut self) -> Result<bool, Self::Error> {
        if self.lookahead.is_some() {
            return Ok(true);
        }
        match self.uart.read() {
            Ok(byte) => {
                self.lookahead = Some(byte);
                Ok(true)
            }
            Err(nb::Error::WouldBlock) => Ok(false),
            Err(nb::Error::Other(e)) => Err(NativeError::Serial(e)),
        }
    }

    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        for slot in buffer.iter_mut() {
            *slot = match self.lookahead.take() {
                Some(byte) => byte,
                None => nb::block!(self.uart.read()).map_err(NativeError::Serial)?,
            };
        }
        Ok(())
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        for &byte in bytes {
            nb::block!(self.uart.write(byte)).map_err(NativeError::Serial)?;
        }
        nb::block!(self.uart.flush()).map_err(NativeError::Serial)
    }
}

impl<U, P> SensorPins for NativeInterface<U, P>
where
    U: Read<u8> + Write<u8>,
    P: OutputPin,
{
    fn configure(&mut self, pin: PinId) -> Result<(), Self::Error> {
        self.output_pin(pin).map(|_| ())
    }

    fn set_direction(&mut self, pin: PinId, direction: Direction) -> Result<(), Self::Error> {
        self.output_pin(pin)?;
        match direction {
            Direction::Output => Ok(()),
            Direction::Input => Err(NativeError::Unsupported(pin)),
        }
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error> {
        let state = match level {
            Level::High => PinState::High,
            Level::Low => PinState::Low,
        };
        self.output_pin(pin)?
            .set_state(state)
            .map_err(NativeError::Pin)
    }

    fn set_alternate_function(
        &mut self,
        pin: PinId,
        function: PinFunction,
    ) -> Result<(), Self::Error> {
        match function {
            PinFunction::Uart if self.pins.is_uart_pin(pin) => Ok(()),
            // SET and RESET stay plain outputs
            PinFunction::Uart => self
                .output_pin(pin)
                .and(Err(NativeError::Unsupported(pin))),
        }
    }
}
