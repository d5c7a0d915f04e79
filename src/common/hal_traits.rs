// src/common/hal_traits.rs

use core::fmt::Debug;

/// Identifier of a board GPIO, as numbered by the platform.
pub type PinId = u8;

/// Direction of a GPIO.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Direction {
    Input,
    Output,
}

/// Logic level driven onto an output pin.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Level {
    Low,
    High,
}

/// Peripheral function a pin can be muxed to.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PinFunction {
    /// Pin is owned by the UART peripheral (TX or RX).
    Uart,
}

/// Error type shared by the serial and pin capabilities of one handle.
///
/// Both capability traits require it so that a driver generic over
/// `IF: SensorSerial + SensorPins` has a single `IF::Error`.
pub trait ErrorType {
    /// Associated error type for hardware errors.
    type Error: Debug;
}

/// Blocking serial operations required by the sensor driver.
///
/// None of the operations retry internally.
pub trait SensorSerial: ErrorType {
    /// Opens the port at the given baud rate (8-N-1 framing).
    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error>;

    /// Returns `true` if at least one received byte is waiting to be read.
    fn has_pending_data(&mut self) -> Result<bool, Self::Error>;

    /// Fills `buffer` completely.
    ///
    /// Blocks until `buffer.len()` bytes have arrived. There is no timeout:
    /// if the device stalls, so does the caller.
    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error>;

    /// Transmits every byte of `bytes`, blocking until they are handed off.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;
}

/// Digital pin operations required by the sensor driver.
pub trait SensorPins: ErrorType {
    /// Prepares `pin` for use as a GPIO.
    fn configure(&mut self, pin: PinId) -> Result<(), Self::Error>;

    /// Sets the direction of `pin`.
    fn set_direction(&mut self, pin: PinId, direction: Direction) -> Result<(), Self::Error>;

    /// Drives `pin` to `level`. Only meaningful for outputs.
    fn write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error>;

    /// Hands `pin` over to a peripheral function.
    fn set_alternate_function(
        &mut self,
        pin: PinId,
        function: PinFunction,
    ) -> Result<(), Self::Error>;
}

// Lending a handle works the same as moving it into the driver.

impl<T: ErrorType + ?Sized> ErrorType for &mut T {
    type Error = T::Error;
}

impl<T: SensorSerial + ?Sized> SensorSerial for &mut T {
    fn open(&mut self, baud_rate: u32) -> Result<(), Self::Error> {
        T::open(self, baud_rate)
    }

    fn has_pending_data(&mut self) -> Result<bool, Self::Error> {
        T::has_pending_data(self)
    }

    fn read_exact(&mut self, buffer: &mut [u8]) -> Result<(), Self::Error> {
        T::read_exact(self, buffer)
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        T::write_all(self, bytes)
    }
}

impl<T: SensorPins + ?Sized> SensorPins for &mut T {
    fn configure(&mut self, pin: PinId) -> Result<(), Self::Error> {
        T::configure(self, pin)
    }

    fn set_direction(&mut self, pin: PinId, direction: Direction) -> Result<(), Self::Error> {
        T::set_direction(self, pin, direction)
    }

    fn write(&mut self, pin: PinId, level: Level) -> Result<(), Self::Error> {
        T::write(self, pin, level)
    }

    fn set_alternate_function(
        &mut self,
        pin: PinId,
        function: PinFunction,
    ) -> Result<(), Self::Error> {
        T::set_alternate_function(self, pin, function)
    }
}
