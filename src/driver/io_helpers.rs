// src/driver/io_helpers.rs

use super::Pms7003;
use crate::common::{
    command::Command,
    error::ReadError,
    hal_traits::{Direction, Level, PinId, SensorPins, SensorSerial},
};
use log::debug;

// Implementation block for I/O related helpers
impl<IF> Pms7003<IF>
where
    IF: SensorSerial + SensorPins,
{
    /// Reads one byte and checks it against a framing marker.
    ///
    /// On mismatch the call fails without reading further. No attempt is
    /// made to scan forward for the next frame boundary.
    pub(super) fn read_marker(
        &mut self,
        slot: &mut u8,
        expected: u8,
    ) -> Result<(), ReadError<IF::Error>> {
        self.interface
            .read_exact(core::slice::from_mut(slot))
            .map_err(ReadError::Io)?;
        if *slot != expected {
            debug!(
                "pms7003: start marker {:#04x} where {:#04x} expected",
                *slot, expected
            );
            return Err(ReadError::BadStartMarker(*slot));
        }
        Ok(())
    }

    /// Makes `pin` an output and drives it high.
    pub(super) fn drive_high(&mut self, pin: PinId) -> Result<(), IF::Error> {
        self.interface.configure(pin)?;
        self.interface.set_direction(pin, Direction::Output)?;
        self.interface.write(pin, Level::High)
    }

    /// Encodes `command` and writes it in a single call.
    pub(super) fn send_command(&mut self, command: Command) -> Result<(), IF::Error> {
        debug!("pms7003: sending {:?}", command);
        self.interface.write_all(&command.encode())
    }
}
