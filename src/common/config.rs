// src/common/config.rs

use super::command::ReportingMode;
use super::hal_traits::PinId;

/// Fixed line rate of the sensor (8-N-1).
pub const BAUD_RATE: u32 = 9600;

/// Board GPIOs wired to the sensor connector.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct PinConfig {
    /// MCU pin carrying data to the sensor (sensor RXD).
    pub tx: PinId,
    /// MCU pin receiving data from the sensor (sensor TXD).
    pub rx: PinId,
    /// SET pin: high selects normal operation, low puts the sensor to sleep.
    pub mode_select: PinId,
    /// RESET pin, active low.
    pub reset: PinId,
}

impl Default for PinConfig {
    /// Wiring of the reference board: UART1 on GPIO 0/1, SET on 2, RESET on 3.
    fn default() -> Self {
        PinConfig {
            tx: 0,
            rx: 1,
            mode_select: 2,
            reset: 3,
        }
    }
}

impl PinConfig {
    /// Returns `true` if `pin` is one of the two UART pins.
    pub fn is_uart_pin(&self, pin: PinId) -> bool {
        pin == self.tx || pin == self.rx
    }
}

/// Configuration passed to [`Pms7003::new`](crate::Pms7003::new).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub struct SensorConfig {
    pub pins: PinConfig,
    /// Reporting mode selected during `initialize`.
    pub reporting_mode: ReportingMode,
}

impl SensorConfig {
    pub fn new(pins: PinConfig) -> Self {
        SensorConfig {
            pins,
            reporting_mode: ReportingMode::default(),
        }
    }

    pub fn with_reporting_mode(mut self, mode: ReportingMode) -> Self {
        self.reporting_mode = mode;
        self
    }
}
