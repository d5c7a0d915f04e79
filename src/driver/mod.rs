// src/driver/mod.rs

// Frame acquisition helpers
mod io_helpers;

use crate::common::{
    command::{Command, OperatingState, ReportingMode},
    config::{SensorConfig, BAUD_RATE},
    error::ReadError,
    frame::{self, FRAME_LEN, START_1, START_2},
    hal_traits::{PinFunction, SensorPins, SensorSerial},
    measurement::Measurement,
};
use log::{debug, trace, warn};

/// Synchronous driver for a PMS7003-class particulate matter sensor.
///
/// The driver owns its capability handle `IF`. Pass `&mut handle` instead to
/// keep ownership on the caller's side; `&mut T` implements the same traits.
///
/// Every operation blocks. There is no timeout: if the sensor stops talking
/// in the middle of a frame, `read` does not return.
#[derive(Debug)]
pub struct Pms7003<IF>
where
    IF: SensorSerial + SensorPins,
{
    interface: IF,
    config: SensorConfig,
}

impl<IF> Pms7003<IF>
where
    IF: SensorSerial + SensorPins,
{
    pub fn new(interface: IF, config: SensorConfig) -> Self {
        Pms7003 { interface, config }
    }

    /// Brings the sensor up.
    ///
    /// In order: opens the serial port at 9600 baud, muxes TX then RX to the
    /// UART, drives SET high (normal operation), drives RESET high (out of
    /// reset) and sends the reporting-mode command from the config (passive by
    /// default). The first failing step aborts the sequence.
    ///
    /// Not safe to interleave with `read` on the same handle.
    pub fn initialize(&mut self) -> Result<(), IF::Error> {
        let pins = self.config.pins;

        self.interface.open(BAUD_RATE)?;
        self.interface
            .set_alternate_function(pins.tx, PinFunction::Uart)?;
        self.interface
            .set_alternate_function(pins.rx, PinFunction::Uart)?;

        self.drive_high(pins.mode_select)?;
        self.drive_high(pins.reset)?;

        self.send_command(Command::SetReportingMode(self.config.reporting_mode))?;
        debug!(
            "pms7003: initialized, {:?} reporting",
            self.config.reporting_mode
        );
        Ok(())
    }

    /// Acquires, validates and decodes one frame.
    ///
    /// Gates, in order, each failing the call immediately:
    /// pending data, first marker, second marker, length field, checksum.
    /// Nothing is transmitted; in passive mode call
    /// [`request_read`](Self::request_read) first.
    pub fn read(&mut self) -> Result<Measurement, ReadError<IF::Error>> {
        if !self.interface.has_pending_data().map_err(ReadError::Io)? {
            debug!("pms7003: no data pending");
            return Err(ReadError::NotReadable);
        }

        let mut buf = [0u8; FRAME_LEN];
        let (markers, rest) = buf.split_at_mut(2);
        self.read_marker(&mut markers[0], START_1)?;
        self.read_marker(&mut markers[1], START_2)?;
        self.interface.read_exact(rest).map_err(ReadError::Io)?;

        if let Err(e) = frame::validate(&buf) {
            warn!("pms7003: dropping frame: {}", e);
            return Err(e.into());
        }

        let measurement = frame::decode_unchecked(&buf);
        trace!("pms7003: {:?}", measurement);
        Ok(measurement)
    }

    /// Asks the sensor for one frame (passive mode read request).
    pub fn request_read(&mut self) -> Result<(), IF::Error> {
        self.send_command(Command::ReadPassive)
    }

    /// Switches between passive and active reporting.
    pub fn set_reporting_mode(&mut self, mode: ReportingMode) -> Result<(), IF::Error> {
        self.send_command(Command::SetReportingMode(mode))?;
        self.config.reporting_mode = mode;
        Ok(())
    }

    /// Stops the fan and laser.
    pub fn sleep(&mut self) -> Result<(), IF::Error> {
        self.send_command(Command::SetOperatingState(OperatingState::Sleep))
    }

    /// Restarts the fan and laser. The first frames after wake-up are not
    /// stable for roughly 30 s.
    pub fn wake(&mut self) -> Result<(), IF::Error> {
        self.send_command(Command::SetOperatingState(OperatingState::Wakeup))
    }

    pub fn config(&self) -> &SensorConfig {
        &self.config
    }

    pub fn interface(&self) -> &IF {
        &self.interface
    }

    pub fn interface_mut(&mut self) -> &mut IF {
        &mut self.interface
    }

    /// Gives the capability handle back.
    pub fn release(self) -> IF {
        self.interface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::frame::tests::{expected_measurement, VALID_FRAME};
    use crate::common::frame::{checksum, CHECKSUM_OFFSET};
    use crate::common::hal_traits::{Direction, Level};
    use crate::common::PinConfig;
    use crate::platform::mock::{Call, MockError, MockInterface};

    fn sensor_with(stream: &[u8]) -> Pms7003<MockInterface> {
        let mut mock = MockInterface::new();
        mock.set_pending(true);
        mock.stage_read_data(stream).unwrap();
        Pms7003::new(mock, SensorConfig::default())
    }

    fn with_fixed_checksum(mut frame: [u8; FRAME_LEN]) -> [u8; FRAME_LEN] {
        let sum = checksum(&frame[..CHECKSUM_OFFSET]);
        frame[CHECKSUM_OFFSET..].copy_from_slice(&sum.to_be_bytes());
        frame
    }

    #[test]
    fn test_initialize_sequence() {
        let mut sensor = Pms7003::new(MockInterface::new(), SensorConfig::default());
        sensor.initialize().unwrap();

        assert_eq!(
            sensor.interface().calls(),
            &[
                Call::Open(9600),
                Call::SetAlternateFunction(0, PinFunction::Uart),
                Call::SetAlternateFunction(1, PinFunction::Uart),
                Call::Configure(2),
                Call::SetDirection(2, Direction::Output),
                Call::Write(2, Level::High),
                Call::Configure(3),
                Call::SetDirection(3, Direction::Output),
                Call::Write(3, Level::High),
                Call::WriteAll(7),
            ]
        );
        assert_eq!(
            sensor.interface().written(),
            &[0x42, 0x4D, 0xE1, 0x00, 0x00, 0x01, 0x70]
        );
    }

    #[test]
    fn test_initialize_uses_configured_pins() {
        let pins = PinConfig {
            tx: 4,
            rx: 5,
            mode_select: 20,
            reset: 21,
        };
        let mut sensor = Pms7003::new(MockInterface::new(), SensorConfig::new(pins));
        sensor.initialize().unwrap();

        let calls = sensor.interface().calls();
        assert_eq!(calls[1], Call::SetAlternateFunction(4, PinFunction::Uart));
        assert_eq!(calls[2], Call::SetAlternateFunction(5, PinFunction::Uart));
        assert_eq!(calls[5], Call::Write(20, Level::High));
        assert_eq!(calls[8], Call::Write(21, Level::High));
    }

    #[test]
    fn test_initialize_aborts_on_first_failure() {
        let mut mock = MockInterface::new();
        mock.fail_on(Call::Configure(3)).unwrap();
        let mut sensor = Pms7003::new(mock, SensorConfig::default());

        assert_eq!(sensor.initialize(), Err(MockError::Injected));
        // Stops at the RESET pin: no direction, no level, no mode command
        assert_eq!(sensor.interface().calls().len(), 7);
        assert_eq!(sensor.interface().calls()[6], Call::Configure(3));
        assert!(sensor.interface().written().is_empty());
    }

    #[test]
    fn test_initialize_open_failure_touches_nothing_else() {
        let mut mock = MockInterface::new();
        mock.fail_on(Call::Open(9600)).unwrap();
        let mut sensor = Pms7003::new(mock, SensorConfig::default());

        assert_eq!(sensor.initialize(), Err(MockError::Injected));
        assert_eq!(sensor.interface().calls(), &[Call::Open(9600)]);
    }

    #[test]
    fn test_initialize_active_mode() {
        let config = SensorConfig::default().with_reporting_mode(ReportingMode::Active);
        let mut sensor = Pms7003::new(MockInterface::new(), config);
        sensor.initialize().unwrap();
        assert_eq!(
            sensor.interface().written(),
            &[0x42, 0x4D, 0xE1, 0x00, 0x01, 0x01, 0x71]
        );
    }

    #[test]
    fn test_read_valid_frame() {
        let mut sensor = sensor_with(&VALID_FRAME);
        let m = sensor.read().unwrap();

        assert_eq!(m, expected_measurement());
        assert_eq!(m.pm1_0_cf1, 10);
        assert_eq!(m.pm2_5_cf1, 25);
        assert_eq!(m.pm10_cf1, 50);
        assert_eq!(m.pm1_0_atm, 10);
        assert_eq!(m.pm2_5_atm, 25);
        assert_eq!(m.pm10_atm, 50);
        assert_eq!(m.count_0_3, 100);
        assert_eq!(m.count_0_5, 50);
        assert_eq!(m.count_1_0, 20);
        assert_eq!(m.count_2_5, 10);
        assert_eq!(m.count_5_0, 5);
        assert_eq!(m.count_10, 1);

        assert_eq!(
            sensor.interface().calls(),
            &[
                Call::HasPendingData,
                Call::ReadExact(1),
                Call::ReadExact(1),
                Call::ReadExact(30),
            ]
        );
        assert_eq!(sensor.interface().remaining(), 0);
        // read never transmits
        assert!(sensor.interface().written().is_empty());
    }

    #[test]
    fn test_read_rejects_stale_checksum() {
        let mut frame = VALID_FRAME;
        frame[30] = 0x01;
        frame[31] = 0xE1;
        let mut sensor = sensor_with(&frame);
        assert_eq!(
            sensor.read(),
            Err(ReadError::ChecksumMismatch {
                expected: 0x01E1,
                calculated: 0x020F
            })
        );
    }

    #[test]
    fn test_not_readable_issues_no_reads() {
        let mut sensor = sensor_with(&VALID_FRAME);
        sensor.interface_mut().set_pending(false);

        assert_eq!(sensor.read(), Err(ReadError::NotReadable));
        assert_eq!(sensor.interface().calls(), &[Call::HasPendingData]);
        assert_eq!(sensor.interface().remaining(), FRAME_LEN);
    }

    #[test]
    fn test_bad_first_marker_stops_after_one_byte() {
        for b in 0..=u8::MAX {
            if b == START_1 {
                continue;
            }
            let mut frame = VALID_FRAME;
            frame[0] = b;
            let mut sensor = sensor_with(&frame);

            assert_eq!(sensor.read(), Err(ReadError::BadStartMarker(b)));
            assert_eq!(
                sensor.interface().calls(),
                &[Call::HasPendingData, Call::ReadExact(1)]
            );
            assert_eq!(sensor.interface().remaining(), FRAME_LEN - 1);
        }
    }

    #[test]
    fn test_bad_second_marker_stops_after_two_bytes() {
        for b in 0..=u8::MAX {
            if b == START_2 {
                continue;
            }
            let mut frame = VALID_FRAME;
            frame[1] = b;
            let mut sensor = sensor_with(&frame);

            assert_eq!(sensor.read(), Err(ReadError::BadStartMarker(b)));
            assert_eq!(sensor.interface().remaining(), FRAME_LEN - 2);
        }
    }

    #[test]
    fn test_length_field_checked_even_with_good_checksum() {
        for len in [0u16, 1, 27, 29, 32, 0x1C00, 0xFFFF] {
            let mut frame = VALID_FRAME;
            frame[2..4].copy_from_slice(&len.to_be_bytes());
            let mut sensor = sensor_with(&with_fixed_checksum(frame));
            assert_eq!(sensor.read(), Err(ReadError::BadLength(len)));
        }
    }

    #[test]
    fn test_single_byte_corruption_never_decodes() {
        for idx in 0..CHECKSUM_OFFSET {
            for mask in [0x01u8, 0x80, 0xFF] {
                let mut frame = VALID_FRAME;
                frame[idx] ^= mask;
                let mut sensor = sensor_with(&frame);
                let result = sensor.read();

                match idx {
                    // Markers and length are gated before the checksum
                    0 | 1 => assert!(matches!(result, Err(ReadError::BadStartMarker(_)))),
                    2 | 3 => assert!(matches!(result, Err(ReadError::BadLength(_)))),
                    _ => assert!(
                        matches!(result, Err(ReadError::ChecksumMismatch { .. })),
                        "byte {} mask {:#04x}: {:?}",
                        idx,
                        mask,
                        result
                    ),
                }
            }
        }
    }

    #[test]
    fn test_corrupted_checksum_field() {
        let mut frame = VALID_FRAME;
        frame[30] = 0xFF;
        let mut sensor = sensor_with(&frame);
        assert_eq!(
            sensor.read(),
            Err(ReadError::ChecksumMismatch {
                expected: 0xFF0F,
                calculated: 0x020F
            })
        );
    }

    #[test]
    fn test_pending_error_surfaces_as_io() {
        let mut sensor = sensor_with(&VALID_FRAME);
        sensor.interface_mut().fail_on(Call::HasPendingData).unwrap();

        assert_eq!(sensor.read(), Err(ReadError::Io(MockError::Injected)));
        assert_eq!(sensor.interface().calls(), &[Call::HasPendingData]);
        assert_eq!(sensor.interface().remaining(), FRAME_LEN);
    }

    #[test]
    fn test_body_read_error_surfaces_as_io() {
        let mut sensor = sensor_with(&VALID_FRAME);
        sensor.interface_mut().fail_on(Call::ReadExact(30)).unwrap();
        assert_eq!(sensor.read(), Err(ReadError::Io(MockError::Injected)));
    }

    #[test]
    fn test_command_write_failure_is_returned() {
        let mut mock = MockInterface::new();
        mock.fail_on(Call::WriteAll(7)).unwrap();
        let mut sensor = Pms7003::new(mock, SensorConfig::default());

        assert_eq!(sensor.request_read(), Err(MockError::Injected));
        assert_eq!(
            sensor.set_reporting_mode(ReportingMode::Active),
            Err(MockError::Injected)
        );
        // Mode only changes once the command went out
        assert_eq!(sensor.config().reporting_mode, ReportingMode::Passive);
    }

    #[test]
    fn test_truncated_stream_surfaces_io_error() {
        let mut sensor = sensor_with(&VALID_FRAME[..10]);
        assert_eq!(sensor.read(), Err(ReadError::Io(MockError::Exhausted)));
    }

    #[test]
    fn test_no_resync_but_stream_recovers_on_next_call() {
        // One stray byte ahead of a good frame
        let mut stream = [0u8; FRAME_LEN + 1];
        stream[0] = 0x00;
        stream[1..].copy_from_slice(&VALID_FRAME);
        let mut sensor = sensor_with(&stream);

        assert_eq!(sensor.read(), Err(ReadError::BadStartMarker(0x00)));
        assert_eq!(sensor.read(), Ok(expected_measurement()));
    }

    #[test]
    fn test_consecutive_frames() {
        let second = frame::encode(&Measurement {
            pm2_5_atm: 310,
            count_0_3: 4021,
            ..Measurement::default()
        });
        let mut stream = [0u8; 2 * FRAME_LEN];
        stream[..FRAME_LEN].copy_from_slice(&VALID_FRAME);
        stream[FRAME_LEN..].copy_from_slice(&second);
        let mut sensor = sensor_with(&stream);

        assert_eq!(sensor.read(), Ok(expected_measurement()));
        let m = sensor.read().unwrap();
        assert_eq!(m.pm2_5_atm, 310);
        assert_eq!(m.count_0_3, 4021);
        assert_eq!(sensor.interface().remaining(), 0);
    }

    #[test]
    fn test_request_read_sends_passive_read() {
        let mut sensor = Pms7003::new(MockInterface::new(), SensorConfig::default());
        sensor.request_read().unwrap();
        assert_eq!(sensor.interface().calls(), &[Call::WriteAll(7)]);
        assert_eq!(
            sensor.interface().written(),
            &[0x42, 0x4D, 0xE2, 0x00, 0x00, 0x01, 0x71]
        );
    }

    #[test]
    fn test_sleep_and_wake() {
        let mut sensor = Pms7003::new(MockInterface::new(), SensorConfig::default());
        sensor.sleep().unwrap();
        sensor.wake().unwrap();
        assert_eq!(
            sensor.interface().written(),
            &[
                0x42, 0x4D, 0xE4, 0x00, 0x00, 0x01, 0x73, // sleep
                0x42, 0x4D, 0xE4, 0x00, 0x01, 0x01, 0x74, // wake-up
            ]
        );
    }

    #[test]
    fn test_set_reporting_mode_updates_config() {
        let mut sensor = Pms7003::new(MockInterface::new(), SensorConfig::default());
        sensor.set_reporting_mode(ReportingMode::Active).unwrap();
        assert_eq!(sensor.config().reporting_mode, ReportingMode::Active);
        assert_eq!(
            sensor.interface().written(),
            &[0x42, 0x4D, 0xE1, 0x00, 0x01, 0x01, 0x71]
        );
    }

    #[test]
    fn test_borrowed_handle() {
        let mut mock = MockInterface::new();
        {
            let mut sensor = Pms7003::new(&mut mock, SensorConfig::default());
            sensor.initialize().unwrap();
        }
        assert_eq!(mock.baud_rate(), Some(9600));
        assert_eq!(mock.calls().len(), 10);
    }

    #[test]
    fn test_independent_instances() {
        let mut a = sensor_with(&VALID_FRAME);
        let mut b = Pms7003::new(MockInterface::new(), SensorConfig::default());

        assert!(a.read().is_ok());
        assert_eq!(b.read(), Err(ReadError::NotReadable));

        let mock = a.release();
        assert_eq!(mock.remaining(), 0);
    }
}
