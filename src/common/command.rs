// src/common/command.rs

use super::frame::{checksum, START_1, START_2};

/// Length of every host-to-sensor command.
pub const COMMAND_LEN: usize = 7;

const CMD_READ_PASSIVE: u8 = 0xE2;
const CMD_CHANGE_MODE: u8 = 0xE1;
const CMD_SLEEP_SET: u8 = 0xE4;

/// How the sensor reports frames.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum ReportingMode {
    /// A frame is emitted only after a read request.
    #[default]
    Passive,
    /// Frames are streamed continuously.
    Active,
}

/// Power state requested over the serial link.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum OperatingState {
    Sleep,
    Wakeup,
}

/// Commands understood by the sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Command {
    /// Switch between passive and active reporting.
    SetReportingMode(ReportingMode),
    /// Ask for one frame while in passive mode.
    ReadPassive,
    /// Put the fan and laser to sleep, or wake them.
    SetOperatingState(OperatingState),
}

impl Command {
    fn code_and_data(&self) -> (u8, u16) {
        match self {
            Command::SetReportingMode(ReportingMode::Passive) => (CMD_CHANGE_MODE, 0x0000),
            Command::SetReportingMode(ReportingMode::Active) => (CMD_CHANGE_MODE, 0x0001),
            Command::ReadPassive => (CMD_READ_PASSIVE, 0x0000),
            Command::SetOperatingState(OperatingState::Sleep) => (CMD_SLEEP_SET, 0x0000),
            Command::SetOperatingState(OperatingState::Wakeup) => (CMD_SLEEP_SET, 0x0001),
        }
    }

    /// Encodes the command as `42 4D CMD DATAH DATAL LRCH LRCL`.
    ///
    /// The trailing check word is the big-endian sum of the first five bytes.
    pub fn encode(&self) -> [u8; COMMAND_LEN] {
        let (code, data) = self.code_and_data();
        let [data_h, data_l] = data.to_be_bytes();
        let mut bytes = [START_1, START_2, code, data_h, data_l, 0, 0];
        let [lrc_h, lrc_l] = checksum(&bytes[..5]).to_be_bytes();
        bytes[5] = lrc_h;
        bytes[6] = lrc_l;
        bytes
    }
}
