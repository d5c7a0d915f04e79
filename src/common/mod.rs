// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod command;
pub mod config;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod measurement;

// --- Re-export key types/traits/functions for easier access ---

// From command.rs
pub use command::{Command, OperatingState, ReportingMode, COMMAND_LEN};

// From config.rs
pub use config::{PinConfig, SensorConfig, BAUD_RATE};

// From error.rs
pub use error::{FrameError, ReadError};

// From frame.rs (constants stay under common::frame::*)
pub use frame::FRAME_LEN;

// From hal_traits.rs
pub use hal_traits::{Direction, ErrorType, Level, PinFunction, PinId, SensorPins, SensorSerial};

// From measurement.rs
pub use measurement::Measurement;
