// src/lib.rs

#![no_std] // Specify no_std at the crate root

pub mod common;
pub mod driver;
pub mod platform;

// Re-export key types for convenience
pub use common::{Measurement, ReadError, SensorConfig};
pub use driver::Pms7003;
