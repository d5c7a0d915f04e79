// src/common/measurement.rs

/// One decoded sensor reading.
///
/// Concentrations are in µg/m³. Particle counts are the number of particles
/// above the given diameter per 0.1 L of sampled air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Measurement {
    /// PM1.0, CF=1 (standard particle).
    pub pm1_0_cf1: u16,
    /// PM2.5, CF=1 (standard particle).
    pub pm2_5_cf1: u16,
    /// PM10, CF=1 (standard particle).
    pub pm10_cf1: u16,
    /// PM1.0, atmospheric environment.
    pub pm1_0_atm: u16,
    /// PM2.5, atmospheric environment.
    pub pm2_5_atm: u16,
    /// PM10, atmospheric environment.
    pub pm10_atm: u16,
    /// Particles > 0.3 µm.
    pub count_0_3: u16,
    /// Particles > 0.5 µm.
    pub count_0_5: u16,
    /// Particles > 1.0 µm.
    pub count_1_0: u16,
    /// Particles > 2.5 µm.
    pub count_2_5: u16,
    /// Particles > 5.0 µm.
    pub count_5_0: u16,
    /// Particles > 10 µm.
    pub count_10: u16,
}

impl Measurement {
    /// Builds a measurement from the twelve data words of a frame, in wire order.
    pub fn from_words(words: [u16; 12]) -> Self {
        let [
            pm1_0_cf1,
            pm2_5_cf1,
            pm10_cf1,
            pm1_0_atm,
            pm2_5_atm,
            pm10_atm,
            count_0_3,
            count_0_5,
            count_1_0,
            count_2_5,
            count_5_0,
            count_10,
        ] = words;
        Measurement {
            pm1_0_cf1,
            pm2_5_cf1,
            pm10_cf1,
            pm1_0_atm,
            pm2_5_atm,
            pm10_atm,
            count_0_3,
            count_0_5,
            count_1_0,
            count_2_5,
            count_5_0,
            count_10,
        }
    }
}
