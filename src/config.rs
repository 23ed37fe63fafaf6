//! Reference configuration of the drop test rig.

/// Unsigned 10-bit reading at or below which the sensor is considered to be at atmospheric
/// pressure.
pub const ATM_THRESH: u16 = 105;

/// Number of consecutive atmospheric readings that end a run.
pub const ATM_COUNT_THRESH: usize = 10;

/// Each sample arrives as a big-endian `u16`.
pub const SAMPLE_WIDTH: usize = 2;

/// The sensor ADC has 10 significant bits.
pub const SAMPLE_MASK: u16 = 0x03ff;

pub const BAUD_RATE: u32 = 19200;

#[cfg(windows)]
pub const DEFAULT_PORT: &str = "COM11";
#[cfg(not(windows))]
pub const DEFAULT_PORT: &str = "/dev/ttyUSB0";

pub const DEFAULT_FILENAME: &str = "pressure-data.csv";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AcquisitionConfig {
    /// Readings `<= atm_thresh` count as atmospheric.
    pub atm_thresh: u16,
    /// Must be at least 1.
    pub atm_count_thresh: usize,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            atm_thresh: ATM_THRESH,
            atm_count_thresh: ATM_COUNT_THRESH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    pub path: String,
    pub baud_rate: u32,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_PORT.to_owned(),
            baud_rate: BAUD_RATE,
        }
    }
}

impl SerialConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self { path: path.into(), ..Default::default() }
    }
}
