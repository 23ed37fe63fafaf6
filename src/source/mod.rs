//! Byte stream sources that samples are read from.

use std::io::Read;

use crate::acquire::AcquisitionError;
use crate::config::SerialConfig;

mod simulator;

pub use simulator::{Simulator, SENSOR_PERIOD};

#[cfg(feature = "hardware")]
#[path = "serial.rs"]
mod imp;

#[cfg(not(feature = "hardware"))]
#[path = "stub.rs"]
mod imp;

#[derive(Debug, Clone)]
pub enum DataSource {
    Serial(SerialConfig),
    Simulator(Simulator),
}

impl DataSource {
    /// Open the source for reading. The returned stream is closed when dropped.
    pub fn open(self) -> Result<Box<dyn Read + Send>, AcquisitionError> {
        match self {
            DataSource::Serial(config) => imp::open(&config),
            DataSource::Simulator(simulator) => {
                log::debug!("source: opened {:?}", simulator);
                Ok(Box::new(simulator))
            }
        }
    }
}
