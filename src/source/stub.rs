use std::io::Read;

use crate::acquire::AcquisitionError;
use crate::config::SerialConfig;

pub fn open(config: &SerialConfig) -> Result<Box<dyn Read + Send>, AcquisitionError> {
    Err(AcquisitionError::Unsupported { path: config.path.clone() })
}
