use std::io::Read;
use std::time::Duration;

use crate::acquire::AcquisitionError;
use crate::config::SerialConfig;

// The sensor sends nothing until it is powered, and the operator may take a while to set up
// the drop after starting the capture.
const READ_TIMEOUT: Duration = Duration::from_secs(60 * 60 * 24);

pub fn open(config: &SerialConfig) -> Result<Box<dyn Read + Send>, AcquisitionError> {
    let port = serialport::new(config.path.as_str(), config.baud_rate)
        .data_bits(serialport::DataBits::Eight)
        .parity(serialport::Parity::None)
        .stop_bits(serialport::StopBits::One)
        .flow_control(serialport::FlowControl::None)
        .timeout(READ_TIMEOUT)
        .open()
        .map_err(|error| AcquisitionError::Open {
            path: config.path.clone(),
            error: error.into(),
        })?;
    log::debug!("source: opened {} at {} baud", config.path, config.baud_rate);
    Ok(Box::new(port))
}
