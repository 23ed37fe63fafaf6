use std::io;
use std::time::Duration;

use crate::config::SAMPLE_MASK;
use crate::run::Sample;

/// The sensor firmware sends about one sample per second.
pub const SENSOR_PERIOD: Duration = Duration::from_secs(1);

/// Synthetic drop test: a slowly leaking pressurized plateau, then ambient pressure forever.
///
/// Produces the same wire format as the sensor (big-endian `u16` per sample).
#[derive(Debug, Clone)]
pub struct Simulator {
    plateau: Sample,
    ambient: Sample,
    drop_after: usize,
    period: Duration,
    index: usize,
    pending: Option<u8>,
}

impl Default for Simulator {
    fn default() -> Self {
        Simulator::new(800, 60, 120)
    }
}

impl Simulator {
    pub fn new(plateau: Sample, ambient: Sample, drop_after: usize) -> Simulator {
        Simulator {
            plateau,
            ambient,
            drop_after,
            period: Duration::ZERO,
            index: 0,
            pending: None,
        }
    }

    /// Wait `period` before emitting each sample, to mimic the sensor's sampling rate.
    pub fn with_period(self, period: Duration) -> Simulator {
        Simulator { period, ..self }
    }

    /// Value of the `index`-th sample.
    pub fn sample(&self, index: usize) -> Sample {
        let value = if index < self.drop_after {
            let leaked = (index / 4).min(Sample::MAX as usize) as Sample;
            self.plateau.saturating_sub(leaked).max(self.ambient)
        } else {
            self.ambient
        };
        value & SAMPLE_MASK
    }
}

impl io::Read for Simulator {
    fn read(&mut self, data: &mut [u8]) -> io::Result<usize> {
        for byte in data.iter_mut() {
            *byte = match self.pending.take() {
                Some(low) => low,
                None => {
                    if !self.period.is_zero() {
                        std::thread::sleep(self.period);
                    }
                    let [high, low] = self.sample(self.index).to_be_bytes();
                    self.index += 1;
                    self.pending = Some(low);
                    high
                }
            };
        }
        Ok(data.len())
    }
}
