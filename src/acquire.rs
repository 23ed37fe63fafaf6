use std::io::{self, Read};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::{AcquisitionConfig, SAMPLE_MASK, SAMPLE_WIDTH};
use crate::run::{Run, Sample};
use crate::termination::AtmosphereDetector;

#[derive(Debug)]
pub enum AcquisitionError {
    Open { path: String, error: io::Error },
    Read { sample: usize, error: io::Error },
    ShortRead { sample: usize },
    Unsupported { path: String },
    InvalidConfig(&'static str),
}

impl std::fmt::Display for AcquisitionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Open { path, error } =>
                write!(f, "cannot open {}: {}", path, error),
            Self::Read { sample, error } =>
                write!(f, "read error at sample #{}: {}", sample, error),
            Self::ShortRead { sample } =>
                write!(f, "stream ended in the middle of sample #{}", sample),
            Self::Unsupported { path } =>
                write!(f, "cannot open {}: built without serial port support", path),
            Self::InvalidConfig(reason) =>
                write!(f, "invalid configuration: {}", reason),
        }
    }
}

impl std::error::Error for AcquisitionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { error, .. } | Self::Read { error, .. } => Some(error),
            _ => None,
        }
    }
}

/// Source of the current time, in seconds.
pub trait Clock {
    fn now(&mut self) -> f64;
}

impl<F: FnMut() -> f64> Clock for F {
    fn now(&mut self) -> f64 {
        self()
    }
}

/// Wall clock time since the Unix epoch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&mut self) -> f64 {
        match SystemTime::now().duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_secs_f64(),
            Err(error) => -error.duration().as_secs_f64(),
        }
    }
}

/// State of a single acquisition: the run built so far and the termination detector.
#[derive(Debug)]
pub struct AcquisitionSession {
    detector: AtmosphereDetector,
    origin: Option<f64>,
    run: Run,
}

impl AcquisitionSession {
    pub fn new(config: &AcquisitionConfig) -> Result<AcquisitionSession, AcquisitionError> {
        if config.atm_count_thresh == 0 {
            return Err(AcquisitionError::InvalidConfig("atmospheric count threshold is zero"))
        }
        Ok(AcquisitionSession {
            detector: AtmosphereDetector::new(config.atm_thresh, config.atm_count_thresh),
            origin: None,
            run: Run::default(),
        })
    }

    /// Append a sample received at wall clock time `now`.
    ///
    /// Returns `true` once the run is complete; no further samples should be accepted
    /// after that.
    pub fn accept(&mut self, value: Sample, now: f64) -> bool {
        let origin = *self.origin.get_or_insert(now);
        // the wall clock may step backwards; offsets never do
        let offset = (now - origin).max(0.0);
        self.run.push(value, offset);
        log::info!("{} : {}", value, offset);
        self.detector.process(value)
    }

    pub fn run(&self) -> &Run {
        &self.run
    }

    /// Number of consecutive atmospheric samples at the end of the run so far.
    pub fn atmospheric_count(&self) -> usize {
        self.detector.count()
    }

    pub fn finish(self) -> Run {
        self.run
    }
}

/// Decode one sample from its wire format. Only the low 10 bits are significant.
pub fn decode_sample(bytes: [u8; SAMPLE_WIDTH]) -> Sample {
    let raw = u16::from_be_bytes(bytes);
    if raw & !SAMPLE_MASK != 0 {
        log::warn!("sample {:#06x} has bits set above the 10-bit range, masking", raw);
    }
    raw & SAMPLE_MASK
}

/// Read samples from `reader` until the pressure returns to atmospheric, and return the run.
///
/// Each sample is read, timestamped, counted and logged before the next one is read.
pub fn acquire<R, C>(reader: &mut R, clock: &mut C, config: &AcquisitionConfig)
        -> Result<Run, AcquisitionError>
        where R: Read + ?Sized, C: Clock + ?Sized {
    let mut session = AcquisitionSession::new(config)?;
    log::debug!("acquire: started with {:?}", config);
    loop {
        let sample = session.run().len();
        let mut bytes = [0u8; SAMPLE_WIDTH];
        reader.read_exact(&mut bytes).map_err(|error| match error.kind() {
            io::ErrorKind::UnexpectedEof => AcquisitionError::ShortRead { sample },
            _ => AcquisitionError::Read { sample, error },
        })?;
        log::trace!("acquire: frame {:02x?}", bytes);
        let value = decode_sample(bytes);
        if session.accept(value, clock.now()) {
            break
        }
    }
    let run = session.finish();
    log::debug!("acquire: done after {} samples ({:.3} s)", run.len(), run.duration());
    Ok(run)
}

#[cfg(test)]
mod test {
    use super::*;

    fn frames(values: &[u16]) -> Vec<u8> {
        values.iter().flat_map(|value| value.to_be_bytes()).collect()
    }

    // one tick per second, starting at an arbitrary epoch time
    fn ticking_clock() -> impl FnMut() -> f64 {
        let mut time = 1_700_000_000.0;
        move || { let now = time; time += 1.0; now }
    }

    fn config(atm_thresh: u16, atm_count_thresh: usize) -> AcquisitionConfig {
        AcquisitionConfig { atm_thresh, atm_count_thresh }
    }

    #[test]
    fn test_decode_sample() {
        assert_eq!(decode_sample([0x03, 0x20]), 800);
        assert_eq!(decode_sample([0x00, 0x5a]), 90);
        assert_eq!(decode_sample([0x03, 0xff]), 1023);
        assert_eq!(decode_sample([0xfc, 0x01]), 1);
    }

    #[test]
    fn test_dip_then_drop() {
        let data = frames(&[800, 700, 100, 104, 500, 90, 50, 20, 999]);
        let run = acquire(&mut &data[..], &mut ticking_clock(), &config(105, 3)).unwrap();
        assert_eq!(run.values(), &[800, 700, 100, 104, 500, 90, 50, 20]);
        assert_eq!(run.offsets(), &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_three_atmospheric_in_a_row() {
        // `100, 104, 90` are all at or below 105, so the third of them ends the run
        let data = frames(&[800, 700, 100, 104, 90, 500, 50]);
        let run = acquire(&mut &data[..], &mut ticking_clock(), &config(105, 3)).unwrap();
        assert_eq!(run.values(), &[800, 700, 100, 104, 90]);
    }

    #[test]
    fn test_dip_does_not_terminate() {
        let data = frames(&[800, 700, 100, 104, 500]);
        let mut session = AcquisitionSession::new(&config(105, 3)).unwrap();
        let mut clock = ticking_clock();
        for value in [800, 700, 100, 104] {
            assert!(!session.accept(value, clock.now()));
        }
        assert_eq!(session.atmospheric_count(), 2);
        assert!(!session.accept(500, clock.now()));
        assert_eq!(session.atmospheric_count(), 0);
        // the same stream alone runs dry before terminating
        let result = acquire(&mut &data[..], &mut ticking_clock(), &config(105, 3));
        assert!(matches!(result, Err(AcquisitionError::ShortRead { sample: 5 })));
    }

    #[test]
    fn test_starts_atmospheric() {
        let data = frames(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]);
        let run = acquire(&mut &data[..], &mut ticking_clock(), &AcquisitionConfig::default())
            .unwrap();
        assert_eq!(run.len(), crate::ATM_COUNT_THRESH);
        assert_eq!(run.offsets()[0], 0.0);
    }

    #[test]
    fn test_short_read() {
        let mut data = frames(&[800, 700]);
        data.push(0x03);
        let result = acquire(&mut &data[..], &mut ticking_clock(), &config(105, 3));
        assert!(matches!(result, Err(AcquisitionError::ShortRead { sample: 2 })));
    }

    #[test]
    fn test_read_error() {
        struct Disconnected;

        impl Read for Disconnected {
            fn read(&mut self, _data: &mut [u8]) -> io::Result<usize> {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
            }
        }

        let result = acquire(&mut Disconnected, &mut ticking_clock(), &config(105, 3));
        match result {
            Err(AcquisitionError::Read { sample: 0, error }) =>
                assert_eq!(error.kind(), io::ErrorKind::BrokenPipe),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_invalid_config() {
        let data = frames(&[1, 2, 3]);
        let result = acquire(&mut &data[..], &mut ticking_clock(), &config(105, 0));
        assert!(matches!(result, Err(AcquisitionError::InvalidConfig(_))));
    }

    #[test]
    fn test_clock_steps_backwards() {
        let mut session = AcquisitionSession::new(&config(105, 3)).unwrap();
        session.accept(800, 100.0);
        session.accept(800, 99.5);
        session.accept(800, 101.25);
        assert_eq!(session.run().offsets(), &[0.0, 0.0, 1.25]);
    }

    #[test]
    fn test_sessions_are_isolated() {
        let mut first = AcquisitionSession::new(&config(105, 2)).unwrap();
        let mut second = AcquisitionSession::new(&config(105, 2)).unwrap();
        assert!(!first.accept(10, 0.0));
        assert!(!second.accept(900, 5.0));
        assert!(first.accept(10, 1.0));
        assert!(!second.accept(10, 6.0));
        assert_eq!(first.finish().len(), 2);
        assert_eq!(second.finish().offsets(), &[0.0, 1.0]);
    }

    #[test]
    fn test_simulator() {
        let mut source = crate::Simulator::new(800, 60, 20);
        let run = acquire(&mut source, &mut ticking_clock(), &AcquisitionConfig::default())
            .unwrap();
        assert_eq!(run.len(), 20 + crate::ATM_COUNT_THRESH);
        assert!(run.values()[..20].iter().all(|&value| value > crate::ATM_THRESH));
    }

    #[test]
    fn test_simulator_real_time() {
        let period = std::time::Duration::from_millis(5);
        let mut source = crate::Simulator::new(800, 60, 3).with_period(period);
        let run = acquire(&mut source, &mut SystemClock, &AcquisitionConfig::default())
            .unwrap();
        assert_eq!(run.len(), 3 + crate::ATM_COUNT_THRESH);
        assert_eq!(run.offsets()[0], 0.0);
        assert!(run.offsets().windows(2).all(|pair| pair[0] <= pair[1]));
        // 12 more sleeps separate the last sample from the first
        assert!(run.duration() >= 0.055, "run lasted {} s", run.duration());
    }

    mod logging {
        use std::cell::RefCell;

        thread_local! {
            static LINES: RefCell<Vec<String>> = RefCell::new(Vec::new());
        }

        struct Capture;

        impl log::Log for Capture {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                metadata.level() <= log::Level::Info
            }

            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    LINES.with(|lines| lines.borrow_mut().push(record.args().to_string()));
                }
            }

            fn flush(&self) {}
        }

        static CAPTURE: Capture = Capture;

        // records logged on the calling thread while `f` runs
        pub fn capture<F: FnOnce()>(f: F) -> Vec<String> {
            let _ = log::set_logger(&CAPTURE);
            log::set_max_level(log::LevelFilter::Info);
            LINES.with(|lines| lines.borrow_mut().clear());
            f();
            LINES.with(|lines| lines.borrow_mut().drain(..).collect())
        }
    }

    #[test]
    fn test_logs_each_sample() {
        let data = frames(&[800, 90, 50, 20, 999]);
        let lines = logging::capture(|| {
            acquire(&mut &data[..], &mut ticking_clock(), &config(105, 3)).unwrap();
        });
        assert_eq!(lines, ["800 : 0", "90 : 1", "50 : 2", "20 : 3"]);
    }

    mod proptests {
        use proptest::prelude::*;

        use super::*;

        fn pressurized() -> impl Strategy<Value = u16> { 106u16..=1023 }
        fn atmospheric() -> impl Strategy<Value = u16> { 0u16..=105 }

        // a prefix never holding `count` atmospheric samples in a row
        fn no_run_prefix(count: usize) -> impl Strategy<Value = Vec<u16>> {
            prop::collection::vec(
                (prop::collection::vec(atmospheric(), 0..count), pressurized()),
                0..8
            ).prop_map(|groups| {
                groups.into_iter().flat_map(|(mut dip, high)| { dip.push(high); dip }).collect()
            })
        }

        proptest! {
            #[test]
            fn terminates_after_first_atmospheric_run(
                (count, prefix, suffix, tail) in (1usize..6).prop_flat_map(|count| (
                    Just(count),
                    no_run_prefix(count),
                    prop::collection::vec(atmospheric(), count),
                    prop::collection::vec(0u16..=1023, 0..4),
                ))
            ) {
                let mut values = prefix.clone();
                values.extend(&suffix);
                values.extend(&tail);
                let data = frames(&values);
                let run = acquire(&mut &data[..], &mut ticking_clock(), &config(105, count))
                    .unwrap();
                prop_assert_eq!(run.len(), prefix.len() + count);
                prop_assert_eq!(run.values(), &values[..prefix.len() + count]);
                prop_assert_eq!(run.offsets().len(), run.len());
            }
        }
    }
}
