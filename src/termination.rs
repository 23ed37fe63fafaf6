//! Detects the end of a drop test as a sustained return to atmospheric pressure.

use crate::run::Sample;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AtmosphereDetector {
    level: Sample,      // if sample <= level { count += 1 } else { count = 0 }
    count_thresh: usize, // fired once count reaches this
    count: usize,
}

impl AtmosphereDetector {
    /// Create a detector that fires after `count_thresh` consecutive samples at or below
    /// `level`.
    ///
    /// Any sample strictly above `level` resets the detector, so a short dip towards
    /// atmospheric pressure (for example, a leak that recovers) does not end the run. For
    /// example, with `level` 105 and `count_thresh` 3, processing `[800, 100, 104, 500, 90,
    /// 80, 70]` fires at sample #7 (value 70); the dip at samples #2..#3 is forgotten when
    /// sample #4 arrives.
    pub fn new(level: Sample, count_thresh: usize) -> AtmosphereDetector {
        AtmosphereDetector { level, count_thresh, count: 0 }
    }

    /// Process one sample. Returns `true` if this sample completes the atmospheric run.
    pub fn process(&mut self, sample: Sample) -> bool {
        if sample <= self.level {
            self.count += 1;
            self.count >= self.count_thresh
        } else {
            self.count = 0;
            false
        }
    }

    /// Like `process`, but over a slice; stops at the sample that fires the detector.
    ///
    /// Returns the amount of consumed samples and whether the detector fired.
    pub fn find(&mut self, samples: &[Sample]) -> (usize, bool) {
        for (index, &sample) in samples.iter().enumerate() {
            if self.process(sample) {
                return (index + 1, true)
            }
        }
        (samples.len(), false)
    }

    /// Number of consecutive atmospheric samples seen so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn reset(&mut self) {
        self.count = 0;
    }
}
