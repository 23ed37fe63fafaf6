/// Raw 10-bit pressure reading.
pub type Sample = u16;

/// Samples of one drop test and their offsets from the first sample, in seconds.
///
/// Both sequences are index-aligned and in arrival order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Run {
    values: Vec<Sample>,
    offsets: Vec<f64>,
}

impl Run {
    /// Returns `None` if the sequences are not of equal length.
    pub fn from_parts(values: Vec<Sample>, offsets: Vec<f64>) -> Option<Run> {
        if values.len() == offsets.len() {
            Some(Run { values, offsets })
        } else {
            None
        }
    }

    pub(crate) fn push(&mut self, value: Sample, offset: f64) {
        self.values.push(value);
        self.offsets.push(offset);
    }

    pub fn values(&self) -> &[Sample] {
        &self.values
    }

    /// Offsets in seconds.
    pub fn offsets(&self) -> &[f64] {
        &self.offsets
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Offset of the last sample, or zero for an empty run.
    pub fn duration(&self) -> f64 {
        self.offsets.last().copied().unwrap_or(0.0)
    }
}
