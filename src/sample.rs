/// Sample size configuration for delimiter detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSize {
    /// Sample a specific number of normalized lines.
    Lines(usize),
    /// Sample lines until their total length reaches a number of bytes.
    Bytes(usize),
}

impl Default for SampleSize {
    fn default() -> Self {
        SampleSize::Lines(1024)
    }
}

impl SampleSize {
    /// Returns the number of lines to sample, or None for a byte budget.
    pub fn lines(&self) -> Option<usize> {
        match self {
            SampleSize::Lines(n) => Some(*n),
            SampleSize::Bytes(_) => None,
        }
    }

    /// Returns the number of bytes to sample, or None for a line budget.
    pub fn bytes(&self) -> Option<usize> {
        match self {
            SampleSize::Bytes(n) => Some(*n),
            SampleSize::Lines(_) => None,
        }
    }

    /// The budget, whatever its unit.
    pub(crate) fn budget(&self) -> usize {
        match self {
            SampleSize::Lines(n) | SampleSize::Bytes(n) => *n,
        }
    }

    /// How much of the budget one line uses up.
    pub(crate) fn measure(&self, line: &[u8]) -> usize {
        match self {
            SampleSize::Lines(_) => 1,
            SampleSize::Bytes(_) => line.len(),
        }
    }
}

/// Default number of bytes sampled for encoding and line terminator detection.
pub const ENC_DETECTION_SIZE: usize = 10 * 1024;

/// Default chunk size when reading from an `io::Read` source.
pub const CHUNK_SIZE: usize = 8 * 1024;
