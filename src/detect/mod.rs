//! Line terminator and delimiter detection.
//!
//! Two strategies share the [`DialectDetector`] interface:
//! - [`VarianceDetector`] picks the candidate producing the most evenly sized
//!   lines or cells, with a bias toward the conventional default on near-ties.
//! - [`UniformityDetector`] counts terminators and picks the delimiter whose
//!   records have the most consistent field counts.

pub mod uniformity;
pub mod variance;

pub use uniformity::UniformityDetector;
pub use variance::VarianceDetector;

use crate::dialect::LineTerminator;
use crate::tokenize::RowTokenizer;

/// Strategy for detecting the line terminator and delimiter of a sample.
pub trait DialectDetector {
    /// Detect the line terminator from the raw byte sample.
    fn line_terminator(&self, sample: &[u8]) -> LineTerminator;

    /// Detect the field delimiter from normalized sample lines.
    fn delimiter(&self, lines: &[Vec<u8>], tokenizer: &dyn RowTokenizer) -> u8;
}

/// Which detection strategy a reader uses.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Detection {
    /// Variance minimization with the given near-tie bias.
    Variance(Bias),
    /// Table uniformity over the built-in candidate delimiters.
    Uniformity,
}

impl Default for Detection {
    fn default() -> Self {
        Detection::variance()
    }
}

impl Default for Bias {
    fn default() -> Self {
        Self {
            smoothing: SMOOTHING,
            threshold: THRESHOLD,
        }
    }
}

impl Detection {
    /// Variance minimization with the default bias.
    pub fn variance() -> Self {
        Detection::Variance(Bias::default())
    }

    /// Build the detector for this strategy.
    pub fn detector(&self) -> Box<dyn DialectDetector> {
        match self {
            Detection::Variance(bias) => Box::new(VarianceDetector::new(*bias)),
            Detection::Uniformity => Box::new(UniformityDetector::default()),
        }
    }
}

/// Smoothing added to every variance before comparing.
pub const SMOOTHING: f64 = 0.1;

/// Ratio above which the preferred candidate wins a near-tie.
pub const THRESHOLD: f64 = 0.9;

/// Near-tie bias toward a preferred candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bias {
    /// Added to every variance before comparing.
    pub smoothing: f64,
    /// The preferred candidate wins if `best / preferred` exceeds this.
    pub threshold: f64,
}

impl Bias {
    /// Create a bias with explicit constants.
    pub const fn new(smoothing: f64, threshold: f64) -> Self {
        Self {
            smoothing,
            threshold,
        }
    }

    /// Pick the candidate with the lowest variance, favoring `preferred`.
    ///
    /// Candidates are `(candidate, variance)` pairs; on equal variances the
    /// earlier one wins. Returns `None` if there are no candidates.
    pub fn pick<T>(&self, scored: &[(T, f64)], preferred: T) -> Option<T>
    where
        T: Copy + PartialEq,
    {
        let mut best: Option<(T, f64)> = None;
        for &(candidate, variance) in scored {
            let smoothed = variance + self.smoothing;
            if best.is_none_or(|(_, b)| smoothed < b) {
                best = Some((candidate, smoothed));
            }
        }
        let (best, best_variance) = best?;

        if let Some(&(_, variance)) = scored.iter().find(|(c, _)| *c == preferred) {
            let preferred_variance = variance + self.smoothing;
            if preferred_variance <= best_variance
                || best_variance / preferred_variance > self.threshold
            {
                return Some(preferred);
            }
        }

        Some(best)
    }
}

/// Population variance of a list of lengths.
///
/// Returns `None` for an empty list.
pub fn variance(values: &[usize]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let n = values.len() as f64;
    let mean: f64 = values.iter().sum::<usize>() as f64 / n;

    let variance: f64 = values
        .iter()
        .map(|&v| {
            let diff = v as f64 - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Some(variance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variance() {
        assert_eq!(variance(&[3, 3, 3, 3]), Some(0.0));
        assert_eq!(variance(&[0, 2]), Some(1.0));
        assert_eq!(variance(&[]), None);
    }

    #[test]
    fn test_pick_lowest() {
        let bias = Bias::default();
        let scored = [("lf", 5.0), ("crlf", 1.0), ("cr", 9.0)];
        assert_eq!(bias.pick(&scored, "crlf"), Some("crlf"));

        let scored = [("lf", 1.0), ("crlf", 5.0)];
        assert_eq!(bias.pick(&scored, "crlf"), Some("lf"));
    }

    #[test]
    fn test_pick_near_tie_goes_to_preferred() {
        let bias = Bias::default();
        // 0.1 / 0.11 > 0.9 even though lf is strictly lower
        let scored = [("lf", 0.0), ("crlf", 0.01)];
        assert_eq!(bias.pick(&scored, "crlf"), Some("crlf"));

        // 0.1 / 0.2 is not a near-tie
        let scored = [("lf", 0.0), ("crlf", 0.1)];
        assert_eq!(bias.pick(&scored, "crlf"), Some("lf"));
    }

    #[test]
    fn test_pick_ties_keep_order() {
        let bias = Bias::default();
        let scored = [("a", 1.0), ("b", 1.0)];
        assert_eq!(bias.pick(&scored, "missing"), Some("a"));
    }

    #[test]
    fn test_pick_without_smoothing() {
        let bias = Bias::new(0.0, 0.9);
        let scored = [("a", 0.0), ("b", 0.0)];
        assert_eq!(bias.pick(&scored, "b"), Some("b"));
    }

    #[test]
    fn test_pick_empty() {
        assert_eq!(Bias::default().pick::<u8>(&[], b','), None);
    }

    #[test]
    fn test_detection_default() {
        assert_eq!(Detection::default(), Detection::Variance(Bias::default()));
    }
}
