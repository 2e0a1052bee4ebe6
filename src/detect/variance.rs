//! Variance minimization detection.
//!
//! A right guess splits content into pieces of similar length; a wrong one
//! fragments it irregularly. For each candidate terminator or delimiter the
//! length variance of the resulting pieces is computed and the lowest wins,
//! with near-ties going to the conventional choice (CRLF, comma).

use std::io;

use tracing::debug;

use super::{Bias, DialectDetector, variance};
use crate::dialect::{DELIMITERS, LINE_TERMINATORS, LineTerminator};
use crate::tokenize::RowTokenizer;

/// Detector picking the candidate with the least length variance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VarianceDetector {
    bias: Bias,
}

impl VarianceDetector {
    /// Create a detector with the given near-tie bias.
    pub const fn new(bias: Bias) -> Self {
        Self { bias }
    }

    /// Variance of the line lengths for each terminator candidate.
    ///
    /// Candidates that produce no complete line are left out.
    pub fn line_variances(sample: &[u8]) -> Vec<(LineTerminator, f64)> {
        LINE_TERMINATORS
            .iter()
            .filter_map(|&terminator| {
                let lengths = segment_lengths(sample, terminator.as_bytes());
                variance(&lengths).map(|v| (terminator, v))
            })
            .collect()
    }

    /// Variance of the cell lengths for each delimiter candidate.
    ///
    /// Only records with more than one field count; candidates that never
    /// split a record are left out.
    pub fn cell_variances(
        lines: &[Vec<u8>],
        tokenizer: &dyn RowTokenizer,
    ) -> Vec<(u8, f64)> {
        DELIMITERS
            .iter()
            .filter_map(|&delimiter| {
                let lines = lines.to_vec().into_iter().map(Ok::<_, io::Error>);
                let lengths: Vec<usize> = tokenizer
                    .tokenize(Box::new(lines), delimiter)
                    .filter_map(Result::ok)
                    .filter(|row| row.len() > 1)
                    .flat_map(|row| row.into_iter().map(|cell| cell.len()))
                    .collect();
                variance(&lengths).map(|v| (delimiter, v))
            })
            .collect()
    }
}

impl DialectDetector for VarianceDetector {
    fn line_terminator(&self, sample: &[u8]) -> LineTerminator {
        let variances = Self::line_variances(sample);
        debug!(?variances, "line terminator variances");

        self.bias
            .pick(&variances, LineTerminator::CRLF)
            .unwrap_or(LineTerminator::LF)
    }

    fn delimiter(&self, lines: &[Vec<u8>], tokenizer: &dyn RowTokenizer) -> u8 {
        let variances = Self::cell_variances(lines, tokenizer);
        debug!(?variances, "delimiter variances");

        self.bias.pick(&variances, b',').unwrap_or(b',')
    }
}

/// Lengths of the pieces between occurrences of `separator`.
///
/// The piece after the last separator is incomplete and not counted.
fn segment_lengths(data: &[u8], separator: &[u8]) -> Vec<usize> {
    let mut lengths = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i + separator.len() <= data.len() {
        if data[i..].starts_with(separator) {
            lengths.push(i - start);
            i += separator.len();
            start = i;
        } else {
            i += 1;
        }
    }

    lengths
}
