//! Table uniformity detection.
//!
//! The coarser of the two strategies: the line terminator is whichever
//! terminator occurs most, and the delimiter is the candidate whose records
//! have the most uniform field counts, scored with:
//! - `tau_0` (consistency): `1 / (1 + 2 * sigma)` of the field counts
//! - `tau_1` (dispersion): range, transitions and modal dominance

use foldhash::{HashMap, HashMapExt};
use std::io;
use tracing::debug;

use super::DialectDetector;
use crate::dialect::LineTerminator;
use crate::tokenize::RowTokenizer;

/// Delimiters tried by default.
pub const CANDIDATE_DELIMITERS: &[u8] = b",;\t|";

/// Detector scoring candidate delimiters by table uniformity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformityDetector {
    delimiters: Vec<u8>,
}

impl Default for UniformityDetector {
    fn default() -> Self {
        Self::new(CANDIDATE_DELIMITERS.to_vec())
    }
}

impl UniformityDetector {
    /// Create a detector trying `delimiters`, earlier ones winning ties.
    pub fn new(delimiters: Vec<u8>) -> Self {
        Self { delimiters }
    }

    /// The candidate delimiters.
    pub fn delimiters(&self) -> &[u8] {
        &self.delimiters
    }
}

impl DialectDetector for UniformityDetector {
    fn line_terminator(&self, sample: &[u8]) -> LineTerminator {
        count_line_terminator(sample)
    }

    fn delimiter(&self, lines: &[Vec<u8>], tokenizer: &dyn RowTokenizer) -> u8 {
        let mut best: Option<(u8, f64)> = None;

        for &delimiter in &self.delimiters {
            let lines = lines.to_vec().into_iter().map(Ok::<_, io::Error>);
            let field_counts: Vec<usize> = tokenizer
                .tokenize(Box::new(lines), delimiter)
                .filter_map(Result::ok)
                .filter(|row| !row.is_empty())
                .map(|row| row.len())
                .collect();

            let counts = FieldCounts::new(field_counts);
            if counts.modal() <= 1 {
                continue;
            }

            let score = counts.uniformity();
            debug!(delimiter = ?(delimiter as char), score, "uniformity score");

            if best.is_none_or(|(_, s)| score > s) {
                best = Some((delimiter, score));
            }
        }

        match best {
            Some((delimiter, _)) => delimiter,
            None => {
                debug!("no sniffable dialect, falling back to comma");
                b','
            }
        }
    }
}

/// Detect the most likely line terminator by counting occurrences.
pub fn count_line_terminator(data: &[u8]) -> LineTerminator {
    let crlf_count = data.windows(2).filter(|w| *w == b"\r\n").count();
    let lf_count = bytecount::count(data, b'\n') - crlf_count;
    let cr_count = bytecount::count(data, b'\r') - crlf_count;

    // Prefer CRLF if present (Windows), then LF (Unix), then CR (old Mac)
    if crlf_count > 0 && crlf_count >= lf_count && crlf_count >= cr_count {
        LineTerminator::CRLF
    } else if lf_count >= cr_count {
        LineTerminator::LF
    } else {
        LineTerminator::CR
    }
}

/// Field counts of the records of one tokenized sample.
#[derive(Debug, Clone)]
struct FieldCounts {
    counts: Vec<usize>,
    modal: usize,
}

impl FieldCounts {
    fn new(counts: Vec<usize>) -> Self {
        let modal = modal_field_count(&counts);
        Self { counts, modal }
    }

    fn modal(&self) -> usize {
        self.modal
    }

    /// Geometric mean of `tau_0` and `tau_1`.
    fn uniformity(&self) -> f64 {
        (self.tau_0() * self.tau_1()).sqrt()
    }

    fn tau_0(&self) -> f64 {
        if self.counts.is_empty() {
            return 0.0;
        }

        let sigma = super::variance(&self.counts).unwrap_or(0.0).sqrt();
        1.0 / 2.0f64.mul_add(sigma, 1.0)
    }

    fn tau_1(&self) -> f64 {
        let n = self.counts.len();
        if n == 0 {
            return 0.0;
        }
        if n == 1 {
            return 1.0;
        }

        let min_fc = self.counts.iter().copied().min().unwrap_or(0);
        let max_fc = self.counts.iter().copied().max().unwrap_or(0);
        let range_score = if max_fc == 0 {
            0.0
        } else {
            1.0 - ((max_fc - min_fc) as f64 / max_fc as f64).min(1.0)
        };

        let transitions = self.counts.windows(2).filter(|w| w[0] != w[1]).count();
        let transition_score = 1.0 - (transitions as f64 / (n - 1) as f64);

        let mode_freq = self.counts.iter().filter(|&&c| c == self.modal).count();
        let mode_score = mode_freq as f64 / n as f64;

        // range_score * 0.3 + transition_score * 0.3 + mode_score * 0.4
        mode_score.mul_add(0.4, range_score * 0.3 + transition_score * 0.3)
    }
}

/// Most common field count; ties go to the higher count.
fn modal_field_count(field_counts: &[usize]) -> usize {
    let mut counts: HashMap<usize, usize> = HashMap::with_capacity(field_counts.len());
    for &fc in field_counts {
        *counts.entry(fc).or_insert(0) += 1;
    }

    counts
        .into_iter()
        .max_by(|(fc_a, count_a), (fc_b, count_b)| {
            count_a.cmp(count_b).then_with(|| fc_a.cmp(fc_b))
        })
        .map_or(0, |(fc, _)| fc)
}
