//! Non-destructive sampling of a chunk or line stream.
//!
//! Detection needs to look at the beginning of a stream that cannot be
//! rewound. The accumulators pull a bounded prefix off the stream and keep it;
//! [`ByteSample::splice`] and [`LineSample::splice`] then put it back in front
//! of whatever is left, so downstream stages see the stream unchanged.

use std::io;
use std::vec;

use crate::encoding::{UTF8_BOM, has_utf8_bom};
use crate::sample::SampleSize;

/// Bytes pulled from the front of a chunk stream.
#[derive(Debug, Default)]
pub struct ByteSample {
    bytes: Vec<u8>,
    error: Option<io::Error>,
    ended: bool,
}

impl ByteSample {
    /// The sampled bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of sampled bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns true if the source failed while sampling.
    ///
    /// The error itself is replayed by the splice, at the position it
    /// happened.
    pub fn has_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns true if the sample holds the whole stream.
    pub fn reached_end(&self) -> bool {
        self.ended
    }

    /// Drop a leading UTF-8 BOM, if any.
    pub(crate) fn strip_utf8_bom(&mut self) -> bool {
        if has_utf8_bom(&self.bytes) {
            self.bytes.drain(..UTF8_BOM.len());
            true
        } else {
            false
        }
    }

    /// Put the sample back in front of the rest of the stream.
    pub fn splice<I>(self, rest: I) -> Splice<I> {
        let head = if self.bytes.is_empty() {
            Vec::new()
        } else {
            vec![self.bytes]
        };
        Splice::new(head, self.error, rest)
    }
}

/// Lines pulled from the front of a line stream.
#[derive(Debug, Default)]
pub struct LineSample {
    lines: Vec<Vec<u8>>,
    error: Option<io::Error>,
}

impl LineSample {
    /// The sampled lines, terminators included.
    pub fn lines(&self) -> &[Vec<u8>] {
        &self.lines
    }

    /// Number of sampled lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if nothing was sampled.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Put the sample back in front of the rest of the stream.
    pub fn splice<I>(self, rest: I) -> Splice<I> {
        Splice::new(self.lines, self.error, rest)
    }
}

/// Pull chunks until at least `size_budget` bytes are collected.
///
/// Stops early, without error, when the stream ends. `stream` is left
/// positioned after the last pulled chunk.
pub fn accumulate_bytes<I>(stream: &mut I, size_budget: usize) -> ByteSample
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    let mut sample = ByteSample::default();

    while sample.bytes.len() < size_budget {
        match stream.next() {
            Some(Ok(chunk)) => {
                if sample.bytes.is_empty() {
                    sample.bytes = chunk;
                } else {
                    sample.bytes.extend_from_slice(&chunk);
                }
            }
            Some(Err(e)) => {
                sample.error = Some(e);
                break;
            }
            None => {
                sample.ended = true;
                break;
            }
        }
    }

    sample
}

/// Pull lines until the sample size budget is used up.
pub fn accumulate_lines<I>(stream: &mut I, size: SampleSize) -> LineSample
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    let mut sample = LineSample::default();
    let budget = size.budget();
    let mut used = 0;

    while used < budget {
        match stream.next() {
            Some(Ok(line)) => {
                used += size.measure(&line);
                sample.lines.push(line);
            }
            Some(Err(e)) => {
                sample.error = Some(e);
                break;
            }
            None => break,
        }
    }

    sample
}

/// A sampled prefix followed by the rest of its stream.
///
/// Yields the prefix items, then the error hit while sampling (if any), then
/// everything `rest` has left.
#[derive(Debug)]
pub struct Splice<I> {
    head: vec::IntoIter<Vec<u8>>,
    error: Option<io::Error>,
    rest: I,
}

impl<I> Splice<I> {
    fn new(head: Vec<Vec<u8>>, error: Option<io::Error>, rest: I) -> Self {
        Self {
            head: head.into_iter(),
            error,
            rest,
        }
    }
}

impl<I> Iterator for Splice<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(item) = self.head.next() {
            return Some(Ok(item));
        }
        if let Some(e) = self.error.take() {
            return Some(Err(e));
        }
        self.rest.next()
    }
}
