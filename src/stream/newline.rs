//! Universal newline handling for chunked input.
//!
//! Turns a stream of raw chunks into lines ending in exactly one `\n`, whatever
//! mixture of `\n`, `\r\n` and `\r` the source uses and wherever the chunk
//! boundaries fall.

use std::collections::VecDeque;
use std::io;
use std::mem;

const LF: u8 = b'\n';
const CR: u8 = b'\r';

/// Stateful newline normalizer.
///
/// Bytes not yet known to end a line are kept in `tail` between calls to
/// [`push`](Self::push). A CR at the very end of a chunk is ambiguous (it may
/// be the first half of a CRLF) and stays in `tail` until the next chunk or
/// [`finish`](Self::finish) resolves it.
///
/// # Example
///
/// ```
/// use casava::UniversalNewlines;
///
/// let mut newlines = UniversalNewlines::new();
/// let mut lines: Vec<Vec<u8>> = Vec::new();
/// newlines.push(b"a\r", &mut lines);
/// newlines.push(b"\nb", &mut lines);
/// lines.extend(newlines.finish());
///
/// assert_eq!(lines, vec![b"a\n".to_vec(), b"b".to_vec()]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct UniversalNewlines {
    tail: Vec<u8>,
}

impl UniversalNewlines {
    /// Create a normalizer with an empty tail.
    pub const fn new() -> Self {
        Self { tail: Vec::new() }
    }

    /// Bytes carried over from previous chunks.
    pub fn tail(&self) -> &[u8] {
        &self.tail
    }

    /// Feed one chunk, appending every line it completes to `lines`.
    pub fn push<E>(&mut self, chunk: &[u8], lines: &mut E)
    where
        E: Extend<Vec<u8>>,
    {
        if chunk.is_empty() {
            return;
        }

        let mut rest = chunk;

        // A CR left over from the previous chunk ends a line either way
        if self.tail.last() == Some(&CR) {
            self.tail.pop();
            lines.extend(Some(self.take_line()));
            if rest[0] == LF {
                rest = &rest[1..];
            }
        }

        while let Some(pos) = rest.iter().position(|&b| b == LF || b == CR) {
            let skip = if rest[pos] == CR {
                match rest.get(pos + 1) {
                    Some(&LF) => 2,
                    Some(_) => 1,
                    None => break,
                }
            } else {
                1
            };

            self.tail.extend_from_slice(&rest[..pos]);
            lines.extend(Some(self.take_line()));
            rest = &rest[pos + skip..];
        }

        self.tail.extend_from_slice(rest);
    }

    /// Flush the tail at end of stream.
    ///
    /// A pending CR is a terminator and is emitted as `\n`; otherwise the last
    /// line is returned as-is, with no terminator added.
    pub fn finish(&mut self) -> Option<Vec<u8>> {
        if self.tail.is_empty() {
            return None;
        }
        if self.tail.last() == Some(&CR) {
            self.tail.pop();
            return Some(self.take_line());
        }
        Some(mem::take(&mut self.tail))
    }

    fn take_line(&mut self) -> Vec<u8> {
        let mut line = mem::take(&mut self.tail);
        line.push(LF);
        line
    }
}

/// Iterator adapter yielding normalized lines from a chunk stream.
#[derive(Debug)]
pub struct Lines<I> {
    chunks: I,
    newlines: UniversalNewlines,
    ready: VecDeque<Vec<u8>>,
    done: bool,
}

impl<I> Lines<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    /// Wrap a chunk stream.
    pub fn new(chunks: I) -> Self {
        Self {
            chunks,
            newlines: UniversalNewlines::new(),
            ready: VecDeque::new(),
            done: false,
        }
    }
}

impl<I> Iterator for Lines<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(line) = self.ready.pop_front() {
                return Some(Ok(line));
            }
            if self.done {
                return None;
            }
            match self.chunks.next() {
                Some(Ok(chunk)) => self.newlines.push(&chunk, &mut self.ready),
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.done = true;
                    self.ready.extend(self.newlines.finish());
                }
            }
        }
    }
}
