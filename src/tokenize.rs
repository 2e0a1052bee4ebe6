//! Splitting normalized lines into raw byte cells.

use std::collections::VecDeque;
use std::io::{self, Read};

use crate::error::Result;
use crate::stream::ByteStream;

/// A tokenized record: one byte string per field.
pub type RawRow = Vec<Vec<u8>>;

/// A boxed stream of tokenized records.
pub type RawRows<'a> = Box<dyn Iterator<Item = Result<RawRow>> + 'a>;

/// Capability for splitting a line stream into records.
///
/// The tokenizer gets the whole line stream rather than one line at a time:
/// a quoted field may contain the `\n` terminator, and putting such a field
/// back together is the tokenizer's job.
///
/// A blank line outside a quoted field is a record with no fields.
///
/// Malformed records should be reported as
/// [`ReaderError::MalformedRow`](crate::ReaderError::MalformedRow) so the
/// reader can skip them.
pub trait RowTokenizer {
    /// Tokenize `lines` using `delimiter` between fields.
    fn tokenize<'a>(&self, lines: ByteStream<'a>, delimiter: u8) -> RawRows<'a>;
}

/// Default tokenizer backed by the `csv` crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CsvTokenizer {
    quote: Option<u8>,
}

impl Default for CsvTokenizer {
    fn default() -> Self {
        Self { quote: Some(b'"') }
    }
}

impl CsvTokenizer {
    /// Create a tokenizer using `"` for quoting.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the quote character, or disable quoting with `None`.
    pub fn quote(mut self, quote: Option<u8>) -> Self {
        self.quote = quote;
        self
    }

    fn builder(&self, delimiter: u8) -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .terminator(csv::Terminator::Any(b'\n'));

        match self.quote {
            Some(q) => {
                builder.quoting(true).quote(q);
            }
            None => {
                builder.quoting(false);
            }
        }

        builder
    }
}

impl RowTokenizer for CsvTokenizer {
    fn tokenize<'a>(&self, lines: ByteStream<'a>, delimiter: u8) -> RawRows<'a> {
        let reader = self.builder(delimiter).from_reader(LineReader::new(lines));
        Box::new(Records::new(reader))
    }
}

/// Records of a `csv::Reader`, with the blank lines it skips put back.
///
/// The csv crate silently drops empty lines. They are recovered from line
/// numbers: the newlines a read consumes are the blank lines before the
/// record, the newlines inside its quoted fields, and its terminator. Whether
/// the last record has a terminator is only known at end of input, so one
/// record is held back.
struct Records<'a> {
    reader: csv::Reader<LineReader<'a>>,
    record: csv::ByteRecord,
    /// Line number after the last read.
    line: u64,
    /// Last record read, with its newline count less inner newlines.
    held: Option<(u64, RawRow)>,
    ready: VecDeque<Result<RawRow>>,
    done: bool,
}

impl<'a> Records<'a> {
    fn new(reader: csv::Reader<LineReader<'a>>) -> Self {
        Self {
            line: reader.position().line(),
            reader,
            record: csv::ByteRecord::new(),
            held: None,
            ready: VecDeque::new(),
            done: false,
        }
    }

    /// Newlines consumed since the previous read.
    fn advance(&mut self) -> u64 {
        let line = self.reader.position().line();
        let consumed = line.saturating_sub(self.line);
        self.line = line;
        consumed
    }

    fn release(&mut self, terminated: bool) {
        if let Some((newlines, row)) = self.held.take() {
            self.push_blank(newlines.saturating_sub(u64::from(terminated)));
            self.ready.push_back(Ok(row));
        }
    }

    fn push_blank(&mut self, count: u64) {
        for _ in 0..count {
            self.ready.push_back(Ok(Vec::new()));
        }
    }

    fn fill(&mut self) {
        match self.reader.read_byte_record(&mut self.record) {
            Ok(true) => {
                let inner: usize = self
                    .record
                    .iter()
                    .map(|field| bytecount::count(field, b'\n'))
                    .sum();
                let newlines = self.advance().saturating_sub(inner as u64);
                let row = self.record.iter().map(<[u8]>::to_vec).collect();

                // Another record follows, so the held one was terminated
                self.release(true);
                self.held = Some((newlines, row));
            }
            Ok(false) => {
                let trailing = self.advance();
                let terminated = self.reader.get_ref().ends_with_newline();
                self.release(terminated);
                self.push_blank(trailing);
                self.done = true;
            }
            Err(e) => {
                self.release(true);
                self.ready.push_back(Err(e.into()));
            }
        }
    }
}

impl Iterator for Records<'_> {
    type Item = Result<RawRow>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.ready.pop_front() {
                return Some(item);
            }
            if self.done {
                return None;
            }
            self.fill();
        }
    }
}

/// `io::Read` over a line stream, handing out one line at a time.
struct LineReader<'a> {
    lines: ByteStream<'a>,
    current: Vec<u8>,
    pos: usize,
    last: Option<u8>,
}

impl<'a> LineReader<'a> {
    fn new(lines: ByteStream<'a>) -> Self {
        Self {
            lines,
            current: Vec::new(),
            pos: 0,
            last: None,
        }
    }

    /// Returns true if the last byte handed out was `\n`.
    fn ends_with_newline(&self) -> bool {
        self.last == Some(b'\n')
    }
}

impl Read for LineReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while self.pos >= self.current.len() {
            match self.lines.next() {
                Some(line) => {
                    self.current = line?;
                    self.pos = 0;
                }
                None => return Ok(0),
            }
        }

        let available = &self.current[self.pos..];
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        if n > 0 {
            self.last = Some(buf[n - 1]);
        }
        self.pos += n;
        Ok(n)
    }
}
