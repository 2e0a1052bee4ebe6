use encoding_rs::Encoding;
use std::fmt;

/// Detected CSV dialect.
///
/// Computed once per reader, before the first row is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dialect {
    /// Text encoding of the stream, if one could be guessed.
    ///
    /// `None` means every cell is decoded on its own.
    pub encoding: Option<&'static Encoding>,
    /// Line terminator style found in the sample.
    pub line_terminator: LineTerminator,
    /// Field delimiter character.
    pub delimiter: u8,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            encoding: None,
            line_terminator: LineTerminator::LF,
            delimiter: b',',
        }
    }
}

impl Dialect {
    /// Create a new Dialect with the given parameters.
    pub const fn new(
        encoding: Option<&'static Encoding>,
        line_terminator: LineTerminator,
        delimiter: u8,
    ) -> Self {
        Self {
            encoding,
            line_terminator,
            delimiter,
        }
    }

    /// Name of the detected encoding, if any.
    pub fn encoding_name(&self) -> Option<&'static str> {
        self.encoding.map(Encoding::name)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "encoding={} line_terminator={} delimiter={:?}",
            self.encoding_name().unwrap_or("unknown"),
            self.line_terminator,
            self.delimiter as char
        )
    }
}

/// Line terminator sequences.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineTerminator {
    /// Unix-style line ending (\n).
    LF,
    /// Windows-style line ending (\r\n).
    CRLF,
    /// Old Mac-style line ending (\r).
    CR,
}

impl LineTerminator {
    /// Returns the byte sequence for this line terminator.
    pub const fn as_bytes(&self) -> &'static [u8] {
        match self {
            LineTerminator::LF => b"\n",
            LineTerminator::CRLF => b"\r\n",
            LineTerminator::CR => b"\r",
        }
    }

    /// Returns the escaped string representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LineTerminator::LF => "\\n",
            LineTerminator::CRLF => "\\r\\n",
            LineTerminator::CR => "\\r",
        }
    }
}

impl fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Line terminators to test, in tie-breaking order.
pub const LINE_TERMINATORS: &[LineTerminator] = &[
    LineTerminator::LF,
    LineTerminator::CRLF,
    LineTerminator::CR,
];

/// Delimiters to test, in tie-breaking order.
pub const DELIMITERS: &[u8] = b",;\t";
