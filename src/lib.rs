//! casava: a streaming CSV reader that works out the format on its own
//!
//! Reads CSV-like files whose encoding, line endings and delimiter are not
//! known in advance. The format is inferred from a bounded sample at the start
//! of the stream; the sample is then put back, and the whole stream is read
//! lazily, one row at a time, without ever holding the file in memory.
//!
//! # Quick Start
//!
//! ```no_run
//! use casava::ReaderBuilder;
//!
//! let mut reader = ReaderBuilder::new().from_path("data.csv").unwrap();
//!
//! let dialect = reader.dialect();
//! println!("Delimiter: {:?}", dialect.delimiter as char);
//! println!("Line terminator: {}", dialect.line_terminator);
//! println!("Encoding: {:?}", dialect.encoding_name());
//!
//! for row in reader {
//!     println!("{:?}", row.unwrap());
//! }
//! ```
//!
//! # Pipeline
//!
//! 1. A byte sample is pulled off the chunk stream and used to guess the
//!    encoding (chardetng) and the line terminator.
//! 2. The sample is spliced back in front of the stream, which is then cut
//!    into lines by a universal newline transducer: `\n`, `\r\n` and `\r` all
//!    become `\n`, even when a `\r\n` pair straddles two chunks.
//! 3. A sample of lines is tokenized with each candidate delimiter (`,`, `;`,
//!    tab) to pick one, then spliced back as well.
//! 4. Lines are tokenized by the `csv` crate and each cell is decoded, falling
//!    back to per-cell guessing when a cell is not valid in the file encoding.
//!
//! # Detection
//!
//! The default strategy picks the line terminator and delimiter producing the
//! most evenly sized lines and cells (lowest length variance), preferring CRLF
//! and comma when the choice is close. Nothing in detection ever fails: an
//! input with no signal gets a comma delimiter and LF terminator.

pub mod decode;
pub mod detect;
mod dialect;
pub mod encoding;
mod error;
mod reader;
mod sample;
pub mod stream;
pub mod tokenize;

// Re-export public API
pub use decode::{Row, decode_row};
pub use detect::{Bias, DialectDetector, Detection, UniformityDetector, VarianceDetector};
pub use dialect::{DELIMITERS, Dialect, LINE_TERMINATORS, LineTerminator};
pub use encoding::{CharsetGuesser, EncodingGuesser};
pub use error::{ReaderError, Result};
pub use reader::{ReaderBuilder, TableReader};
pub use sample::SampleSize;
pub use stream::accumulate::{ByteSample, LineSample, Splice, accumulate_bytes, accumulate_lines};
pub use stream::chunks::{ReadChunks, from_chunks};
pub use stream::newline::{Lines, UniversalNewlines};
pub use tokenize::{CsvTokenizer, RowTokenizer};

/// Read all rows from in-memory bytes with the default configuration.
pub fn read_bytes(data: &[u8]) -> Result<Vec<Row>> {
    ReaderBuilder::new().from_bytes(data.to_vec())?.collect()
}
