//! Reader builder and the lazy row iterator.

use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use encoding_rs::Encoding;
use tracing::{debug, warn};

use crate::decode::{Row, decode_row};
use crate::detect::{Bias, Detection, DialectDetector};
use crate::dialect::Dialect;
use crate::encoding::{CharsetGuesser, EncodingGuesser, Transcode, UTF8_BOM};
use crate::error::{ReaderError, Result};
use crate::sample::{CHUNK_SIZE, ENC_DETECTION_SIZE, SampleSize};
use crate::stream::ByteStream;
use crate::stream::accumulate::{accumulate_bytes, accumulate_lines};
use crate::stream::chunks::ReadChunks;
use crate::stream::newline::Lines;
use crate::tokenize::{CsvTokenizer, RawRows, RowTokenizer};

/// CSV reader configuration.
///
/// Every setter returns `&mut Self` for chaining. A builder can create any
/// number of independent [`TableReader`]s.
///
/// # Example
///
/// ```
/// use casava::{ReaderBuilder, SampleSize};
///
/// let mut builder = ReaderBuilder::new();
/// builder
///     .enc_detection_size(4096)
///     .sep_detection_size(SampleSize::Lines(100));
///
/// let rows: Vec<Vec<String>> = builder
///     .from_bytes(b"a;b;c\r\nd;e;f".to_vec())
///     .unwrap()
///     .collect::<Result<_, _>>()
///     .unwrap();
///
/// assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
/// ```
#[derive(Clone)]
pub struct ReaderBuilder {
    /// Bytes sampled for encoding and line terminator detection.
    enc_detection_size: usize,
    /// Lines (or bytes of lines) sampled for delimiter detection.
    sep_detection_size: SampleSize,
    /// Chunk size when reading from an `io::Read`.
    chunk_size: usize,
    /// Detection strategy.
    detection: Detection,
    /// Custom detector, replacing `detection` when set.
    detector: Option<Arc<dyn DialectDetector + Send + Sync>>,
    /// Optional forced delimiter.
    forced_delimiter: Option<u8>,
    /// Optional forced encoding.
    forced_encoding: Option<&'static Encoding>,
    guesser: Arc<dyn EncodingGuesser + Send + Sync>,
    tokenizer: Arc<dyn RowTokenizer + Send + Sync>,
}

impl Default for ReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ReaderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReaderBuilder")
            .field("enc_detection_size", &self.enc_detection_size)
            .field("sep_detection_size", &self.sep_detection_size)
            .field("chunk_size", &self.chunk_size)
            .field("detection", &self.detection)
            .field("custom_detector", &self.detector.is_some())
            .field("forced_delimiter", &self.forced_delimiter)
            .field("forced_encoding", &self.forced_encoding)
            .finish_non_exhaustive()
    }
}

impl ReaderBuilder {
    /// Create a builder with default settings.
    pub fn new() -> Self {
        Self {
            enc_detection_size: ENC_DETECTION_SIZE,
            sep_detection_size: SampleSize::default(),
            chunk_size: CHUNK_SIZE,
            detection: Detection::default(),
            detector: None,
            forced_delimiter: None,
            forced_encoding: None,
            guesser: Arc::new(CharsetGuesser),
            tokenizer: Arc::new(CsvTokenizer::new()),
        }
    }

    /// Set how many bytes are sampled for encoding and terminator detection.
    pub fn enc_detection_size(&mut self, size: usize) -> &mut Self {
        self.enc_detection_size = size;
        self
    }

    /// Set how much is sampled for delimiter detection.
    pub fn sep_detection_size(&mut self, size: SampleSize) -> &mut Self {
        self.sep_detection_size = size;
        self
    }

    /// Set the chunk size used when reading from an `io::Read`.
    pub fn chunk_size(&mut self, size: usize) -> &mut Self {
        self.chunk_size = size;
        self
    }

    /// Set the detection strategy.
    pub fn detection(&mut self, detection: Detection) -> &mut Self {
        self.detection = detection;
        self.detector = None;
        self
    }

    /// Use variance detection with a custom near-tie bias.
    pub fn bias(&mut self, bias: Bias) -> &mut Self {
        self.detection(Detection::Variance(bias))
    }

    /// Replace the detection strategy with a custom detector.
    ///
    /// ```
    /// use casava::{ReaderBuilder, UniformityDetector};
    ///
    /// let mut builder = ReaderBuilder::new();
    /// builder.detector(UniformityDetector::new(b"#".to_vec()));
    ///
    /// let mut reader = builder.from_bytes(b"a#b\nc#d\n".to_vec()).unwrap();
    /// assert_eq!(reader.dialect().delimiter, b'#');
    /// ```
    pub fn detector<D>(&mut self, detector: D) -> &mut Self
    where
        D: DialectDetector + Send + Sync + 'static,
    {
        self.detector = Some(Arc::new(detector));
        self
    }

    /// Force a specific delimiter (skip delimiter detection).
    pub fn delimiter(&mut self, delimiter: u8) -> &mut Self {
        self.forced_delimiter = Some(delimiter);
        self
    }

    /// Force a specific encoding (skip encoding detection).
    pub fn encoding(&mut self, encoding: &'static Encoding) -> &mut Self {
        self.forced_encoding = Some(encoding);
        self
    }

    /// Set the quote character of the default tokenizer, `None` to disable.
    pub fn quote(&mut self, quote: Option<u8>) -> &mut Self {
        self.tokenizer = Arc::new(CsvTokenizer::new().quote(quote));
        self
    }

    /// Replace the encoding guesser.
    pub fn guesser<G>(&mut self, guesser: G) -> &mut Self
    where
        G: EncodingGuesser + Send + Sync + 'static,
    {
        self.guesser = Arc::new(guesser);
        self
    }

    /// Replace the tokenizer.
    pub fn tokenizer<T>(&mut self, tokenizer: T) -> &mut Self
    where
        T: RowTokenizer + Send + Sync + 'static,
    {
        self.tokenizer = Arc::new(tokenizer);
        self
    }

    /// Read the file at `path`.
    pub fn from_path<P: AsRef<Path>>(&self, path: P) -> Result<TableReader<'static>> {
        let file = File::open(path.as_ref())?;
        self.from_reader(file)
    }

    /// Read from any `io::Read`.
    pub fn from_reader<'a, R: Read + 'a>(&self, reader: R) -> Result<TableReader<'a>> {
        self.from_chunks(ReadChunks::new(reader, self.chunk_size))
    }

    /// Read from in-memory bytes.
    pub fn from_bytes(&self, data: Vec<u8>) -> Result<TableReader<'static>> {
        self.from_chunks(std::iter::once(Ok(data)))
    }

    /// Read from a stream of chunks.
    pub fn from_chunks<'a, I>(&self, chunks: I) -> Result<TableReader<'a>>
    where
        I: Iterator<Item = io::Result<Vec<u8>>> + 'a,
    {
        self.validate()?;
        Ok(TableReader {
            config: self.clone(),
            dialect: None,
            state: State::Init(Box::new(chunks)),
        })
    }

    fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(ReaderError::InvalidConfig(
                "chunk size must be positive".to_string(),
            ));
        }
        if let Detection::Variance(bias) = self.detection {
            if !bias.smoothing.is_finite() || bias.smoothing < 0.0 {
                return Err(ReaderError::InvalidConfig(format!(
                    "smoothing must be a non-negative number, got {}",
                    bias.smoothing
                )));
            }
            if !(0.0..=1.0).contains(&bias.threshold) {
                return Err(ReaderError::InvalidConfig(format!(
                    "threshold must be between 0 and 1, got {}",
                    bias.threshold
                )));
            }
        }
        Ok(())
    }
}

enum State<'a> {
    /// Nothing read yet.
    Init(ByteStream<'a>),
    /// Dialect known, producing rows.
    Streaming(RawRows<'a>),
    /// Source exhausted or failed.
    Done,
}

/// Lazy iterator over the decoded rows of a CSV stream.
///
/// The dialect is detected when the first row is requested (or
/// [`dialect`](Self::dialect) is called), from a bounded sample that is then
/// handed back to the stream. Malformed rows are logged and skipped. After
/// an I/O error has been returned once, the iterator is done.
pub struct TableReader<'a> {
    config: ReaderBuilder,
    dialect: Option<Dialect>,
    state: State<'a>,
}

impl fmt::Debug for TableReader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableReader")
            .field("config", &self.config)
            .field("dialect", &self.dialect)
            .finish_non_exhaustive()
    }
}

impl<'a> TableReader<'a> {
    /// Read with the default configuration from a stream of chunks.
    pub fn new<I>(chunks: I) -> Self
    where
        I: Iterator<Item = io::Result<Vec<u8>>> + 'a,
    {
        Self {
            config: ReaderBuilder::new(),
            dialect: None,
            state: State::Init(Box::new(chunks)),
        }
    }

    /// The detected dialect, running detection if it has not happened yet.
    pub fn dialect(&mut self) -> Dialect {
        self.detect();
        self.dialect.unwrap_or_default()
    }

    fn detect(&mut self) {
        let mut chunks = match std::mem::replace(&mut self.state, State::Done) {
            State::Init(chunks) => chunks,
            other => {
                self.state = other;
                return;
            }
        };
        let config = &self.config;
        let built;
        let detector: &dyn DialectDetector = match &config.detector {
            Some(detector) => detector.as_ref(),
            None => {
                built = config.detection.detector();
                built.as_ref()
            }
        };

        // Always sample enough to see a whole BOM
        let budget = config.enc_detection_size.max(UTF8_BOM.len());
        let mut sample = accumulate_bytes(&mut chunks, budget);
        let encoding = config.forced_encoding.or_else(|| {
            if sample.reached_end() {
                config.guesser.guess(sample.bytes())
            } else {
                config.guesser.guess_prefix(sample.bytes())
            }
        });

        // Newlines can only be found byte-wise in ASCII-compatible encodings
        let transcode = encoding.filter(|enc| !enc.is_ascii_compatible());
        let line_terminator = match transcode {
            Some(enc) => {
                let (text, _) = enc.decode_with_bom_removal(sample.bytes());
                detector.line_terminator(text.as_bytes())
            }
            None => detector.line_terminator(sample.bytes()),
        };

        if encoding == Some(encoding_rs::UTF_8) {
            sample.strip_utf8_bom();
        }
        let mut stream: ByteStream<'a> = Box::new(sample.splice(chunks));
        if let Some(enc) = transcode {
            debug!(encoding = enc.name(), "transcoding to UTF-8");
            stream = Box::new(Transcode::new(stream, enc));
        }

        let mut lines: ByteStream<'a> = Box::new(Lines::new(stream));
        let delimiter = match config.forced_delimiter {
            Some(delimiter) => delimiter,
            None => {
                let line_sample = accumulate_lines(&mut lines, config.sep_detection_size);
                let delimiter = detector.delimiter(line_sample.lines(), config.tokenizer.as_ref());
                lines = Box::new(line_sample.splice(lines));
                delimiter
            }
        };

        let rows = config.tokenizer.tokenize(lines, delimiter);
        self.start(Dialect::new(encoding, line_terminator, delimiter), rows);
    }

    fn start(&mut self, dialect: Dialect, rows: RawRows<'a>) {
        debug!(%dialect, "detected dialect");
        self.dialect = Some(dialect);
        self.state = State::Streaming(rows);
    }
}

impl Iterator for TableReader<'_> {
    type Item = Result<Row>;

    fn next(&mut self) -> Option<Self::Item> {
        self.detect();

        let State::Streaming(rows) = &mut self.state else {
            return None;
        };
        // Transcoded streams carry UTF-8 from here on
        let encoding = self
            .dialect
            .and_then(|d| d.encoding)
            .map(Encoding::output_encoding);

        loop {
            match rows.next() {
                Some(Ok(raw)) => {
                    return Some(Ok(decode_row(raw, encoding, self.config.guesser.as_ref())));
                }
                Some(Err(e)) if e.is_row_local() => {
                    warn!(error = %e, "skipping malformed row");
                }
                Some(Err(e)) => {
                    self.state = State::Done;
                    return Some(Err(e));
                }
                None => {
                    self.state = State::Done;
                    return None;
                }
            }
        }
    }
}
