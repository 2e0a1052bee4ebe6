//! Encoding detection and transcoding using chardetng and `encoding_rs`.

use chardetng::EncodingDetector;
use encoding_rs::{Decoder, Encoding};
use simdutf8::basic::from_utf8;
use std::io;

/// The UTF-8 BOM (Byte Order Mark): EF BB BF.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Capability for guessing the text encoding of a byte sample.
///
/// Returning `None` signals that the sample is ambiguous; callers then decode
/// cell by cell.
pub trait EncodingGuesser {
    /// Guess the encoding of `bytes`, which hold a whole input.
    fn guess(&self, bytes: &[u8]) -> Option<&'static Encoding>;

    /// Guess the encoding of a stream from its first `bytes`.
    ///
    /// The prefix may stop in the middle of a character.
    fn guess_prefix(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        self.guess(bytes)
    }
}

impl<F> EncodingGuesser for F
where
    F: Fn(&[u8]) -> Option<&'static Encoding>,
{
    fn guess(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        self(bytes)
    }
}

/// Default guesser: BOM sniffing, SIMD UTF-8 validation, then chardetng.
#[derive(Debug, Clone, Copy, Default)]
pub struct CharsetGuesser;

impl CharsetGuesser {
    fn detect(bytes: &[u8], last: bool) -> Option<&'static Encoding> {
        if bytes.is_empty() {
            return None;
        }

        // chardetng doesn't handle UTF-16 BOMs
        if let Some((encoding, _)) = Encoding::for_bom(bytes) {
            return Some(encoding);
        }

        let utf8 = if last {
            is_utf8(bytes)
        } else {
            is_utf8_prefix(bytes)
        };
        if utf8 {
            return Some(encoding_rs::UTF_8);
        }

        let mut detector = EncodingDetector::new();
        detector.feed(bytes, last);
        Some(detector.guess(None, true))
    }
}

impl EncodingGuesser for CharsetGuesser {
    fn guess(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        Self::detect(bytes, true)
    }

    fn guess_prefix(&self, bytes: &[u8]) -> Option<&'static Encoding> {
        Self::detect(bytes, false)
    }
}

/// Check if the given bytes are valid UTF-8.
///
/// Uses SIMD-accelerated validation for performance.
pub fn is_utf8(data: &[u8]) -> bool {
    from_utf8(data).is_ok()
}

/// Check if the given bytes are valid UTF-8 up to a possibly truncated last
/// character.
pub fn is_utf8_prefix(data: &[u8]) -> bool {
    match simdutf8::compat::from_utf8(data) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// Check if the data starts with a UTF-8 BOM.
pub fn has_utf8_bom(data: &[u8]) -> bool {
    data.starts_with(UTF8_BOM)
}

/// Decode `bytes` whatever they are, guessing the encoding on the spot.
///
/// Always returns valid text: malformed sequences become U+FFFD. Falls back to
/// UTF-8 when the guesser has nothing to say.
pub fn auto_decode(bytes: &[u8], guesser: &dyn EncodingGuesser) -> String {
    match guesser.guess(bytes) {
        Some(encoding) => {
            let (text, _, _) = encoding.decode(bytes);
            text.into_owned()
        }
        None => String::from_utf8_lossy(bytes).into_owned(),
    }
}

/// Streaming transcoder from an arbitrary encoding to UTF-8.
///
/// Used for encodings that are not ASCII compatible (UTF-16LE/BE), where
/// newline and delimiter bytes cannot be searched for in the raw stream.
/// A leading BOM is removed.
pub struct Transcode<I> {
    chunks: I,
    decoder: Decoder,
    finished: bool,
}

impl<I> Transcode<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    /// Wrap a chunk stream encoded with `encoding`.
    pub fn new(chunks: I, encoding: &'static Encoding) -> Self {
        Self {
            chunks,
            decoder: encoding.new_decoder_with_bom_removal(),
            finished: false,
        }
    }

    fn decode(&mut self, src: &[u8], last: bool) -> Vec<u8> {
        let capacity = self
            .decoder
            .max_utf8_buffer_length(src.len())
            .unwrap_or(src.len() * 3 + 16);
        let mut dst = vec![0u8; capacity];
        // With a worst-case sized buffer the decoder always consumes all input
        let (_, _, written, _) = self.decoder.decode_to_utf8(src, &mut dst, last);
        dst.truncate(written);
        dst
    }
}

impl<I> Iterator for Transcode<I>
where
    I: Iterator<Item = io::Result<Vec<u8>>>,
{
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.finished {
            match self.chunks.next() {
                Some(Ok(chunk)) => {
                    let decoded = self.decode(&chunk, false);
                    if !decoded.is_empty() {
                        return Some(Ok(decoded));
                    }
                }
                Some(Err(e)) => return Some(Err(e)),
                None => {
                    self.finished = true;
                    let decoded = self.decode(&[], true);
                    if !decoded.is_empty() {
                        return Some(Ok(decoded));
                    }
                }
            }
        }
        None
    }
}
