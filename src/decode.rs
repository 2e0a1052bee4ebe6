//! Turning raw byte cells into text.

use encoding_rs::Encoding;
use tracing::trace;

use crate::encoding::{EncodingGuesser, auto_decode};
use crate::tokenize::RawRow;

/// A decoded record.
pub type Row = Vec<String>;

/// Decode every cell of a raw row.
///
/// With a known encoding each cell is decoded strictly; a cell that is not
/// valid in that encoding is guessed again on its own, which copes with files
/// mixing encodings. Without an encoding every cell is guessed. Never fails:
/// the last resort is a lossy decode.
pub fn decode_row(
    raw: RawRow,
    encoding: Option<&'static Encoding>,
    guesser: &dyn EncodingGuesser,
) -> Row {
    raw.into_iter()
        .map(|cell| match encoding {
            Some(encoding) => decode_cell(&cell, encoding).unwrap_or_else(|| {
                trace!(encoding = encoding.name(), "cell not decodable, guessing");
                auto_decode(&cell, guesser)
            }),
            None => auto_decode(&cell, guesser),
        })
        .collect()
}

/// Strictly decode one cell, or `None` if it is malformed for `encoding`.
pub fn decode_cell(cell: &[u8], encoding: &'static Encoding) -> Option<String> {
    if encoding == encoding_rs::UTF_8 {
        return simdutf8::basic::from_utf8(cell).ok().map(str::to_owned);
    }
    encoding
        .decode_without_bom_handling_and_without_replacement(cell)
        .map(|text| text.into_owned())
}
