//! Integration tests for casava

use casava::{
    Detection, DialectDetector, LineTerminator, ReaderBuilder, ReaderError, Row, RowTokenizer,
    TableReader, UniformityDetector, from_chunks,
};
use std::io::{Cursor, Write};
use tempfile::NamedTempFile;

fn read_all(data: &[u8]) -> Vec<Row> {
    ReaderBuilder::new()
        .from_bytes(data.to_vec())
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap()
}

#[test]
fn test_read_easy() {
    assert_eq!(
        read_all(b"really,easy,data\nis,really,easy"),
        vec![vec!["really", "easy", "data"], vec!["is", "really", "easy"]]
    );
}

#[test]
fn test_read_semicolon_crlf() {
    let mut reader = ReaderBuilder::new()
        .from_bytes(b"a;b;c\r\nd;e;f".to_vec())
        .unwrap();

    let dialect = reader.dialect();
    assert_eq!(dialect.delimiter, b';');
    assert_eq!(dialect.line_terminator, LineTerminator::CRLF);

    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
}

#[test]
fn test_read_tab_delimited() {
    let mut reader = ReaderBuilder::new()
        .from_bytes(b"name\tage\nAlice\t30\nBob\t25\n".to_vec())
        .unwrap();

    assert_eq!(reader.dialect().delimiter, b'\t');
    assert_eq!(reader.count(), 3);
}

#[test]
fn test_read_old_mac_line_endings() {
    let mut reader = ReaderBuilder::new()
        .from_bytes(b"a,b,c\rd,e,f\r".to_vec())
        .unwrap();

    assert_eq!(reader.dialect().line_terminator, LineTerminator::CR);
    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
}

#[test]
fn test_read_quoted_newlines() {
    assert_eq!(
        read_all(b"really,\"easy\r\n\",data\r\nis,really,easy"),
        vec![vec!["really", "easy\n", "data"], vec!["is", "really", "easy"]]
    );
}

#[test]
fn test_read_quoted_lf_in_crlf_file() {
    let mut reader = ReaderBuilder::new()
        .from_bytes(b"really,\"easy\n\",data\r\nis,really,easy".to_vec())
        .unwrap();

    assert_eq!(reader.dialect().line_terminator, LineTerminator::CRLF);
    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(
        rows,
        vec![vec!["really", "easy\n", "data"], vec!["is", "really", "easy"]]
    );
}

#[test]
fn test_read_blank_lines() {
    let empty: Vec<&str> = Vec::new();
    assert_eq!(
        read_all(b"a,b\n\nc,d\n"),
        vec![vec!["a", "b"], empty.clone(), vec!["c", "d"]]
    );
    assert_eq!(
        read_all(b"a;b\r\n\r\n\r\nc;d"),
        vec![vec!["a", "b"], empty.clone(), empty.clone(), vec!["c", "d"]]
    );
}

#[test]
fn test_read_mixed_line_endings() {
    assert_eq!(
        read_all(b"a,b\r\nc,d\ne,f\rg,h"),
        vec![
            vec!["a", "b"],
            vec!["c", "d"],
            vec!["e", "f"],
            vec!["g", "h"]
        ]
    );
}

#[test]
fn test_read_unicode() {
    assert_eq!(
        read_all("名前,年齢,🎉\nñandú,ß,ünïcødé\n".as_bytes()),
        vec![vec!["名前", "年齢", "🎉"], vec!["ñandú", "ß", "ünïcødé"]]
    );
}

#[test]
fn test_read_utf16_with_bom() {
    let mut data = vec![0xFF, 0xFE];
    for unit in "a,b\r\nc,d\r\n".encode_utf16() {
        data.extend_from_slice(&unit.to_le_bytes());
    }

    let mut reader = ReaderBuilder::new().from_bytes(data).unwrap();
    let dialect = reader.dialect();
    assert_eq!(dialect.encoding, Some(encoding_rs::UTF_16LE));
    assert_eq!(dialect.line_terminator, LineTerminator::CRLF);

    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn test_read_forced_encoding() {
    let mut builder = ReaderBuilder::new();
    builder.encoding(encoding_rs::WINDOWS_1252);

    let rows: Vec<Row> = builder
        .from_bytes(b"caf\xe9,na\xefve\n".to_vec())
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(rows, vec![vec!["café", "naïve"]]);
}

#[test]
fn test_read_mixed_encoding_cells() {
    let mut builder = ReaderBuilder::new();
    builder.encoding(encoding_rs::UTF_8);

    let rows: Vec<Row> = builder
        .from_bytes(b"plain,\xff\xfe\x03^\x9dO\xcfe\xd7\x82\xcfe\n".to_vec())
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(rows, vec![vec!["plain", "布依族苗族"]]);
}

#[test]
fn test_read_utf8_split_at_sample_end() {
    // The default 10 KiB sample ends between the two bytes of an 'é'
    let mut first = vec![b'a'; 10238];
    first.extend_from_slice(b",\xC3");
    let second = b"\xA9\nx,caf\xC3\xA9\n".to_vec();

    let mut reader = TableReader::new(from_chunks(vec![first, second]));
    assert_eq!(reader.dialect().encoding, Some(encoding_rs::UTF_8));

    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0][1], "é");
    assert_eq!(rows[1], vec!["x", "café"]);
}

#[test]
fn test_read_utf8_bom_split_across_chunks() {
    let mut builder = ReaderBuilder::new();
    builder.enc_detection_size(1);

    let chunks = from_chunks(vec![&b"\xEF"[..], b"\xBB", b"\xBFa,b\n"]);
    let rows: Vec<Row> = builder
        .from_chunks(chunks)
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(rows, vec![vec!["a", "b"]]);
}

#[test]
fn test_read_empty_input() {
    let mut reader = ReaderBuilder::new().from_bytes(Vec::new()).unwrap();

    let dialect = reader.dialect();
    assert_eq!(dialect.delimiter, b',');
    assert_eq!(dialect.line_terminator, LineTerminator::LF);
    assert_eq!(dialect.encoding, None);
    assert!(reader.next().is_none());
}

#[test]
fn test_read_single_column_defaults_to_comma() {
    let mut reader = ReaderBuilder::new()
        .from_bytes(b"one\ntwo\nthree\n".to_vec())
        .unwrap();

    assert_eq!(reader.dialect().delimiter, b',');
    assert_eq!(reader.count(), 3);
}

#[test]
fn test_read_small_chunks() {
    let mut builder = ReaderBuilder::new();
    builder.chunk_size(3);

    let reader = builder
        .from_reader(Cursor::new(b"a;b;c\r\nd;e;f\r\ng;h;i\r\n".to_vec()))
        .unwrap();
    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(
        rows,
        vec![
            vec!["a", "b", "c"],
            vec!["d", "e", "f"],
            vec!["g", "h", "i"]
        ]
    );
}

#[test]
fn test_read_crlf_split_across_chunks() {
    let chunks = from_chunks(vec![&b"a,b\r"[..], b"\nc,d\r", b"\n"]);
    let rows: Vec<Row> = TableReader::new(chunks).map(|r| r.unwrap()).collect();
    assert_eq!(rows, vec![vec!["a", "b"], vec!["c", "d"]]);
}

#[test]
fn test_read_file_larger_than_samples() {
    let mut file = NamedTempFile::new().unwrap();
    for i in 0..2000 {
        write!(file, "{i:05};row;{:05}\r\n", (i * 7) % 10000).unwrap();
    }
    file.flush().unwrap();

    let mut builder = ReaderBuilder::new();
    builder.chunk_size(1000);
    let mut reader = builder.from_path(file.path()).unwrap();

    let dialect = reader.dialect();
    assert_eq!(dialect.delimiter, b';');
    assert_eq!(dialect.line_terminator, LineTerminator::CRLF);

    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2000);
    assert_eq!(rows[0], vec!["00000", "row", "00000"]);
    assert_eq!(rows[1999], vec!["01999", "row", "03993"]);
}

#[test]
fn test_read_missing_file() {
    let result = ReaderBuilder::new().from_path("/nonexistent/casava/data.csv");
    assert!(matches!(result, Err(ReaderError::Io(_))));
}

#[test]
fn test_uniformity_strategy() {
    let mut builder = ReaderBuilder::new();
    builder.detection(Detection::Uniformity);

    let mut reader = builder
        .from_bytes(b"name|age|city\nAlice|30|New York\nBob|25|Los Angeles\n".to_vec())
        .unwrap();

    assert_eq!(reader.dialect().delimiter, b'|');
    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows[1], vec!["Alice", "30", "New York"]);
}

#[test]
fn test_uniformity_custom_candidates() {
    let data = b"a#b#c\nd#e#f\n".to_vec();

    // '#' is not a default candidate
    let mut reader = ReaderBuilder::new().from_bytes(data.clone()).unwrap();
    assert_eq!(reader.dialect().delimiter, b',');

    let mut builder = ReaderBuilder::new();
    builder.detector(UniformityDetector::new(vec![b'#', b',']));
    let mut reader = builder.from_bytes(data).unwrap();
    assert_eq!(reader.dialect().delimiter, b'#');

    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows, vec![vec!["a", "b", "c"], vec!["d", "e", "f"]]);
}

/// Detector for fixed-width style files: always space-separated, CRLF.
struct SpaceDetector;

impl DialectDetector for SpaceDetector {
    fn line_terminator(&self, _sample: &[u8]) -> LineTerminator {
        LineTerminator::CRLF
    }

    fn delimiter(&self, _lines: &[Vec<u8>], _tokenizer: &dyn RowTokenizer) -> u8 {
        b' '
    }
}

#[test]
fn test_custom_detector() {
    let mut builder = ReaderBuilder::new();
    builder.detector(SpaceDetector);

    let mut reader = builder.from_bytes(b"a b,c\nd e\n".to_vec()).unwrap();
    let dialect = reader.dialect();
    assert_eq!(dialect.delimiter, b' ');
    assert_eq!(dialect.line_terminator, LineTerminator::CRLF);

    let rows: Vec<Row> = reader.map(|r| r.unwrap()).collect();
    assert_eq!(rows, vec![vec!["a", "b,c"], vec!["d", "e"]]);

    // Choosing a strategy again drops the custom detector
    builder.detection(Detection::default());
    let mut reader = builder.from_bytes(b"a b,c\nd e,f\n".to_vec()).unwrap();
    assert_eq!(reader.dialect().delimiter, b',');
}

#[test]
fn test_quoting_disabled() {
    let mut builder = ReaderBuilder::new();
    builder.quote(None).delimiter(b',');

    let rows: Vec<Row> = builder
        .from_bytes(b"\"a,b\",c\n".to_vec())
        .unwrap()
        .map(|r| r.unwrap())
        .collect();
    assert_eq!(rows, vec![vec!["\"a", "b\"", "c"]]);
}

#[test]
fn test_custom_guesser() {
    let mut builder = ReaderBuilder::new();
    builder.guesser(|_: &[u8]| -> Option<&'static encoding_rs::Encoding> {
        Some(encoding_rs::WINDOWS_1252)
    });

    let mut reader = builder.from_bytes(b"caf\xe9,ok\n".to_vec()).unwrap();
    assert_eq!(reader.dialect().encoding_name(), Some("windows-1252"));
    assert_eq!(reader.next().unwrap().unwrap(), vec!["café", "ok"]);
}
