//! Chunked reading from `io::Read` sources.

use std::io::{self, Read};

/// Iterator over fixed-capacity chunks read from an `io::Read`.
///
/// Chunks may be shorter than the capacity; nothing downstream relies on
/// their size. Interrupted reads are retried.
#[derive(Debug)]
pub struct ReadChunks<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    /// Read `reader` in chunks of at most `chunk_size` bytes.
    ///
    /// A `chunk_size` of zero is bumped to one byte.
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            chunk_size: chunk_size.max(1),
            done: false,
        }
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let mut buffer = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut buffer) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(n) => {
                    buffer.truncate(n);
                    return Some(Ok(buffer));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
        }
    }
}

/// Turn in-memory chunks into an infallible chunk stream.
pub fn from_chunks<I, C>(chunks: I) -> impl Iterator<Item = io::Result<Vec<u8>>>
where
    I: IntoIterator<Item = C>,
    C: Into<Vec<u8>>,
{
    chunks.into_iter().map(|chunk| Ok(chunk.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_read_chunks() {
        let chunks: Vec<Vec<u8>> = ReadChunks::new(Cursor::new(b"abcdefg".to_vec()), 3)
            .map(|c| c.unwrap())
            .collect();
        assert_eq!(chunks, vec![b"abc".to_vec(), b"def".to_vec(), b"g".to_vec()]);
    }

    #[test]
    fn test_read_chunks_empty() {
        let mut chunks = ReadChunks::new(Cursor::new(Vec::new()), 8);
        assert!(chunks.next().is_none());
        assert!(chunks.next().is_none());
    }

    #[test]
    fn test_from_chunks() {
        let chunks: Vec<Vec<u8>> = from_chunks(["ab", "cd"]).map(|c| c.unwrap()).collect();
        assert_eq!(chunks, vec![b"ab".to_vec(), b"cd".to_vec()]);
    }
}
