//! Streaming plumbing: chunk sources, sampling and newline normalization.

pub mod accumulate;
pub mod chunks;
pub mod newline;

use std::io;

/// A boxed stream of byte chunks or lines.
pub type ByteStream<'a> = Box<dyn Iterator<Item = io::Result<Vec<u8>>> + 'a>;
