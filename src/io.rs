//! Input and output collaborators.
//!
//! The parser pulls single bytes from a [`ByteSource`]; writers push text
//! into a [`Sink`]. Both come with in-memory and file-backed
//! implementations, and `Sink` additionally bridges to any
//! [`std::io::Write`].

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};

/// A pull-based byte stream with end-of-input lookahead.
pub trait ByteSource {
    /// Reads the next byte. Calling past the end is an error.
    fn read_byte(&mut self) -> Result<u8>;

    /// Returns `true` when no bytes remain.
    fn at_end(&self) -> bool;
}

/// A `ByteSource` over an in-memory slice.
pub struct SliceSource<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    #[must_use]
    pub fn new(bytes: &'a [u8]) -> Self {
        SliceSource { bytes, pos: 0 }
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_byte(&mut self) -> Result<u8> {
        let byte = *self
            .bytes
            .get(self.pos)
            .ok_or_else(|| Error::internal("read past end of input"))?;
        self.pos += 1;
        Ok(byte)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.bytes.len()
    }
}

/// A buffered, streaming `ByteSource` over a file.
///
/// One byte of lookahead is kept so that [`ByteSource::at_end`] can answer
/// without consuming input.
pub struct FileSource {
    reader: BufReader<File>,
    next: Option<u8>,
}

impl FileSource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path.as_ref())
            .map_err(|e| Error::io(format!("{}: {e}", path.as_ref().display())))?;
        let mut source = FileSource {
            reader: BufReader::new(file),
            next: None,
        };
        source.advance()?;
        Ok(source)
    }

    fn advance(&mut self) -> Result<()> {
        let mut buf = [0u8; 1];
        self.next = match self.reader.read(&mut buf) {
            Ok(0) => None,
            Ok(_) => Some(buf[0]),
            Err(e) => return Err(Error::io(e.to_string())),
        };
        Ok(())
    }
}

impl ByteSource for FileSource {
    fn read_byte(&mut self) -> Result<u8> {
        let byte = self
            .next
            .ok_or_else(|| Error::internal("read past end of input"))?;
        self.advance()?;
        Ok(byte)
    }

    fn at_end(&self) -> bool {
        self.next.is_none()
    }
}

/// A push-based text output used by the writers.
pub trait Sink {
    fn write_str(&mut self, s: &str) -> Result<()>;

    fn write_line(&mut self, s: &str) -> Result<()> {
        self.write_str(s)?;
        self.write_str("\n")
    }

    /// Writes `unit` once per open nesting level.
    fn write_indent(&mut self, depth: usize, unit: &str) -> Result<()> {
        for _ in 0..depth {
            self.write_str(unit)?;
        }
        Ok(())
    }

    /// Flushes and releases the output. Writers call this exactly once at
    /// the end of a dump.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A `Sink` collecting into a `String`.
#[derive(Default)]
pub struct StringSink {
    buf: String,
}

impl StringSink {
    #[must_use]
    pub fn new() -> Self {
        StringSink::default()
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.buf
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.buf
    }
}

impl Sink for StringSink {
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.buf.push_str(s);
        Ok(())
    }
}

/// A `Sink` over any [`std::io::Write`].
pub struct WriteSink<W: Write> {
    inner: W,
}

impl<W: Write> WriteSink<W> {
    pub fn new(inner: W) -> Self {
        WriteSink { inner }
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Sink for WriteSink<W> {
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.inner
            .write_all(s.as_bytes())
            .map_err(|e| Error::io(e.to_string()))
    }

    fn close(&mut self) -> Result<()> {
        self.inner.flush().map_err(|e| Error::io(e.to_string()))
    }
}

/// A buffered file-backed `Sink`.
pub struct FileSink {
    inner: WriteSink<BufWriter<File>>,
}

impl FileSink {
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::create(path.as_ref())
            .map_err(|e| Error::io(format!("{}: {e}", path.as_ref().display())))?;
        Ok(FileSink {
            inner: WriteSink::new(BufWriter::new(file)),
        })
    }
}

impl Sink for FileSink {
    fn write_str(&mut self, s: &str) -> Result<()> {
        self.inner.write_str(s)
    }

    fn close(&mut self) -> Result<()> {
        self.inner.close()
    }
}
