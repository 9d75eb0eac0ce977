//! Text encodings accepted by the readers.
//!
//! Everything is decoded to UTF-8 on the fly so the `csv` and `serde_json`
//! readers only ever see UTF-8.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;

use crate::error::{Error, Result};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Supported source encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    /// UTF-8, read as is.
    Utf8,
    /// UTF-8 with an optional leading byte-order mark, which is dropped.
    Utf8Sig,
    /// ISO-8859-1: every byte is the code point of the same value.
    Latin1,
}

impl Encoding {
    /// Parses an encoding label, ignoring case, `-` and `_`.
    ///
    /// # Errors
    ///
    /// Returns `Error::Encoding` for unsupported labels.
    pub fn parse(label: &str) -> Result<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "utf8" => Ok(Self::Utf8),
            "utf8sig" => Ok(Self::Utf8Sig),
            "latin1" | "iso88591" | "l1" => Ok(Self::Latin1),
            _ => Err(Error::Encoding(format!(
                "unsupported encoding '{label}' (expected utf-8, utf-8-sig or latin-1)"
            ))),
        }
    }

    /// Opens a file and returns a buffered UTF-8 view of it.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the file cannot be opened.
    pub fn open(self, path: &Path) -> Result<Box<dyn BufRead + Send>> {
        let file = File::open(path)?;
        self.wrap(file)
    }

    /// Wraps any byte source.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the byte-order mark cannot be peeked.
    pub fn wrap<R: Read + Send + 'static>(self, inner: R) -> Result<Box<dyn BufRead + Send>> {
        match self {
            Self::Utf8 => Ok(Box::new(BufReader::new(inner))),
            Self::Utf8Sig => {
                let mut reader = BufReader::new(inner);
                if reader.fill_buf()?.starts_with(UTF8_BOM) {
                    reader.consume(UTF8_BOM.len());
                }
                Ok(Box::new(reader))
            }
            Self::Latin1 => Ok(Box::new(BufReader::new(Latin1Decoder::new(inner)))),
        }
    }
}

/// Streams ISO-8859-1 bytes out as UTF-8.
struct Latin1Decoder<R> {
    inner: R,
    /// Second byte of a two-byte sequence that did not fit the last buffer.
    carry: Option<u8>,
    raw: Box<[u8]>,
}

impl<R: Read> Latin1Decoder<R> {
    fn new(inner: R) -> Self {
        Self {
            inner,
            carry: None,
            raw: vec![0; 4096].into_boxed_slice(),
        }
    }
}

impl<R: Read> Read for Latin1Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut written = 0;
        if let Some(byte) = self.carry.take() {
            buf[0] = byte;
            written = 1;
        }
        let room = buf.len() - written;
        if room == 0 {
            return Ok(written);
        }

        // Each input byte expands to at most two output bytes.
        let want = (room / 2).clamp(1, self.raw.len());
        let n = self.inner.read(&mut self.raw[..want])?;
        for &b in &self.raw[..n] {
            if b < 0x80 {
                buf[written] = b;
                written += 1;
            } else {
                buf[written] = 0xC0 | (b >> 6);
                written += 1;
                let low = 0x80 | (b & 0x3F);
                if written < buf.len() {
                    buf[written] = low;
                    written += 1;
                } else {
                    self.carry = Some(low);
                }
            }
        }
        Ok(written)
    }
}

/// Maps an invalid-UTF-8 read error to an encoding error.
pub(crate) fn decode_error(err: io::Error, encoding_hint: &str) -> Error {
    if err.kind() == io::ErrorKind::InvalidData {
        Error::Encoding(format!("input is not valid {encoding_hint}: {err}"))
    } else {
        Error::Io(err)
    }
}
