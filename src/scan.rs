//! Byte-exact line scanning for FASTA input
//!
//! The scanner presents a source as an ordered sequence of logical lines,
//! each reporting its content (terminator stripped), its exact byte position
//! in the source, the encoded byte length of the content, and the width of
//! the terminator that ended it. `\n` and `\r\n` terminators are detected
//! per line, so files using either convention (or mixing them) scan with
//! exact offsets.
//!
//! The scanner owns all stream-position state and nothing else: it does not
//! interpret records, it only classifies lines as header or data. Input
//! carrying the gzip magic signature is refused at construction, before any
//! line is produced.

use crate::error::{FaidxError, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Gzip magic signature (RFC 1952 ID1/ID2)
const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Leading character of a FASTA header line
const HEADER_MARKER: char = '>';

/// A single scanned line with its exact position in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedLine {
    /// Line content with the terminator stripped
    pub text: String,
    /// Byte position of the first content byte
    pub offset: u64,
    /// Encoded byte length of the content (terminator excluded)
    pub bytes: usize,
    /// Terminator byte length: 0 (end of input), 1 (`\n`) or 2 (`\r\n`)
    pub sep: usize,
    /// 1-based line number
    pub number: usize,
}

impl ScannedLine {
    /// Whether this line starts a new FASTA record
    pub fn is_header(&self) -> bool {
        self.text.starts_with(HEADER_MARKER)
    }

    /// Byte position immediately past this line's terminator
    pub fn end_offset(&self) -> u64 {
        self.offset + (self.bytes + self.sep) as u64
    }
}

/// Streaming line scanner with exact byte-position tracking
///
/// Produces a lazy, finite, forward-only sequence of [`ScannedLine`]s from
/// any buffered reader. The running offset advances by exactly
/// `bytes + sep` per line, so `end_offset()` of one line equals `offset` of
/// the next. A single reused buffer keeps memory constant regardless of
/// input size.
///
/// # Example
///
/// ```
/// use faidx::LineScanner;
/// use std::io::Cursor;
///
/// # fn main() -> faidx::Result<()> {
/// let scanner = LineScanner::new(Cursor::new(b">chr1\nACGT\n"))?;
/// for line in scanner {
///     let line = line?;
///     println!("{} @ {}", line.text, line.offset);
/// }
/// # Ok(())
/// # }
/// ```
pub struct LineScanner<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    offset: u64,
    number: usize,
}

impl LineScanner<BufReader<File>> {
    /// Open a file read-only and scan it from the start
    ///
    /// The handle is held for the lifetime of the scanner and released when
    /// the scanner is dropped, on every exit path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::new(BufReader::new(file))
    }
}

impl<R: BufRead> LineScanner<R> {
    /// Wrap a buffered reader positioned at the start of the input
    ///
    /// Peeks the buffered head for the gzip magic signature and fails with
    /// [`FaidxError::CompressedInput`] before producing any line if it is
    /// present. Detection is by content, never by file name.
    pub fn new(mut reader: R) -> Result<Self> {
        let head = reader.fill_buf()?;
        if head.len() >= GZIP_MAGIC.len() && head[..GZIP_MAGIC.len()] == GZIP_MAGIC {
            return Err(FaidxError::CompressedInput);
        }
        Ok(Self {
            reader,
            buf: Vec::with_capacity(256),
            offset: 0,
            number: 0,
        })
    }

    /// Read the next line, or `None` at end of input
    fn read_line(&mut self) -> Result<Option<ScannedLine>> {
        self.buf.clear();
        let consumed = self.reader.read_until(b'\n', &mut self.buf)?;
        if consumed == 0 {
            return Ok(None);
        }
        self.number += 1;

        // A '\r' is part of the terminator only when it directly precedes
        // the '\n'; a lone '\r' stays in the content.
        let mut content = self.buf.as_slice();
        let mut sep = 0;
        if content.last() == Some(&b'\n') {
            content = &content[..content.len() - 1];
            sep = 1;
            if content.last() == Some(&b'\r') {
                content = &content[..content.len() - 1];
                sep = 2;
            }
        }

        let text = std::str::from_utf8(content)
            .map_err(|_| FaidxError::InvalidEncoding { line: self.number })?
            .to_string();
        let line = ScannedLine {
            bytes: content.len(),
            text,
            offset: self.offset,
            sep,
            number: self.number,
        };
        self.offset += consumed as u64;
        Ok(Some(line))
    }
}

impl<R: BufRead> Iterator for LineScanner<R> {
    type Item = Result<ScannedLine>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.read_line() {
            Ok(Some(line)) => Some(Ok(line)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}
