//! FASTA index (.fai) building, serialization and random access
//!
//! # Format
//!
//! A `.fai` index is a tab-delimited text file with one line per sequence
//! and five columns:
//!
//! 1. **NAME**: sequence name (first word after `>`)
//! 2. **LENGTH**: total sequence length in characters
//! 3. **OFFSET**: byte offset of the first sequence character
//! 4. **LINEBASES**: characters per full data line
//! 5. **LINEBYTES**: bytes per full data line, terminator included
//!
//! For a FASTA file:
//! ```text
//! >chr1
//! ACGTACGTACGTACGTACGTACGTACGT
//! TGCATGCATGCATGCA
//! >chr2
//! GGGGCCCCAAAATTTT
//! ```
//!
//! the corresponding index:
//! ```text
//! chr1	44	6	28	29
//! chr2	16	58	16	17
//! ```
//!
//! # Building
//!
//! The index is built in one sequential pass over the source. Every
//! structural invariant is enforced during the scan: names must be unique,
//! data may not precede a header, and every data line of a record except
//! the last must have the full line's character and byte width. Any
//! violation aborts the build with a typed [`FaidxError`] before anything
//! is written, so a failed build never leaves a partial or corrupt index
//! behind.
//!
//! ```no_run
//! # fn main() -> faidx::Result<()> {
//! let index = faidx::index_fasta("genome.fa")?;
//! println!("indexed {} sequences", index.len());
//! # Ok(())
//! # }
//! ```

use crate::error::{FaidxError, Result};
use crate::scan::{LineScanner, ScannedLine};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read, Seek, SeekFrom, Write};
use std::path::Path;

/// One row of a FASTA index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaiRecord {
    /// Sequence name: first whitespace-delimited token after `>`
    pub name: String,
    /// Total sequence length in characters, terminators excluded
    pub length: u64,
    /// Byte offset of the first sequence character, just past the header line
    pub offset: u64,
    /// Characters per full data line (0 for a record with no data lines)
    pub line_bases: u32,
    /// Bytes per full data line including its terminator (0 for a record
    /// with no data lines)
    pub line_bytes: u32,
}

impl FaiRecord {
    /// Parse a single index entry from a `.fai` line
    ///
    /// `number` is the 1-based line number within the index file, carried
    /// into the error on failure.
    pub fn from_line(line: &str, number: usize) -> Result<Self> {
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() != 5 {
            return Err(FaidxError::InvalidIndex {
                line: number,
                msg: format!("expected 5 tab-separated fields, got {}", fields.len()),
            });
        }

        let name = fields[0].to_string();
        if name.is_empty() {
            return Err(FaidxError::InvalidIndex {
                line: number,
                msg: "empty sequence name".to_string(),
            });
        }

        let parse_field = |value: &str, what: &str| -> Result<u64> {
            value.parse::<u64>().map_err(|e| FaidxError::InvalidIndex {
                line: number,
                msg: format!("invalid {what} field '{value}': {e}"),
            })
        };
        let length = parse_field(fields[1], "LENGTH")?;
        let offset = parse_field(fields[2], "OFFSET")?;
        let line_bases = parse_field(fields[3], "LINEBASES")? as u32;
        let line_bytes = parse_field(fields[4], "LINEBYTES")? as u32;

        if line_bytes < line_bases {
            return Err(FaidxError::InvalidIndex {
                line: number,
                msg: format!("LINEBYTES {line_bytes} smaller than LINEBASES {line_bases}"),
            });
        }

        Ok(FaiRecord {
            name,
            length,
            offset,
            line_bases,
            line_bytes,
        })
    }

    /// Format as a `.fai` line, terminator excluded
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}",
            self.name, self.length, self.offset, self.line_bases, self.line_bytes
        )
    }

    /// File offset of a 0-based sequence position, accounting for line
    /// wrapping
    ///
    /// Callers guarantee `line_bases > 0` and `position < length`.
    fn position_to_offset(&self, position: u64) -> u64 {
        let line = position / self.line_bases as u64;
        let column = position % self.line_bases as u64;
        self.offset + line * self.line_bytes as u64 + column
    }
}

/// An index record still accepting data lines
///
/// The explicit open state of the per-record machine: created when a header
/// is scanned, mutated by each following data line, and sealed into an
/// immutable [`FaiRecord`] when the next header or end of input arrives.
#[derive(Debug)]
struct OpenRecord {
    name: String,
    offset: u64,
    length: u64,
    line_bases: u32,
    line_bytes: u32,
    /// Whether the first data line has established the line geometry
    have_geometry: bool,
    /// A line differing from the established geometry was seen; legal only
    /// if it proves to be the record's last data line
    irregular: bool,
}

impl OpenRecord {
    fn open(name: String, offset: u64) -> Self {
        Self {
            name,
            offset,
            length: 0,
            line_bases: 0,
            line_bytes: 0,
            have_geometry: false,
            irregular: false,
        }
    }

    fn data_line(&mut self, line: &ScannedLine) -> Result<()> {
        if self.irregular {
            // The earlier short or odd line was not the record's last line
            return Err(FaidxError::InconsistentLineLength {
                name: self.name.clone(),
                line: line.number,
            });
        }

        let chars = line.text.chars().count() as u64;
        let width = (line.bytes + line.sep) as u32;
        if !self.have_geometry {
            self.line_bases = chars as u32;
            self.line_bytes = width;
            self.have_geometry = true;
        } else if chars != self.line_bases as u64 || width != self.line_bytes {
            self.irregular = true;
        }

        self.length += chars;
        Ok(())
    }

    fn seal(self) -> FaiRecord {
        FaiRecord {
            name: self.name,
            length: self.length,
            offset: self.offset,
            line_bases: self.line_bases,
            line_bytes: self.line_bytes,
        }
    }
}

/// Accumulates scanned lines into a validated, ordered record collection
///
/// At most one record is open at a time; a header line seals the current
/// record and opens the next, end of input seals the last. Name uniqueness
/// is checked in O(1) per header against a name map kept alongside the
/// ordered records. The accumulated collection is not observable until
/// [`IndexBuilder::finish`]; a failed build drops it whole.
#[derive(Debug, Default)]
pub struct IndexBuilder {
    records: Vec<FaiRecord>,
    by_name: HashMap<String, usize>,
    open: Option<OpenRecord>,
}

impl IndexBuilder {
    /// Create an empty builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next scanned line
    pub fn push(&mut self, line: &ScannedLine) -> Result<()> {
        if line.is_header() {
            self.header_line(line)
        } else {
            self.data_line(line)
        }
    }

    fn header_line(&mut self, line: &ScannedLine) -> Result<()> {
        let name = line.text[1..]
            .split_whitespace()
            .next()
            .ok_or(FaidxError::MalformedHeader { line: line.number })?
            .to_string();

        self.seal_open();

        if self.by_name.contains_key(&name) {
            return Err(FaidxError::DuplicateName {
                name,
                line: line.number,
            });
        }
        self.by_name.insert(name.clone(), self.records.len());
        self.open = Some(OpenRecord::open(name, line.end_offset()));
        Ok(())
    }

    fn data_line(&mut self, line: &ScannedLine) -> Result<()> {
        match self.open.as_mut() {
            Some(open) => open.data_line(line),
            // Blank lines ahead of the first header are tolerated; anything
            // else is sequence data without a record to belong to.
            None if line.text.is_empty() => Ok(()),
            None => Err(FaidxError::MissingHeader { line: line.number }),
        }
    }

    fn seal_open(&mut self) {
        if let Some(open) = self.open.take() {
            self.records.push(open.seal());
        }
    }

    /// Seal the last open record and return the finished index
    pub fn finish(mut self) -> FaiIndex {
        self.seal_open();
        FaiIndex {
            records: self.records,
            by_name: self.by_name,
        }
    }
}

/// A complete, validated FASTA index
///
/// Records keep the first-appearance order of their headers in the source;
/// lookups by name go through an auxiliary map. An index is only ever
/// observable fully built: every constructor either returns a validated
/// collection or fails without partial state.
///
/// # Example
///
/// ```no_run
/// use faidx::FaiIndex;
///
/// # fn main() -> faidx::Result<()> {
/// let index = FaiIndex::build("genome.fa")?;
/// if let Some(record) = index.get("chr1") {
///     println!("chr1: {} bp", record.length);
/// }
/// index.write("genome.fa.fai")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct FaiIndex {
    records: Vec<FaiRecord>,
    by_name: HashMap<String, usize>,
}

impl FaiIndex {
    /// Build an index by scanning a FASTA file
    ///
    /// The file is opened read-only and scanned once; nothing is written.
    /// Use [`FaiIndex::write`] or [`index_fasta`] to persist the result.
    pub fn build<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_scanner(LineScanner::from_path(path)?)
    }

    /// Build an index from any buffered reader positioned at the start of
    /// FASTA input
    ///
    /// ```
    /// use faidx::FaiIndex;
    /// use std::io::Cursor;
    ///
    /// # fn main() -> faidx::Result<()> {
    /// let index = FaiIndex::from_reader(Cursor::new(b">s\nACGT\n"))?;
    /// assert_eq!(index.get("s").unwrap().length, 4);
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        Self::from_scanner(LineScanner::new(reader)?)
    }

    fn from_scanner<R: BufRead>(scanner: LineScanner<R>) -> Result<Self> {
        let mut builder = IndexBuilder::new();
        for line in scanner {
            builder.push(&line?)?;
        }
        Ok(builder.finish())
    }

    /// Load an existing `.fai` index file
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = BufReader::new(File::open(path)?);
        let mut records = Vec::new();
        let mut by_name = HashMap::new();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            let record = FaiRecord::from_line(&line, i + 1)?;
            if by_name.contains_key(&record.name) {
                return Err(FaidxError::DuplicateName {
                    name: record.name,
                    line: i + 1,
                });
            }
            by_name.insert(record.name.clone(), records.len());
            records.push(record);
        }

        Ok(Self { records, by_name })
    }

    /// Serialize in `.fai` format, one line per record, every line
    /// newline-terminated
    pub fn write_to<W: Write>(&self, mut writer: W) -> std::io::Result<()> {
        for record in &self.records {
            writeln!(writer, "{}", record.to_line())?;
        }
        Ok(())
    }

    /// Write the index to a file
    ///
    /// The whole index is serialized in memory and written in a single
    /// call, so a pre-existing file at `path` is replaced only once the
    /// complete serialized form exists. Validation failures never reach
    /// this point: an index value is only constructible from a fully
    /// validated scan.
    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        fs::write(path, buf)?;
        Ok(())
    }

    /// Get a record by sequence name
    pub fn get(&self, name: &str) -> Option<&FaiRecord> {
        self.by_name.get(name).map(|&i| &self.records[i])
    }

    /// Records in first-appearance order
    pub fn records(&self) -> &[FaiRecord] {
        &self.records
    }

    /// Sequence names in first-appearance order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.name.as_str())
    }

    /// Number of sequences in the index
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the index holds no sequences
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Fetch an entire sequence from the indexed FASTA file
    pub fn fetch<P: AsRef<Path>>(&self, name: &str, fasta_path: P) -> Result<String> {
        let record = self.get(name).ok_or_else(|| FaidxError::SequenceNotFound {
            name: name.to_string(),
        })?;
        self.fetch_region(name, 0, record.length, fasta_path)
    }

    /// Fetch a region of a sequence (0-based, half-open `[start, end)`)
    ///
    /// `end` past the sequence is clamped to its length; `start` past it is
    /// an error. `start == end` is a legal zero-length range and returns an
    /// empty string, which makes empty records retrievable.
    pub fn fetch_region<P: AsRef<Path>>(
        &self,
        name: &str,
        start: u64,
        end: u64,
        fasta_path: P,
    ) -> Result<String> {
        let record = self.get(name).ok_or_else(|| FaidxError::SequenceNotFound {
            name: name.to_string(),
        })?;

        if start > end {
            return Err(FaidxError::InvalidRange {
                msg: format!("start {start} past end {end}"),
            });
        }
        if start > record.length {
            return Err(FaidxError::InvalidRange {
                msg: format!(
                    "start {start} past length {} of '{}'",
                    record.length, name
                ),
            });
        }

        let end = end.min(record.length);
        if start == end {
            return Ok(String::new());
        }
        if record.line_bases == 0 {
            // Length without line geometry: the record's first data line
            // was blank, so positions are not addressable.
            return Err(FaidxError::InvalidRange {
                msg: format!("sequence '{name}' has no line geometry"),
            });
        }

        // Exact byte span from the first to the last requested character,
        // interior terminators included.
        let first = record.position_to_offset(start);
        let last = record.position_to_offset(end - 1);
        let span = (last - first + 1) as usize;

        let mut file = File::open(fasta_path)?;
        file.seek(SeekFrom::Start(first))?;
        let mut raw = vec![0u8; span];
        file.read_exact(&mut raw)?;

        let sequence: String = raw
            .iter()
            .filter(|&&b| b != b'\n' && b != b'\r')
            .map(|&b| b as char)
            .collect();
        Ok(sequence)
    }
}

/// Index a FASTA file and write the index alongside it
///
/// Builds the index in a single validating pass and, only on full success,
/// writes it to `<path>.fai`. On any validation failure no index file is
/// created and a pre-existing one is left untouched.
///
/// ```no_run
/// # fn main() -> faidx::Result<()> {
/// let index = faidx::index_fasta("genome.fa")?;
/// assert!(std::path::Path::new("genome.fa.fai").exists());
/// # Ok(())
/// # }
/// ```
pub fn index_fasta<P: AsRef<Path>>(path: P) -> Result<FaiIndex> {
    let path = path.as_ref();
    let index = FaiIndex::build(path)?;

    let mut fai = path.as_os_str().to_os_string();
    fai.push(".fai");
    index.write(fai)?;
    Ok(index)
}
