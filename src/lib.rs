//! faidx: single-pass FASTA indexing with samtools-compatible output
//!
//! # Overview
//!
//! faidx builds the `.fai` side-car index that enables O(1) random access
//! into FASTA files: for every sequence record it stores the name, the
//! sequence length, the byte offset where the sequence data begins, and
//! the character/byte widths of a full data line. The index is built in
//! one sequential pass with constant auxiliary memory per record, and
//! every structural invariant of the input is validated during that pass.
//! Invalid input fails with a typed error before any index is written.
//!
//! ## Key guarantees
//!
//! - **Byte-exact offsets**: `\n` and `\r\n` terminators are detected per
//!   line and accounted exactly
//! - **Atomic output**: a failed build never leaves a partial index behind
//! - **Typed failures**: duplicate names, inconsistent line lengths,
//!   missing headers and compressed input are distinct, inspectable errors
//!
//! ## Quick Start
//!
//! ```no_run
//! # fn main() -> faidx::Result<()> {
//! // Index genome.fa and write genome.fa.fai
//! let index = faidx::index_fasta("genome.fa")?;
//!
//! // Random access through the index
//! let region = index.fetch_region("chr1", 1000, 2000, "genome.fa")?;
//! assert_eq!(region.len(), 1000);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`scan`]: byte-exact line scanning (offsets, terminators, headers)
//! - [`index`]: index building, validation, serialization and retrieval
//! - [`error`]: the crate error type

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod index;
pub mod scan;

pub use error::{FaidxError, Result};
pub use index::{FaiIndex, FaiRecord, IndexBuilder, index_fasta};
pub use scan::{LineScanner, ScannedLine};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
