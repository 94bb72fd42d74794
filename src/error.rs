//! Error types for faidx

use thiserror::Error;

/// Result type alias for faidx operations
pub type Result<T> = std::result::Result<T, FaidxError>;

/// Error types that can occur while building or using a FASTA index
///
/// Structural errors (everything except [`FaidxError::Io`]) are data-
/// correctness failures detected during the forward scan; they abort the
/// build immediately and are never retried. Filesystem-level failures are
/// surfaced separately as [`FaidxError::Io`] so callers can tell bad FASTA
/// from a bad filesystem.
#[derive(Debug, Error)]
pub enum FaidxError {
    /// I/O error below the scanning layer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Input carries the gzip magic signature; compressed input is refused
    #[error("cannot index compressed input (gzip signature detected)")]
    CompressedInput,

    /// Sequence data encountered before any header line
    #[error("sequence data at line {line} precedes any '>' header")]
    MissingHeader {
        /// Line number of the offending data line
        line: usize,
    },

    /// Header line yields no usable sequence name
    #[error("header at line {line} has an empty sequence name")]
    MalformedHeader {
        /// Line number of the offending header
        line: usize,
    },

    /// Two headers derive the same sequence name
    #[error("duplicate sequence name '{name}' at line {line}")]
    DuplicateName {
        /// The colliding name
        name: String,
        /// Line number of the second header
        line: usize,
    },

    /// A data line of differing length appears before the record's last line
    #[error("inconsistent line length in sequence '{name}' at line {line}")]
    InconsistentLineLength {
        /// Name of the record being accumulated
        name: String,
        /// Line number of the data line that proved the earlier one non-final
        line: usize,
    },

    /// Line content is not valid UTF-8
    #[error("invalid UTF-8 in input at line {line}")]
    InvalidEncoding {
        /// Line number of the undecodable line
        line: usize,
    },

    /// Malformed `.fai` index file
    #[error("invalid index entry at line {line}: {msg}")]
    InvalidIndex {
        /// Line number within the index file
        line: usize,
        /// What was wrong with the entry
        msg: String,
    },

    /// Requested sequence is not present in the index
    #[error("sequence '{name}' not found in index")]
    SequenceNotFound {
        /// The requested name
        name: String,
    },

    /// Requested region is not addressable within the sequence
    #[error("invalid range: {msg}")]
    InvalidRange {
        /// What made the range invalid
        msg: String,
    },
}
