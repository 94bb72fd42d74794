//! Integration tests for FASTA index building, persistence and retrieval

use faidx::{FaiIndex, FaidxError, index_fasta};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const TEST_FASTA: &[u8] = b">chr1\n\
ACGTACGTACGTACGTACGTACGTACGT\n\
TGCATGCATGCATGCA\n\
>chr2\n\
GGGGCCCCAAAATTTT\n\
>chr3\n\
ATCGATCGATCGATCGATCGATCGATCG\n\
ATCGATCGATCGATCGATCGATCGATCG\n\
ATCGATCG\n";

const TEST_FAI: &str = "chr1\t44\t6\t28\t29\nchr2\t16\t58\t16\t17\nchr3\t64\t81\t28\t29\n";

fn write_file(dir: &TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, bytes).unwrap();
    path
}

fn fai_path(fasta: &Path) -> PathBuf {
    let mut p = fasta.as_os_str().to_os_string();
    p.push(".fai");
    PathBuf::from(p)
}

#[test]
fn test_build_write_and_reload() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "test.fa", TEST_FASTA);
    let fai = fai_path(&fasta);

    let index = FaiIndex::build(&fasta).expect("Failed to build index");

    assert_eq!(index.len(), 3);
    let chr1 = index.get("chr1").unwrap();
    assert_eq!(chr1.length, 44);
    assert_eq!(chr1.offset, 6);
    assert_eq!(chr1.line_bases, 28);
    assert_eq!(chr1.line_bytes, 29);

    let chr2 = index.get("chr2").unwrap();
    assert_eq!(chr2.length, 16);
    assert_eq!(chr2.offset, 58);

    let chr3 = index.get("chr3").unwrap();
    assert_eq!(chr3.length, 64);
    assert_eq!(chr3.offset, 81);

    index.write(&fai).expect("Failed to write index");
    assert_eq!(fs::read_to_string(&fai).unwrap(), TEST_FAI);

    let reloaded = FaiIndex::from_path(&fai).expect("Failed to reload index");
    assert_eq!(reloaded.len(), index.len());
    assert_eq!(reloaded.records(), index.records());
}

#[test]
fn test_index_fasta_writes_sibling_and_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "genome.fa", TEST_FASTA);
    let fai = fai_path(&fasta);

    index_fasta(&fasta).expect("Failed to index");
    assert!(fai.is_file());
    let first = fs::read(&fai).unwrap();

    index_fasta(&fasta).expect("Failed to re-index");
    let second = fs::read(&fai).unwrap();

    assert_eq!(first, second);
    assert_eq!(first, TEST_FAI.as_bytes());
}

#[test]
fn test_duplicate_name_leaves_no_index() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "dups.fa", b">seq\nACGT\n>seq\nTTTT\n");

    let result = index_fasta(&fasta);
    assert!(matches!(result, Err(FaidxError::DuplicateName { .. })));
    assert!(!fai_path(&fasta).exists());
}

#[test]
fn test_inconsistent_line_length_leaves_no_index() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "ragged.fa", b">seq\nACGTACGT\nACG\nACGTACGT\n");

    let result = index_fasta(&fasta);
    assert!(matches!(
        result,
        Err(FaidxError::InconsistentLineLength { .. })
    ));
    assert!(!fai_path(&fasta).exists());
}

#[test]
fn test_existing_index_untouched_on_failure() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "genome.fa", TEST_FASTA);
    let fai = fai_path(&fasta);

    index_fasta(&fasta).expect("Failed to index");
    let good = fs::read(&fai).unwrap();

    // Source goes bad after the index was written
    fs::write(&fasta, b">seq\nACGT\n>seq\nTTTT\n").unwrap();
    assert!(index_fasta(&fasta).is_err());

    assert_eq!(fs::read(&fai).unwrap(), good);
}

#[test]
fn test_gzip_input_rejected() {
    use flate2::Compression;
    use flate2::write::GzEncoder;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("genome.fa.gz");

    let mut encoder = GzEncoder::new(fs::File::create(&path).unwrap(), Compression::default());
    encoder.write_all(TEST_FASTA).unwrap();
    encoder.finish().unwrap();

    let result = index_fasta(&path);
    assert!(matches!(result, Err(FaidxError::CompressedInput)));
    assert!(!fai_path(&path).exists());
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let result = FaiIndex::build(dir.path().join("absent.fa"));
    assert!(matches!(result, Err(FaidxError::Io(_))));
}

#[test]
fn test_fetch_entire_sequences() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "test.fa", TEST_FASTA);
    let index = FaiIndex::build(&fasta).unwrap();

    let chr1 = index.fetch("chr1", &fasta).unwrap();
    assert_eq!(chr1.len(), 44);
    assert!(chr1.starts_with("ACGTACGTACGTACGTACGTACGTACGT"));
    assert!(chr1.ends_with("TGCATGCATGCATGCA"));

    let chr2 = index.fetch("chr2", &fasta).unwrap();
    assert_eq!(chr2, "GGGGCCCCAAAATTTT");

    let chr3 = index.fetch("chr3", &fasta).unwrap();
    assert_eq!(chr3.len(), 64);
    assert!(chr3.ends_with("ATCGATCG"));
}

#[test]
fn test_fetch_region() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "test.fa", TEST_FASTA);
    let index = FaiIndex::build(&fasta).unwrap();

    let region = index.fetch_region("chr1", 0, 10, &fasta).unwrap();
    assert_eq!(region, "ACGTACGTAC");

    // Crosses the line boundary at position 28
    let region = index.fetch_region("chr1", 26, 32, &fasta).unwrap();
    assert_eq!(region, "GTTGCA");

    // End past the sequence is clamped
    let region = index.fetch_region("chr2", 10, 100, &fasta).unwrap();
    assert_eq!(region, "AATTTT");

    // Zero-length range is legal
    let region = index.fetch_region("chr2", 4, 4, &fasta).unwrap();
    assert_eq!(region, "");
}

#[test]
fn test_fetch_errors() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "test.fa", TEST_FASTA);
    let index = FaiIndex::build(&fasta).unwrap();

    let result = index.fetch("chr99", &fasta);
    assert!(matches!(result, Err(FaidxError::SequenceNotFound { .. })));

    let result = index.fetch_region("chr1", 10, 5, &fasta);
    assert!(matches!(result, Err(FaidxError::InvalidRange { .. })));

    let result = index.fetch_region("chr1", 1000, 2000, &fasta);
    assert!(matches!(result, Err(FaidxError::InvalidRange { .. })));
}

#[test]
fn test_empty_record_retrievable_as_zero_length_range() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "empty.fa", b">empty\n>seq\nACGT\n");
    let index = FaiIndex::build(&fasta).unwrap();

    assert_eq!(index.get("empty").unwrap().length, 0);
    let region = index.fetch_region("empty", 0, 0, &fasta).unwrap();
    assert_eq!(region, "");

    assert_eq!(index.fetch("seq", &fasta).unwrap(), "ACGT");
}

#[test]
fn test_crlf_terminator_accounting() {
    let dir = TempDir::new().unwrap();
    let lf = write_file(&dir, "lf.fa", b">seq\nACGTACGTAC\nACGT\n");
    let crlf = write_file(&dir, "crlf.fa", b">seq\r\nACGTACGTAC\r\nACGT\r\n");

    let lf_index = FaiIndex::build(&lf).unwrap();
    let crlf_index = FaiIndex::build(&crlf).unwrap();

    let a = lf_index.get("seq").unwrap();
    let b = crlf_index.get("seq").unwrap();

    assert_eq!(a.length, b.length);
    assert_eq!(a.line_bases, b.line_bases);
    assert_eq!(a.offset + 1, b.offset);
    assert_eq!(a.line_bytes + 1, b.line_bytes);

    // Identical logical content either way
    assert_eq!(
        lf_index.fetch("seq", &lf).unwrap(),
        crlf_index.fetch("seq", &crlf).unwrap()
    );
}

#[test]
fn test_retrieval_matches_source_lines() {
    let dir = TempDir::new().unwrap();
    let fasta = write_file(&dir, "test.fa", TEST_FASTA);
    let index = FaiIndex::build(&fasta).unwrap();

    // Reassemble each sequence straight from the source text
    let text = String::from_utf8(TEST_FASTA.to_vec()).unwrap();
    let mut expected: Vec<(String, String)> = Vec::new();
    for line in text.lines() {
        if let Some(header) = line.strip_prefix('>') {
            expected.push((header.to_string(), String::new()));
        } else {
            expected.last_mut().unwrap().1.push_str(line);
        }
    }

    assert_eq!(expected.len(), index.len());
    for (name, sequence) in &expected {
        assert_eq!(&index.fetch(name, &fasta).unwrap(), sequence);
    }
}
