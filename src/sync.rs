//! Streaming reader for PoPoolation2 "synchronized" files.
//!
//! Each line tallies the base counts of one position for every sample:
//!
//! ```text
//! 2R  2302  T  0:7:0:0:0:0  0:7:0:0:0:0
//! 2R  2303  T  0:8:0:0:0:0  0:8:0:0:0:0
//! ```
//!
//! Columns are chromosome, 1-based position, reference base, then one
//! `A:T:C:G:N:D` count column per sample (D = deletions). The notation
//! `.:.:.:.:.:.` marks a masked sample; it reads as zero counts with
//! [`BaseCounts::missing`] set, unless the reader was built with
//! [`SyncReader::with_allow_missing`]`(false)`.
//!
//! Counts are checked when a line is parsed: a line whose counts, summed
//! over all samples, do not fit in a `u64` is a parse error.

use crate::error::{Result, WindowError};
use crate::streaming::buffers::{DEFAULT_INPUT_BUFFER, DEFAULT_LINE_BUFFER};
use crate::streaming::parsing::{parse_locus_bytes, parse_u64_fast, should_skip_line};
use crate::window::GenomicRecord;
use memchr::memchr;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// Base counts of one sample at one position.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BaseCounts {
    pub a: u64,
    pub t: u64,
    pub c: u64,
    pub g: u64,
    pub n: u64,
    pub deletions: u64,
    /// Sample was masked (`.:.:.:.:.:.`) rather than observed with zero coverage
    pub missing: bool,
}

impl BaseCounts {
    /// Sum of the A, C, G and T counts (saturating).
    #[inline]
    pub fn nucleotide_count(&self) -> u64 {
        self.a
            .saturating_add(self.c)
            .saturating_add(self.g)
            .saturating_add(self.t)
    }

    /// Sum of all six counts (saturating).
    #[inline]
    pub fn total(&self) -> u64 {
        self.nucleotide_count()
            .saturating_add(self.n)
            .saturating_add(self.deletions)
    }

    fn checked_total(&self) -> Option<u64> {
        [self.c, self.g, self.t, self.n, self.deletions]
            .iter()
            .try_fold(self.a, |sum, &count| sum.checked_add(count))
    }
}

/// One line of a sync file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncRecord {
    pub chromosome: String,
    pub position: u64,
    pub reference_base: u8,
    pub samples: Vec<BaseCounts>,
}

impl SyncRecord {
    /// Nucleotide depth summed over all samples (saturating).
    pub fn total_depth(&self) -> u64 {
        self.samples
            .iter()
            .fold(0u64, |depth, s| depth.saturating_add(s.nucleotide_count()))
    }
}

impl GenomicRecord for SyncRecord {
    #[inline]
    fn chromosome(&self) -> &str {
        &self.chromosome
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position
    }
}

/// A streaming sync file reader.
pub struct SyncReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: Vec<u8>,
    /// Number of samples, fixed by the first data line
    sample_count: Option<usize>,
    allow_missing: bool,
}

impl SyncReader<File> {
    /// Open a sync file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> SyncReader<R> {
    /// Create a new reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_INPUT_BUFFER, reader),
            line_number: 0,
            buffer: Vec::with_capacity(DEFAULT_LINE_BUFFER),
            sample_count: None,
            allow_missing: true,
        }
    }

    /// Accept masked `.:.:.:.:.:.` samples (builder pattern, default on).
    /// When off, a masked sample is a parse error.
    pub fn with_allow_missing(mut self, allow_missing: bool) -> Self {
        self.allow_missing = allow_missing;
        self
    }

    /// Number of samples per line, once the first line has been read.
    pub fn sample_count(&self) -> Option<usize> {
        self.sample_count
    }

    /// Read the next record.
    pub fn read_record(&mut self) -> Result<Option<SyncRecord>> {
        loop {
            self.buffer.clear();
            let bytes_read = self.reader.read_until(b'\n', &mut self.buffer)?;
            if bytes_read == 0 {
                return Ok(None);
            }
            self.line_number += 1;

            if should_skip_line(&self.buffer) {
                continue;
            }

            let record = self.parse_line()?;
            match self.sample_count {
                None => self.sample_count = Some(record.samples.len()),
                Some(expected) if expected != record.samples.len() => {
                    return Err(self.error(format!(
                        "Expected {} samples, got {}",
                        expected,
                        record.samples.len()
                    )));
                }
                Some(_) => {}
            }
            return Ok(Some(record));
        }
    }

    fn parse_line(&self) -> Result<SyncRecord> {
        let (chrom, position, rest_start) = parse_locus_bytes(&self.buffer)
            .ok_or_else(|| self.error("Expected 'chrom<TAB>position' at start of line"))?;

        let chromosome = std::str::from_utf8(chrom)
            .map_err(|_| self.error("Chromosome name is not valid UTF-8"))?
            .to_string();

        let mut fields = self.buffer[rest_start..].trim_ascii_end().split(|&b| b == b'\t');
        // Leading empty field from the tab right after the position
        fields.next();

        let reference_base = match fields.next() {
            Some([base]) => base.to_ascii_uppercase(),
            Some(other) => {
                return Err(self.error(format!(
                    "Invalid reference base '{}'",
                    String::from_utf8_lossy(other)
                )))
            }
            None => return Err(self.error("Missing reference base column")),
        };

        let samples = fields
            .map(|field| self.parse_counts(field))
            .collect::<Result<Vec<_>>>()?;
        if samples.is_empty() {
            return Err(self.error("No sample columns"));
        }
        samples
            .iter()
            .try_fold(0u64, |sum, s| sum.checked_add(s.checked_total()?))
            .ok_or_else(|| self.error("Allele counts overflow when summed over samples"))?;

        Ok(SyncRecord {
            chromosome,
            position,
            reference_base,
            samples,
        })
    }

    /// Parse one `A:T:C:G:N:D` column.
    fn parse_counts(&self, field: &[u8]) -> Result<BaseCounts> {
        if field == b".:.:.:.:.:." {
            if !self.allow_missing {
                return Err(self.error("Masked sample '.:.:.:.:.:.' not allowed"));
            }
            return Ok(BaseCounts {
                missing: true,
                ..BaseCounts::default()
            });
        }

        let mut counts = [0u64; 6];
        let mut rest = field;
        for (i, slot) in counts.iter_mut().enumerate() {
            let end = memchr(b':', rest).unwrap_or(rest.len());
            let last = i == 5;
            if last != (end == rest.len()) {
                return Err(self.invalid_counts(field));
            }
            *slot = parse_u64_fast(&rest[..end]).ok_or_else(|| self.invalid_counts(field))?;
            rest = if last { &[] } else { &rest[end + 1..] };
        }

        let [a, t, c, g, n, deletions] = counts;
        Ok(BaseCounts {
            a,
            t,
            c,
            g,
            n,
            deletions,
            missing: false,
        })
    }

    fn invalid_counts(&self, field: &[u8]) -> WindowError {
        self.error(format!(
            "Invalid allele counts '{}', expected A:T:C:G:N:D",
            String::from_utf8_lossy(field)
        ))
    }

    fn error(&self, message: impl Into<String>) -> WindowError {
        WindowError::Parse {
            line: self.line_number,
            message: message.into(),
        }
    }

    /// Get an iterator over all records.
    pub fn records(self) -> SyncRecordIter<R> {
        SyncRecordIter { reader: self }
    }
}

/// Iterator over sync records.
pub struct SyncRecordIter<R: Read> {
    reader: SyncReader<R>,
}

impl<R: Read> Iterator for SyncRecordIter<R> {
    type Item = Result<SyncRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Parse sync records from a string (useful for testing).
pub fn parse_sync(content: &str) -> Result<Vec<SyncRecord>> {
    SyncReader::new(content.as_bytes()).records().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_read_sync() {
        let content = "2R\t2302\tT\t0:7:0:0:0:0\t0:7:0:0:0:0\n\
                       2R\t2305\tc\t1:0:9:0:0:0\t0:0:9:1:0:2\n";
        let records = parse_sync(content).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].chromosome, "2R");
        assert_eq!(records[0].position, 2302);
        assert_eq!(records[0].reference_base, b'T');
        assert_eq!(records[0].samples[0].t, 7);
        assert_eq!(records[0].total_depth(), 14);

        assert_eq!(records[1].reference_base, b'C');
        assert_eq!(records[1].samples[1].g, 1);
        assert_eq!(records[1].samples[1].deletions, 2);
        assert_eq!(records[1].samples[1].total(), 12);
    }

    #[test]
    #[serial]
    fn test_missing_sample() {
        let content = "2L\t1\tA\t.:.:.:.:.:.\t3:0:0:0:0:0\n";
        let records = parse_sync(content).unwrap();

        assert!(records[0].samples[0].missing);
        assert_eq!(records[0].samples[0].total(), 0);
        assert!(!records[0].samples[1].missing);
        assert_eq!(records[0].total_depth(), 3);
    }

    #[test]
    #[serial]
    fn test_missing_sample_rejected_when_disallowed() {
        let content = "2L\t1\tA\t1:0:0:0:0:0\t1:0:0:0:0:0\n2L\t2\tA\t.:.:.:.:.:.\t3:0:0:0:0:0\n";
        let result: Result<Vec<_>> = SyncReader::new(content.as_bytes())
            .with_allow_missing(false)
            .records()
            .collect();

        match result {
            Err(WindowError::Parse { line, message }) => {
                assert_eq!(line, 2);
                assert!(message.contains("not allowed"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    #[serial]
    fn test_count_overflow_rejected() {
        let err = parse_sync("2L\t1\tA\t18446744073709551615:0:1:0:0:0\n").unwrap_err();
        assert!(matches!(err, WindowError::Parse { line: 1, .. }));

        // Each sample fits, the sum over samples does not
        let content = "2L\t1\tA\t18446744073709551615:0:0:0:0:0\t1:0:0:0:0:0\n";
        assert!(matches!(
            parse_sync(content),
            Err(WindowError::Parse { line: 1, .. })
        ));

        let record = parse_sync("2L\t1\tA\t18446744073709551615:0:0:0:0:0\n").unwrap();
        assert_eq!(record[0].total_depth(), u64::MAX);
    }

    #[test]
    fn test_counts_saturate() {
        let counts = BaseCounts {
            a: u64::MAX,
            t: 5,
            ..BaseCounts::default()
        };
        assert_eq!(counts.nucleotide_count(), u64::MAX);
        assert_eq!(counts.total(), u64::MAX);
    }

    #[test]
    #[serial]
    fn test_invalid_counts() {
        for bad in ["0:7:0:0:0", "0:7:0:0:0:0:1", "0:x:0:0:0:0", "::::::"] {
            let content = format!("2L\t1\tA\t{}\n", bad);
            let err = parse_sync(&content).unwrap_err();
            assert!(
                matches!(err, WindowError::Parse { line: 1, .. }),
                "expected parse error for {}",
                bad
            );
        }
    }

    #[test]
    #[serial]
    fn test_inconsistent_sample_count() {
        let content = "2L\t1\tA\t1:0:0:0:0:0\n2L\t2\tA\t1:0:0:0:0:0\t1:0:0:0:0:0\n";
        let err = parse_sync(content).unwrap_err();
        assert!(err.to_string().contains("Expected 1 samples, got 2"));
    }

    #[test]
    #[serial]
    fn test_missing_columns() {
        assert!(parse_sync("2L\t1\n").is_err());
        assert!(parse_sync("2L\t1\tA\n").is_err());
        assert!(parse_sync("2L\t1\tAC\t1:0:0:0:0:0\n").is_err());
    }
}
