//! Streaming reader for plain position tables.
//!
//! Each data line starts with `chrom\tpos`; any further columns are kept
//! verbatim. Blank lines and `#` comments are skipped.

use crate::error::{Result, WindowError};
use crate::streaming::buffers::{DEFAULT_INPUT_BUFFER, DEFAULT_LINE_BUFFER};
use crate::streaming::parsing::{parse_locus_bytes, should_skip_line};
use crate::window::GenomicRecord;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

/// A single position on a chromosome, with optional trailing columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocusRecord {
    pub chromosome: String,
    pub position: u64,
    /// Columns after the position, without the leading tab
    pub rest: Option<String>,
}

impl LocusRecord {
    pub fn new(chromosome: impl Into<String>, position: u64) -> Self {
        Self {
            chromosome: chromosome.into(),
            position,
            rest: None,
        }
    }
}

impl GenomicRecord for LocusRecord {
    #[inline]
    fn chromosome(&self) -> &str {
        &self.chromosome
    }

    #[inline]
    fn position(&self) -> u64 {
        self.position
    }
}

impl fmt::Display for LocusRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.chromosome, self.position)?;
        if let Some(rest) = &self.rest {
            write!(f, "\t{}", rest)?;
        }
        Ok(())
    }
}

/// A streaming position table reader.
pub struct LocusReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    buffer: Vec<u8>,
}

impl LocusReader<File> {
    /// Open a position table from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> LocusReader<R> {
    /// Create a new reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::with_capacity(DEFAULT_INPUT_BUFFER, reader),
            line_number: 0,
            buffer: Vec::with_capacity(DEFAULT_LINE_BUFFER),
        }
    }

    /// Read the next record.
    pub fn read_record(&mut self) -> Result<Option<LocusRecord>> {
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

            return self.parse_line().map(Some);
        }
    }

    fn parse_line(&self) -> Result<LocusRecord> {
        let (chrom, position, rest_start) =
            parse_locus_bytes(&self.buffer).ok_or_else(|| WindowError::Parse {
                line: self.line_number,
                message: "Expected 'chrom<TAB>position' at start of line".to_string(),
            })?;

        let chromosome = self.utf8(chrom)?.to_string();

        let tail = self.buffer[rest_start..].trim_ascii_end();
        let rest = match tail.split_first() {
            Some((b'\t', rest)) => Some(self.utf8(rest)?.to_string()),
            _ => None,
        };

        Ok(LocusRecord {
            chromosome,
            position,
            rest,
        })
    }

    fn utf8<'a>(&self, bytes: &'a [u8]) -> Result<&'a str> {
        std::str::from_utf8(bytes).map_err(|_| WindowError::Parse {
            line: self.line_number,
            message: "Line is not valid UTF-8".to_string(),
        })
    }

    /// Get an iterator over all records.
    pub fn records(self) -> LocusRecordIter<R> {
        LocusRecordIter { reader: self }
    }
}

/// Iterator over position table records.
pub struct LocusRecordIter<R: Read> {
    reader: LocusReader<R>,
}

impl<R: Read> Iterator for LocusRecordIter<R> {
    type Item = Result<LocusRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.reader.read_record().transpose()
    }
}

/// Parse position records from a string (useful for testing).
pub fn parse_loci(content: &str) -> Result<Vec<LocusRecord>> {
    LocusReader::new(content.as_bytes()).records().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_read_loci() {
        let content = "# header\nchr1\t10\nchr1\t20\tA\tx\n\nchr2\t5\r\n";
        let records = parse_loci(content).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0], LocusRecord::new("chr1", 10));
        assert_eq!(records[1].rest.as_deref(), Some("A\tx"));
        assert_eq!(records[2], LocusRecord::new("chr2", 5));
    }

    #[test]
    #[serial]
    fn test_parse_error_line_number() {
        let content = "chr1\t10\nchr1\tten\n";
        let err = parse_loci(content).unwrap_err();
        assert!(matches!(err, WindowError::Parse { line: 2, .. }));
    }

    #[test]
    #[serial]
    fn test_zero_based_input() {
        crate::config::set_zero_based(true);
        let records = parse_loci("chr1\t0\n");
        crate::config::set_zero_based(false);

        assert_eq!(records.unwrap()[0].position, 1);
    }

    #[test]
    #[serial]
    fn test_zero_based_position_overflow() {
        crate::config::set_zero_based(true);
        let result = parse_loci("chr1\t5\nchr1\t18446744073709551615\n");
        crate::config::set_zero_based(false);

        assert!(matches!(result, Err(WindowError::Parse { line: 2, .. })));
    }

    #[test]
    fn test_display() {
        let mut rec = LocusRecord::new("chrX", 7);
        assert_eq!(rec.to_string(), "chrX\t7");
        rec.rest = Some("G".to_string());
        assert_eq!(rec.to_string(), "chrX\t7\tG");
    }
}
