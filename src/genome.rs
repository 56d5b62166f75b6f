//! Chromosome length tables used as window boundary sources.
//!
//! Supported inputs, detected per line:
//! - `.genome` / `.fai` files: tab-delimited `chrom\tlength[\t...]`
//! - SAM sequence dictionaries (`.dict`): `@SQ\tSN:chrom\tLN:length`

use std::collections::{BTreeMap, HashMap};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, WindowError};

/// Lookup from chromosome name to its total length.
///
/// When a window stream is given a boundary source, every window spans
/// `1..=length` of its chromosome instead of the range observed in the data.
pub trait BoundarySource {
    /// Length of the chromosome, or `None` if the table does not know it.
    fn chromosome_length(&self, chrom: &str) -> Option<u64>;
}

impl BoundarySource for HashMap<String, u64> {
    fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        self.get(chrom).copied()
    }
}

impl BoundarySource for BTreeMap<String, u64> {
    fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        self.get(chrom).copied()
    }
}

/// Chromosome sizes loaded from a reference table.
#[derive(Debug, Clone, Default)]
pub struct Genome {
    sizes: HashMap<String, u64>,
}

impl Genome {
    /// Create an empty genome.
    pub fn new() -> Self {
        Self {
            sizes: HashMap::new(),
        }
    }

    /// Load a genome, fasta index or sequence dictionary file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Self::from_reader(BufReader::new(file))
    }

    /// Load chromosome lengths from any buffered reader.
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut genome = Self::new();

        for (line_num, line_result) in reader.lines().enumerate() {
            let line = line_result?;
            let line = line.trim_end();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let entry = if line.starts_with('@') {
                parse_dict_line(line, line_num + 1)?
            } else {
                Some(parse_table_line(line, line_num + 1)?)
            };

            if let Some((chrom, size)) = entry {
                genome.insert(chrom, size);
            }
        }

        Ok(genome)
    }

    /// Get the size of a chromosome.
    #[inline]
    pub fn chrom_size(&self, chrom: &str) -> Option<u64> {
        self.sizes.get(chrom).copied()
    }

    /// Get number of chromosomes.
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Sum of all chromosome lengths (saturating).
    pub fn total_length(&self) -> u64 {
        self.sizes
            .values()
            .fold(0u64, |total, &size| total.saturating_add(size))
    }

    /// Insert or replace a chromosome size.
    pub fn insert(&mut self, chrom: String, size: u64) {
        self.sizes.insert(chrom, size);
    }
}

impl BoundarySource for Genome {
    #[inline]
    fn chromosome_length(&self, chrom: &str) -> Option<u64> {
        self.chrom_size(chrom)
    }
}

/// Parse `chrom\tlength[\t...]`, as found in `.genome` and `.fai` files.
fn parse_table_line(line: &str, line_num: usize) -> Result<(String, u64)> {
    let mut fields = line.split('\t');
    let chrom = fields.next().unwrap_or_default();
    let size = fields.next().ok_or_else(|| WindowError::Parse {
        line: line_num,
        message: "Genome file requires two columns: chrom and size".to_string(),
    })?;

    Ok((chrom.to_string(), parse_length(size, line_num)?))
}

/// Parse one header line of a sequence dictionary. Only `@SQ` lines carry
/// lengths; `@HD`, `@PG` and friends are ignored.
fn parse_dict_line(line: &str, line_num: usize) -> Result<Option<(String, u64)>> {
    if !line.starts_with("@SQ\t") {
        return Ok(None);
    }

    let mut name = None;
    let mut length = None;
    for tag in line.split('\t').skip(1) {
        if let Some(value) = tag.strip_prefix("SN:") {
            name = Some(value.to_string());
        } else if let Some(value) = tag.strip_prefix("LN:") {
            length = Some(parse_length(value, line_num)?);
        }
    }

    match (name, length) {
        (Some(name), Some(length)) => Ok(Some((name, length))),
        _ => Err(WindowError::Parse {
            line: line_num,
            message: "@SQ line requires SN and LN tags".to_string(),
        }),
    }
}

fn parse_length(field: &str, line_num: usize) -> Result<u64> {
    match field.trim().parse::<u64>() {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(WindowError::Parse {
            line: line_num,
            message: format!("Invalid chromosome size: {}", field),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use tempfile::NamedTempFile;

    #[test]
    fn test_genome_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "chr1\t1000000").unwrap();
        writeln!(file, "chr2\t500000").unwrap();
        writeln!(file, "# comment line").unwrap();
        writeln!(file, "chr3\t250000").unwrap();

        let genome = Genome::from_file(file.path()).unwrap();

        assert_eq!(genome.chrom_size("chr1"), Some(1000000));
        assert_eq!(genome.chrom_size("chr2"), Some(500000));
        assert_eq!(genome.chrom_size("chr3"), Some(250000));
        assert_eq!(genome.chrom_size("chr4"), None);
        assert_eq!(genome.len(), 3);
        assert_eq!(genome.total_length(), 1750000);
    }

    #[test]
    fn test_fai_extra_columns() {
        let fai = "chr1\t248956422\t112\t70\t71\nchrM\t16569\t252513167\t70\t71\n";
        let genome = Genome::from_reader(Cursor::new(fai)).unwrap();

        assert_eq!(genome.chrom_size("chr1"), Some(248956422));
        assert_eq!(genome.chrom_size("chrM"), Some(16569));
        assert_eq!(genome.len(), 2);
        assert_eq!(genome.total_length(), 248956422 + 16569);
    }

    #[test]
    fn test_sequence_dict() {
        let dict = "@HD\tVN:1.6\n\
                    @SQ\tSN:2L\tLN:23513712\tM5:abc\tUR:file:ref.fa\n\
                    @SQ\tSN:2R\tLN:25286936\n";
        let genome = Genome::from_reader(Cursor::new(dict)).unwrap();

        assert_eq!(genome.len(), 2);
        assert_eq!(genome.chrom_size("2L"), Some(23513712));
        assert_eq!(genome.chrom_size("2R"), Some(25286936));
    }

    #[test]
    fn test_sequence_dict_missing_length() {
        let dict = "@SQ\tSN:2L\n";
        let result = Genome::from_reader(Cursor::new(dict));
        assert!(matches!(result, Err(WindowError::Parse { line: 1, .. })));
    }

    #[test]
    fn test_invalid_sizes() {
        assert!(Genome::from_reader(Cursor::new("chr1\tabc\n")).is_err());
        assert!(Genome::from_reader(Cursor::new("chr1\t0\n")).is_err());
        assert!(Genome::from_reader(Cursor::new("chr1\n")).is_err());
    }

    #[test]
    fn test_genome_bounds() {
        let mut genome = Genome::new();
        genome.insert("chr1".to_string(), 1000);

        assert_eq!(genome.chromosome_length("chr1"), Some(1000));
        assert_eq!(genome.chromosome_length("chr2"), None);

        genome.insert("chr1".to_string(), 2000);
        assert_eq!(genome.len(), 1);
        assert_eq!(genome.chromosome_length("chr1"), Some(2000));
    }

    #[test]
    fn test_map_boundary_sources() {
        let mut map = HashMap::new();
        map.insert("chr1".to_string(), 10u64);
        assert_eq!(map.chromosome_length("chr1"), Some(10));

        let tree: BTreeMap<String, u64> = map.into_iter().collect();
        assert_eq!(tree.chromosome_length("chr1"), Some(10));
        assert_eq!(tree.chromosome_length("chr2"), None);
    }
}
