//! Per-chromosome summary - one output line per chromosome window.
//!
//! Memory complexity: O(1). Each chromosome is streamed through its window
//! view and reduced to a handful of counters; nothing is buffered.
//!
//! Output columns:
//! `chrom  first  last  positions  covered_fraction  mean_depth`
//!
//! where `first..=last` are the window bounds (from the genome file when one
//! is given, otherwise from the data), `positions` counts the sites that
//! pass the depth threshold, and `mean_depth` averages the nucleotide depth
//! over those sites (0 for inputs without depth).

use crate::commands::{open_input, InputFormat};
use crate::error::{Result, WindowError};
use crate::genome::Genome;
use crate::locus::{LocusReader, LocusRecord};
use crate::streaming::output::TsvWriter;
use crate::sync::{SyncReader, SyncRecord};
use crate::window::{
    make_chromosome_window_stream, BoundaryPolicy, ChromosomeWindowStats,
    ChromosomeWindowStream, RecordExtractor, RecordSource, WindowView,
};
use std::io::Write;
use std::path::Path;

/// Reduced statistics of one chromosome window.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChromosomeSummary {
    pub chromosome: String,
    pub first_position: u64,
    pub last_position: u64,
    /// Sites passing the depth threshold
    pub positions: u64,
    /// Summed depth over counted sites
    pub depth_sum: u64,
}

impl ChromosomeSummary {
    /// Fraction of the window covered by counted sites.
    pub fn covered_fraction(&self) -> f64 {
        let width = self.last_position.saturating_sub(self.first_position) + 1;
        self.positions as f64 / width as f64
    }

    /// Mean depth over counted sites.
    pub fn mean_depth(&self) -> f64 {
        if self.positions == 0 {
            0.0
        } else {
            self.depth_sum as f64 / self.positions as f64
        }
    }
}

/// Per-chromosome summary command configuration.
#[derive(Debug, Clone)]
pub struct ChromosomeSummaryCommand {
    /// Minimum nucleotide depth for a site to be counted
    pub min_depth: u64,
    /// Write a `#chrom ...` header line
    pub header: bool,
}

impl Default for ChromosomeSummaryCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ChromosomeSummaryCommand {
    pub fn new() -> Self {
        Self {
            min_depth: 0,
            header: false,
        }
    }

    /// Set minimum depth (builder pattern).
    pub fn with_min_depth(mut self, min_depth: u64) -> Self {
        self.min_depth = min_depth;
        self
    }

    /// Set header flag (builder pattern).
    pub fn with_header(mut self, header: bool) -> Self {
        self.header = header;
        self
    }

    /// Execute the summary on a file (`-` for stdin).
    pub fn run<P: AsRef<Path>, W: Write>(
        &self,
        input: P,
        format: InputFormat,
        genome: Option<&Genome>,
        output: &mut W,
    ) -> Result<ChromosomeWindowStats> {
        let reader = open_input(input.as_ref())?;
        match format {
            InputFormat::Sync => {
                self.summarize_sync(SyncReader::new(reader).records(), genome, output)
            }
            InputFormat::Locus => {
                self.summarize_loci(LocusReader::new(reader).records(), genome, output)
            }
        }
    }

    /// Summarize sync records, using the summed nucleotide depth of all samples.
    pub fn summarize_sync<S, W>(
        &self,
        source: S,
        genome: Option<&Genome>,
        output: &mut W,
    ) -> Result<ChromosomeWindowStats>
    where
        S: RecordSource<Record = SyncRecord>,
        W: Write,
    {
        let stream = make_chromosome_window_stream(
            source,
            |r: SyncRecord| Some(r.total_depth()),
            |r: &SyncRecord| r.chromosome.as_str(),
            |r: &SyncRecord| r.position,
        );
        self.summarize(stream, genome, output)
    }

    /// Summarize plain position records, which carry no depth.
    pub fn summarize_loci<S, W>(
        &self,
        source: S,
        genome: Option<&Genome>,
        output: &mut W,
    ) -> Result<ChromosomeWindowStats>
    where
        S: RecordSource<Record = LocusRecord>,
        W: Write,
    {
        let stream = make_chromosome_window_stream(
            source,
            |_: LocusRecord| None::<u64>,
            |r: &LocusRecord| r.chromosome.as_str(),
            |r: &LocusRecord| r.position,
        );
        self.summarize(stream, genome, output)
    }

    fn summarize<'b, S, X, W>(
        &self,
        stream: ChromosomeWindowStream<'b, S, X>,
        genome: Option<&'b Genome>,
        output: &mut W,
    ) -> Result<ChromosomeWindowStats>
    where
        S: RecordSource,
        X: RecordExtractor<S::Record, Output = Option<u64>>,
        W: Write,
    {
        let policy = match genome {
            Some(genome) => BoundaryPolicy::Reference(genome),
            None => BoundaryPolicy::DataDriven,
        };
        let mut stream = stream.with_policy(policy);

        let mut writer = TsvWriter::new(output);
        if self.header {
            writer.write_header(&[
                "#chrom",
                "first",
                "last",
                "positions",
                "covered_fraction",
                "mean_depth",
            ])?;
        }

        while let Some(mut view) = stream.next_window()? {
            let summary = self.summarize_window(&mut view)?;
            write_summary(&mut writer, &summary)?;
        }

        writer.flush()?;
        Ok(stream.stats().clone())
    }

    /// Drive one window view to its end and reduce it.
    pub fn summarize_window<S, X>(
        &self,
        view: &mut WindowView<'_, '_, S, X>,
    ) -> Result<ChromosomeSummary>
    where
        S: RecordSource,
        X: RecordExtractor<S::Record, Output = Option<u64>>,
    {
        let mut positions = 0u64;
        let mut depth_sum = 0u64;

        while let Some(depth) = view.next_element()? {
            match depth {
                Some(d) if d < self.min_depth => {}
                Some(d) => {
                    positions += 1;
                    depth_sum = depth_sum.checked_add(d).ok_or_else(|| {
                        WindowError::InvalidFormat(format!(
                            "Summed depth overflows on chromosome '{}'",
                            view.chromosome()
                        ))
                    })?;
                }
                None => positions += 1,
            }
        }

        // Bounds are only final once the view is exhausted
        Ok(ChromosomeSummary {
            chromosome: view.chromosome().to_string(),
            first_position: view.first_position(),
            last_position: view.last_position(),
            positions,
            depth_sum,
        })
    }
}

fn write_summary<W: Write>(writer: &mut TsvWriter<W>, summary: &ChromosomeSummary) -> Result<()> {
    writer.write_field(summary.chromosome.as_bytes())?;
    writer.write_int(summary.first_position)?;
    writer.write_int(summary.last_position)?;
    writer.write_int(summary.positions)?;
    writer.write_float_fixed(summary.covered_fraction(), 6)?;
    writer.write_float_fixed(summary.mean_depth(), 2)?;
    writer.end_line()
}
