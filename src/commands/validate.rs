//! Validate command - check that an input can be streamed by chromosome.
//!
//! Drives every chromosome window to its end, which surfaces the same
//! errors any windowed consumer would hit: repeated chromosomes, positions
//! that do not strictly increase, chromosomes missing from the genome file
//! and positions beyond a chromosome's length.

use crate::commands::{open_input, InputFormat};
use crate::error::Result;
use crate::genome::Genome;
use crate::locus::LocusReader;
use crate::sync::SyncReader;
use crate::window::{
    make_default_chromosome_window_stream, ChromosomeWindowStats, GenomicRecord, RecordSource,
};
use std::path::Path;

/// Validate command configuration.
#[derive(Debug, Clone, Default)]
pub struct ValidateCommand;

impl ValidateCommand {
    pub fn new() -> Self {
        Self
    }

    /// Validate a file (`-` for stdin).
    pub fn run<P: AsRef<Path>>(
        &self,
        input: P,
        format: InputFormat,
        genome: Option<&Genome>,
    ) -> Result<ChromosomeWindowStats> {
        let reader = open_input(input.as_ref())?;
        match format {
            InputFormat::Sync => self.validate(SyncReader::new(reader).records(), genome),
            InputFormat::Locus => self.validate(LocusReader::new(reader).records(), genome),
        }
    }

    /// Stream all records of `source` through chromosome windows.
    pub fn validate<S>(&self, source: S, genome: Option<&Genome>) -> Result<ChromosomeWindowStats>
    where
        S: RecordSource,
        S::Record: GenomicRecord,
    {
        let mut stream = make_default_chromosome_window_stream(source);
        if let Some(genome) = genome {
            stream = stream.with_boundaries(genome);
        }

        stream.for_each_window(|view| {
            for record in view.by_ref() {
                record?;
            }
            Ok(())
        })?;

        Ok(stream.stats().clone())
    }
}
