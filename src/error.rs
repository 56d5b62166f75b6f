//! Error type shared by the window engine, the readers and the commands.

use std::convert::Infallible;
use std::io;
use thiserror::Error;

/// Errors that can occur while streaming chromosome windows.
///
/// Every variant is fatal for the traversal that produced it: once the
/// input violates ordering or uniqueness, no window after that point can be
/// trusted.
#[derive(Error, Debug)]
pub enum WindowError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Chromosome '{chrom}' occurs multiple times in the input (chromosomes must be contiguous)")]
    DuplicateChromosome { chrom: String },

    #[error(
        "Invalid order on chromosome '{chrom}': position {previous} followed by position {next}"
    )]
    OutOfOrderPosition {
        chrom: String,
        previous: u64,
        next: u64,
    },

    #[error("Cannot iterate chromosome '{chrom}': not found in the reference genome")]
    UnknownChromosome { chrom: String },

    #[error(
        "Chromosome '{chrom}' has length {length} in the reference genome, \
         but the input contains positions up to {position}"
    )]
    ChromosomeLengthExceeded {
        chrom: String,
        length: u64,
        position: u64,
    },

    #[error("Invalid position 0 on chromosome '{chrom}' (positions are 1-based)")]
    InvalidPosition { chrom: String },
}

impl From<Infallible> for WindowError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

pub type Result<T> = std::result::Result<T, WindowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_chromosome() {
        let err = WindowError::DuplicateChromosome {
            chrom: "chr1".to_string(),
        };
        assert!(err.to_string().contains("'chr1'"));

        let err = WindowError::OutOfOrderPosition {
            chrom: "chr2".to_string(),
            previous: 5,
            next: 3,
        };
        let msg = err.to_string();
        assert!(msg.contains("chr2"));
        assert!(msg.contains("position 5 followed by position 3"));

        let err = WindowError::ChromosomeLengthExceeded {
            chrom: "chrX".to_string(),
            length: 1000,
            position: 1001,
        };
        let msg = err.to_string();
        assert!(msg.contains("length 1000"));
        assert!(msg.contains("up to 1001"));
    }

    #[test]
    fn test_io_conversion() {
        let err: WindowError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, WindowError::Io(_)));
    }
}
