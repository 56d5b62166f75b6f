//! Command implementations for chromwin.
//!
//! Each command is a per-chromosome consumer of a window stream.

pub mod summary;
pub mod validate;

pub use summary::{ChromosomeSummary, ChromosomeSummaryCommand};
pub use validate::ValidateCommand;

use crate::error::Result;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Supported record formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// PoPoolation2 synchronized files
    Sync,
    /// Plain `chrom<TAB>pos` tables
    Locus,
}

impl InputFormat {
    /// Parse a format name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "sync" => Some(Self::Sync),
            "locus" | "loci" | "tsv" => Some(Self::Locus),
            _ => None,
        }
    }

    /// Guess the format from a file extension, defaulting to plain tables.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("sync") => Self::Sync,
            _ => Self::Locus,
        }
    }
}

/// Open a file for reading, with `-` meaning stdin.
pub fn open_input(path: &Path) -> Result<Box<dyn Read>> {
    if path.to_string_lossy() == "-" {
        Ok(Box::new(io::stdin().lock()))
    } else {
        Ok(Box::new(File::open(path)?))
    }
}
