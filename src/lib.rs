// Clippy allows for the whole crate
#![allow(clippy::should_implement_trait)]

//! chromwin: chromosome-scoped genomic window streaming
//!
//! This library turns sorted streams of genome-position records into one
//! lazily evaluated window per chromosome.
//!
//! # Features
//!
//! - **Streaming**: a chromosome is never held in memory; each window view
//!   pulls records from the input one at a time
//! - **Generic records**: any record type works through three extractors
//!   (chromosome, position, output transform)
//! - **Validated input**: repeated chromosomes and non-increasing positions
//!   are detected while streaming
//! - **Reference bounds**: window bounds come from the data or from a
//!   `.genome` / `.fai` / `.dict` length table
//!
//! # Logging
//!
//! Window progress is reported through the `log` facade (`debug` when a
//! window opens or closes, `trace` for records skipped after an abandoned
//! view). The library installs no logger; the embedding program does. The
//! `chromwin` binary prints these messages with `-v` or `-vv`.
//!
//! # Example
//!
//! ```rust,no_run
//! use chromwin::{sync::SyncReader, window::make_default_chromosome_window_stream};
//!
//! let reader = SyncReader::from_path("pool.sync").unwrap();
//! let mut stream = make_default_chromosome_window_stream(reader.records());
//!
//! while let Some(mut view) = stream.next_window().unwrap() {
//!     let mut depth = 0;
//!     while let Some(record) = view.next_element().unwrap() {
//!         depth += record.total_depth();
//!     }
//!     println!("{}\t{}", view.chromosome(), depth);
//! }
//! ```

pub mod commands;
pub mod config;
pub mod error;
pub mod genome;
pub mod locus;
pub mod streaming;
pub mod sync;
pub mod window;

// Re-export commonly used types
pub use error::{Result, WindowError};
pub use genome::{BoundarySource, Genome};
pub use window::{ChromosomeWindowStream, WindowView};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{ChromosomeSummaryCommand, InputFormat, ValidateCommand};
    pub use crate::error::{Result, WindowError};
    pub use crate::genome::{BoundarySource, Genome};
    pub use crate::locus::{LocusReader, LocusRecord};
    pub use crate::sync::{SyncReader, SyncRecord};
    pub use crate::window::{
        infallible_source, make_chromosome_window_stream, make_default_chromosome_window_stream,
        BoundaryPolicy, ChromosomeWindowStream, GenomicRecord, RecordExtractor, RecordSource,
        WindowView,
    };
}

#[cfg(test)]
mod tests {
    use crate::locus::parse_loci;
    use crate::window::{infallible_source, make_default_chromosome_window_stream};
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_basic_workflow() {
        let content = "chr1\t100\nchr1\t150\nchr2\t300\n";
        let records = parse_loci(content).unwrap();
        let mut stream = make_default_chromosome_window_stream(infallible_source(records));

        let mut windows = Vec::new();
        while let Some(mut view) = stream.next_window().unwrap() {
            let count = view.by_ref().count();
            windows.push((view.chromosome().to_string(), count, view.last_position()));
        }

        assert_eq!(
            windows,
            vec![("chr1".to_string(), 2, 150), ("chr2".to_string(), 1, 300)]
        );
    }
}
