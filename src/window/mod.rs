//! Chromosome-scoped window streaming.
//!
//! Turns a sorted stream of position records into one window per
//! chromosome, without holding a chromosome in memory:
//!
//! - [`ChromosomeWindowStream`] walks the chromosomes in input order,
//! - [`WindowView`] streams the records of one chromosome on demand,
//! - [`RecordExtractor`] adapts arbitrary record types,
//! - [`BoundaryPolicy`] decides whether window bounds come from the data or
//!   from a reference length table.
//!
//! Ordering is validated on the fly: positions must strictly increase within
//! a chromosome, and each chromosome must appear as a single contiguous run.

pub mod extract;
pub mod source;
pub mod stream;
pub mod view;

pub use extract::{DefaultExtractor, Extractors, GenomicRecord, RecordExtractor};
pub use source::{infallible_source, RecordSource};
pub use stream::{
    make_chromosome_window_stream, make_default_chromosome_window_stream, BoundaryPolicy,
    ChromosomeWindowStats, ChromosomeWindowStream,
};
pub use view::WindowView;
