//! The outer iterator: one window per chromosome.

use std::fmt;

use rustc_hash::FxHashSet;

use super::extract::{DefaultExtractor, Extractors, GenomicRecord, RecordExtractor};
use super::source::RecordSource;
use super::view::WindowView;
use crate::error::{Result, WindowError};
use crate::genome::BoundarySource;

/// How the bounds of each chromosome window are determined.
///
/// Both policies start every window at position 1.
#[derive(Clone, Copy)]
pub enum BoundaryPolicy<'b> {
    /// The last position is the last position observed in the data, known
    /// only once the chromosome's run has been fully consumed.
    DataDriven,
    /// The last position is the chromosome length from a reference table,
    /// known up front. Data beyond that length is an error; data that stops
    /// short of it is not.
    Reference(&'b dyn BoundarySource),
}

impl fmt::Debug for BoundaryPolicy<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundaryPolicy::DataDriven => f.write_str("DataDriven"),
            BoundaryPolicy::Reference(_) => f.write_str("Reference"),
        }
    }
}

/// Stream over whole chromosomes, each yielding a lazy [`WindowView`] over
/// the positions of that chromosome.
///
/// The input must be sorted by position within each chromosome, and each
/// chromosome must form one contiguous run. Chromosomes themselves may come
/// in any order. Both properties are checked while streaming:
/// a chromosome that reappears later fails with
/// [`WindowError::DuplicateChromosome`], and a position that does not
/// strictly increase fails with [`WindowError::OutOfOrderPosition`].
///
/// At most one record is held at a time: the view streams straight from the
/// underlying source instead of collecting the chromosome. A view borrows
/// the stream mutably, so it has to be dropped before the next call to
/// [`next_window`](Self::next_window). If it was not consumed to the end,
/// the remaining records of its chromosome are skipped on that call.
///
/// Any error exhausts the stream; later calls to `next_window` return
/// `Ok(None)`.
///
/// ```
/// use chromwin::locus::LocusRecord;
/// use chromwin::window::{infallible_source, make_default_chromosome_window_stream};
///
/// let records = vec![
///     LocusRecord::new("chr1", 10),
///     LocusRecord::new("chr1", 20),
///     LocusRecord::new("chr2", 5),
/// ];
/// let mut stream = make_default_chromosome_window_stream(infallible_source(records));
///
/// let mut counts = Vec::new();
/// while let Some(mut view) = stream.next_window()? {
///     let mut n = 0;
///     while view.next_element()?.is_some() {
///         n += 1;
///     }
///     counts.push((view.chromosome().to_string(), n, view.last_position()));
/// }
/// assert_eq!(counts, vec![("chr1".to_string(), 2, 20), ("chr2".to_string(), 1, 5)]);
/// # Ok::<(), chromwin::WindowError>(())
/// ```
pub struct ChromosomeWindowStream<'b, S: RecordSource, X> {
    source: S,
    pub(super) extractor: X,
    pub(super) policy: BoundaryPolicy<'b>,

    /// Next record not yet handed out.
    pub(super) lookahead: Option<S::Record>,
    source_done: bool,

    /// Chromosome of the most recently opened window.
    current: Option<String>,
    /// Chromosomes already opened, to reject repeated runs.
    processed: FxHashSet<String>,

    pub(super) exhausted: bool,
    pub(super) stats: ChromosomeWindowStats,
}

impl<'b, S, X> ChromosomeWindowStream<'b, S, X>
where
    S: RecordSource,
    X: RecordExtractor<S::Record>,
{
    /// Create a stream with data-driven window bounds.
    pub fn new(source: S, extractor: X) -> Self {
        Self {
            source,
            extractor,
            policy: BoundaryPolicy::DataDriven,
            lookahead: None,
            source_done: false,
            current: None,
            processed: FxHashSet::default(),
            exhausted: false,
            stats: ChromosomeWindowStats::default(),
        }
    }

    /// Use chromosome lengths from a reference table as window bounds (builder pattern).
    pub fn with_boundaries(mut self, boundaries: &'b dyn BoundarySource) -> Self {
        self.policy = BoundaryPolicy::Reference(boundaries);
        self
    }

    /// Set the boundary policy (builder pattern).
    pub fn with_policy(mut self, policy: BoundaryPolicy<'b>) -> Self {
        self.policy = policy;
        self
    }

    /// True once every chromosome has been produced, or after an error.
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn stats(&self) -> &ChromosomeWindowStats {
        &self.stats
    }

    /// Move to the next chromosome and return its window.
    ///
    /// The first call opens the first chromosome. Returns `Ok(None)` once
    /// the input is exhausted; for empty input that is the first call.
    pub fn next_window(&mut self) -> Result<Option<WindowView<'_, 'b, S, X>>> {
        if self.exhausted {
            return Ok(None);
        }

        match self.open_next() {
            Ok(Some((chromosome, first, last))) => {
                Ok(Some(WindowView::new(self, chromosome, first, last)))
            }
            Ok(None) => {
                self.exhausted = true;
                Ok(None)
            }
            Err(e) => {
                self.exhausted = true;
                Err(e)
            }
        }
    }

    /// Drive `f` once per chromosome window until the input is exhausted.
    pub fn for_each_window<F>(&mut self, mut f: F) -> Result<()>
    where
        F: FnMut(&mut WindowView<'_, 'b, S, X>) -> Result<()>,
    {
        while let Some(mut view) = self.next_window()? {
            f(&mut view)?;
        }
        Ok(())
    }

    /// Skip leftovers, then set up bounds for the chromosome at the cursor.
    fn open_next(&mut self) -> Result<Option<(String, u64, u64)>> {
        self.skip_current_run()?;

        self.fill()?;
        let chrom = match self.lookahead.as_ref() {
            Some(record) => self.extractor.chromosome(record),
            None => return Ok(None),
        };

        if self.processed.contains(chrom) {
            return Err(WindowError::DuplicateChromosome {
                chrom: chrom.to_string(),
            });
        }
        let chrom = chrom.to_string();
        self.processed.insert(chrom.clone());

        let last = match self.policy {
            BoundaryPolicy::DataDriven => 1,
            BoundaryPolicy::Reference(boundaries) => boundaries
                .chromosome_length(&chrom)
                .ok_or_else(|| WindowError::UnknownChromosome {
                    chrom: chrom.clone(),
                })?,
        };

        log::debug!("opening window for chromosome {} (1..={})", chrom, last);
        self.current = Some(chrom.clone());
        self.stats.chromosomes += 1;

        Ok(Some((chrom, 1, last)))
    }

    /// Discard the rest of the current chromosome's run. Only does work when
    /// the previous view was abandoned before reaching its end.
    fn skip_current_run(&mut self) -> Result<()> {
        let Some(current) = self.current.take() else {
            return Ok(());
        };

        let mut skipped = 0usize;
        loop {
            self.fill()?;
            let same_chrom = match self.lookahead.as_ref() {
                Some(record) => self.extractor.chromosome(record) == current,
                None => false,
            };
            if !same_chrom {
                break;
            }
            self.lookahead = None;
            skipped += 1;
        }

        if skipped > 0 {
            log::trace!("skipped {} remaining records of chromosome {}", skipped, current);
            self.stats.records_skipped += skipped;
        }
        Ok(())
    }

    /// Make sure the lookahead slot holds the next record, if there is one.
    pub(super) fn fill(&mut self) -> Result<()> {
        if self.lookahead.is_none() && !self.source_done {
            match self.source.next_record()? {
                Some(record) => self.lookahead = Some(record),
                None => self.source_done = true,
            }
        }
        Ok(())
    }
}

/// Counters collected while streaming windows.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ChromosomeWindowStats {
    /// Number of chromosome windows opened
    pub chromosomes: usize,
    /// Number of records handed out by views
    pub records_yielded: usize,
    /// Number of records skipped after a view was abandoned early
    pub records_skipped: usize,
}

impl fmt::Display for ChromosomeWindowStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Chromosomes: {}, Positions: {}, Skipped: {}",
            self.chromosomes, self.records_yielded, self.records_skipped
        )
    }
}

/// Build a window stream from a source and three extraction closures.
///
/// ```
/// use chromwin::window::{infallible_source, make_chromosome_window_stream};
///
/// let records = vec![("2L".to_string(), 3u64, 0.5f64), ("2L".to_string(), 9, 0.25)];
/// let mut stream = make_chromosome_window_stream(
///     infallible_source(records),
///     |r: (String, u64, f64)| r.2,
///     |r: &(String, u64, f64)| r.0.as_str(),
///     |r: &(String, u64, f64)| r.1,
/// );
/// let mut view = stream.next_window()?.unwrap();
/// let values: Vec<f64> = view.by_ref().collect::<Result<_, _>>()?;
/// assert_eq!(values, vec![0.5, 0.25]);
/// # Ok::<(), chromwin::WindowError>(())
/// ```
pub fn make_chromosome_window_stream<'b, S, T, FI, FC, FP>(
    source: S,
    input: FI,
    chromosome: FC,
    position: FP,
) -> ChromosomeWindowStream<'b, S, Extractors<FI, FC, FP>>
where
    S: RecordSource,
    FI: Fn(S::Record) -> T,
    FC: Fn(&S::Record) -> &str,
    FP: Fn(&S::Record) -> u64,
{
    ChromosomeWindowStream::new(source, Extractors::new(input, chromosome, position))
}

/// Build a window stream for records that expose their own chromosome and
/// position, handing the records through unchanged.
pub fn make_default_chromosome_window_stream<'b, S>(
    source: S,
) -> ChromosomeWindowStream<'b, S, DefaultExtractor>
where
    S: RecordSource,
    S::Record: GenomicRecord,
{
    ChromosomeWindowStream::new(source, DefaultExtractor)
}
