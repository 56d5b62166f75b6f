//! Lazy cursor over the positions of a single chromosome.

use super::extract::RecordExtractor;
use super::source::RecordSource;
use super::stream::{BoundaryPolicy, ChromosomeWindowStream};
use crate::error::{Result, WindowError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PullState {
    /// Nothing handed out yet; the run's first record sits in the lookahead.
    First,
    /// Last handed-out position.
    After(u64),
    Done,
}

/// Window over one whole chromosome, streaming its records on demand.
///
/// Produced by [`ChromosomeWindowStream::next_window`]. The view holds a
/// mutable borrow of its stream, so the stream cannot advance while the
/// view is alive.
///
/// The window always starts at position 1. Its last position is either the
/// chromosome length from the reference table, known from the start, or,
/// without a reference, the last position observed in the data. In the
/// latter case [`last_position`](Self::last_position) reports a placeholder
/// of 1 until the view has been pulled to its end.
pub struct WindowView<'s, 'b, S: RecordSource, X> {
    stream: &'s mut ChromosomeWindowStream<'b, S, X>,
    chromosome: String,
    first_position: u64,
    last_position: u64,
    state: PullState,
}

impl<'s, 'b, S, X> WindowView<'s, 'b, S, X>
where
    S: RecordSource,
    X: RecordExtractor<S::Record>,
{
    pub(super) fn new(
        stream: &'s mut ChromosomeWindowStream<'b, S, X>,
        chromosome: String,
        first_position: u64,
        last_position: u64,
    ) -> Self {
        Self {
            stream,
            chromosome,
            first_position,
            last_position,
            state: PullState::First,
        }
    }

    #[inline]
    pub fn chromosome(&self) -> &str {
        &self.chromosome
    }

    #[inline]
    pub fn first_position(&self) -> u64 {
        self.first_position
    }

    #[inline]
    pub fn last_position(&self) -> u64 {
        self.last_position
    }

    /// A chromosome window is always the first window of its chromosome.
    #[inline]
    pub fn is_first_window(&self) -> bool {
        true
    }

    /// A chromosome window is always the last window of its chromosome.
    #[inline]
    pub fn is_last_window(&self) -> bool {
        true
    }

    /// True once the chromosome's run has ended (or an error occurred).
    #[inline]
    pub fn is_finished(&self) -> bool {
        self.state == PullState::Done
    }

    /// Pull the next element of this chromosome.
    ///
    /// Returns `Ok(None)` once the run has ended, and keeps doing so.
    /// An error ends both this view and the whole stream.
    pub fn next_element(&mut self) -> Result<Option<X::Output>> {
        let result = self.pull();
        if result.is_err() {
            self.state = PullState::Done;
            self.stream.exhausted = true;
        }
        result
    }

    fn pull(&mut self) -> Result<Option<X::Output>> {
        let old_pos = match self.state {
            PullState::Done => return Ok(None),
            PullState::First => return self.pull_first(),
            PullState::After(pos) => pos,
        };

        self.stream.fill()?;
        let Some(new_pos) = self.peek_position() else {
            self.finish(old_pos)?;
            return Ok(None);
        };

        if old_pos >= new_pos {
            return Err(WindowError::OutOfOrderPosition {
                chrom: self.chromosome.clone(),
                previous: old_pos,
                next: new_pos,
            });
        }

        self.state = PullState::After(new_pos);
        Ok(self.hand_out())
    }

    fn pull_first(&mut self) -> Result<Option<X::Output>> {
        let Some(pos) = self.peek_position() else {
            self.state = PullState::Done;
            return Ok(None);
        };
        if pos == 0 {
            return Err(WindowError::InvalidPosition {
                chrom: self.chromosome.clone(),
            });
        }

        self.state = PullState::After(pos);
        Ok(self.hand_out())
    }

    /// Position of the lookahead record, if it belongs to this chromosome.
    fn peek_position(&self) -> Option<u64> {
        let stream = &*self.stream;
        let record = stream.lookahead.as_ref()?;
        if stream.extractor.chromosome(record) == self.chromosome {
            Some(stream.extractor.position(record))
        } else {
            None
        }
    }

    /// Move the lookahead record out, transformed for the consumer.
    fn hand_out(&mut self) -> Option<X::Output> {
        let record = self.stream.lookahead.take()?;
        self.stream.stats.records_yielded += 1;
        Some(self.stream.extractor.input(record))
    }

    /// Close the window after the last record of its run at `old_pos`.
    fn finish(&mut self, old_pos: u64) -> Result<()> {
        self.state = PullState::Done;

        match self.stream.policy {
            BoundaryPolicy::Reference(_) => {
                if old_pos > self.last_position {
                    return Err(WindowError::ChromosomeLengthExceeded {
                        chrom: self.chromosome.clone(),
                        length: self.last_position,
                        position: old_pos,
                    });
                }
            }
            BoundaryPolicy::DataDriven => self.last_position = old_pos,
        }

        log::debug!(
            "closing window for chromosome {} ({}..={})",
            self.chromosome,
            self.first_position,
            self.last_position
        );
        Ok(())
    }
}

impl<S, X> Iterator for WindowView<'_, '_, S, X>
where
    S: RecordSource,
    X: RecordExtractor<S::Record>,
{
    type Item = Result<X::Output>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_element().transpose()
    }
}
