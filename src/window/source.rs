//! Forward-only record sources feeding a window stream.

use std::convert::Infallible;

use crate::error::{Result, WindowError};

/// A read-once, forward-only stream of records.
///
/// Every `Iterator` over `Result<R, E>` is a record source as long as its
/// error converts into [`WindowError`]; the readers in this crate
/// (`SyncReader`, `LocusReader`) qualify directly. Plain in-memory
/// records can be wrapped with [`infallible_source`].
pub trait RecordSource {
    type Record;

    /// Pull the next record, or `None` once the stream is done.
    fn next_record(&mut self) -> Result<Option<Self::Record>>;
}

impl<I, R, E> RecordSource for I
where
    I: Iterator<Item = std::result::Result<R, E>>,
    E: Into<WindowError>,
{
    type Record = R;

    #[inline]
    fn next_record(&mut self) -> Result<Option<R>> {
        self.next().transpose().map_err(Into::into)
    }
}

/// Wrap records that cannot fail into a [`RecordSource`].
pub fn infallible_source<I>(
    records: I,
) -> impl Iterator<Item = std::result::Result<I::Item, Infallible>>
where
    I: IntoIterator,
{
    records.into_iter().map(Ok)
}
