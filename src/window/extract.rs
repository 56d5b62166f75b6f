//! Adapting arbitrary record types to the window engine.

/// The three operations the engine needs from a record type.
///
/// - `input` turns a raw record into the element handed to consumers
///   (often the identity).
/// - `chromosome` names the chromosome the record belongs to.
/// - `position` gives its 1-based coordinate on that chromosome.
///
/// All three must be pure: the engine may call `chromosome` and `position`
/// more than once for the same record.
pub trait RecordExtractor<R> {
    type Output;

    fn input(&self, record: R) -> Self::Output;
    fn chromosome<'r>(&self, record: &'r R) -> &'r str;
    fn position(&self, record: &R) -> u64;
}

/// Extractor assembled from three closures.
///
/// ```
/// use chromwin::window::{Extractors, RecordExtractor};
///
/// struct Site { contig: String, pos: u64, depth: u32 }
///
/// let extract = Extractors::new(
///     |s: Site| s.depth,
///     |s: &Site| s.contig.as_str(),
///     |s: &Site| s.pos,
/// );
/// let site = Site { contig: "2L".to_string(), pos: 7, depth: 12 };
/// assert_eq!(extract.chromosome(&site), "2L");
/// assert_eq!(extract.position(&site), 7);
/// assert_eq!(extract.input(site), 12);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Extractors<FI, FC, FP> {
    input: FI,
    chromosome: FC,
    position: FP,
}

impl<FI, FC, FP> Extractors<FI, FC, FP> {
    pub fn new<R, T>(input: FI, chromosome: FC, position: FP) -> Self
    where
        FI: Fn(R) -> T,
        FC: Fn(&R) -> &str,
        FP: Fn(&R) -> u64,
    {
        Self {
            input,
            chromosome,
            position,
        }
    }
}

impl<R, T, FI, FC, FP> RecordExtractor<R> for Extractors<FI, FC, FP>
where
    FI: Fn(R) -> T,
    FC: Fn(&R) -> &str,
    FP: Fn(&R) -> u64,
{
    type Output = T;

    #[inline]
    fn input(&self, record: R) -> T {
        (self.input)(record)
    }

    #[inline]
    fn chromosome<'r>(&self, record: &'r R) -> &'r str {
        (self.chromosome)(record)
    }

    #[inline]
    fn position(&self, record: &R) -> u64 {
        (self.position)(record)
    }
}

/// Records that carry their own chromosome and position.
pub trait GenomicRecord {
    fn chromosome(&self) -> &str;
    fn position(&self) -> u64;
}

/// Identity extractor for any [`GenomicRecord`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtractor;

impl<R: GenomicRecord> RecordExtractor<R> for DefaultExtractor {
    type Output = R;

    #[inline]
    fn input(&self, record: R) -> R {
        record
    }

    #[inline]
    fn chromosome<'r>(&self, record: &'r R) -> &'r str {
        record.chromosome()
    }

    #[inline]
    fn position(&self, record: &R) -> u64 {
        record.position()
    }
}
