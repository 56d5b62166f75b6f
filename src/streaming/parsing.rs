//! Zero-allocation line parsing utilities.
//!
//! These functions parse the leading `chrom\tpos` columns of tabular
//! position files without any heap allocation in the hot path.

use crate::config::normalize_position;
use memchr::memchr;

/// Parse an unsigned decimal field straight from bytes.
///
/// `None` for empty fields, non-digits, or values past `u64::MAX`.
#[inline(always)]
pub fn parse_u64_fast(bytes: &[u8]) -> Option<u64> {
    if bytes.is_empty() {
        return None;
    }
    let mut n: u64 = 0;
    for &b in bytes {
        let d = b.wrapping_sub(b'0');
        if d > 9 {
            return None;
        }
        n = n.checked_mul(10)?.checked_add(d as u64)?;
    }
    Some(n)
}

/// Parse the `chrom\tpos` prefix of a line using memchr.
///
/// Returns `(chrom_bytes, position, rest_start)` where `rest_start` is the
/// byte offset just past the position field (pointing at the following
/// tab, or at the end of the line). A trailing `\r` or `\n` is ignored.
///
/// The position is passed through [`normalize_position`], so zero-based
/// inputs come out 1-based when that mode is enabled. A zero-based
/// position of `u64::MAX` does not parse.
#[inline(always)]
pub fn parse_locus_bytes(line: &[u8]) -> Option<(&[u8], u64, usize)> {
    let line = trim_line_end(line);

    let tab1 = memchr(b'\t', line)?;
    let chrom = &line[..tab1];
    if chrom.is_empty() {
        return None;
    }

    let rest = &line[tab1 + 1..];
    let pos_len = memchr(b'\t', rest).unwrap_or(rest.len());
    let pos = normalize_position(parse_u64_fast(&rest[..pos_len])?)?;

    Some((chrom, pos, tab1 + 1 + pos_len))
}

/// Check if a line should be skipped (empty or comment).
#[inline(always)]
pub fn should_skip_line(line: &[u8]) -> bool {
    let line = trim_line_end(line);
    line.is_empty() || line[0] == b'#'
}

#[inline(always)]
fn trim_line_end(mut line: &[u8]) -> &[u8] {
    while let [head @ .., b'\n' | b'\r'] = line {
        line = head;
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_parse_u64_fast() {
        assert_eq!(parse_u64_fast(b"12345"), Some(12345));
        assert_eq!(parse_u64_fast(b"0"), Some(0));
        assert_eq!(parse_u64_fast(b""), None);
        assert_eq!(parse_u64_fast(b"abc"), None);
        assert_eq!(parse_u64_fast(b"123abc"), None);
        assert_eq!(parse_u64_fast(b"18446744073709551615"), Some(u64::MAX));
        assert_eq!(parse_u64_fast(b"18446744073709551616"), None);
    }

    #[test]
    #[serial]
    fn test_parse_locus_bytes() {
        assert_eq!(parse_locus_bytes(b"chr1\t100"), Some((&b"chr1"[..], 100, 8)));
        assert_eq!(
            parse_locus_bytes(b"chr1\t100\tA\t0:1:0:0:0:0"),
            Some((&b"chr1"[..], 100, 8))
        );
        assert_eq!(parse_locus_bytes(b"chr1\t100\r\n"), Some((&b"chr1"[..], 100, 8)));
        assert_eq!(parse_locus_bytes(b"chr1"), None);
        assert_eq!(parse_locus_bytes(b"chr1\tx"), None);
        assert_eq!(parse_locus_bytes(b"\t100"), None);
        assert_eq!(parse_locus_bytes(b""), None);
    }

    #[test]
    #[serial]
    fn test_parse_locus_bytes_zero_based_limit() {
        crate::config::set_zero_based(true);
        assert_eq!(
            parse_locus_bytes(b"chr1\t18446744073709551614"),
            Some((&b"chr1"[..], u64::MAX, 25))
        );
        assert_eq!(parse_locus_bytes(b"chr1\t18446744073709551615"), None);
        crate::config::set_zero_based(false);
    }

    #[test]
    fn test_should_skip_line() {
        assert!(should_skip_line(b""));
        assert!(should_skip_line(b"\n"));
        assert!(should_skip_line(b"#comment"));
        assert!(!should_skip_line(b"chr1\t100"));
    }
}
