//! Shared streaming utilities for chromwin readers and commands.
//!
//! This module provides:
//! - Zero-allocation parsing of `chrom\tpos` line prefixes
//! - Efficient tab-separated output formatting
//! - Buffer size defaults

pub mod buffers;
pub mod output;
pub mod parsing;

pub use output::TsvWriter;
pub use parsing::{parse_locus_bytes, parse_u64_fast, should_skip_line};
