//! Global configuration for chromwin runtime behavior.
//!
//! This module provides thread-safe global configuration that affects
//! how readers interpret coordinates, without adding overhead to hot loops.

use std::sync::atomic::{AtomicBool, Ordering};

/// Global flag for zero-based input coordinates.
///
/// The window engine works on 1-based positions. Some tabular inputs
/// carry 0-based coordinates; when this flag is set, readers shift every
/// parsed position by one.
///
/// This is set once at startup and read during parsing.
static ZERO_BASED: AtomicBool = AtomicBool::new(false);

/// Declare that input positions are zero-based.
///
/// # Example
///
/// ```
/// use chromwin::config;
///
/// // Enable at startup before any parsing
/// config::set_zero_based(true);
///
/// // Now a parsed position 0 becomes position 1
/// assert_eq!(config::normalize_position(0), Some(1));
/// # config::set_zero_based(false);
/// ```
#[inline]
pub fn set_zero_based(enabled: bool) {
    ZERO_BASED.store(enabled, Ordering::Release);
}

/// Check if zero-based input mode is enabled.
#[inline]
pub fn is_zero_based() -> bool {
    ZERO_BASED.load(Ordering::Acquire)
}

/// Convert a parsed position into the 1-based coordinate used by windows.
///
/// Should be called during parsing, not in inner loops. Returns `None`
/// when a zero-based position has no 1-based counterpart in `u64`.
#[inline]
pub fn normalize_position(pos: u64) -> Option<u64> {
    if is_zero_based() {
        pos.checked_add(1)
    } else {
        Some(pos)
    }
}
