//! Shared symbol and pair types.

use std::fmt;

/// A symbol identifier.
///
/// Values below 256 are raw bytes; values from 256 upward are learned
/// composite symbols, assigned in merge order.
pub type Symbol = u32;

/// First id handed out to a learned merge. Ids below it are raw bytes.
pub const FIRST_MERGED_SYMBOL: Symbol = 256;

/// Ordered pair of adjacent symbols `(left, right)`.
///
/// The derived ordering is lexicographic on `(left, right)`, which is the
/// tie-break order used when two pairs are equally frequent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pair(pub Symbol, pub Symbol);

impl fmt::Display for Pair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.0, self.1)
    }
}

/// Lift raw bytes into the symbol space.
pub fn byte_symbols(bytes: &[u8]) -> Vec<Symbol> {
    bytes.iter().map(|&b| Symbol::from(b)).collect()
}
