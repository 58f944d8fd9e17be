//! The trained artifact: ordered merge rules and their inverse.

use std::collections::HashMap;
use std::fmt::Write;

use crate::error::{Error, Result};
use crate::types::{Pair, Symbol, FIRST_MERGED_SYMBOL};

/// Pair -> merged symbol, kept in the order the merges were learned.
///
/// Position in the table is the merge's rank, and rank `r` always maps to
/// symbol `256 + r`. A merge may only refer to raw bytes and to symbols
/// learned before it, so every entry expands to bytes in finitely many
/// steps.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeTable {
    order: Vec<(Pair, Symbol)>,
    /// Pair -> rank.
    lookup: HashMap<Pair, usize>,
}

impl MergeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a merge for `pair` and return the symbol it was assigned.
    ///
    /// Fails if `pair` is already in the table or refers to a symbol the
    /// table has not assigned yet.
    pub fn push(&mut self, pair: Pair) -> Result<Symbol> {
        let symbol = self.next_symbol();
        if self.lookup.contains_key(&pair) {
            return Err(Error::DuplicateMerge(pair));
        }
        if pair.0 >= symbol || pair.1 >= symbol {
            return Err(Error::UndefinedMergeSymbol { pair, symbol });
        }
        self.lookup.insert(pair, self.order.len());
        self.order.push((pair, symbol));
        Ok(symbol)
    }

    /// Symbol the next merge will receive.
    pub fn next_symbol(&self) -> Symbol {
        FIRST_MERGED_SYMBOL + self.order.len() as Symbol
    }

    #[inline]
    pub fn get(&self, pair: Pair) -> Option<Symbol> {
        let rank = *self.lookup.get(&pair)?;
        self.order.get(rank).map(|&(_, symbol)| symbol)
    }

    pub fn contains(&self, pair: Pair) -> bool {
        self.lookup.contains_key(&pair)
    }

    /// Learning order of `pair`, 0 for the first merge.
    pub fn rank(&self, pair: Pair) -> Option<usize> {
        self.lookup.get(&pair).copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Merges in rank order.
    pub fn iter(&self) -> impl Iterator<Item = (Pair, Symbol)> + '_ {
        self.order.iter().copied()
    }

    /// Vocabulary size covered by this table: raw bytes plus merges.
    pub fn vocab_size(&self) -> usize {
        FIRST_MERGED_SYMBOL as usize + self.len()
    }

    /// One `merge (A, B) -> C` line per merge, in rank order.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (pair, symbol) in self.iter() {
            let _ = writeln!(out, "merge ({:>5}, {:>5}) -> {:>5}", pair.0, pair.1, symbol);
        }
        out
    }
}

/// Merged symbol -> the pair it replaced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodeDictionary {
    entries: HashMap<Symbol, Pair>,
}

impl DecodeDictionary {
    pub fn get(&self, symbol: Symbol) -> Option<Pair> {
        self.entries.get(&symbol).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the raw bytes `symbol` stands for to `out`.
    ///
    /// Expansion uses an explicit stack, so deep merge chains cannot
    /// overflow the call stack.
    pub fn expand_into(&self, symbol: Symbol, out: &mut Vec<u8>) -> Result<()> {
        let mut pending = vec![symbol];
        while let Some(symbol) = pending.pop() {
            match u8::try_from(symbol) {
                Ok(byte) => out.push(byte),
                Err(_) => {
                    let pair = self.get(symbol).ok_or(Error::UnknownSymbol(symbol))?;
                    // Right first so the left half is expanded first.
                    pending.push(pair.1);
                    pending.push(pair.0);
                }
            }
        }
        Ok(())
    }

    /// One `dict C -> (A, B)` line per entry, by ascending symbol.
    pub fn render(&self) -> String {
        let mut entries: Vec<_> = self.entries.iter().collect();
        entries.sort_unstable_by_key(|&(&symbol, _)| symbol);

        let mut out = String::new();
        for (symbol, pair) in entries {
            let _ = writeln!(out, "dict {:>5} -> ({:>5}, {:>5})", symbol, pair.0, pair.1);
        }
        out
    }
}

impl From<&MergeTable> for DecodeDictionary {
    fn from(table: &MergeTable) -> Self {
        DecodeDictionary {
            entries: table.iter().map(|(pair, symbol)| (symbol, pair)).collect(),
        }
    }
}
