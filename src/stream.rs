//! Symbol sequences for one chunk of training text.
//!
//! [`LinkedStream`] is the reference representation: a doubly linked list
//! over a `Vec` arena, so a merge splices two nodes in constant time.
//! [`ArrayStream`] shifts a plain `Vec` instead and serves as a baseline.

use std::collections::{BTreeSet, HashMap};

use crate::error::{Error, Result};
use crate::stats::PairIndex;
use crate::types::{byte_symbols, Pair, Symbol};

/// An ordered, mergeable sequence of symbols.
pub trait SymbolStream {
    fn from_symbols(symbols: Vec<Symbol>) -> Self
    where
        Self: Sized;

    fn from_bytes(bytes: &[u8]) -> Self
    where
        Self: Sized,
    {
        Self::from_symbols(byte_symbols(bytes))
    }

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Symbol at logical position `index`.
    fn get(&self, index: usize) -> Result<Symbol>;

    fn iter(&self) -> impl Iterator<Item = Symbol> + '_;

    /// Adjacent pairs in order.
    fn pairs(&self) -> impl Iterator<Item = Pair> + '_ {
        self.iter().zip(self.iter().skip(1)).map(|(a, b)| Pair(a, b))
    }

    fn to_vec(&self) -> Vec<Symbol> {
        self.iter().collect()
    }

    /// Merge every occurrence of `pair` into `new_symbol`, scanning left to
    /// right without overlap, and move neighbour counts in `index` over to
    /// the new symbol. `id` is this stream's position in the corpus.
    ///
    /// Retires `pair` from `index`. Returns the number of merges.
    fn merge_adjacent(
        &mut self,
        id: usize,
        pair: Pair,
        new_symbol: Symbol,
        index: &mut PairIndex,
    ) -> usize;
}

/// Node in the doubly linked list.
#[derive(Debug, Clone)]
struct Node {
    symbol: Symbol,
    prev: Option<usize>,
    next: Option<usize>,
}

/// Linked list of symbols stored in a *Vec-as-arena*.
///
/// - Arena slots never move, so `prev`/`next` indices stay valid.
/// - A merge rewrites the left node and empties the right slot.
/// - Slot order equals logical order, since nodes are only ever removed.
#[derive(Debug, Clone, Default)]
pub struct LinkedStream {
    /// `None` marks a node consumed by a merge.
    nodes: Vec<Option<Node>>,
    head: Option<usize>,
    len: usize,

    /// Pair -> slots where an occurrence of it starts.
    sites: HashMap<Pair, BTreeSet<usize>>,
}

impl LinkedStream {
    fn node(&self, idx: usize) -> Option<&Node> {
        self.nodes.get(idx).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, idx: usize) -> Option<&mut Node> {
        self.nodes.get_mut(idx).and_then(Option::as_mut)
    }

    fn symbol_at(&self, idx: usize) -> Option<Symbol> {
        self.node(idx).map(|n| n.symbol)
    }

    fn record_site(&mut self, pair: Pair, idx: usize) {
        self.sites.entry(pair).or_default().insert(idx);
    }

    fn forget_site(&mut self, pair: Pair, idx: usize) {
        if let Some(slots) = self.sites.get_mut(&pair) {
            slots.remove(&idx);
            if slots.is_empty() {
                self.sites.remove(&pair);
            }
        }
    }

    /// Right slot of `pair` starting at `left`, if it still occurs there.
    fn occurrence_at(&self, left: usize, pair: Pair) -> Option<usize> {
        let first = self.node(left)?;
        let right = first.next?;
        let second = self.node(right)?;
        (first.symbol == pair.0 && second.symbol == pair.1).then_some(right)
    }

    /// Rewrite `left` to `new_symbol` and unlink `right`.
    fn splice(&mut self, left: usize, right: usize, new_symbol: Symbol) {
        let next = self.node(right).and_then(|n| n.next);

        if let Some(node) = self.node_mut(left) {
            node.symbol = new_symbol;
            node.next = next;
        }
        if let Some(node) = next.and_then(|idx| self.node_mut(idx)) {
            node.prev = Some(left);
        }
        if let Some(slot) = self.nodes.get_mut(right) {
            *slot = None;
        }
        self.len -= 1;
    }
}

impl SymbolStream for LinkedStream {
    fn from_symbols(symbols: Vec<Symbol>) -> Self {
        let n = symbols.len();
        let mut stream = LinkedStream {
            nodes: Vec::with_capacity(n),
            head: (n > 0).then_some(0),
            len: n,
            sites: HashMap::new(),
        };

        for (i, &symbol) in symbols.iter().enumerate() {
            stream.nodes.push(Some(Node {
                symbol,
                prev: i.checked_sub(1),
                next: (i + 1 < n).then_some(i + 1),
            }));
        }
        for (i, w) in symbols.windows(2).enumerate() {
            stream.record_site(Pair(w[0], w[1]), i);
        }

        stream
    }

    fn len(&self) -> usize {
        self.len
    }

    fn get(&self, index: usize) -> Result<Symbol> {
        self.iter().nth(index).ok_or(Error::IndexOutOfRange {
            index,
            len: self.len,
        })
    }

    fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        Iter {
            nodes: &self.nodes,
            cursor: self.head,
        }
    }

    fn merge_adjacent(
        &mut self,
        id: usize,
        pair: Pair,
        new_symbol: Symbol,
        index: &mut PairIndex,
    ) -> usize {
        index.retire(pair);
        let Some(starts) = self.sites.remove(&pair) else {
            return 0;
        };

        let mut merged = 0;
        // Ascending slots visit occurrences left to right; a start consumed
        // by an earlier merge no longer matches and is skipped.
        for left in starts {
            let Some(right) = self.occurrence_at(left, pair) else {
                continue;
            };
            let prev = self.node(left).and_then(|n| n.prev);
            let next = self.node(right).and_then(|n| n.next);

            if let Some((p, symbol)) = prev.and_then(|p| Some((p, self.symbol_at(p)?))) {
                let old = Pair(symbol, pair.0);
                self.forget_site(old, p);
                index.decrement(old);
            }
            if let Some(symbol) = next.and_then(|n| self.symbol_at(n)) {
                let old = Pair(pair.1, symbol);
                self.forget_site(old, right);
                index.decrement(old);
            }

            self.splice(left, right, new_symbol);

            if let Some((p, symbol)) = prev.and_then(|p| Some((p, self.symbol_at(p)?))) {
                let new = Pair(symbol, new_symbol);
                self.record_site(new, p);
                index.increment(new, id);
            }
            if let Some(symbol) = next.and_then(|n| self.symbol_at(n)) {
                let new = Pair(new_symbol, symbol);
                self.record_site(new, left);
                index.increment(new, id);
            }

            merged += 1;
        }
        merged
    }
}

/// Walks live nodes from the head.
struct Iter<'a> {
    nodes: &'a [Option<Node>],
    cursor: Option<usize>,
}

impl Iterator for Iter<'_> {
    type Item = Symbol;

    fn next(&mut self) -> Option<Symbol> {
        let node = self.nodes.get(self.cursor?)?.as_ref()?;
        self.cursor = node.next;
        Some(node.symbol)
    }
}

/// Plain vector of symbols; each merge shifts the tail left.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArrayStream {
    symbols: Vec<Symbol>,
}

impl SymbolStream for ArrayStream {
    fn from_symbols(symbols: Vec<Symbol>) -> Self {
        ArrayStream { symbols }
    }

    fn len(&self) -> usize {
        self.symbols.len()
    }

    fn get(&self, index: usize) -> Result<Symbol> {
        self.symbols.get(index).copied().ok_or(Error::IndexOutOfRange {
            index,
            len: self.symbols.len(),
        })
    }

    fn iter(&self) -> impl Iterator<Item = Symbol> + '_ {
        self.symbols.iter().copied()
    }

    fn merge_adjacent(
        &mut self,
        id: usize,
        pair: Pair,
        new_symbol: Symbol,
        index: &mut PairIndex,
    ) -> usize {
        index.retire(pair);

        let mut merged = 0;
        let mut i = 0;
        while i + 1 < self.symbols.len() {
            if self.symbols[i] == pair.0 && self.symbols[i + 1] == pair.1 {
                if let Some(&left) = i.checked_sub(1).and_then(|j| self.symbols.get(j)) {
                    index.decrement(Pair(left, pair.0));
                    index.increment(Pair(left, new_symbol), id);
                }
                if let Some(&right) = self.symbols.get(i + 2) {
                    index.decrement(Pair(pair.1, right));
                    index.increment(Pair(new_symbol, right), id);
                }
                self.symbols[i] = new_symbol;
                self.symbols.remove(i + 1);
                merged += 1;
            }
            i += 1;
        }
        merged
    }
}
