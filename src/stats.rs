//! Corpus-wide pair statistics.
//!
//! A single [`PairIndex`] is shared by reference across every stream of a
//! training run. Counts are kept exact under every merge; entries never
//! hold zero.

use std::{
    cmp::Ordering,
    collections::{hash_map::Entry, BTreeSet, BinaryHeap, HashMap},
    fmt::Write,
};

use rayon::prelude::*;

use crate::stream::SymbolStream;
use crate::types::{Pair, Symbol};

/// Heap entry: a pair and the count it had when pushed.
///
/// Entries go stale as counts change and are validated against
/// `PairIndex::counts` before use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    count: usize,
    pair: Pair,
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Highest count on top; on equal counts the smaller pair wins.
impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.count
            .cmp(&other.count)
            .then_with(|| other.pair.cmp(&self.pair))
    }
}

/// The heap is rebuilt from `counts` once it holds more than this many
/// entries per live pair (and at least `COMPACT_MIN` entries).
const COMPACT_RATIO: usize = 4;
const COMPACT_MIN: usize = 1024;

type PartialCounts = (HashMap<Pair, usize>, HashMap<Pair, BTreeSet<usize>>);

/// Pair -> number of adjacent occurrences, summed over all streams.
#[derive(Debug, Clone, Default)]
pub struct PairIndex {
    counts: HashMap<Pair, usize>,

    /// Streams that may hold each pair. A superset: streams are only
    /// dropped from it when the pair's count reaches zero or it is retired.
    holders: HashMap<Pair, BTreeSet<usize>>,

    /// Max-heap of candidates, lazily invalidated.
    heap: BinaryHeap<Candidate>,
}

impl PairIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count every adjacent pair inside each stream, never across streams.
    ///
    /// Streams are counted in parallel and the partial maps reduced; the
    /// result equals a sequential scan.
    pub fn count_initial<S: SymbolStream + Sync>(streams: &[S]) -> Self {
        let (counts, holders) = streams
            .par_iter()
            .enumerate()
            .fold(PartialCounts::default, |(mut counts, mut holders), (id, stream)| {
                for pair in stream.pairs() {
                    *counts.entry(pair).or_insert(0) += 1;
                    holders.entry(pair).or_default().insert(id);
                }
                (counts, holders)
            })
            .reduce(PartialCounts::default, |(mut acc_counts, mut acc_holders), (counts, holders)| {
                for (pair, n) in counts {
                    *acc_counts.entry(pair).or_insert(0) += n;
                }
                for (pair, ids) in holders {
                    acc_holders.entry(pair).or_default().extend(ids);
                }
                (acc_counts, acc_holders)
            });

        let heap = counts
            .iter()
            .map(|(&pair, &count)| Candidate { count, pair })
            .collect();

        PairIndex { counts, holders, heap }
    }

    /// Most frequent pair, ties going to the lexicographically smallest.
    ///
    /// Returns `None` when the index is empty or no pair occurs more than
    /// once.
    pub fn most_frequent(&mut self) -> Option<(Pair, usize)> {
        if self.heap.len() > COMPACT_MIN.max(COMPACT_RATIO * self.counts.len()) {
            self.rebuild_heap();
        }
        while let Some(&top) = self.heap.peek() {
            if self.counts.get(&top.pair) == Some(&top.count) {
                return (top.count > 1).then_some((top.pair, top.count));
            }
            // Stale entry.
            self.heap.pop();
        }
        None
    }

    /// Drop stale candidates: one entry per live pair.
    fn rebuild_heap(&mut self) {
        self.heap = self
            .counts
            .iter()
            .map(|(&pair, &count)| Candidate { count, pair })
            .collect();
    }

    /// Replace every occurrence of `pair` with `new_symbol` across `streams`.
    ///
    /// The pair is retired from the index first; neighbour pairs are moved
    /// over to `new_symbol` by each stream. Returns the number of merges
    /// performed, zero when the pair no longer occurs.
    pub fn apply_merge<S: SymbolStream>(
        &mut self,
        pair: Pair,
        new_symbol: Symbol,
        streams: &mut [S],
    ) -> usize {
        let holders = self.retire(pair);
        let mut merged = 0;
        for id in holders {
            if let Some(stream) = streams.get_mut(id) {
                merged += stream.merge_adjacent(id, pair, new_symbol, self);
            }
        }
        merged
    }

    /// Record one more occurrence of `pair` in stream `stream`.
    pub fn increment(&mut self, pair: Pair, stream: usize) {
        let count = self.counts.entry(pair).or_insert(0);
        *count += 1;
        let count = *count;
        self.holders.entry(pair).or_default().insert(stream);
        self.heap.push(Candidate { count, pair });
    }

    /// Record one fewer occurrence of `pair`, dropping the entry at zero.
    ///
    /// A pair that is not tracked (e.g. already retired) is left alone.
    pub fn decrement(&mut self, pair: Pair) {
        if let Entry::Occupied(mut entry) = self.counts.entry(pair) {
            if *entry.get() > 1 {
                *entry.get_mut() -= 1;
                let count = *entry.get();
                self.heap.push(Candidate { count, pair });
            } else {
                entry.remove();
                self.holders.remove(&pair);
            }
        }
    }

    /// Stop tracking `pair`, returning the streams that may still hold it.
    pub fn retire(&mut self, pair: Pair) -> BTreeSet<usize> {
        self.counts.remove(&pair);
        self.holders.remove(&pair).unwrap_or_default()
    }

    /// Current count of `pair`; zero when untracked.
    pub fn get(&self, pair: Pair) -> usize {
        self.counts.get(&pair).copied().unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn counts(&self) -> &HashMap<Pair, usize> {
        &self.counts
    }

    /// Entries ordered by pair.
    pub fn sorted(&self) -> Vec<(Pair, usize)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(&p, &c)| (p, c)).collect();
        entries.sort_unstable();
        entries
    }

    /// Brute-force pair counts straight from the streams.
    pub fn recount<S: SymbolStream>(streams: &[S]) -> HashMap<Pair, usize> {
        let mut counts = HashMap::new();
        for stream in streams {
            for pair in stream.pairs() {
                *counts.entry(pair).or_insert(0) += 1;
            }
        }
        counts
    }

    /// One `stat (A, B) : N` line per tracked pair, ordered by pair.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (pair, count) in self.sorted() {
            let _ = writeln!(out, "stat ({:>5}, {:>5}) : {:>5}", pair.0, pair.1, count);
        }
        out
    }
}
