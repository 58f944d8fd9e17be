//! Text -> symbols using a trained merge table.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use serde::Deserialize;

use crate::merges::MergeTable;
use crate::types::{byte_symbols, Pair, Symbol};

/// How merges are applied while encoding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeMode {
    /// One left-to-right pass. At each position the symbol absorbs its right
    /// neighbour for as long as the pair is in the table, then the pass
    /// moves on and never looks back.
    #[default]
    GreedySweep,
    /// Repeatedly apply the lowest-rank merge found anywhere in the
    /// sequence until none applies.
    RankPriority,
}

pub struct Encoder<'a> {
    merges: &'a MergeTable,
    mode: EncodeMode,
}

impl<'a> Encoder<'a> {
    pub fn new(merges: &'a MergeTable) -> Self {
        Encoder {
            merges,
            mode: EncodeMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: EncodeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn encode(&self, text: &str) -> Vec<Symbol> {
        self.encode_bytes(text.as_bytes())
    }

    pub fn encode_bytes(&self, bytes: &[u8]) -> Vec<Symbol> {
        match self.mode {
            EncodeMode::GreedySweep => self.greedy_sweep(bytes),
            EncodeMode::RankPriority => self.rank_priority(bytes),
        }
    }

    fn greedy_sweep(&self, bytes: &[u8]) -> Vec<Symbol> {
        let mut rest = bytes.iter().map(|&b| Symbol::from(b));
        let Some(mut current) = rest.next() else {
            return Vec::new();
        };

        // Everything right of `current` is still a raw byte.
        let mut out = Vec::with_capacity(bytes.len());
        for next in rest {
            match self.merges.get(Pair(current, next)) {
                Some(merged) => current = merged,
                None => {
                    out.push(current);
                    current = next;
                }
            }
        }
        out.push(current);
        out
    }

    /// Priority queue + linked-list skip structure, O(n log n).
    fn rank_priority(&self, bytes: &[u8]) -> Vec<Symbol> {
        let n = bytes.len();
        let mut symbols = byte_symbols(bytes);
        if n < 2 {
            return symbols;
        }

        // Linked list for O(1) neighbor traversal after merges.
        let mut next: Vec<usize> = (1..=n).collect();
        let mut prev: Vec<usize> = (0..n).map(|i| if i == 0 { usize::MAX } else { i - 1 }).collect();
        let mut alive = vec![true; n];

        // Generation counters to cheaply invalidate stale heap entries.
        let mut gen: Vec<u32> = vec![0; n];

        // Min-heap of (rank, position, generation_at_push).
        let mut heap: BinaryHeap<Reverse<(usize, usize, u32)>> = BinaryHeap::with_capacity(n);

        let pair_rank = |i: usize, symbols: &[Symbol], next: &[usize]| -> Option<usize> {
            let j = next[i];
            if j >= n {
                return None;
            }
            self.merges.rank(Pair(symbols[i], symbols[j]))
        };

        for i in 0..n - 1 {
            if let Some(rank) = pair_rank(i, &symbols, &next) {
                heap.push(Reverse((rank, i, 0)));
            }
        }

        while let Some(Reverse((rank, i, g))) = heap.pop() {
            if !alive[i] || gen[i] != g {
                continue;
            }
            let j = next[i];
            if j >= n || !alive[j] {
                continue;
            }
            // The right neighbour may have changed since the push.
            if pair_rank(i, &symbols, &next) != Some(rank) {
                continue;
            }
            let Some(merged) = self.merges.get(Pair(symbols[i], symbols[j])) else {
                continue;
            };

            symbols[i] = merged;
            gen[i] += 1;
            alive[j] = false;
            let k = next[j];
            next[i] = k;
            if k < n {
                prev[k] = i;
            }

            // Left neighbour now pairs with the merged symbol.
            if prev[i] != usize::MAX && alive[prev[i]] {
                let p = prev[i];
                if let Some(r) = pair_rank(p, &symbols, &next) {
                    heap.push(Reverse((r, p, gen[p])));
                }
            }
            if next[i] < n {
                if let Some(r) = pair_rank(i, &symbols, &next) {
                    heap.push(Reverse((r, i, gen[i])));
                }
            }
        }

        let mut out = Vec::with_capacity(n);
        let mut i = 0;
        while i < n {
            out.push(symbols[i]);
            i = next[i];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: Symbol = b'a' as Symbol;
    const B: Symbol = b'b' as Symbol;
    const C: Symbol = b'c' as Symbol;

    fn table(entries: &[(Symbol, Symbol)]) -> MergeTable {
        let mut merges = MergeTable::new();
        for &(l, r) in entries {
            merges.push(Pair(l, r)).unwrap();
        }
        merges
    }

    #[test]
    fn test_empty_table_passes_bytes_through() {
        let merges = MergeTable::new();
        let encoder = Encoder::new(&merges);
        assert_eq!(encoder.encode("hi!"), vec![104, 105, 33]);
        assert!(encoder.encode("").is_empty());
        assert_eq!(encoder.encode("x"), vec![120]);
    }

    #[test]
    fn test_greedy_merges_repeatedly_at_one_position() {
        // aa -> 256, (256, a) -> 257, (257, b) -> 258
        let merges = table(&[(A, A), (256, A), (257, B)]);
        let encoder = Encoder::new(&merges);
        assert_eq!(encoder.encode("aaab"), vec![258]);
        assert_eq!(encoder.encode("aaaab"), vec![257, A, B]);
    }

    #[test]
    fn test_greedy_scenario_table() {
        let merges = table(&[(A, A), (A, B), (256, 257)]);
        let encoder = Encoder::new(&merges);
        // The sweep never revisits position 0, so (256, 257) is missed.
        assert_eq!(encoder.encode("aaab"), vec![256, 257]);
        assert_eq!(encoder.encode("aab"), vec![256, B]);
    }

    #[test]
    fn test_greedy_does_not_look_back() {
        // (b, c) -> 256 then (a, 256) -> 257.
        let merges = table(&[(B, C), (A, 256)]);
        let greedy = Encoder::new(&merges);
        assert_eq!(greedy.encode("abc"), vec![A, 256]);

        let ranked = Encoder::new(&merges).with_mode(EncodeMode::RankPriority);
        assert_eq!(ranked.encode("abc"), vec![257]);
    }

    #[test]
    fn test_rank_priority_prefers_earlier_merges() {
        // (b, c) was learned before (a, b).
        let merges = table(&[(B, C), (A, B)]);
        let ranked = Encoder::new(&merges).with_mode(EncodeMode::RankPriority);
        assert_eq!(ranked.encode("abc"), vec![A, 256]);
        let greedy = Encoder::new(&merges);
        assert_eq!(greedy.encode("abc"), vec![257, C]);
    }

    #[test]
    fn test_rank_priority_short_inputs() {
        let merges = table(&[(A, A)]);
        let ranked = Encoder::new(&merges).with_mode(EncodeMode::RankPriority);
        assert!(ranked.encode("").is_empty());
        assert_eq!(ranked.encode("a"), vec![A]);
        assert_eq!(ranked.encode("aaa"), vec![256, A]);
    }
}
