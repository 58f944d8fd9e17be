//! Merge training loop.
//!
//! Each step picks the globally most frequent pair, assigns it the next
//! free symbol and rewrites every stream. The loop makes `vocab_size - 256`
//! attempts; once no pair repeats, the remaining attempts merge nothing and
//! the table stays short.

use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::merges::{DecodeDictionary, MergeTable};
use crate::stats::PairIndex;
use crate::stream::{LinkedStream, SymbolStream};
use crate::types::{Pair, Symbol, FIRST_MERGED_SYMBOL};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrainerState {
    Training,
    Done,
}

/// An accepted merge: the pair, the symbol it became and how often the
/// pair occurred when it was picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeStep {
    pub pair: Pair,
    pub symbol: Symbol,
    pub frequency: usize,
}

/// Result of a finished training run.
#[derive(Debug, Clone)]
pub struct Vocabulary {
    pub merges: MergeTable,
    pub dictionary: DecodeDictionary,
    pub steps: Vec<MergeStep>,
    /// Pair statistics of the merged corpus.
    pub final_stats: PairIndex,
}

pub struct Trainer<S: SymbolStream = LinkedStream> {
    streams: Vec<S>,
    index: PairIndex,

    /// Attempts to make in total, `vocab_size - 256`.
    budget: usize,
    attempts: usize,

    /// Set once an attempt found no repeated pair. The index cannot change
    /// after that, so later attempts cannot find one either.
    exhausted: bool,

    merges: MergeTable,
    steps: Vec<MergeStep>,
}

impl<S: SymbolStream + Sync> Trainer<S> {
    /// Set up a run over `streams` aiming for `vocab_size` symbols.
    pub fn new(streams: Vec<S>, vocab_size: usize) -> Result<Self> {
        let budget = vocab_size
            .checked_sub(FIRST_MERGED_SYMBOL as usize)
            .filter(|_| Symbol::try_from(vocab_size).is_ok())
            .ok_or(Error::InvalidConfiguration { vocab_size })?;

        let index = PairIndex::count_initial(&streams);
        info!(
            "training on {} chunks: {} distinct pairs, {} merge attempts",
            streams.len(),
            index.len(),
            budget
        );

        Ok(Trainer {
            streams,
            index,
            budget,
            attempts: 0,
            exhausted: false,
            merges: MergeTable::new(),
            steps: Vec::new(),
        })
    }

    /// One stream per chunk, each starting as its raw bytes.
    pub fn from_chunks<I, B>(chunks: I, vocab_size: usize) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let streams = chunks
            .into_iter()
            .map(|chunk| S::from_bytes(chunk.as_ref()))
            .collect();
        Self::new(streams, vocab_size)
    }

    pub fn state(&self) -> TrainerState {
        if self.attempts < self.budget {
            TrainerState::Training
        } else {
            TrainerState::Done
        }
    }

    /// Make one attempt. Returns the merge it performed, if any.
    ///
    /// Once Done, this is a no-op returning `None`.
    pub fn step(&mut self) -> Option<MergeStep> {
        if self.state() == TrainerState::Done {
            return None;
        }
        self.attempts += 1;
        if self.exhausted {
            return None;
        }

        let Some((pair, frequency)) = self.index.most_frequent() else {
            debug!(
                "attempt {}: no repeated pair left after {} merges",
                self.attempts,
                self.merges.len()
            );
            self.exhausted = true;
            return None;
        };

        let symbol = match self.merges.push(pair) {
            Ok(symbol) => symbol,
            Err(e) => {
                warn!("attempt {}: {e}; stopping", self.attempts);
                self.exhausted = true;
                return None;
            }
        };
        let merged = self.index.apply_merge(pair, symbol, &mut self.streams);

        debug!("merge {pair} -> {symbol} (frequency {frequency}, {merged} sites)");

        let step = MergeStep {
            pair,
            symbol,
            frequency,
        };
        self.steps.push(step);
        Some(step)
    }

    /// Make every remaining attempt and build the vocabulary.
    pub fn run(mut self) -> Vocabulary {
        while self.state() == TrainerState::Training {
            if self.exhausted {
                self.attempts = self.budget;
                break;
            }
            self.step();
        }
        self.finish()
    }

    fn finish(self) -> Vocabulary {
        info!(
            "training done: {} merges from {} attempts, vocabulary size {}",
            self.merges.len(),
            self.budget,
            self.merges.vocab_size()
        );
        let dictionary = DecodeDictionary::from(&self.merges);
        Vocabulary {
            merges: self.merges,
            dictionary,
            steps: self.steps,
            final_stats: self.index,
        }
    }

    pub fn streams(&self) -> &[S] {
        &self.streams
    }

    pub fn index(&self) -> &PairIndex {
        &self.index
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Symbol the next accepted merge will receive.
    pub fn next_symbol(&self) -> Symbol {
        self.merges.next_symbol()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::ArrayStream;

    const A: Symbol = b'a' as Symbol;
    const B: Symbol = b'b' as Symbol;
    const C: Symbol = b'c' as Symbol;
    const D: Symbol = b'd' as Symbol;

    #[test]
    fn test_rejects_small_vocab() {
        let result = Trainer::<LinkedStream>::from_chunks(["abc"], 255);
        assert!(matches!(
            result,
            Err(Error::InvalidConfiguration { vocab_size: 255 })
        ));
    }

    #[test]
    fn test_vocab_256_makes_no_merges() {
        let trainer = Trainer::<LinkedStream>::from_chunks(["aaaa"], 256).unwrap();
        assert_eq!(trainer.state(), TrainerState::Done);
        let vocab = trainer.run();
        assert!(vocab.merges.is_empty());
        assert!(vocab.dictionary.is_empty());
    }

    #[test]
    fn test_scenario_trace() {
        let mut trainer = Trainer::<LinkedStream>::from_chunks(["aaabdaaabac"], 256 + 5).unwrap();
        assert_eq!(trainer.index().get(Pair(A, A)), 4);

        let first = trainer.step().unwrap();
        assert_eq!(
            first,
            MergeStep {
                pair: Pair(A, A),
                symbol: 256,
                frequency: 4
            }
        );
        assert_eq!(
            trainer.streams()[0].to_vec(),
            vec![256, A, B, D, 256, A, B, A, C]
        );
        let index = trainer.index();
        assert_eq!(index.get(Pair(256, A)), 2);
        assert_eq!(index.get(Pair(A, B)), 2);
        assert_eq!(index.get(Pair(B, D)), 1);
        assert_eq!(index.get(Pair(D, 256)), 1);
        assert_eq!(index.get(Pair(B, A)), 1);
        assert_eq!(index.get(Pair(A, C)), 1);
        assert_eq!(index.len(), 6);

        // (a, b) and (256, a) tie at 2; the smaller pair wins.
        let second = trainer.step().unwrap();
        assert_eq!(
            second,
            MergeStep {
                pair: Pair(A, B),
                symbol: 257,
                frequency: 2
            }
        );
        assert_eq!(
            trainer.streams()[0].to_vec(),
            vec![256, 257, D, 256, 257, A, C]
        );
        assert_eq!(trainer.index().get(Pair(256, 257)), 2);
        assert_eq!(trainer.index().counts(), &PairIndex::recount(trainer.streams()));

        let third = trainer.step().unwrap();
        assert_eq!(third.pair, Pair(256, 257));
        assert_eq!(third.symbol, 258);

        // Nothing repeats any more: attempts continue, merges do not.
        assert_eq!(trainer.step(), None);
        assert_eq!(trainer.next_symbol(), 259);
        assert_eq!(trainer.state(), TrainerState::Training);
        assert_eq!(trainer.step(), None);
        assert_eq!(trainer.state(), TrainerState::Done);
        assert_eq!(trainer.attempts(), 5);

        let vocab = trainer.run();
        assert_eq!(vocab.merges.len(), 3);
        assert_eq!(vocab.steps.len(), 3);
        assert_eq!(vocab.dictionary.get(258), Some(Pair(256, 257)));
    }

    #[test]
    fn test_step_after_done_is_noop() {
        let mut trainer = Trainer::<LinkedStream>::from_chunks(["abab"], 257).unwrap();
        assert!(trainer.step().is_some());
        assert_eq!(trainer.state(), TrainerState::Done);
        assert_eq!(trainer.step(), None);
        assert_eq!(trainer.attempts(), 1);
        assert_eq!(trainer.merges().len(), 1);
    }

    #[test]
    fn test_ids_are_monotonic() {
        let text = "the cat sat on the mat with the hat";
        let vocab = Trainer::<LinkedStream>::from_chunks([text], 300).unwrap().run();
        assert!(!vocab.merges.is_empty());
        for (rank, (_, symbol)) in vocab.merges.iter().enumerate() {
            assert_eq!(symbol, FIRST_MERGED_SYMBOL + rank as Symbol);
        }
    }

    #[test]
    fn test_no_repeats_yields_no_merges() {
        let vocab = Trainer::<LinkedStream>::from_chunks(["abcdefg"], 300).unwrap().run();
        assert!(vocab.merges.is_empty());
        assert_eq!(vocab.final_stats.len(), 6);
    }

    #[test]
    fn test_chunk_barrier_never_merges_across() {
        let vocab = Trainer::<LinkedStream>::from_chunks(["ab", "ba"], 300).unwrap().run();
        assert!(!vocab.merges.contains(Pair(B, B)));
        assert!(vocab.merges.is_empty());
    }

    #[test]
    fn test_invariant_holds_after_every_step() {
        let text = "abracadabra abracadabra banana bandana cabana";
        let chunks: Vec<&str> = text.split(' ').collect();
        let mut trainer = Trainer::<LinkedStream>::from_chunks(&chunks, 256 + 40).unwrap();
        while trainer.state() == TrainerState::Training {
            trainer.step();
            assert_eq!(
                trainer.index().counts(),
                &PairIndex::recount(trainer.streams())
            );
        }
    }

    #[test]
    fn test_linked_and_array_train_identically() {
        let text = b"low lower lowest newer wider new newest widest";
        let chunks: Vec<&[u8]> = text.split(|&b| b == b' ').collect();
        let linked = Trainer::<LinkedStream>::from_chunks(&chunks, 320).unwrap().run();
        let array = Trainer::<ArrayStream>::from_chunks(&chunks, 320).unwrap().run();
        assert_eq!(linked.merges, array.merges);
        assert_eq!(linked.steps, array.steps);
    }
}
