//! Train-then-encode front end over a chunked corpus.

use crate::config::TrainConfig;
use crate::decoder::Decoder;
use crate::encoder::{EncodeMode, Encoder};
use crate::error::Result;
use crate::merges::{DecodeDictionary, MergeTable};
use crate::splitter::ChunkSplitter;
use crate::stats::PairIndex;
use crate::stream::{LinkedStream, SymbolStream};
use crate::trainer::{MergeStep, Trainer};
use crate::types::Symbol;

/// A corpus split into chunks plus, once trained, its merge table.
///
/// Until [`BpeTokenizer::train`] runs, the table is empty and encoding
/// passes raw bytes through.
#[derive(Debug, Clone)]
pub struct BpeTokenizer {
    chunks: Vec<Vec<u8>>,
    stats: PairIndex,
    merges: MergeTable,
    dictionary: DecodeDictionary,
    steps: Vec<MergeStep>,
    encode_mode: EncodeMode,
}

impl BpeTokenizer {
    /// Split `text` with `pattern`; fails if the pattern is malformed.
    pub fn new(text: &str, pattern: &str) -> Result<Self> {
        let splitter = ChunkSplitter::new(pattern)?;
        Self::from_chunks(splitter.split(text)?)
    }

    /// Normalize and split `text` as `config` says.
    ///
    /// `config.vocab_size` is not used here; pass it to [`BpeTokenizer::train`].
    pub fn from_config(text: &str, config: &TrainConfig) -> Result<Self> {
        let text = config.normalization.apply(text);
        let mut tokenizer = Self::new(&text, &config.pattern)?;
        tokenizer.encode_mode = config.encode_mode;
        Ok(tokenizer)
    }

    /// Use pre-split chunks directly. Each chunk is a merge barrier.
    pub fn from_chunks<I, B>(chunks: I) -> Result<Self>
    where
        I: IntoIterator<Item = B>,
        B: AsRef<[u8]>,
    {
        let chunks: Vec<Vec<u8>> = chunks.into_iter().map(|c| c.as_ref().to_vec()).collect();
        let streams: Vec<LinkedStream> = chunks.iter().map(|c| LinkedStream::from_bytes(c)).collect();
        let stats = PairIndex::count_initial(&streams);

        Ok(BpeTokenizer {
            chunks,
            stats,
            merges: MergeTable::new(),
            dictionary: DecodeDictionary::default(),
            steps: Vec::new(),
            encode_mode: EncodeMode::default(),
        })
    }

    /// Learn up to `vocab_size - 256` merges from the corpus.
    ///
    /// Training always starts from the raw chunks, replacing any earlier
    /// table. Fails if `vocab_size < 256`.
    pub fn train(&mut self, vocab_size: usize) -> Result<()> {
        let vocab = Trainer::<LinkedStream>::from_chunks(&self.chunks, vocab_size)?.run();
        self.merges = vocab.merges;
        self.dictionary = vocab.dictionary;
        self.steps = vocab.steps;
        self.stats = vocab.final_stats;
        Ok(())
    }

    pub fn encode(&self, text: &str) -> Vec<Symbol> {
        Encoder::new(&self.merges)
            .with_mode(self.encode_mode)
            .encode(text)
    }

    pub fn decode(&self, symbols: &[Symbol]) -> Result<Vec<u8>> {
        Decoder::new(&self.dictionary).decode(symbols)
    }

    pub fn decode_to_string(&self, symbols: &[Symbol]) -> Result<String> {
        Decoder::new(&self.dictionary).decode_to_string(symbols)
    }

    pub fn set_encode_mode(&mut self, mode: EncodeMode) {
        self.encode_mode = mode;
    }

    pub fn encode_mode(&self) -> EncodeMode {
        self.encode_mode
    }

    pub fn merges(&self) -> &MergeTable {
        &self.merges
    }

    pub fn dictionary(&self) -> &DecodeDictionary {
        &self.dictionary
    }

    /// Pair statistics: of the raw chunks before training, of the merged
    /// corpus after.
    pub fn stats(&self) -> &PairIndex {
        &self.stats
    }

    /// Accepted merges of the last training run, in order.
    pub fn steps(&self) -> &[MergeStep] {
        &self.steps
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn vocab_size(&self) -> usize {
        self.merges.vocab_size()
    }

    pub fn render_stats(&self) -> String {
        self.stats.render()
    }

    pub fn render_merges(&self) -> String {
        self.merges.render()
    }

    pub fn render_dict(&self) -> String {
        self.dictionary.render()
    }
}
