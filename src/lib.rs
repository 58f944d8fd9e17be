//! Byte-pair merge training over chunked text.
//!
//! Training text is split into chunks, each chunk becomes a stream of byte
//! symbols, and the most frequent adjacent pair across all streams is
//! repeatedly merged into a new symbol. The resulting [`MergeTable`]
//! encodes new text and its [`DecodeDictionary`] turns symbols back into the
//! exact original bytes.
//!
//! ```
//! use bytemerge::BpeTokenizer;
//!
//! let mut tokenizer = BpeTokenizer::new("aaabdaaabac", r"\w+")?;
//! tokenizer.train(256 + 3)?;
//! let ids = tokenizer.encode("aaabdaaabac");
//! assert_eq!(tokenizer.decode(&ids)?, b"aaabdaaabac");
//! # Ok::<(), bytemerge::Error>(())
//! ```

pub mod config;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod loader;
pub mod merges;
pub mod splitter;
pub mod stats;
pub mod stream;
pub mod tokenizer;
pub mod trainer;
pub mod types;

pub use config::TrainConfig;
pub use decoder::Decoder;
pub use encoder::{EncodeMode, Encoder};
pub use error::{Error, Result};
pub use loader::{load_text, Normalization};
pub use merges::{DecodeDictionary, MergeTable};
pub use splitter::{ChunkSplitter, DEFAULT_PATTERN};
pub use stats::PairIndex;
pub use stream::{ArrayStream, LinkedStream, SymbolStream};
pub use tokenizer::BpeTokenizer;
pub use trainer::{MergeStep, Trainer, TrainerState, Vocabulary};
pub use types::{Pair, Symbol, FIRST_MERGED_SYMBOL};
