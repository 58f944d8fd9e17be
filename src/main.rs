use std::io::{self, Read};
use std::path::PathBuf;
use std::process;

use bytemerge::{load_text, BpeTokenizer, EncodeMode, Error, Normalization, Result, TrainConfig};
use clap::{ArgAction, Parser};
use env_logger::Env;
use log::LevelFilter;
use rayon::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "bytemerge",
    version,
    about = "Learn byte-pair merges from text, then encode and decode with them",
    after_help = "When no paths are given, reads training text from stdin.\n\
                  The split pattern defaults to $BYTEMERGE_PATTERN if set."
)]
struct Args {
    /// Training text files
    paths: Vec<PathBuf>,

    /// Target vocabulary size, raw bytes included (>= 256)
    #[arg(short = 'n', long, value_name = "SIZE")]
    vocab_size: Option<usize>,

    /// Regex that splits the training text into chunks
    #[arg(short, long, value_name = "REGEX")]
    pattern: Option<String>,

    /// JSON training configuration; flags override its values
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Apply Unicode NFC to the training text before splitting
    #[arg(long)]
    nfc: bool,

    /// Encode by merge rank instead of a single greedy sweep
    #[arg(long)]
    rank_priority: bool,

    /// Text to encode after training (repeatable)
    #[arg(short, long, value_name = "TEXT")]
    encode: Vec<String>,

    /// Print the merge table
    #[arg(long)]
    merges: bool,

    /// Print the decode dictionary
    #[arg(long)]
    dict: bool,

    /// Print pair statistics of the merged corpus
    #[arg(long)]
    stats: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(short = 'v', long, action = ArgAction::Count)]
    verbose: u8,

    /// Decrease verbosity (-q, -qq)
    #[arg(short = 'q', long, action = ArgAction::Count)]
    quiet: u8,
}

/// Level forced by `-v`/`-q`. Without either flag `RUST_LOG` decides.
fn level_override(verbose: u8, quiet: u8) -> Option<LevelFilter> {
    match (quiet, verbose) {
        (0, 0) => None,
        (0, 1) => Some(LevelFilter::Debug),
        (0, _) => Some(LevelFilter::Trace),
        (1, _) => Some(LevelFilter::Warn),
        (2, _) => Some(LevelFilter::Error),
        _ => Some(LevelFilter::Off),
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));
    builder.format_timestamp_millis();
    if let Some(level) = level_override(verbose, quiet) {
        builder.filter_level(level);
    }
    let _ = builder.try_init();
}

fn build_config(args: &Args) -> Result<TrainConfig> {
    let mut config = match &args.config {
        Some(path) => TrainConfig::from_json_file(path)?,
        None => TrainConfig::default(),
    };
    if let Some(size) = args.vocab_size {
        config = config.with_vocab_size(size);
    }
    if let Some(pattern) = &args.pattern {
        config = config.with_pattern(pattern.as_str());
    }
    if args.nfc {
        config = config.with_normalization(Normalization::Nfc);
    }
    if args.rank_priority {
        config = config.with_encode_mode(EncodeMode::RankPriority);
    }
    Ok(config)
}

/// Concatenated training text, files in argument order.
fn read_corpus(paths: &[PathBuf]) -> Result<String> {
    if paths.is_empty() {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map_err(|source| Error::Io {
            path: PathBuf::from("<stdin>"),
            source,
        })?;
        return Ok(buf);
    }

    let texts = paths
        .par_iter()
        .map(|path| load_text(path))
        .collect::<Result<Vec<String>>>()?;
    Ok(texts.concat())
}

fn format_line(count: &str, label: &str) -> String {
    format!("{:>8} {}\n", count, label)
}

fn run(args: Args) -> Result<()> {
    let config = build_config(&args)?;
    let text = read_corpus(&args.paths)?;

    let mut tokenizer = BpeTokenizer::from_config(&text, &config)?;
    tokenizer.train(config.vocab_size)?;

    print!("{}", format_line(&text.len().to_string(), "bytes"));
    print!("{}", format_line(&tokenizer.chunk_count().to_string(), "chunks"));
    print!("{}", format_line(&tokenizer.merges().len().to_string(), "merges"));
    print!("{}", format_line(&tokenizer.vocab_size().to_string(), "vocab size"));

    if args.merges {
        print!("{}", tokenizer.render_merges());
    }
    if args.dict {
        print!("{}", tokenizer.render_dict());
    }
    if args.stats {
        print!("{}", tokenizer.render_stats());
    }

    for sample in &args.encode {
        let ids = tokenizer.encode(sample);
        let decoded = tokenizer.decode_to_string(&ids)?;
        println!("{:?}", ids);
        let ratio = if ids.is_empty() {
            0.0
        } else {
            sample.len() as f64 / ids.len() as f64
        };
        print!("{}", format_line(&format!("{:.3}", ratio), "bytes per symbol"));
        println!("{}", decoded);
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose, args.quiet);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
