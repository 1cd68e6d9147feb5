use anyhow::Result;
use clap::{Parser, ValueEnum};
use search::run_search;
use sift_core::config::{SearchConfig, DEFAULT_TOP_K};
use sift_core::persist::IndexPaths;
use sift_core::query::{EvaluationStrategy, QueryMode};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Boolean when a line uses operators, parentheses or quotes
    Auto,
    Boolean,
    Ranked,
}

impl From<Mode> for QueryMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Auto => QueryMode::Auto,
            Mode::Boolean => QueryMode::Boolean,
            Mode::Ranked => QueryMode::Ranked,
        }
    }
}

#[derive(Parser)]
#[command(name = "search")]
#[command(about = "Answer a file of boolean, phrasal and free-text queries", long_about = None)]
struct Cli {
    /// Dictionary file written by the indexer
    #[arg(short, long)]
    dictionary: PathBuf,
    /// Postings file written by the indexer
    #[arg(short, long)]
    postings: PathBuf,
    /// One query per line
    #[arg(short, long)]
    queries: PathBuf,
    /// Results file, one line per query line
    #[arg(short, long)]
    output: PathBuf,
    /// Documents returned per ranked query
    #[arg(short = 'k', long, env = "SIFT_TOP_K", default_value_t = DEFAULT_TOP_K)]
    top_k: usize,
    /// Return every scored document for ranked queries
    #[arg(long, default_value_t = false)]
    all: bool,
    /// Keep documents whose ranked score is zero
    #[arg(long, default_value_t = false)]
    keep_zero: bool,
    #[arg(long, value_enum, default_value_t = Mode::Auto)]
    mode: Mode,
    /// Evaluate boolean queries strictly left to right without skip pointers
    #[arg(long, default_value_t = false)]
    naive: bool,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    let config = SearchConfig {
        top_k: if cli.all { None } else { Some(cli.top_k) },
        mode: cli.mode.into(),
        strategy: if cli.naive { EvaluationStrategy::Naive } else { EvaluationStrategy::Optimized },
        positive_only: !cli.keep_zero,
    };
    let paths = IndexPaths::new(&cli.dictionary, &cli.postings);
    run_search(&paths, &cli.queries, &cli.output, &config)?;
    Ok(())
}
