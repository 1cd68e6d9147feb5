use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use sift_core::config::{BuildConfig, DEFAULT_MEMORY_LIMIT};
use sift_core::persist::IndexPaths;
use sift_core::posting::PostingMode;
use sift_core::spimi::build_index;
use sift_core::tokenizer::Normalizer;
use tracing_subscriber::{fmt, EnvFilter};

use std::path::PathBuf;

mod corpus;

use corpus::{discover, Loader};

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build a SPIMI inverted index with skip pointers", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the dictionary and postings files from a corpus
    Build(BuildArgs),
}

#[derive(Args)]
struct BuildArgs {
    /// Corpus directory, numbered text file, or .jsonl file
    #[arg(short, long)]
    input: PathBuf,
    /// Output dictionary file
    #[arg(short, long)]
    dictionary: PathBuf,
    /// Output postings file
    #[arg(short, long)]
    postings: PathBuf,
    /// Posting entries held in memory before a block is spilled
    #[arg(long, env = "SIFT_MEMORY_LIMIT", default_value_t = DEFAULT_MEMORY_LIMIT)]
    memory_limit: usize,
    /// Store term positions, enabling phrase queries and real term frequencies
    #[arg(long, default_value_t = false)]
    positional: bool,
    /// Drop English stopwords at index and query time
    #[arg(long, default_value_t = false)]
    stopwords: bool,
    /// Directory for the temporary block file
    #[arg(long)]
    temp_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Build(args) => build(args),
    }
}

fn build(args: BuildArgs) -> Result<()> {
    let refs = discover(&args.input)?;
    let config = BuildConfig {
        memory_limit: args.memory_limit,
        mode: if args.positional { PostingMode::Positional } else { PostingMode::Ids },
        remove_stopwords: args.stopwords,
        temp_dir: args.temp_dir,
    };
    let normalizer = Normalizer::new(config.remove_stopwords);
    let paths = IndexPaths::new(&args.dictionary, &args.postings);

    let mut loader = Loader::default();
    let docs = refs.iter().map(|r| loader.load(r).and_then(|doc| doc.into_document(&normalizer)));
    let summary = build_index(docs, config, &paths)?;

    tracing::info!(
        num_docs = summary.num_docs,
        num_terms = summary.num_terms,
        num_title_terms = summary.num_title_terms,
        blocks = summary.blocks_written,
        merges = summary.merges,
        postings_bytes = summary.postings_bytes,
        dictionary = %args.dictionary.display(),
        postings = %args.postings.display(),
        "index build complete"
    );
    Ok(())
}
