//! Default tuning values for indexing and search.
//!
//! Runtime overrides come from the `indexer` and `search` command lines
//! (and their `SIFT_*` environment variables).

use crate::posting::PostingMode;
use crate::query::{EvaluationStrategy, QueryMode};
use std::path::PathBuf;

/// In-memory posting entries a SPIMI block may hold before it is flushed.
pub const DEFAULT_MEMORY_LIMIT: usize = 131_072;

/// Number of documents returned for a ranked query.
pub const DEFAULT_TOP_K: usize = 10;

/// Linear weights used to combine per-zone cosine scores.
pub const TITLE_ZONE_WEIGHT: f64 = 0.2;
pub const CONTENT_ZONE_WEIGHT: f64 = 0.8;

pub const HIGH_IMPORTANCE_MULTIPLIER: f64 = 10.0;
pub const MEDIUM_IMPORTANCE_MULTIPLIER: f64 = 8.5;
pub const LOW_IMPORTANCE_MULTIPLIER: f64 = 1.0;

/// Bumped whenever the dictionary or postings layout changes.
pub const INDEX_VERSION: u32 = 1;

#[derive(Debug, Clone)]
pub struct BuildConfig {
    pub memory_limit: usize,
    pub mode: PostingMode,
    pub remove_stopwords: bool,
    /// Directory for the temporary block file; the system temp dir when `None`.
    pub temp_dir: Option<PathBuf>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            memory_limit: DEFAULT_MEMORY_LIMIT,
            mode: PostingMode::Ids,
            remove_stopwords: false,
            temp_dir: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// `None` ranks every matching document.
    pub top_k: Option<usize>,
    pub mode: QueryMode,
    pub strategy: EvaluationStrategy,
    /// Drop ranked documents whose final score is not strictly positive.
    pub positive_only: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: Some(DEFAULT_TOP_K),
            mode: QueryMode::Auto,
            strategy: EvaluationStrategy::Optimized,
            positive_only: true,
        }
    }
}
