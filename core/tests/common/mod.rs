#![allow(dead_code)]

use sift_core::config::BuildConfig;
use sift_core::persist::{IndexPaths, IndexReader};
use sift_core::posting::PostingMode;
use sift_core::spimi::build_index;
use sift_core::tokenizer::Normalizer;
use sift_core::{DocId, Document};
use std::path::Path;

/// Builds an index under `dir` from `(id, text)` pairs and opens it.
pub fn build_tiny_index(
    dir: &Path,
    docs: &[(DocId, &str)],
    mode: PostingMode,
    memory_limit: usize,
) -> (IndexPaths, IndexReader) {
    let paths = IndexPaths::in_dir(dir);
    let normalizer = Normalizer::default();
    let docs = docs
        .iter()
        .map(|(id, text)| Ok(Document::new(*id, normalizer.positioned_terms(text))));
    let config = BuildConfig { memory_limit, mode, ..Default::default() };
    build_index(docs, config, &paths).unwrap();
    let reader = IndexReader::open(&paths).unwrap();
    (paths, reader)
}

pub const ANIMALS: &[(DocId, &str)] = &[(1, "cat dog"), (2, "dog"), (3, "cat cat")];
