//! Batch query evaluation: one results line per query line.

use anyhow::{Context, Result};
use sift_core::config::SearchConfig;
use sift_core::error::QueryError;
use sift_core::persist::{IndexPaths, IndexReader};
use sift_core::query::{parse_query, BooleanProcessor, Query};
use sift_core::ranking::{RankOptions, VectorSpaceModel};
use sift_core::tokenizer::Normalizer;
use sift_core::DocId;
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Result of one query line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// Blank input line.
    Blank,
    /// Matching ids in ascending order.
    Boolean(Vec<DocId>),
    /// Ids by descending score.
    Ranked(Vec<DocId>),
    /// The line was malformed; answered with nothing.
    Degraded,
}

impl Answer {
    pub fn doc_ids(&self) -> &[DocId] {
        match self {
            Answer::Boolean(ids) | Answer::Ranked(ids) => ids,
            Answer::Blank | Answer::Degraded => &[],
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchSummary {
    pub queries: usize,
    pub boolean: usize,
    pub ranked: usize,
    pub degraded: usize,
}

impl SearchSummary {
    fn record(&mut self, answer: &Answer) {
        match answer {
            Answer::Blank => return,
            Answer::Boolean(_) => self.boolean += 1,
            Answer::Ranked(_) => self.ranked += 1,
            Answer::Degraded => self.degraded += 1,
        }
        self.queries += 1;
    }
}

/// An open index plus the settings queries are answered with.
pub struct Searcher {
    reader: IndexReader,
    normalizer: Normalizer,
    config: SearchConfig,
}

impl Searcher {
    pub fn open(paths: &IndexPaths, config: SearchConfig) -> Result<Self> {
        let reader = IndexReader::open(paths)?;
        let normalizer = reader.meta().normalizer();
        tracing::debug!(num_docs = reader.num_docs(), mode = ?reader.meta().mode, "opened index");
        Ok(Self { reader, normalizer, config })
    }

    pub fn answer(&mut self, line: &str) -> Result<Answer> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(Answer::Blank);
        }
        let query = match parse_query(line, self.config.mode, &self.normalizer) {
            Ok(query) => query,
            Err(err) => return Ok(degrade(line, &err)),
        };
        match query {
            Query::Boolean(postfix) => {
                let mut processor = BooleanProcessor::new(&mut self.reader);
                match processor.evaluate(&postfix, self.config.strategy) {
                    Ok(ids) => Ok(Answer::Boolean(ids.into_ids())),
                    Err(err) => match err.downcast_ref::<QueryError>() {
                        Some(query_err) => Ok(degrade(line, query_err)),
                        None => Err(err),
                    },
                }
            }
            Query::Ranked(terms) => {
                let options = RankOptions {
                    top_k: self.config.top_k,
                    positive_only: self.config.positive_only,
                };
                let ranked = VectorSpaceModel::new(&mut self.reader).rank(&terms, options)?;
                Ok(Answer::Ranked(ranked.into_iter().map(|s| s.doc_id).collect()))
            }
        }
    }
}

/// One output line per input line. Lines that are not valid UTF-8 are
/// decoded with replacement characters and answered like any other line.
fn write_answers<R: BufRead>(
    searcher: &mut Searcher,
    mut input: R,
    staging: &Path,
    summary: &mut SearchSummary,
) -> Result<()> {
    let mut out = BufWriter::new(File::create(staging)?);
    let mut raw = Vec::new();
    for line_no in 1.. {
        raw.clear();
        if input.read_until(b'\n', &mut raw)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&raw);
        if let Cow::Owned(_) = line {
            tracing::warn!(line = line_no, "query line is not valid UTF-8, decoding lossily");
        }
        let answer = searcher.answer(&line)?;
        summary.record(&answer);
        let ids: Vec<String> = answer.doc_ids().iter().map(|id| id.to_string()).collect();
        writeln!(out, "{}", ids.join(" "))?;
    }
    out.flush()?;
    out.get_ref().sync_all()?;
    Ok(())
}

fn degrade(line: &str, err: &QueryError) -> Answer {
    tracing::warn!(query = line, error = %err, "malformed query, answering with no documents");
    Answer::Degraded
}

/// Answers every line of `queries` into `output`, which is replaced only
/// once all lines are written.
pub fn run_search(
    paths: &IndexPaths,
    queries: &Path,
    output: &Path,
    config: &SearchConfig,
) -> Result<SearchSummary> {
    let mut searcher = Searcher::open(paths, config.clone())?;
    let file = File::open(queries)
        .with_context(|| format!("opening queries {}", queries.display()))?;

    let mut staging = output.as_os_str().to_owned();
    staging.push(".tmp");
    let staging = PathBuf::from(staging);

    let mut summary = SearchSummary::default();
    if let Err(err) = write_answers(&mut searcher, BufReader::new(file), &staging, &mut summary) {
        let _ = fs::remove_file(&staging);
        return Err(err);
    }
    fs::rename(&staging, output)
        .with_context(|| format!("writing results {}", output.display()))?;

    tracing::info!(
        queries = summary.queries,
        boolean = summary.boolean,
        ranked = summary.ranked,
        degraded = summary.degraded,
        output = %output.display(),
        "search complete"
    );
    Ok(summary)
}
