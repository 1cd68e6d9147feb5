//! Single-pass in-memory indexing with bounded blocks.
//!
//! Terms accumulate in a build-local map until the configured number of
//! posting entries is reached. The map is then sorted and spilled as a block:
//! a run of records in its own temporary file. After the corpus is consumed,
//! blocks are merged two at a time (oldest first) until one remains, and that
//! block is rewritten as skip lists into the postings file. A block's file is
//! deleted as soon as it has been merged, so scratch space stays near the
//! size of the live blocks.

use crate::config::BuildConfig;
use crate::error::BuildError;
use crate::persist::{save_dictionary, DictEntry, Dictionary, IndexMeta, IndexPaths, PostingsWriter};
use crate::posting::PostingBuf;
use crate::skiplist::SkipList;
use crate::weighting::{log_tf, vector_length};
use crate::{config, DocId, DocWeight, Document, Position, TermKey, Zone};
use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::{HashMap, VecDeque};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use tempfile::NamedTempFile;

type Record = (TermKey, PostingBuf);

/// One sorted run of records. Its file is removed on drop.
struct Block {
    file: NamedTempFile,
    records: usize,
}

impl Block {
    fn cursor(&self) -> Result<BlockCursor> {
        let reader = BufReader::new(self.file.reopen().context("reopening block file")?);
        let mut cursor = BlockCursor { reader, remaining: self.records, current: None };
        cursor.advance()?;
        Ok(cursor)
    }
}

struct BlockWriter {
    file: NamedTempFile,
    out: BufWriter<File>,
    records: usize,
}

impl BlockWriter {
    fn create(config: &BuildConfig) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("sift-block-");
        let file = match &config.temp_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }
        .context("creating temporary block file")?;
        let out = BufWriter::new(file.as_file().try_clone()?);
        Ok(Self { file, out, records: 0 })
    }

    fn push(&mut self, record: &Record) -> Result<()> {
        bincode::serialize_into(&mut self.out, record)?;
        self.records += 1;
        Ok(())
    }

    fn finish(mut self) -> Result<Block> {
        self.out.flush()?;
        Ok(Block { file: self.file, records: self.records })
    }
}

/// Walks one block's records in order, holding only the current one.
struct BlockCursor {
    reader: BufReader<File>,
    remaining: usize,
    current: Option<Record>,
}

impl BlockCursor {
    fn advance(&mut self) -> Result<()> {
        self.current = if self.remaining == 0 {
            None
        } else {
            self.remaining -= 1;
            Some(bincode::deserialize_from(&mut self.reader).context("reading block record")?)
        };
        Ok(())
    }

    fn key(&self) -> Option<&TermKey> {
        self.current.as_ref().map(|(key, _)| key)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IndexSummary {
    pub num_docs: usize,
    pub num_terms: usize,
    pub num_title_terms: usize,
    pub blocks_written: usize,
    pub merges: usize,
    pub postings_bytes: u64,
}

/// Build context owned by one indexing pass.
pub struct SpimiBuilder {
    config: BuildConfig,
    terms: HashMap<TermKey, PostingBuf>,
    entries_in_memory: usize,
    blocks: VecDeque<Block>,
    universe: Vec<DocId>,
    doc_weights: HashMap<DocId, DocWeight>,
    blocks_written: usize,
    merges: usize,
}

impl SpimiBuilder {
    pub fn new(config: BuildConfig) -> Result<Self> {
        if config.memory_limit == 0 {
            return Err(BuildError::ZeroMemoryLimit.into());
        }
        Ok(Self {
            config,
            terms: HashMap::new(),
            entries_in_memory: 0,
            blocks: VecDeque::new(),
            universe: Vec::new(),
            doc_weights: HashMap::new(),
            blocks_written: 0,
            merges: 0,
        })
    }

    /// Entries currently held in memory; never above the configured limit.
    pub fn entries_in_memory(&self) -> usize {
        self.entries_in_memory
    }

    pub fn blocks_written(&self) -> usize {
        self.blocks_written
    }

    pub fn add_document(&mut self, doc: &Document) -> Result<()> {
        if let Some(&previous) = self.universe.last() {
            if doc.id <= previous {
                return Err(BuildError::OutOfOrder { previous, next: doc.id }.into());
            }
        }
        self.universe.push(doc.id);
        self.doc_weights.insert(
            doc.id,
            DocWeight {
                content_length: zone_length(&doc.content),
                title_length: zone_length(&doc.title),
                importance: doc.importance,
            },
        );
        for (zone, terms) in [(Zone::Content, &doc.content), (Zone::Title, &doc.title)] {
            for (term, pos) in terms {
                self.add_occurrence(TermKey::new(zone, term.as_str()), doc.id, *pos)?;
            }
        }
        Ok(())
    }

    fn add_occurrence(&mut self, key: TermKey, doc_id: DocId, pos: Position) -> Result<()> {
        let mode = self.config.mode;
        let added = self
            .terms
            .entry(key)
            .or_insert_with(|| PostingBuf::new(mode))
            .add(doc_id, pos);
        self.entries_in_memory += added;
        if self.entries_in_memory >= self.config.memory_limit {
            self.flush_block()?;
        }
        Ok(())
    }

    /// Sorts the in-memory map and spills it as one block.
    fn flush_block(&mut self) -> Result<()> {
        if self.terms.is_empty() {
            return Ok(());
        }
        let mut pairs: Vec<Record> = self.terms.drain().collect();
        pairs.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        let mut writer = BlockWriter::create(&self.config)?;
        for record in &pairs {
            writer.push(record)?;
        }
        let block = writer.finish()?;
        self.blocks_written += 1;
        tracing::debug!(
            block = self.blocks_written,
            terms = block.records,
            entries = self.entries_in_memory,
            "flushed block"
        );
        self.entries_in_memory = 0;
        self.blocks.push_back(block);
        Ok(())
    }

    /// Binary merge of the block queue down to a single block.
    fn merge_blocks(&mut self) -> Result<Option<Block>> {
        while self.blocks.len() > 1 {
            let (Some(a), Some(b)) = (self.blocks.pop_front(), self.blocks.pop_front()) else {
                break;
            };
            let merged = self.merge_pair(&a, &b)?;
            self.merges += 1;
            let remaining = self.blocks.len() + 1;
            tracing::debug!(merges = self.merges, remaining, "merged block pair");
            self.blocks.push_back(merged);
        }
        Ok(self.blocks.pop_front())
    }

    fn merge_pair(&self, a: &Block, b: &Block) -> Result<Block> {
        let mut out = BlockWriter::create(&self.config)?;
        let mut left = a.cursor()?;
        let mut right = b.cursor()?;
        loop {
            let order = match (left.key(), right.key()) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => break,
            };
            match order {
                Ordering::Equal => {
                    let pair = (left.current.take(), right.current.take());
                    if let (Some((key, pa)), Some((_, pb))) = pair {
                        out.push(&(key, pa.merge(pb)))?;
                    }
                    left.advance()?;
                    right.advance()?;
                }
                Ordering::Less | Ordering::Greater => {
                    let cursor = if order == Ordering::Less { &mut left } else { &mut right };
                    if let Some(record) = cursor.current.take() {
                        out.push(&record)?;
                    }
                    cursor.advance()?;
                }
            }
        }
        out.finish()
    }

    /// Spills what is left, merges, and writes the dictionary and postings
    /// files. The dictionary is moved into place last; a failed build
    /// removes every staged file it created.
    pub fn finish(mut self, paths: &IndexPaths) -> Result<IndexSummary> {
        self.flush_block()?;
        let final_block = self.merge_blocks()?;
        let staging = paths.staging();
        let result = self.write_index(final_block.as_ref(), &staging).and_then(|summary| {
            fs::rename(&staging.postings, &paths.postings)
                .with_context(|| format!("moving postings into {}", paths.postings.display()))?;
            fs::rename(&staging.dictionary, &paths.dictionary)
                .with_context(|| format!("moving dictionary into {}", paths.dictionary.display()))?;
            Ok(summary)
        });
        if result.is_err() {
            let _ = fs::remove_file(&staging.postings);
            let _ = fs::remove_file(&staging.dictionary);
        }
        result
    }

    fn write_index(&mut self, block: Option<&Block>, staging: &IndexPaths) -> Result<IndexSummary> {
        let mut writer = PostingsWriter::create(&staging.postings)?;
        let mut terms: HashMap<String, DictEntry> = HashMap::new();
        let mut title_terms: HashMap<String, DictEntry> = HashMap::new();
        if let Some(block) = block {
            let mut cursor = block.cursor()?;
            while let Some((key, buf)) = cursor.current.take() {
                let dict_entry = writer.append(&buf.into_posting_list())?;
                match key.zone {
                    Zone::Content => terms.insert(key.term, dict_entry),
                    Zone::Title => title_terms.insert(key.term, dict_entry),
                };
                cursor.advance()?;
            }
        }
        let universe_ids = SkipList::from_sorted(std::mem::take(&mut self.universe));
        let universe = writer.append_universe(&universe_ids)?;
        let postings_bytes = writer.finish()?;

        let meta = IndexMeta {
            num_docs: universe_ids.len() as u32,
            created_at: time::OffsetDateTime::now_utc()
                .format(&time::format_description::well_known::Rfc3339)
                .unwrap_or_default(),
            version: config::INDEX_VERSION,
            mode: self.config.mode,
            remove_stopwords: self.config.remove_stopwords,
            postings_bytes,
        };
        let summary = IndexSummary {
            num_docs: universe_ids.len(),
            num_terms: terms.len(),
            num_title_terms: title_terms.len(),
            blocks_written: self.blocks_written,
            merges: self.merges,
            postings_bytes,
        };
        let dictionary = Dictionary {
            meta,
            terms,
            title_terms,
            universe,
            doc_weights: std::mem::take(&mut self.doc_weights),
        };
        save_dictionary(&staging.dictionary, &dictionary)?;
        Ok(summary)
    }
}

/// Length of a zone's `1 + log10(tf)` vector.
fn zone_length(terms: &[(String, Position)]) -> f64 {
    let mut counts: HashMap<&str, u32> = HashMap::new();
    for (term, _) in terms {
        *counts.entry(term.as_str()).or_insert(0) += 1;
    }
    vector_length(counts.values().map(|&tf| log_tf(tf)))
}

/// Builds an index from documents in ascending id order.
pub fn build_index<I>(docs: I, config: BuildConfig, paths: &IndexPaths) -> Result<IndexSummary>
where
    I: IntoIterator<Item = Result<Document>>,
{
    let mut builder = SpimiBuilder::new(config)?;
    for doc in docs {
        builder.add_document(&doc?)?;
    }
    builder.finish(paths)
}
