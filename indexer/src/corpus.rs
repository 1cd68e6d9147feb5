//! Corpus discovery and lazy document loading.
//!
//! Discovery only records where each document lives. Bodies are read one
//! at a time while the index is being built.

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sift_core::tokenizer::Normalizer;
use sift_core::{DocId, Document, Importance};
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// One JSONL record.
#[derive(Debug, Deserialize)]
pub struct InputDoc {
    pub id: DocId,
    pub body: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub importance: Option<String>,
}

#[derive(Deserialize)]
struct IdOnly {
    id: DocId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// A plain-text file named by its id.
    Plain(PathBuf),
    /// A line of a `.jsonl` file starting at `offset`.
    Jsonl { path: PathBuf, offset: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocRef {
    pub id: DocId,
    pub location: Location,
}

/// Finds every document under `input`, sorted by id. Duplicate ids are an error.
pub fn discover(input: &Path) -> Result<Vec<DocRef>> {
    if !input.exists() {
        bail!("input path {} does not exist", input.display());
    }
    let mut refs = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            if entry.file_type().is_file() {
                collect(entry.path(), &mut refs)?;
            }
        }
    } else if !collect(input, &mut refs)? {
        bail!("{} is neither a numbered document nor a .jsonl file", input.display());
    }

    refs.sort_by_key(|r| r.id);
    if let Some(pair) = refs.windows(2).find(|w| w[0].id == w[1].id) {
        bail!(
            "duplicate document id {} ({:?} and {:?})",
            pair[0].id,
            pair[0].location,
            pair[1].location
        );
    }
    tracing::info!(documents = refs.len(), input = %input.display(), "discovered corpus");
    Ok(refs)
}

/// Adds the documents in one file; false when the file is not a corpus file.
fn collect(path: &Path, refs: &mut Vec<DocRef>) -> Result<bool> {
    if path.extension().and_then(|s| s.to_str()) == Some("jsonl") {
        scan_jsonl(path, refs)?;
        return Ok(true);
    }
    match path.file_name().and_then(|s| s.to_str()).and_then(|s| s.parse::<DocId>().ok()) {
        Some(id) => {
            refs.push(DocRef { id, location: Location::Plain(path.to_path_buf()) });
            Ok(true)
        }
        None => {
            tracing::debug!(path = %path.display(), "skipping non-corpus file");
            Ok(false)
        }
    }
}

fn scan_jsonl(path: &Path, refs: &mut Vec<DocRef>) -> Result<()> {
    let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut reader = BufReader::new(file);
    let mut offset = 0u64;
    let mut line = String::new();
    for line_no in 1.. {
        line.clear();
        let read = reader.read_line(&mut line)?;
        if read == 0 {
            break;
        }
        if !line.trim().is_empty() {
            let record: IdOnly = serde_json::from_str(&line)
                .with_context(|| format!("{}:{}: invalid record", path.display(), line_no))?;
            let location = Location::Jsonl { path: path.to_path_buf(), offset };
            refs.push(DocRef { id: record.id, location });
        }
        offset += read as u64;
    }
    Ok(())
}

/// Reads documents by reference, keeping the last JSONL file open.
#[derive(Default)]
pub struct Loader {
    open: Option<(PathBuf, BufReader<File>)>,
}

impl Loader {
    pub fn load(&mut self, doc: &DocRef) -> Result<InputDoc> {
        match &doc.location {
            Location::Plain(path) => {
                let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                Ok(InputDoc {
                    id: doc.id,
                    body: String::from_utf8_lossy(&bytes).into_owned(),
                    title: None,
                    importance: None,
                })
            }
            Location::Jsonl { path, offset } => {
                let reader = self.reader(path)?;
                reader.seek(SeekFrom::Start(*offset))?;
                let mut line = String::new();
                reader.read_line(&mut line)?;
                let record: InputDoc = serde_json::from_str(&line)
                    .with_context(|| format!("{}@{}: invalid record", path.display(), offset))?;
                Ok(record)
            }
        }
    }

    fn reader(&mut self, path: &Path) -> Result<&mut BufReader<File>> {
        let stale = self.open.as_ref().map_or(true, |(open, _)| open != path);
        if stale {
            let file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
            self.open = Some((path.to_path_buf(), BufReader::new(file)));
        }
        match self.open.as_mut() {
            Some((_, reader)) => Ok(reader),
            None => bail!("no reader for {}", path.display()),
        }
    }
}

impl InputDoc {
    pub fn into_document(self, normalizer: &Normalizer) -> Result<Document> {
        let importance = match self.importance.as_deref() {
            None => Importance::default(),
            Some(raw) => Importance::parse(raw)
                .with_context(|| format!("document {}: unknown importance {:?}", self.id, raw))?,
        };
        let title =
            self.title.as_deref().map(|t| normalizer.positioned_terms(t)).unwrap_or_default();
        Ok(Document::new(self.id, normalizer.positioned_terms(&self.body))
            .with_title(title)
            .with_importance(importance))
    }
}
