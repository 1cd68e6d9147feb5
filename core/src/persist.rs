use crate::posting::{PostingList, PostingMode};
use crate::skiplist::SkipList;
use crate::tokenizer::Normalizer;
use crate::{DocId, DocWeight, Zone};
use anyhow::{bail, Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Location of one serialized posting inside the postings file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictEntry {
    pub doc_freq: u32,
    pub offset: u64,
    pub length: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexMeta {
    pub num_docs: u32,
    pub created_at: String,
    pub version: u32,
    pub mode: PostingMode,
    pub remove_stopwords: bool,
    /// Size of the postings file written alongside this dictionary.
    pub postings_bytes: u64,
}

impl IndexMeta {
    pub fn normalizer(&self) -> Normalizer {
        Normalizer::new(self.remove_stopwords)
    }
}

/// Everything in the dictionary file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dictionary {
    pub meta: IndexMeta,
    pub terms: HashMap<String, DictEntry>,
    pub title_terms: HashMap<String, DictEntry>,
    pub universe: DictEntry,
    pub doc_weights: HashMap<DocId, DocWeight>,
}

impl Dictionary {
    pub fn zone(&self, zone: Zone) -> &HashMap<String, DictEntry> {
        match zone {
            Zone::Content => &self.terms,
            Zone::Title => &self.title_terms,
        }
    }

    pub fn lookup(&self, zone: Zone, term: &str) -> Option<&DictEntry> {
        self.zone(zone).get(term)
    }

    pub fn doc_freq(&self, zone: Zone, term: &str) -> u32 {
        self.lookup(zone, term).map_or(0, |e| e.doc_freq)
    }

    pub fn has_titles(&self) -> bool {
        !self.title_terms.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub dictionary: PathBuf,
    pub postings: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(dictionary: P, postings: Q) -> Self {
        Self {
            dictionary: dictionary.as_ref().to_path_buf(),
            postings: postings.as_ref().to_path_buf(),
        }
    }

    /// Conventional file names inside one directory.
    pub fn in_dir<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        Self::new(root.join("dictionary.bin"), root.join("postings.bin"))
    }

    /// Paths the builder writes before renaming into place.
    pub fn staging(&self) -> IndexPaths {
        IndexPaths {
            dictionary: with_tmp_suffix(&self.dictionary),
            postings: with_tmp_suffix(&self.postings),
        }
    }
}

fn with_tmp_suffix(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Append-only writer for the postings file.
pub struct PostingsWriter {
    out: BufWriter<File>,
    offset: u64,
}

impl PostingsWriter {
    pub fn create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let f = File::create(path)
            .with_context(|| format!("creating postings file {}", path.display()))?;
        Ok(Self { out: BufWriter::new(f), offset: 0 })
    }

    pub fn append(&mut self, posting: &PostingList) -> Result<DictEntry> {
        self.append_record(posting, posting.len())
    }

    /// Stores the id list of every indexed document.
    pub fn append_universe(&mut self, universe: &SkipList) -> Result<DictEntry> {
        self.append_record(universe, universe.len())
    }

    fn append_record<T: Serialize>(&mut self, record: &T, doc_freq: usize) -> Result<DictEntry> {
        let bytes = bincode::serialize(record)?;
        self.out.write_all(&bytes)?;
        let entry = DictEntry {
            doc_freq: doc_freq as u32,
            offset: self.offset,
            length: bytes.len() as u64,
        };
        self.offset += entry.length;
        Ok(entry)
    }

    pub fn finish(mut self) -> Result<u64> {
        self.out.flush()?;
        Ok(self.offset)
    }
}

pub fn save_dictionary(path: &Path, dict: &Dictionary) -> Result<()> {
    let f = File::create(path)
        .with_context(|| format!("creating dictionary file {}", path.display()))?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, dict)?;
    w.flush()?;
    Ok(())
}

pub fn load_dictionary(path: &Path) -> Result<Dictionary> {
    let f = File::open(path)
        .with_context(|| format!("opening dictionary file {}", path.display()))?;
    let dict: Dictionary = bincode::deserialize_from(BufReader::new(f))
        .with_context(|| format!("decoding dictionary file {}", path.display()))?;
    Ok(dict)
}

/// Read-only handle over a built index. Each concurrent query needs its own.
pub struct IndexReader {
    dictionary: Dictionary,
    postings: File,
}

impl IndexReader {
    pub fn open(paths: &IndexPaths) -> Result<Self> {
        let dictionary = load_dictionary(&paths.dictionary)?;
        let postings = File::open(&paths.postings)
            .with_context(|| format!("opening postings file {}", paths.postings.display()))?;
        let found = postings.metadata()?.len();
        let expected = dictionary.meta.postings_bytes;
        if found != expected {
            bail!(
                "postings file {} has {found} bytes, its dictionary expects {expected}",
                paths.postings.display()
            );
        }
        Ok(Self { dictionary, postings })
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.dictionary.meta
    }

    pub fn num_docs(&self) -> usize {
        self.dictionary.meta.num_docs as usize
    }

    pub fn read_entry(&mut self, entry: &DictEntry) -> Result<PostingList> {
        self.read_record(entry)
    }

    fn read_record<T: DeserializeOwned>(&mut self, entry: &DictEntry) -> Result<T> {
        self.postings.seek(SeekFrom::Start(entry.offset))?;
        let mut buf = vec![0u8; entry.length as usize];
        self.postings.read_exact(&mut buf).context("reading posting record")?;
        let record = bincode::deserialize(&buf).context("decoding posting record")?;
        Ok(record)
    }

    /// Posting for `term` in `zone`; empty when the term is unknown.
    pub fn postings(&mut self, zone: Zone, term: &str) -> Result<PostingList> {
        match self.dictionary.lookup(zone, term).copied() {
            Some(entry) => self.read_entry(&entry),
            None => Ok(PostingList::default()),
        }
    }

    pub fn universe(&mut self) -> Result<SkipList> {
        let entry = self.dictionary.universe;
        self.read_record(&entry)
    }
}
