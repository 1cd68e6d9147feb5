use serde::{Deserialize, Serialize};

pub mod config;
pub mod error;
pub mod persist;
pub mod posting;
pub mod query;
pub mod ranking;
pub mod setops;
pub mod skiplist;
pub mod spimi;
pub mod tokenizer;
pub mod topk;
pub mod weighting;

pub type DocId = u32;
pub type Position = u32;

/// Logical region of a document that is indexed and scored separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Zone {
    Content,
    Title,
}

/// Dictionary key used while building: zone first so a sorted block keeps
/// each zone's terms contiguous.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TermKey {
    pub zone: Zone,
    pub term: String,
}

impl TermKey {
    pub fn new(zone: Zone, term: impl Into<String>) -> Self {
        Self { zone, term: term.into() }
    }
}

/// Categorical importance of a document, applied as a score multiplier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Importance {
    High,
    Medium,
    #[default]
    Low,
}

impl Importance {
    pub fn multiplier(self) -> f64 {
        match self {
            Importance::High => config::HIGH_IMPORTANCE_MULTIPLIER,
            Importance::Medium => config::MEDIUM_IMPORTANCE_MULTIPLIER,
            Importance::Low => config::LOW_IMPORTANCE_MULTIPLIER,
        }
    }

    /// Accepts `high`/`medium`/`low` in any case, plus the single-letter tiers `h`/`m`/`l`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" | "h" => Some(Importance::High),
            "medium" | "m" => Some(Importance::Medium),
            "low" | "l" => Some(Importance::Low),
            _ => None,
        }
    }
}

/// Per-document scalars needed at query time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DocWeight {
    /// Euclidean length of the content zone's log-tf vector.
    pub content_length: f64,
    /// Euclidean length of the title zone's log-tf vector, 0 when untitled.
    pub title_length: f64,
    pub importance: Importance,
}

/// A normalized document as handed to the index builder.
#[derive(Debug, Clone, Default)]
pub struct Document {
    pub id: DocId,
    /// Content terms with their word positions.
    pub content: Vec<(String, Position)>,
    pub title: Vec<(String, Position)>,
    pub importance: Importance,
}

impl Document {
    pub fn new(id: DocId, content: Vec<(String, Position)>) -> Self {
        Self { id, content, ..Default::default() }
    }

    /// Convenience for callers that already hold bare terms; positions are sequential.
    pub fn from_terms<S: AsRef<str>>(id: DocId, terms: &[S]) -> Self {
        let content = terms
            .iter()
            .enumerate()
            .map(|(pos, t)| (t.as_ref().to_string(), pos as Position))
            .collect();
        Self::new(id, content)
    }

    pub fn with_title(mut self, title: Vec<(String, Position)>) -> Self {
        self.title = title;
        self
    }

    pub fn with_importance(mut self, importance: Importance) -> Self {
        self.importance = importance;
        self
    }
}
