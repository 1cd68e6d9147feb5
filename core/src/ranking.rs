//! Cosine ranking with lnc.ltc weighting.
//!
//! Query terms are weighted `(1 + log10 tf) * log10(N / df)` and the query
//! vector is length-normalized. Document terms are weighted `1 + log10 tf`
//! and divided by the document's zone length. Scores are accumulated
//! sparsely by streaming each query term's postings, so only documents
//! sharing a term with the query are ever scored. Zone scores combine
//! linearly and the sum is scaled by the document's importance tier.

use crate::config::{CONTENT_ZONE_WEIGHT, TITLE_ZONE_WEIGHT};
use crate::persist::IndexReader;
use crate::topk::{select, Scored};
use crate::weighting::{log_tf, vector_length, TfIdf};
use crate::{DocId, Zone};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap};

/// Linear weights for combining per-zone scores.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneWeights {
    pub content: f64,
    pub title: f64,
}

impl ZoneWeights {
    /// Fixed title/content split when the index has titles, content alone otherwise.
    pub fn for_index(has_titles: bool) -> Self {
        if has_titles {
            Self { content: CONTENT_ZONE_WEIGHT, title: TITLE_ZONE_WEIGHT }
        } else {
            Self { content: 1.0, title: 0.0 }
        }
    }

    fn zones(self) -> impl Iterator<Item = (Zone, f64)> {
        [(Zone::Content, self.content), (Zone::Title, self.title)]
            .into_iter()
            .filter(|(_, w)| *w > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankOptions {
    /// `None` returns every scored document.
    pub top_k: Option<usize>,
    pub positive_only: bool,
}

pub struct VectorSpaceModel<'r> {
    reader: &'r mut IndexReader,
    weights: ZoneWeights,
}

impl<'r> VectorSpaceModel<'r> {
    pub fn new(reader: &'r mut IndexReader) -> Self {
        let weights = ZoneWeights::for_index(reader.dictionary().has_titles());
        Self { reader, weights }
    }

    /// Ranked documents for a bag of query terms, best first.
    pub fn rank(&mut self, terms: &[String], options: RankOptions) -> Result<Vec<Scored>> {
        let mut query_tf: BTreeMap<&str, u32> = BTreeMap::new();
        for term in terms {
            *query_tf.entry(term.as_str()).or_insert(0) += 1;
        }

        let mut combined: HashMap<DocId, f64> = HashMap::new();
        for (zone, weight) in self.weights.zones() {
            for (doc_id, score) in self.cosine_scores(zone, &query_tf)? {
                *combined.entry(doc_id).or_insert(0.0) += weight * score;
            }
        }

        let doc_weights = &self.reader.dictionary().doc_weights;
        let scored = combined.into_iter().map(|(doc_id, score)| {
            let multiplier = doc_weights.get(&doc_id).map_or(1.0, |w| w.importance.multiplier());
            Scored::new(score * multiplier, doc_id)
        });
        let ranked = if options.positive_only {
            select(scored.filter(|s| s.score.0 > 0.0), options.top_k)
        } else {
            select(scored, options.top_k)
        };
        Ok(ranked)
    }

    /// Cosine score of every document sharing a term with the query in `zone`.
    pub fn cosine_scores(
        &mut self,
        zone: Zone,
        query_tf: &BTreeMap<&str, u32>,
    ) -> Result<HashMap<DocId, f64>> {
        let n = self.reader.num_docs();
        let dictionary = self.reader.dictionary();
        let mut query_weights: Vec<(&str, f64)> = query_tf
            .iter()
            .filter_map(|(&term, &tf)| {
                let df = dictionary.doc_freq(zone, term) as usize;
                (df > 0).then(|| (term, TfIdf::QUERY.weight(tf, n, df)))
            })
            .collect();
        let query_length = vector_length(query_weights.iter().map(|(_, w)| *w));
        if query_length > 0.0 {
            for (_, w) in query_weights.iter_mut() {
                *w /= query_length;
            }
        }

        let mut scores: HashMap<DocId, f64> = HashMap::new();
        for (term, wtq) in query_weights {
            let posting = self.reader.postings(zone, term)?;
            for (doc_id, tf) in posting.term_frequencies() {
                let length = self.doc_length(zone, doc_id);
                let wtd = if length > 0.0 { log_tf(tf) / length } else { log_tf(tf) };
                *scores.entry(doc_id).or_insert(0.0) += wtq * wtd;
            }
        }
        Ok(scores)
    }

    fn doc_length(&self, zone: Zone, doc_id: DocId) -> f64 {
        self.reader.dictionary().doc_weights.get(&doc_id).map_or(0.0, |w| match zone {
            Zone::Content => w.content_length,
            Zone::Title => w.title_length,
        })
    }
}
