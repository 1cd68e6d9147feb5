mod common;

use common::{build_tiny_index, ANIMALS};
use sift_core::config::BuildConfig;
use sift_core::persist::{IndexPaths, IndexReader};
use sift_core::posting::PostingMode;
use sift_core::ranking::{RankOptions, VectorSpaceModel};
use sift_core::spimi::build_index;
use sift_core::tokenizer::Normalizer;
use sift_core::{DocId, Document, Importance};
use tempfile::tempdir;

const ALL: RankOptions = RankOptions { top_k: None, positive_only: true };

fn ids(ranked: &[sift_core::topk::Scored]) -> Vec<DocId> {
    ranked.iter().map(|s| s.doc_id).collect()
}

fn terms(text: &str) -> Vec<String> {
    Normalizer::default().terms(text)
}

#[test]
fn single_term_prefers_focused_document() {
    for mode in [PostingMode::Ids, PostingMode::Positional] {
        let dir = tempdir().unwrap();
        let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, mode, 100);
        let ranked = VectorSpaceModel::new(&mut reader).rank(&terms("cat"), ALL).unwrap();
        assert_eq!(ids(&ranked), vec![3, 1]);
    }
}

#[test]
fn default_build_ranks_by_term_frequency() {
    let frequent = format!("{} dog", "cat ".repeat(10));
    let docs: &[(DocId, &str)] = &[(1, "cat dog"), (2, frequent.as_str()), (3, "bird")];
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path());
    let n = Normalizer::default();
    let input = docs.iter().map(|(id, text)| Ok(Document::new(*id, n.positioned_terms(text))));
    build_index(input, BuildConfig::default(), &paths).unwrap();
    let mut reader = IndexReader::open(&paths).unwrap();
    assert_eq!(reader.meta().mode, PostingMode::Ids);

    let ranked = VectorSpaceModel::new(&mut reader).rank(&terms("cat"), ALL).unwrap();
    assert_eq!(ids(&ranked), vec![2, 1]);
    assert!(ranked[0].score > ranked[1].score);
}

#[test]
fn id_only_and_positional_scores_agree() {
    let docs: &[(DocId, &str)] = &[(1, "cat dog cat"), (2, "dog dog bird"), (3, "cat bird")];
    let ids_dir = tempdir().unwrap();
    let (_, mut ids_reader) = build_tiny_index(ids_dir.path(), docs, PostingMode::Ids, 2);
    let pos_dir = tempdir().unwrap();
    let (_, mut pos_reader) = build_tiny_index(pos_dir.path(), docs, PostingMode::Positional, 2);

    let query = terms("cat dog dog");
    let a = VectorSpaceModel::new(&mut ids_reader).rank(&query, ALL).unwrap();
    let b = VectorSpaceModel::new(&mut pos_reader).rank(&query, ALL).unwrap();
    assert_eq!(ids(&a), ids(&b));
    for (x, y) in a.iter().zip(&b) {
        assert!((x.score.0 - y.score.0).abs() < 1e-12);
    }
}

#[test]
fn cosine_values_follow_lnc_ltc() {
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, PostingMode::Positional, 100);
    let ranked = VectorSpaceModel::new(&mut reader).rank(&terms("cat"), ALL).unwrap();
    // A one-term query normalizes to weight 1; doc 3 is all "cat", doc 1 is half.
    assert!((ranked[0].score.0 - 1.0).abs() < 1e-9);
    assert!((ranked[1].score.0 - 1.0 / 2f64.sqrt()).abs() < 1e-9);
}

#[test]
fn term_in_every_document_scores_zero() {
    let dir = tempdir().unwrap();
    let docs: &[(DocId, &str)] = &[(1, "dog"), (2, "dog cat")];
    let (_, mut reader) = build_tiny_index(dir.path(), docs, PostingMode::Ids, 100);
    let mut model = VectorSpaceModel::new(&mut reader);
    assert!(model.rank(&terms("dog"), ALL).unwrap().is_empty());
    let options = RankOptions { top_k: None, positive_only: false };
    let unfiltered = model.rank(&terms("dog"), options).unwrap();
    assert_eq!(ids(&unfiltered), vec![1, 2]);
}

#[test]
fn top_k_bounds_results() {
    let docs: Vec<(DocId, String)> =
        (1..=20).map(|i| (i, format!("rust {}", "x ".repeat(i as usize)))).collect();
    let docs: Vec<(DocId, &str)> = docs.iter().map(|(i, t)| (*i, t.as_str())).collect();
    let mut all = docs.clone();
    all.push((21, "python"));
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), &all, PostingMode::Positional, 64);
    let ranked = VectorSpaceModel::new(&mut reader)
        .rank(&terms("rust"), RankOptions { top_k: Some(5), positive_only: true })
        .unwrap();
    assert_eq!(ranked.len(), 5);
    assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
    assert_eq!(ranked[0].doc_id, 1);
}

#[test]
fn unknown_terms_score_nothing() {
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, PostingMode::Ids, 100);
    assert!(VectorSpaceModel::new(&mut reader).rank(&terms("zebra"), ALL).unwrap().is_empty());
}

#[test]
fn zones_and_importance_shape_the_ranking() {
    let dir = tempdir().unwrap();
    let paths = IndexPaths::in_dir(dir.path());
    let n = Normalizer::default();
    let docs = vec![
        Ok(Document::new(1, n.positioned_terms("contract breach damages"))
            .with_title(n.positioned_terms("contract law"))),
        Ok(Document::new(2, n.positioned_terms("contract breach damages"))
            .with_title(n.positioned_terms("tort law"))),
        Ok(Document::new(3, n.positioned_terms("contract breach damages"))
            .with_title(n.positioned_terms("tort law"))
            .with_importance(Importance::High)),
        Ok(Document::new(4, n.positioned_terms("unrelated text here"))),
    ];
    let config = BuildConfig { mode: PostingMode::Positional, ..Default::default() };
    build_index(docs, config, &paths).unwrap();
    let mut reader = IndexReader::open(&paths).unwrap();
    assert!(reader.dictionary().has_titles());

    let ranked = VectorSpaceModel::new(&mut reader).rank(&terms("contract"), ALL).unwrap();
    // Doc 3's tier multiplier outweighs doc 1's title match; doc 1 beats doc 2.
    assert_eq!(ids(&ranked), vec![3, 1, 2]);
}
