mod common;

use common::build_tiny_index;
use proptest::prelude::*;
use sift_core::persist::IndexReader;
use sift_core::posting::{PostingList, PostingMode};
use sift_core::{DocId, Zone};
use std::collections::BTreeMap;
use tempfile::tempdir;

const WORDS: &[&str] = &["red", "green", "blue", "cyan", "magenta", "yellow", "black", "white"];

/// Term -> (doc freq, decoded posting), independent of file offsets.
fn snapshot(reader: &mut IndexReader) -> BTreeMap<String, (u32, PostingList)> {
    let entries: Vec<(String, u32)> = reader
        .dictionary()
        .terms
        .iter()
        .map(|(term, entry)| (term.clone(), entry.doc_freq))
        .collect();
    entries
        .into_iter()
        .map(|(term, df)| {
            let posting = reader.postings(Zone::Content, &term).unwrap();
            (term, (df, posting))
        })
        .collect()
}

fn corpus() -> impl Strategy<Value = Vec<(DocId, String)>> {
    let doc = proptest::collection::vec(0..WORDS.len(), 0..12);
    proptest::collection::vec(doc, 0..30).prop_map(|docs| {
        docs.into_iter()
            .enumerate()
            .map(|(i, words)| {
                let text = words.iter().map(|w| WORDS[*w]).collect::<Vec<_>>().join(" ");
                (i as DocId + 1, text)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn block_merge_matches_single_block(
        corpus in corpus(),
        limit in 1usize..8,
        positional in any::<bool>(),
    ) {
        let mode = if positional { PostingMode::Positional } else { PostingMode::Ids };
        let docs: Vec<(DocId, &str)> = corpus.iter().map(|(id, t)| (*id, t.as_str())).collect();

        let small = tempdir().unwrap();
        let (_, mut blocked) = build_tiny_index(small.path(), &docs, mode, limit);
        let large = tempdir().unwrap();
        let (_, mut single) = build_tiny_index(large.path(), &docs, mode, usize::MAX);

        prop_assert_eq!(snapshot(&mut blocked), snapshot(&mut single));
        prop_assert_eq!(blocked.universe().unwrap(), single.universe().unwrap());
        prop_assert_eq!(&blocked.dictionary().doc_weights, &single.dictionary().doc_weights);

        for (term, (df, posting)) in snapshot(&mut blocked) {
            let ids = posting.doc_ids().ids().to_vec();
            prop_assert_eq!(df as usize, ids.len(), "df of {}", term);
            prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
        }
    }
}

#[test]
fn every_document_reaches_the_universe() {
    let docs: &[(DocId, &str)] = &[(2, "red"), (5, ""), (9, "blue red")];
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), docs, PostingMode::Ids, 1);
    assert_eq!(reader.universe().unwrap().ids(), &[2, 5, 9]);
    assert_eq!(reader.num_docs(), 3);
    assert_eq!(reader.postings(Zone::Content, "red").unwrap().doc_ids().ids(), &[2, 9]);
}
