mod common;

use common::{build_tiny_index, ANIMALS};
use proptest::prelude::*;
use sift_core::error::QueryError;
use sift_core::persist::IndexReader;
use sift_core::posting::PostingMode;
use sift_core::query::{lex, to_postfix, BooleanProcessor, EvaluationStrategy};
use sift_core::tokenizer::Normalizer;
use sift_core::{DocId, Zone};
use std::collections::BTreeSet;
use tempfile::tempdir;

fn run(
    reader: &mut IndexReader,
    query: &str,
    strategy: EvaluationStrategy,
) -> anyhow::Result<Vec<DocId>> {
    let postfix = to_postfix(&lex(query, &Normalizer::default())?)?;
    Ok(BooleanProcessor::new(reader).evaluate(&postfix, strategy)?.into_ids())
}

fn both(reader: &mut IndexReader, query: &str) -> Vec<DocId> {
    let naive = run(reader, query, EvaluationStrategy::Naive).unwrap();
    let optimized = run(reader, query, EvaluationStrategy::Optimized).unwrap();
    assert_eq!(naive, optimized, "strategies disagree on {query:?}");
    optimized
}

#[test]
fn single_term_lookup() {
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, PostingMode::Ids, 100);
    assert_eq!(reader.dictionary().doc_freq(Zone::Content, "cat"), 2);
    assert_eq!(reader.postings(Zone::Content, "cat").unwrap().doc_ids().ids(), &[1, 3]);
    assert_eq!(both(&mut reader, "cat AND dog"), vec![1]);
    assert_eq!(both(&mut reader, "dog OR cat"), vec![1, 2, 3]);
    assert_eq!(both(&mut reader, "NOT dog"), vec![3]);
}

#[test]
fn unknown_terms_are_empty_postings() {
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, PostingMode::Ids, 100);
    assert_eq!(both(&mut reader, "cat AND zebra"), Vec::<DocId>::new());
    assert_eq!(both(&mut reader, "cat OR zebra"), vec![1, 3]);
    assert_eq!(both(&mut reader, "NOT zebra"), vec![1, 2, 3]);
}

#[test]
fn not_runs_cancel_by_parity() {
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, PostingMode::Ids, 100);
    assert_eq!(both(&mut reader, "NOT NOT dog"), vec![1, 2]);
    assert_eq!(both(&mut reader, "NOT NOT NOT dog"), vec![3]);
    assert_eq!(both(&mut reader, "cat AND NOT NOT NOT NOT dog"), vec![1]);
}

#[test]
fn malformed_query_is_a_query_error() {
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, PostingMode::Ids, 100);
    let err = run(&mut reader, "AND cat", EvaluationStrategy::Optimized).unwrap_err();
    assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::MissingOperand { position: 0 }));
}

#[test]
fn postfix_underflow_is_a_query_error() {
    use sift_core::query::Token;
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), ANIMALS, PostingMode::Ids, 100);
    let postfix = vec![Token::Term("cat".into()), Token::And];
    for strategy in [EvaluationStrategy::Naive, EvaluationStrategy::Optimized] {
        let err = BooleanProcessor::new(&mut reader).evaluate(&postfix, strategy).unwrap_err();
        assert_eq!(err.downcast_ref::<QueryError>(), Some(&QueryError::StackUnderflow));
    }
}

#[test]
fn phrases_need_adjacency_in_positional_mode() {
    let docs: &[(DocId, &str)] =
        &[(1, "new york pizza"), (2, "york is new"), (3, "a new york minute")];
    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), docs, PostingMode::Positional, 100);
    assert_eq!(both(&mut reader, "\"new york\""), vec![1, 3]);
    assert_eq!(both(&mut reader, "\"new york\" AND pizza"), vec![1]);
    assert_eq!(both(&mut reader, "\"new york pizza\" OR minute"), vec![1, 3]);

    let dir = tempdir().unwrap();
    let (_, mut reader) = build_tiny_index(dir.path(), docs, PostingMode::Ids, 100);
    assert_eq!(both(&mut reader, "\"new york\""), vec![1, 2, 3]);
}

/// Random boolean expression over a small vocabulary.
#[derive(Debug, Clone)]
enum Expr {
    Term(usize),
    And(Vec<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(usize, Box<Expr>),
}

const VOCAB: &[&str] = &["apple", "berry", "cherry", "date", "elder", "fig"];

fn expr() -> impl Strategy<Value = Expr> {
    let leaf = (0..VOCAB.len()).prop_map(Expr::Term);
    leaf.prop_recursive(4, 24, 4, |inner| {
        prop_oneof![
            proptest::collection::vec(inner.clone(), 2..5).prop_map(Expr::And),
            (inner.clone(), inner.clone()).prop_map(|(a, b)| Expr::Or(Box::new(a), Box::new(b))),
            (1usize..5, inner).prop_map(|(n, e)| Expr::Not(n, Box::new(e))),
        ]
    })
}

fn render(e: &Expr) -> String {
    match e {
        Expr::Term(i) => VOCAB[*i].to_string(),
        Expr::And(parts) => {
            format!("({})", parts.iter().map(render).collect::<Vec<_>>().join(" AND "))
        }
        Expr::Or(a, b) => format!("({} OR {})", render(a), render(b)),
        Expr::Not(n, inner) => format!("{}{}", "NOT ".repeat(*n), render(inner)),
    }
}

fn expected(e: &Expr, corpus: &[(DocId, BTreeSet<usize>)]) -> BTreeSet<DocId> {
    match e {
        Expr::Term(i) => {
            corpus.iter().filter(|(_, terms)| terms.contains(i)).map(|(id, _)| *id).collect()
        }
        Expr::And(parts) => {
            let mut sets = parts.iter().map(|p| expected(p, corpus));
            let first = sets.next().unwrap_or_default();
            sets.fold(first, |acc, s| acc.intersection(&s).copied().collect())
        }
        Expr::Or(a, b) => expected(a, corpus).union(&expected(b, corpus)).copied().collect(),
        Expr::Not(n, inner) => {
            let set = expected(inner, corpus);
            if n % 2 == 0 {
                set
            } else {
                corpus.iter().map(|(id, _)| *id).filter(|id| !set.contains(id)).collect()
            }
        }
    }
}

fn corpus() -> impl Strategy<Value = Vec<(DocId, BTreeSet<usize>)>> {
    proptest::collection::vec(proptest::collection::btree_set(0..VOCAB.len(), 1..4), 1..25)
        .prop_map(|docs| {
            docs.into_iter().enumerate().map(|(i, t)| (i as DocId * 3 + 1, t)).collect()
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn optimized_matches_left_to_right(
        corpus in corpus(),
        queries in proptest::collection::vec(expr(), 1..6),
    ) {
        let texts: Vec<(DocId, String)> = corpus
            .iter()
            .map(|(id, terms)| (*id, terms.iter().map(|i| VOCAB[*i]).collect::<Vec<_>>().join(" ")))
            .collect();
        let docs: Vec<(DocId, &str)> = texts.iter().map(|(id, t)| (*id, t.as_str())).collect();
        let dir = tempdir().unwrap();
        let (_, mut reader) = build_tiny_index(dir.path(), &docs, PostingMode::Ids, 5);
        for q in &queries {
            let text = render(q);
            let want: Vec<DocId> = expected(q, &corpus).into_iter().collect();
            let naive = run(&mut reader, &text, EvaluationStrategy::Naive).unwrap();
            let optimized = run(&mut reader, &text, EvaluationStrategy::Optimized).unwrap();
            prop_assert_eq!(&naive, &want, "naive {}", text);
            prop_assert_eq!(&optimized, &want, "optimized {}", text);
        }
    }
}
