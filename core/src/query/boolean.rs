//! Postfix evaluation against the on-disk index.

use super::{EvaluationStrategy, Token};
use crate::error::QueryError;
use crate::persist::IndexReader;
use crate::posting::{PositionalList, PostingList, PostingMode};
use crate::setops::{complement, intersect, intersect_naive, union};
use crate::skiplist::SkipList;
use crate::{Position, Zone};
use anyhow::Result;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Evaluates postfix queries, reading postings on demand. The universe is
/// loaded on first use and kept for the processor's lifetime.
pub struct BooleanProcessor<'r> {
    reader: &'r mut IndexReader,
    universe: Option<SkipList>,
}

/// Operand queued in a multi-AND run: smallest posting first, then the
/// order it entered the heap.
struct ByLength {
    len: usize,
    seq: usize,
    list: SkipList,
}

impl ByLength {
    fn key(&self) -> (usize, usize) {
        (self.len, self.seq)
    }
}

impl PartialEq for ByLength {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ByLength {}

impl Ord for ByLength {
    // Reversed so `BinaryHeap` pops the smallest key.
    fn cmp(&self, other: &Self) -> Ordering {
        other.key().cmp(&self.key())
    }
}

impl PartialOrd for ByLength {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<'r> BooleanProcessor<'r> {
    pub fn new(reader: &'r mut IndexReader) -> Self {
        Self { reader, universe: None }
    }

    pub fn evaluate(
        &mut self,
        postfix: &[Token],
        strategy: EvaluationStrategy,
    ) -> Result<SkipList> {
        match strategy {
            EvaluationStrategy::Naive => self.evaluate_naive(postfix),
            EvaluationStrategy::Optimized => self.evaluate_optimized(postfix),
        }
    }

    fn evaluate_naive(&mut self, postfix: &[Token]) -> Result<SkipList> {
        let mut stack: Vec<SkipList> = Vec::new();
        for token in postfix {
            let result = match token {
                Token::And | Token::Or => {
                    let right = pop(&mut stack)?;
                    let left = pop(&mut stack)?;
                    if *token == Token::And {
                        intersect_naive(&left, &right)
                    } else {
                        union(&left, &right)
                    }
                }
                Token::Not => {
                    let operand = pop(&mut stack)?;
                    complement(&operand, self.universe()?)
                }
                value => self.resolve(value)?,
            };
            stack.push(result);
        }
        finish(stack)
    }

    fn evaluate_optimized(&mut self, postfix: &[Token]) -> Result<SkipList> {
        let mut stack: Vec<SkipList> = Vec::new();
        let mut idx = 0;
        while idx < postfix.len() {
            let run = run_length(&postfix[idx..]);
            let result = match &postfix[idx] {
                Token::And => multi_and(&mut stack, run)?,
                Token::Or => {
                    let right = pop(&mut stack)?;
                    let left = pop(&mut stack)?;
                    union(&left, &right)
                }
                Token::Not => {
                    let operand = pop(&mut stack)?;
                    if run % 2 == 1 { complement(&operand, self.universe()?) } else { operand }
                }
                value => self.resolve(value)?,
            };
            if matches!(postfix[idx], Token::And | Token::Not) {
                idx += run;
            } else {
                idx += 1;
            }
            stack.push(result);
        }
        finish(stack)
    }

    fn universe(&mut self) -> Result<&SkipList> {
        if self.universe.is_none() {
            self.universe = Some(self.reader.universe()?);
        }
        Ok(self.universe.get_or_insert_with(SkipList::new))
    }

    /// Posting ids for a term or phrase; unknown terms give an empty list.
    fn resolve(&mut self, token: &Token) -> Result<SkipList> {
        match token {
            Token::Term(term) => Ok(self.reader.postings(Zone::Content, term)?.into_doc_ids()),
            Token::Phrase(terms) => self.resolve_phrase(terms),
            Token::Empty => Ok(SkipList::new()),
            _ => Err(QueryError::UnexpectedToken.into()),
        }
    }

    /// Offset-exact position match in a positional index; AND of the terms
    /// in an id-only index.
    fn resolve_phrase(&mut self, terms: &[(String, Position)]) -> Result<SkipList> {
        let mut lists = Vec::with_capacity(terms.len());
        for (term, _) in terms {
            let posting = self.reader.postings(Zone::Content, term)?;
            if posting.is_empty() {
                return Ok(SkipList::new());
            }
            lists.push(posting);
        }
        if self.reader.meta().mode == PostingMode::Ids {
            let mut lists = lists.into_iter().map(PostingList::into_doc_ids);
            let first = lists.next().unwrap_or_default();
            return Ok(lists.fold(first, |acc, next| intersect(&acc, &next)));
        }
        let mut matched: Option<PositionalList> = None;
        for ((_, offset), posting) in terms.iter().zip(lists) {
            let PostingList::Positional(list) = posting else { continue };
            matched = Some(match matched {
                None => list,
                Some(prev) => prev.followed_by(&list, *offset),
            });
        }
        Ok(matched.map(|m| m.ids).unwrap_or_default())
    }
}

/// Number of identical operator tokens starting at `tokens[0]`.
fn run_length(tokens: &[Token]) -> usize {
    match tokens.first() {
        Some(first @ (Token::And | Token::Not)) => {
            tokens.iter().take_while(|t| *t == first).count()
        }
        _ => 1,
    }
}

/// `ands` consecutive ANDs consume the top `ands + 1` operands. They are
/// intersected smallest pair first, re-queueing each intermediate result.
fn multi_and(stack: &mut Vec<SkipList>, ands: usize) -> Result<SkipList> {
    let mut heap = BinaryHeap::with_capacity(ands + 1);
    let mut seq = 0;
    for _ in 0..=ands {
        let list = pop(stack)?;
        heap.push(ByLength { len: list.len(), seq, list });
        seq += 1;
    }
    while heap.len() > 1 {
        let (Some(a), Some(b)) = (heap.pop(), heap.pop()) else { break };
        let list = intersect(&a.list, &b.list);
        heap.push(ByLength { len: list.len(), seq, list });
        seq += 1;
    }
    Ok(heap.pop().map(|top| top.list).unwrap_or_default())
}

fn pop(stack: &mut Vec<SkipList>) -> Result<SkipList, QueryError> {
    stack.pop().ok_or(QueryError::StackUnderflow)
}

fn finish(mut stack: Vec<SkipList>) -> Result<SkipList> {
    match stack.len() {
        1 => Ok(pop(&mut stack)?),
        0 => Err(QueryError::StackUnderflow.into()),
        count => Err(QueryError::DanglingOperands { count }.into()),
    }
}
