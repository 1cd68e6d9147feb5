//! Bounded top-K selection over scored documents.

use crate::DocId;
use ordered_float::OrderedFloat;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

/// Score paired with a document id. Higher scores rank first; equal scores
/// rank the smaller id first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scored {
    pub score: OrderedFloat<f64>,
    pub doc_id: DocId,
}

impl Scored {
    pub fn new(score: f64, doc_id: DocId) -> Self {
        Self { score: OrderedFloat(score), doc_id }
    }
}

impl Ord for Scored {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score).then_with(|| other.doc_id.cmp(&self.doc_id))
    }
}

impl PartialOrd for Scored {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Keeps the `k` best items seen so far in a min-heap of size at most `k`.
#[derive(Debug, Clone)]
pub struct TopK<T: Ord> {
    k: usize,
    heap: BinaryHeap<Reverse<T>>,
}

impl<T: Ord> TopK<T> {
    pub fn new(k: usize) -> Self {
        Self { k, heap: BinaryHeap::with_capacity(k.saturating_add(1).min(1024)) }
    }

    pub fn add(&mut self, item: T) {
        self.heap.push(Reverse(item));
        if self.heap.len() > self.k {
            self.heap.pop();
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Best first.
    pub fn into_sorted_vec(self) -> Vec<T> {
        // Reverse<T> ascending is T descending.
        self.heap.into_sorted_vec().into_iter().map(|Reverse(item)| item).collect()
    }
}

impl<T: Ord> Extend<T> for TopK<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.add(item);
        }
    }
}

/// Best `k` items (all of them when `k` is `None`), best first.
pub fn select<T: Ord, I: IntoIterator<Item = T>>(items: I, k: Option<usize>) -> Vec<T> {
    match k {
        Some(k) => {
            let mut top = TopK::new(k);
            top.extend(items);
            top.into_sorted_vec()
        }
        None => {
            let mut all: Vec<T> = items.into_iter().collect();
            all.sort_unstable_by(|a, b| b.cmp(a));
            all
        }
    }
}
