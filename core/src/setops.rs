//! Merge-based set operations over skip lists.
//!
//! Every operation builds a fresh list and reconstructs its skip pointers
//! for the new length before returning it.

use crate::skiplist::SkipList;
use crate::DocId;
use std::cmp::Ordering;

/// Intersection that follows skip pointers when the landing id does not
/// pass the other side's current id.
pub fn intersect(a: &SkipList, b: &SkipList) -> SkipList {
    let mut out = Vec::with_capacity(a.len().min(b.len()));
    let (mut i, mut j) = (0, 0);
    while let (Some(x), Some(y)) = (a.get(i), b.get(j)) {
        match x.cmp(&y) {
            Ordering::Equal => {
                out.push(x);
                i += 1;
                j += 1;
            }
            Ordering::Less => i = advance(a, i, y),
            Ordering::Greater => j = advance(b, j, x),
        }
    }
    SkipList::from_sorted(out)
}

/// Next index to visit in `list` from `index`, whose id is below `target`.
#[inline]
fn advance(list: &SkipList, index: usize, target: DocId) -> usize {
    match list.skip(index) {
        Some(to) if list.get(to).is_some_and(|id| id <= target) => to,
        _ => index + 1,
    }
}

/// Plain two-pointer intersection without skips; the reference for `intersect`.
pub fn intersect_naive(a: &SkipList, b: &SkipList) -> SkipList {
    let mut out = Vec::new();
    let (mut i, mut j) = (0, 0);
    while let (Some(x), Some(y)) = (a.get(i), b.get(j)) {
        match x.cmp(&y) {
            Ordering::Equal => {
                out.push(x);
                i += 1;
                j += 1;
            }
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
        }
    }
    SkipList::from_sorted(out)
}

pub fn union(a: &SkipList, b: &SkipList) -> SkipList {
    SkipList::from_sorted(union_ids(a.ids(), b.ids()))
}

/// Sorted-set union of two strictly ascending id slices.
pub fn union_ids(a: &[DocId], b: &[DocId]) -> Vec<DocId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            Ordering::Equal => {
                out.push(a[i]);
                i += 1;
                j += 1;
            }
            Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Every universe id absent from `operand`.
pub fn complement(operand: &SkipList, universe: &SkipList) -> SkipList {
    let mut out = Vec::with_capacity(universe.len().saturating_sub(operand.len()));
    let mut j = 0;
    for id in universe.iter() {
        while operand.get(j).is_some_and(|x| x < id) {
            j += 1;
        }
        if operand.get(j) != Some(id) {
            out.push(id);
        }
    }
    SkipList::from_sorted(out)
}
