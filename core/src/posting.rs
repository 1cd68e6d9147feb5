//! Posting payloads, id-only or positional.
//!
//! [`PostingBuf`] is the mutable form held in SPIMI blocks; [`PostingList`]
//! is what the postings file stores. The variant is fixed per index by its
//! [`PostingMode`].

use crate::setops::union_ids;
use crate::skiplist::SkipList;
use crate::{DocId, Position};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostingMode {
    #[default]
    Ids,
    Positional,
}

/// Block-resident posting for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostingBuf {
    /// `(doc, tf)` pairs.
    Ids(Vec<(DocId, u32)>),
    Positional(Vec<(DocId, Vec<Position>)>),
}

impl PostingBuf {
    pub fn new(mode: PostingMode) -> Self {
        match mode {
            PostingMode::Ids => PostingBuf::Ids(Vec::new()),
            PostingMode::Positional => PostingBuf::Positional(Vec::new()),
        }
    }

    /// Records one occurrence and returns how many in-memory entries it added.
    /// Documents must be added in ascending order.
    pub fn add(&mut self, doc_id: DocId, position: Position) -> usize {
        match self {
            PostingBuf::Ids(entries) => match entries.last_mut() {
                Some((last, tf)) if *last == doc_id => {
                    *tf += 1;
                    0
                }
                _ => {
                    entries.push((doc_id, 1));
                    1
                }
            },
            PostingBuf::Positional(entries) => {
                match entries.last_mut() {
                    Some((last, positions)) if *last == doc_id => positions.push(position),
                    _ => entries.push((doc_id, vec![position])),
                }
                1
            }
        }
    }

    pub fn doc_freq(&self) -> usize {
        match self {
            PostingBuf::Ids(entries) => entries.len(),
            PostingBuf::Positional(entries) => entries.len(),
        }
    }

    /// Sorted-set union of two block postings for the same term. A document
    /// present in both halves appears once; its counts or position runs are
    /// combined.
    pub fn merge(self, other: PostingBuf) -> PostingBuf {
        match (self, other) {
            (PostingBuf::Ids(a), PostingBuf::Ids(b)) => {
                PostingBuf::Ids(merge_by_doc(a, b, |x, y| x + y))
            }
            (PostingBuf::Positional(a), PostingBuf::Positional(b)) => {
                PostingBuf::Positional(merge_by_doc(a, b, |pa, pb| union_ids(&pa, &pb)))
            }
            (PostingBuf::Ids(a), PostingBuf::Positional(b))
            | (PostingBuf::Positional(b), PostingBuf::Ids(a)) => {
                let b = b.into_iter().map(|(id, pos)| (id, pos.len() as u32)).collect();
                PostingBuf::Ids(merge_by_doc(a, b, |x, y| x + y))
            }
        }
    }

    pub fn into_posting_list(self) -> PostingList {
        match self {
            PostingBuf::Ids(entries) => {
                let (ids, counts): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
                PostingList::Ids(CountedList { ids: SkipList::from_sorted(ids), counts })
            }
            PostingBuf::Positional(entries) => {
                let (ids, positions): (Vec<_>, Vec<_>) = entries.into_iter().unzip();
                let ids = SkipList::from_sorted(ids);
                PostingList::Positional(PositionalList { ids, positions })
            }
        }
    }
}

fn merge_by_doc<T>(
    a: Vec<(DocId, T)>,
    b: Vec<(DocId, T)>,
    combine: impl Fn(T, T) -> T,
) -> Vec<(DocId, T)> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let mut a = a.into_iter().peekable();
    let mut b = b.into_iter().peekable();
    loop {
        let order = match (a.peek(), b.peek()) {
            (Some((x, _)), Some((y, _))) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match order {
            Ordering::Less => out.extend(a.next()),
            Ordering::Greater => out.extend(b.next()),
            Ordering::Equal => {
                if let (Some((id, va)), Some((_, vb))) = (a.next(), b.next()) {
                    out.push((id, combine(va, vb)));
                }
            }
        }
    }
    out
}

/// Skip list of ids with the term's frequency in each document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountedList {
    pub ids: SkipList,
    pub counts: Vec<u32>,
}

impl CountedList {
    pub fn iter(&self) -> impl Iterator<Item = (DocId, u32)> + '_ {
        self.ids.iter().zip(self.counts.iter().copied())
    }
}

/// Skip list of ids with a parallel arena of ascending positions per id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PositionalList {
    pub ids: SkipList,
    pub positions: Vec<Vec<Position>>,
}

impl PositionalList {
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DocId, &[Position])> + '_ {
        self.ids.iter().zip(self.positions.iter().map(Vec::as_slice))
    }

    /// Documents where `next` occurs at `offset` words after some position of
    /// `self`. The result keeps the positions of `self` (the phrase start).
    pub fn followed_by(&self, next: &PositionalList, offset: Position) -> PositionalList {
        let mut ids = Vec::new();
        let mut positions = Vec::new();
        let (mut i, mut j) = (0, 0);
        while let (Some(x), Some(y)) = (self.ids.get(i), next.ids.get(j)) {
            match x.cmp(&y) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    let starts: Vec<Position> = self.positions[i]
                        .iter()
                        .copied()
                        .filter(|p| next.positions[j].binary_search(&(p + offset)).is_ok())
                        .collect();
                    if !starts.is_empty() {
                        ids.push(x);
                        positions.push(starts);
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        PositionalList { ids: SkipList::from_sorted(ids), positions }
    }
}

/// Persisted posting for one term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PostingList {
    Ids(CountedList),
    Positional(PositionalList),
}

impl Default for PostingList {
    fn default() -> Self {
        PostingList::Ids(CountedList::default())
    }
}

impl PostingList {
    pub fn doc_ids(&self) -> &SkipList {
        match self {
            PostingList::Ids(list) => &list.ids,
            PostingList::Positional(list) => &list.ids,
        }
    }

    pub fn into_doc_ids(self) -> SkipList {
        match self {
            PostingList::Ids(list) => list.ids,
            PostingList::Positional(list) => list.ids,
        }
    }

    pub fn len(&self) -> usize {
        self.doc_ids().len()
    }

    pub fn is_empty(&self) -> bool {
        self.doc_ids().is_empty()
    }

    /// `(doc, tf)` pairs in id order.
    pub fn term_frequencies(&self) -> Vec<(DocId, u32)> {
        match self {
            PostingList::Ids(list) => list.iter().collect(),
            PostingList::Positional(list) => {
                list.iter().map(|(id, pos)| (id, pos.len() as u32)).collect()
            }
        }
    }
}
