//! Index-addressed skip list over ascending document ids.
//!
//! Ids live in a flat vector; skip pointers are a parallel vector of
//! optional forward indices. A pointer sits at index `i` iff
//! `i % step == 0 && i + step < n` with `step = floor(sqrt(n))`.

use crate::DocId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<DocId>", into = "Vec<DocId>")]
pub struct SkipList {
    ids: Vec<DocId>,
    skips: Vec<Option<usize>>,
}

/// Pointer spacing for a list of `n` ids.
pub fn skip_step(n: usize) -> usize {
    (n as f64).sqrt().floor() as usize
}

impl SkipList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds from ids that are already strictly ascending.
    pub fn from_sorted(ids: Vec<DocId>) -> Self {
        debug_assert!(ids.windows(2).all(|w| w[0] < w[1]), "ids must be strictly ascending");
        let mut list = Self { ids, skips: Vec::new() };
        list.reconstruct();
        list
    }

    /// Recomputes every skip pointer for the current length. Pointers from
    /// a previous length are discarded, never reused.
    pub fn reconstruct(&mut self) {
        let n = self.ids.len();
        let step = skip_step(n);
        self.skips.clear();
        self.skips.resize(n, None);
        if step == 0 {
            return;
        }
        let mut i = 0;
        while i + step < n {
            self.skips[i] = Some(i + step);
            i += step;
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<DocId> {
        self.ids.get(index).copied()
    }

    /// Target index of the skip pointer at `index`, if one exists.
    #[inline]
    pub fn skip(&self, index: usize) -> Option<usize> {
        self.skips.get(index).copied().flatten()
    }

    pub fn ids(&self) -> &[DocId] {
        &self.ids
    }

    pub fn into_ids(self) -> Vec<DocId> {
        self.ids
    }

    pub fn iter(&self) -> impl Iterator<Item = DocId> + '_ {
        self.ids.iter().copied()
    }
}

impl From<Vec<DocId>> for SkipList {
    fn from(ids: Vec<DocId>) -> Self {
        Self::from_sorted(ids)
    }
}

impl From<SkipList> for Vec<DocId> {
    fn from(list: SkipList) -> Self {
        list.ids
    }
}

impl FromIterator<DocId> for SkipList {
    fn from_iter<I: IntoIterator<Item = DocId>>(iter: I) -> Self {
        Self::from_sorted(iter.into_iter().collect())
    }
}
