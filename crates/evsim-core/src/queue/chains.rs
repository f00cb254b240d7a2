//! The chain bookkeeping shared by both random queues.

use std::collections::VecDeque;
use std::iter::{Flatten, FusedIterator};
use std::slice;

use super::TieBreak;

/// A set of chains with no generator of its own.
///
/// The queues own the generator and lend it to every call that may need a
/// draw, so that one generator can serve many chain sets.
#[derive(Debug)]
pub(crate) struct ChainSet<V> {
    // never contains an empty chain
    chains: Vec<VecDeque<V>>,
    len: usize,
    // when set, the last chain has already been drawn as the source of the
    // next element. any change to the chains clears this.
    picked: bool,
}

impl<V> ChainSet<V> {
    pub(crate) const fn new() -> Self {
        Self {
            chains: Vec::new(),
            len: 0,
            picked: false,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Adds a chain. Empty chains are ignored.
    pub(crate) fn push_chain(&mut self, chain: VecDeque<V>) {
        if chain.is_empty() {
            return;
        }
        self.len += chain.len();
        self.chains.push(chain);
        self.picked = false;
    }

    // Moves the chain holding the next element to the end of `chains`.
    //
    // Each chain is chosen with probability proportional to its remaining
    // length, which makes every linear extension of the chains equally likely.
    fn pick<T: TieBreak + ?Sized>(&mut self, rng: &mut T) {
        if self.picked || self.chains.is_empty() {
            return;
        }
        let last = self.chains.len() - 1;
        let mut remaining = rng.pick(self.len);
        debug_assert!(remaining < self.len);
        let index = self
            .chains
            .iter()
            .position(|chain| {
                if remaining < chain.len() {
                    true
                } else {
                    remaining -= chain.len();
                    false
                }
            })
            .unwrap_or(last);
        self.chains.swap(index, last);
        self.picked = true;
    }

    pub(crate) fn peek<T: TieBreak + ?Sized>(&mut self, rng: &mut T) -> Option<&V> {
        self.pick(rng);
        self.chains.last().and_then(VecDeque::front)
    }

    pub(crate) fn poll<T: TieBreak + ?Sized>(&mut self, rng: &mut T) -> Option<V> {
        self.pick(rng);
        self.picked = false;
        let mut chain = self.chains.pop()?;
        let out = chain.pop_front();
        self.len -= 1;
        if !chain.is_empty() {
            self.chains.push(chain);
        }
        out
    }

    pub(crate) fn contains_where<F: FnMut(&V) -> bool>(&self, mut pred: F) -> bool {
        self.chains.iter().flatten().any(|v| pred(v))
    }

    /// Removes the first element matching `pred`. The remaining members of
    /// its chain keep their relative order.
    pub(crate) fn remove_where<F: FnMut(&V) -> bool>(&mut self, mut pred: F) -> Option<V> {
        let (ci, vi) = self.chains.iter().enumerate().find_map(|(ci, chain)| {
            chain.iter().position(|v| pred(v)).map(|vi| (ci, vi))
        })?;
        let out = self.chains[ci].remove(vi);
        if self.chains[ci].is_empty() {
            self.chains.swap_remove(ci);
        }
        self.len -= 1;
        self.picked = false;
        out
    }

    pub(crate) fn clear(&mut self) {
        self.chains.clear();
        self.len = 0;
        self.picked = false;
    }

    pub(crate) fn iter(&self) -> ChainIter<'_, V> {
        ChainIter {
            inner: self.chains.iter().flatten(),
            len: self.len,
        }
    }
}

impl<V> Default for ChainSet<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterates over every element of a chain set, chain by chain.
pub(crate) struct ChainIter<'a, V> {
    inner: Flatten<slice::Iter<'a, VecDeque<V>>>,
    len: usize,
}

impl<'a, V> Iterator for ChainIter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        let out = self.inner.next()?;
        self.len -= 1;
        Some(out)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, V> ExactSizeIterator for ChainIter<'a, V> {}
impl<'a, V> FusedIterator for ChainIter<'a, V> {}
