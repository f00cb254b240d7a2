//! A min-priority queue with randomly ordered ties.

use std::collections::{btree_map, BTreeMap, VecDeque};
use std::iter::FusedIterator;

use super::chains::{ChainIter, ChainSet};
use super::TieBreak;
use crate::error::QueueError;

/// A smallest-key-first priority queue. Elements that share a key come out
/// in the random order described in the [module documentation](crate::queue).
///
/// Every key has its own set of chains, and all of them draw from the one
/// generator owned by the queue.
#[derive(Debug)]
pub struct RandomPriorityQueue<K, V, R> {
    // a key is present only while it has at least one element
    groups: BTreeMap<K, ChainSet<V>>,
    len: usize,
    rng: R,
}

impl<K: Ord + Clone, V, R: TieBreak> RandomPriorityQueue<K, V, R> {
    /// Creates an empty queue that breaks ties with `rng`.
    pub fn new(rng: R) -> Self {
        Self {
            groups: BTreeMap::new(),
            len: 0,
            rng,
        }
    }

    /// Pushes a single element with the specified key.
    pub fn push(&mut self, key: K, value: V) {
        self.push_chain(key, VecDeque::from([value]));
    }

    /// Pushes a chain of elements that all share `key`.
    /// They will be polled in the order they are yielded by `values`.
    ///
    /// # Examples
    /// ```
    /// # use evsim_core::queue::RandomPriorityQueue;
    /// # use rand::{rngs::StdRng, SeedableRng};
    /// let mut queue = RandomPriorityQueue::new(StdRng::seed_from_u64(0));
    ///
    /// queue.push(5, "late");
    /// queue.push_ordered(1, ["first", "second", "third"]);
    ///
    /// assert_eq!(queue.poll(), Some((1, "first")));
    /// assert_eq!(queue.poll(), Some((1, "second")));
    /// assert_eq!(queue.poll(), Some((1, "third")));
    /// assert_eq!(queue.poll(), Some((5, "late")));
    /// assert_eq!(queue.poll(), None);
    /// ```
    pub fn push_ordered<I>(&mut self, key: K, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        self.push_chain(key, values.into_iter().collect());
    }

    /// Pushes one chain per key, in the iteration order of `groups`.
    pub fn extend_ordered<I, C>(&mut self, groups: I)
    where
        I: IntoIterator<Item = (K, C)>,
        C: IntoIterator<Item = V>,
    {
        for (key, values) in groups {
            self.push_ordered(key, values);
        }
    }

    fn push_chain(&mut self, key: K, chain: VecDeque<V>) {
        if chain.is_empty() {
            return;
        }
        self.len += chain.len();
        self.groups.entry(key).or_default().push_chain(chain);
    }

    /// Returns the entry the next [`poll`] will return, or `None` if the queue is empty.
    ///
    /// [`poll`]: RandomPriorityQueue::poll
    pub fn peek(&mut self) -> Option<(&K, &V)> {
        let (key, chains) = self.groups.iter_mut().next()?;
        let value = chains.peek(&mut self.rng)?;
        Some((key, value))
    }

    /// Removes and returns the entry with the smallest key. Ties are broken
    /// randomly, respecting chains.
    pub fn poll(&mut self) -> Option<(K, V)> {
        let mut first = self.groups.first_entry()?;
        let value = first.get_mut().poll(&mut self.rng)?;
        self.len -= 1;
        if first.get().is_empty() {
            let (key, _) = first.remove_entry();
            Some((key, value))
        } else {
            Some((first.key().clone(), value))
        }
    }

    /// Like [`peek`](RandomPriorityQueue::peek), but fails on an empty queue.
    pub fn element(&mut self) -> Result<(&K, &V), QueueError> {
        self.peek().ok_or(QueueError::Empty)
    }

    /// Like [`poll`](RandomPriorityQueue::poll), but fails on an empty queue.
    pub fn remove_head(&mut self) -> Result<(K, V), QueueError> {
        self.poll().ok_or(QueueError::Empty)
    }
}

impl<K: Ord, V, R> RandomPriorityQueue<K, V, R> {
    /// Returns the smallest key in the queue without drawing from the generator.
    pub fn peek_key(&self) -> Option<&K> {
        self.groups.keys().next()
    }

    /// Returns the number of elements in the queue.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        self.groups.clear();
        self.len = 0;
    }

    /// Returns `true` if an element equal to `value` is in the queue, under any key.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.groups
            .values()
            .any(|chains| chains.contains_where(|v| v == value))
    }

    /// Returns an iterator over `(key, value)` pairs in ascending key order.
    /// Within one key the order is unspecified.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            groups: self.groups.iter(),
            current: None,
            len: self.len,
        }
    }

    /// Returns a shared reference to the tie-breaking generator.
    pub fn rng(&self) -> &R {
        &self.rng
    }
}

impl<K: Ord + Clone, V, R> RandomPriorityQueue<K, V, R> {
    /// Removes one element equal to `value`, returning whether one was found.
    ///
    /// If the element was part of a chain, the rest of the chain keeps its order.
    pub fn remove(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.remove_where(|v| v == value).is_some()
    }

    /// Removes and returns the first element matching `pred`, searching keys
    /// in ascending order.
    pub fn remove_where<F>(&mut self, mut pred: F) -> Option<(K, V)>
    where
        F: FnMut(&V) -> bool,
    {
        let mut found = None;
        for (key, chains) in self.groups.iter_mut() {
            if let Some(value) = chains.remove_where(&mut pred) {
                found = Some((key.clone(), value));
                break;
            }
        }
        let (key, value) = found?;
        self.len -= 1;
        if self.groups.get(&key).map_or(false, ChainSet::is_empty) {
            self.groups.remove(&key);
        }
        Some((key, value))
    }
}

impl<'a, K: Ord, V, R> IntoIterator for &'a RandomPriorityQueue<K, V, R> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the entries of a [`RandomPriorityQueue`].
///
/// This `struct` is created by [`RandomPriorityQueue::iter`].
pub struct Iter<'a, K, V> {
    groups: btree_map::Iter<'a, K, ChainSet<V>>,
    current: Option<(&'a K, ChainIter<'a, V>)>,
    len: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((key, values)) = &mut self.current {
                if let Some(value) = values.next() {
                    self.len -= 1;
                    return Some((*key, value));
                }
            }
            let (key, chains) = self.groups.next()?;
            self.current = Some((key, chains.iter()));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.len, Some(self.len))
    }
}

impl<'a, K, V> ExactSizeIterator for Iter<'a, K, V> {}
impl<'a, K, V> FusedIterator for Iter<'a, K, V> {}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};

    use super::*;

    fn queue<K: Ord + Clone, V>(seed: u64) -> RandomPriorityQueue<K, V, StdRng> {
        RandomPriorityQueue::new(StdRng::seed_from_u64(seed))
    }

    #[test]
    fn basic() {
        let mut q = queue(0);
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);

        q.push(1, 1);
        assert!(!q.is_empty());
        assert_eq!(q.len(), 1);
        assert_eq!(q.peek(), Some((&1, &1)));
        assert_eq!(q.remove_head(), Ok((1, 1)));
        assert!(q.is_empty());

        q.push(3, 3);
        q.push(2, 2);
        assert_eq!(q.peek_key(), Some(&2));
        assert_eq!(q.element(), Ok((&2, &2)));
        assert_eq!(q.len(), 2);
        assert_eq!(q.poll(), Some((2, 2)));
        assert_eq!(q.poll(), Some((3, 3)));
        assert_eq!(q.poll(), None);
        assert_eq!(q.len(), 0);
    }

    #[test]
    fn empty_accessors() {
        let mut q = queue::<u32, u32>(0);
        assert_eq!(q.peek(), None);
        assert_eq!(q.poll(), None);
        assert_eq!(q.peek_key(), None);
        assert_eq!(q.element(), Err(QueueError::Empty));
        assert_eq!(q.remove_head(), Err(QueueError::Empty));
    }

    #[test]
    fn keys_come_out_ascending() {
        let mut shuffler = StdRng::seed_from_u64(99);
        let mut keys = vec![1, 2, 3];
        let mut q = queue(1);
        for _ in 0..1000 {
            keys.shuffle(&mut shuffler);
            for &k in &keys {
                q.push(k, k);
            }
            assert_eq!(q.poll(), Some((1, 1)));
            assert_eq!(q.len(), 2);
            assert_eq!(q.poll(), Some((2, 2)));
            assert_eq!(q.len(), 1);
            assert_eq!(q.poll(), Some((3, 3)));
            assert!(q.is_empty());
            assert_eq!(q.poll(), None);
        }
    }

    #[test]
    fn singleton_and_chain_give_three_orders() {
        let mut seen = HashSet::new();
        for seed in 0..1000 {
            let mut q = queue(seed);
            q.push(0, 0);
            q.push_ordered(0, [1, 2]);
            let out: Vec<_> = core::iter::from_fn(|| q.poll()).map(|(_, v)| v).collect();
            let a = out.iter().position(|v| *v == 1);
            let b = out.iter().position(|v| *v == 2);
            assert!(a < b);
            seen.insert(out);
        }
        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn extend_ordered_groups_by_key() {
        let mut q = queue(4);
        q.extend_ordered([(2, vec!["c", "d"]), (1, vec!["a", "b"]), (3, vec![])]);
        assert_eq!(q.len(), 4);
        let out: Vec<_> = core::iter::from_fn(|| q.poll()).collect();
        assert_eq!(out, [(1, "a"), (1, "b"), (2, "c"), (2, "d")]);
    }

    #[test]
    fn remove_drops_emptied_key() {
        let mut q = queue(5);
        q.push(1, 10);
        q.push_ordered(2, [20, 21]);
        assert!(q.contains(&10));
        assert!(q.remove(&10));
        assert!(!q.contains(&10));
        assert_eq!(q.peek_key(), Some(&2));
        assert_eq!(q.remove_where(|v| *v == 21), Some((2, 21)));
        assert_eq!(q.remove_where(|v| *v == 21), None);
        assert_eq!(q.len(), 1);
        assert_eq!(q.poll(), Some((2, 20)));
        assert_eq!(q.peek_key(), None);
    }

    #[test]
    fn iterates_in_key_order() {
        let mut q = queue(6);
        q.push(3, 'z');
        q.push_ordered(1, ['a', 'b']);
        q.push(2, 'm');
        let keys: Vec<_> = q.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, [1, 1, 2, 3]);
        assert_eq!(q.iter().len(), 4);
        let values: HashSet<_> = (&q).into_iter().map(|(_, v)| *v).collect();
        assert_eq!(values, HashSet::from(['a', 'b', 'm', 'z']));
    }

    #[test]
    fn clear_empties() {
        let mut q = queue(7);
        q.push_ordered(0, [1, 2, 3]);
        assert!(!q.is_empty());
        q.clear();
        assert!(q.is_empty());
        assert_eq!(q.len(), 0);
        assert_eq!(q.poll(), None);
    }
}
