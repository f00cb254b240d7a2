//! A random queue that keeps ordered chains in order.

use core::iter::FusedIterator;
use std::collections::VecDeque;

use super::chains::{ChainIter, ChainSet};
use super::TieBreak;
use crate::error::QueueError;

/// A queue whose elements come out in a uniformly random order, except
/// that chains added with [`push_ordered`] always come out in order.
///
/// See the [module documentation](crate::queue) for the exact distribution.
///
/// The queue owns its tie-breaking generator `R`.
///
/// [`push_ordered`]: OrderedRandomQueue::push_ordered
#[derive(Debug)]
pub struct OrderedRandomQueue<V, R> {
    chains: ChainSet<V>,
    rng: R,
}

impl<V, R: TieBreak> OrderedRandomQueue<V, R> {
    /// Creates an empty queue that breaks ties with `rng`.
    ///
    /// # Examples
    /// ```
    /// # use evsim_core::queue::OrderedRandomQueue;
    /// # use rand::{rngs::StdRng, SeedableRng};
    /// let mut queue = OrderedRandomQueue::<u32, _>::new(StdRng::seed_from_u64(7));
    ///
    /// assert!(queue.is_empty());
    /// assert_eq!(queue.poll(), None);
    /// ```
    pub fn new(rng: R) -> Self {
        Self {
            chains: ChainSet::new(),
            rng,
        }
    }

    /// Pushes a single element. Its position relative to everything else
    /// in the queue is random.
    pub fn push(&mut self, value: V) {
        self.chains.push_chain(VecDeque::from([value]));
    }

    /// Pushes a chain of elements that will be [polled] in iteration order.
    ///
    /// Other elements may be interleaved between the members of the chain,
    /// but the chain's own order is never broken, even if members are later
    /// [removed]. An empty iterator adds nothing.
    ///
    /// # Examples
    /// ```
    /// # use evsim_core::queue::OrderedRandomQueue;
    /// # use rand::{rngs::StdRng, SeedableRng};
    /// let mut queue = OrderedRandomQueue::new(StdRng::seed_from_u64(1));
    /// queue.push_ordered([1, 2, 3]);
    /// queue.push(10);
    ///
    /// let drained: Vec<_> = std::iter::from_fn(|| queue.poll()).collect();
    /// let chain: Vec<_> = drained.iter().copied().filter(|v| *v < 10).collect();
    /// assert_eq!(chain, [1, 2, 3]);
    /// assert_eq!(drained.len(), 4);
    /// ```
    ///
    /// [polled]: OrderedRandomQueue::poll
    /// [removed]: OrderedRandomQueue::remove
    pub fn push_ordered<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = V>,
    {
        self.chains.push_chain(values.into_iter().collect());
    }

    /// Returns the element that the next [`poll`] will return,
    /// or `None` if the queue is empty.
    ///
    /// Peeking may draw from the generator, which is why it takes `&mut self`.
    /// The draw is kept, so repeated peeks and the following poll agree as
    /// long as the queue is not modified in between.
    ///
    /// [`poll`]: OrderedRandomQueue::poll
    pub fn peek(&mut self) -> Option<&V> {
        self.chains.peek(&mut self.rng)
    }

    /// Removes and returns the next element, or `None` if the queue is empty.
    pub fn poll(&mut self) -> Option<V> {
        self.chains.poll(&mut self.rng)
    }

    /// Like [`peek`](OrderedRandomQueue::peek), but fails on an empty queue.
    pub fn element(&mut self) -> Result<&V, QueueError> {
        self.peek().ok_or(QueueError::Empty)
    }

    /// Like [`poll`](OrderedRandomQueue::poll), but fails on an empty queue.
    ///
    /// # Examples
    /// ```
    /// # use evsim_core::{queue::OrderedRandomQueue, QueueError};
    /// # use rand::{rngs::StdRng, SeedableRng};
    /// let mut queue = OrderedRandomQueue::new(StdRng::seed_from_u64(1));
    /// queue.push("only");
    ///
    /// assert_eq!(queue.remove_head(), Ok("only"));
    /// assert_eq!(queue.remove_head(), Err(QueueError::Empty));
    /// ```
    pub fn remove_head(&mut self) -> Result<V, QueueError> {
        self.poll().ok_or(QueueError::Empty)
    }
}

impl<V, R> OrderedRandomQueue<V, R> {
    /// Returns the number of elements in the queue.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Returns `true` if the queue holds no elements.
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    /// Removes every element. The generator is left as it is.
    pub fn clear(&mut self) {
        self.chains.clear()
    }

    /// Returns `true` if an element equal to `value` is in the queue.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.chains.contains_where(|v| v == value)
    }

    /// Removes one element equal to `value`, returning whether one was found.
    ///
    /// If the element was part of a chain, the rest of the chain keeps its order.
    pub fn remove(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.chains.remove_where(|v| v == value).is_some()
    }

    /// Removes and returns the first element found that matches `pred`.
    ///
    /// "First" refers to [iteration order](OrderedRandomQueue::iter),
    /// not to the order elements would be polled in.
    pub fn remove_where<F>(&mut self, pred: F) -> Option<V>
    where
        F: FnMut(&V) -> bool,
    {
        self.chains.remove_where(pred)
    }

    /// Returns an iterator over the current contents.
    ///
    /// The order is stable while the queue is unchanged, but it is
    /// not the order the elements will be polled in.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter {
            inner: self.chains.iter(),
        }
    }

    /// Returns a shared reference to the tie-breaking generator.
    pub fn rng(&self) -> &R {
        &self.rng
    }

    /// Consumes the queue, returning its generator.
    pub fn into_rng(self) -> R {
        self.rng
    }
}

impl<V, R: TieBreak> Extend<V> for OrderedRandomQueue<V, R> {
    /// Pushes every value on its own. Use [`push_ordered`] to keep them in order.
    ///
    /// [`push_ordered`]: OrderedRandomQueue::push_ordered
    fn extend<I: IntoIterator<Item = V>>(&mut self, iter: I) {
        for value in iter {
            self.push(value);
        }
    }
}

impl<'a, V, R> IntoIterator for &'a OrderedRandomQueue<V, R> {
    type Item = &'a V;
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// An iterator over the elements of an [`OrderedRandomQueue`].
///
/// This `struct` is created by [`OrderedRandomQueue::iter`].
pub struct Iter<'a, V> {
    inner: ChainIter<'a, V>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<'a, V> ExactSizeIterator for Iter<'a, V> {}
impl<'a, V> FusedIterator for Iter<'a, V> {}
