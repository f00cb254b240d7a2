//! Randomly ordered queues with ordered chains.
//!
//! The queues in this module release their elements in a random order,
//! with one exception: elements pushed together with `push_ordered` form a
//! *chain*, and the members of a chain always come out in the order they
//! were pushed in, no matter what else is added or removed around them.
//!
//! # Ordering guarantee
//!
//! Taken together, the chains in a queue form a partial order. Draining
//! the queue produces a linear extension of that partial order, and every
//! linear extension is **equally likely**. For example if one pushes `s`
//! on its own and then pushes `[a, b]` ordered, draining the queue yields
//! `s a b`, `a s b` or `a b s`, each with probability 1/3. It also means
//! that the next element is drawn from a chain with probability
//! proportional to how many elements the chain still holds, so above `a`
//! is twice as likely as `s` to be first.
//!
//! This is equivalent to drawing a uniformly random time in `[0, 1)` for
//! every element, sorting each chain's times into its push order, and then
//! releasing elements by time.
//!
//! # Randomness
//!
//! All tie-breaking goes through the [`TieBreak`] trait, which every
//! [`rand::Rng`] implements. A queue owns its generator, and the sequence of
//! draws it makes is a pure function of the operations performed on it.
//! Two queues built with identically seeded generators and given the same
//! operations therefore behave identically.

mod chains;
pub mod keyed;
pub mod ordered;

pub use keyed::RandomPriorityQueue;
pub use ordered::OrderedRandomQueue;

use rand::Rng;

/// A source of tie-breaking decisions.
pub trait TieBreak {
    /// Returns an index drawn uniformly from `0..n`.
    ///
    /// `n` is never zero.
    fn pick(&mut self, n: usize) -> usize;
}

impl<R: Rng + ?Sized> TieBreak for R {
    fn pick(&mut self, n: usize) -> usize {
        self.gen_range(0..n)
    }
}
