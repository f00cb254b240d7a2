//! Error types for queue access and scheduling.

use thiserror::Error;

use crate::timing::Time;

/// Returned by the strict accessors of the random queues
/// ([`element`] and [`remove_head`]) when there is nothing to return.
///
/// [`element`]: crate::queue::OrderedRandomQueue::element
/// [`remove_head`]: crate::queue::OrderedRandomQueue::remove_head
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum QueueError {
    #[error("the queue is empty")]
    Empty,
}

/// An invalid argument passed when scheduling an activity.
///
/// A failed scheduling call never modifies the scheduler.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error("scheduling delay must not be negative (got {0})")]
    NegativeDelay(Time),
    #[error("a delay of {delay} after {now} is past the end of simulated time")]
    TimeOverflow { now: Time, delay: Time },
}
