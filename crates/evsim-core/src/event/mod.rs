//! The event dispatch loop.
//!
//! An [`EventQueue`] owns the simulated clock and every activity that has
//! been scheduled but not yet run. Activities are closures. They are run one
//! at a time, each to completion, in order of their scheduled time.
//!
//! # The current time
//!
//! Many operations refer to the "current time" of the queue. This is
//!
//! > **the time of the activity most recently executed, or the time most
//! > recently passed to [`execute_until`], whichever is later.**
//!
//! Delays passed to [`schedule_in`] are relative to the current time, and
//! the current time never decreases.
//!
//! # Ordering of simultaneous activities
//!
//! Activities scheduled for the same time run in a random order, with one
//! constraint: everything a single running activity schedules for one time
//! forms an ordered chain, and runs in the order it was scheduled in. Calls
//! made from outside the dispatch loop are independent of each other.
//!
//! For example, if an activity schedules `A` and then `B` for time `t`,
//! and `Y` was scheduled for `t` from outside, the possible orders are
//! `Y A B`, `A Y B` and `A B Y`, each equally likely. Newly scheduled
//! activities become part of this random ordering at the start of the next
//! dispatch. See [`queue`](crate::queue) for the exact distribution.
//!
//! All randomness comes from the generator passed to [`EventQueue::new`],
//! so a run is fully reproducible from the generator's seed.
//!
//! [`execute_until`]: EventQueue::execute_until
//! [`schedule_in`]: EventProxyExt::schedule_in

mod pending;

use core::fmt;

use tracing::{debug, trace};

use self::pending::Pending;
use crate::{
    error::ScheduleError,
    queue::{RandomPriorityQueue, TieBreak},
    timing::Time,
};

/// A unit of work run by the [`EventQueue`].
///
/// The context it receives can be used to read the current time and to
/// schedule further activities.
pub type Activity<'a> = Box<dyn FnOnce(&mut ActivityContext<'_, 'a>) + 'a>;

/// Identifies one scheduled activity, for use with [`EventQueue::cancel`].
///
/// Ids are unique within one event queue and increase with every scheduling call.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ActivityId(u64);

impl ActivityId {
    /// Returns the raw sequence number of the id.
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ActivityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

pub(crate) struct Scheduled<'a> {
    id: ActivityId,
    activity: Activity<'a>,
}

/// The scheduling interface shared by the [`EventQueue`] and
/// the [`ActivityContext`] handed to running activities.
pub trait EventProxy<'a> {
    /// Returns the current time of the simulation.
    fn current_time(&self) -> Time;

    /// Schedules `activity` to run `delay` ticks after the current time.
    ///
    /// A `delay` of zero is allowed and schedules for the current time.
    ///
    /// # Errors
    /// Fails without scheduling anything if `delay` is negative, or if the
    /// target time cannot be represented.
    fn schedule_activity_in(
        &mut self,
        delay: Time,
        activity: Activity<'a>,
    ) -> Result<ActivityId, ScheduleError>;
}

/// Convenience methods for every [`EventProxy`].
pub trait EventProxyExt<'a>: EventProxy<'a> {
    /// Schedules a closure to run `delay` ticks after the current time.
    ///
    /// See [`EventProxy::schedule_activity_in`].
    fn schedule_in<F>(&mut self, delay: Time, activity: F) -> Result<ActivityId, ScheduleError>
    where
        F: FnOnce(&mut ActivityContext<'_, 'a>) + 'a,
    {
        self.schedule_activity_in(delay, Box::new(activity))
    }
}
impl<'a, P: EventProxy<'a> + ?Sized> EventProxyExt<'a> for P {}

/// The view of the event queue available to a running activity.
///
/// Everything one activity schedules for the same time forms an ordered
/// chain: those activities run in the order they were scheduled in.
pub struct ActivityContext<'q, 'a> {
    now: Time,
    running: ActivityId,
    pending: &'q mut Pending<'a>,
}

impl<'q, 'a> ActivityContext<'q, 'a> {
    /// Returns the id of the activity that is running.
    pub fn id(&self) -> ActivityId {
        self.running
    }
}

impl<'q, 'a> EventProxy<'a> for ActivityContext<'q, 'a> {
    fn current_time(&self) -> Time {
        self.now
    }

    fn schedule_activity_in(
        &mut self,
        delay: Time,
        activity: Activity<'a>,
    ) -> Result<ActivityId, ScheduleError> {
        self.pending
            .schedule(Some(self.running), self.now, delay, activity)
    }
}

/// A discrete event scheduler with randomized ordering of simultaneous activities.
///
/// # Examples
/// ```
/// # use std::{cell::RefCell, rc::Rc};
/// # use evsim_core::{EventProxy, EventProxyExt, EventQueue, Time};
/// # use rand::{rngs::StdRng, SeedableRng};
/// let log = Rc::new(RefCell::new(Vec::new()));
/// let mut queue = EventQueue::new(StdRng::seed_from_u64(0));
///
/// let l = log.clone();
/// queue.schedule_in(Time::of(5), move |cx| {
///     l.borrow_mut().push(cx.current_time());
///     // activities may schedule more activities while they run
///     cx.schedule_in(Time::of(2), move |cx| {
///         l.borrow_mut().push(cx.current_time());
///     })
///     .unwrap();
/// }).unwrap();
///
/// queue.execute_until(Time::of(20));
///
/// assert_eq!(*log.borrow(), [Time::of(5), Time::of(7)]);
/// assert_eq!(queue.current_time(), Time::of(20));
/// ```
pub struct EventQueue<'a, R> {
    now: Time,
    committed: RandomPriorityQueue<Time, Scheduled<'a>, R>,
    pending: Pending<'a>,
    executed: u64,
}

impl<'a, R: TieBreak> EventQueue<'a, R> {
    /// Creates an empty event queue at [`Time::ZERO`].
    ///
    /// `rng` decides the order of simultaneous activities, and must not
    /// be shared with anything else for the run to be reproducible.
    pub fn new(rng: R) -> Self {
        Self {
            now: Time::ZERO,
            committed: RandomPriorityQueue::new(rng),
            pending: Pending::new(),
            executed: 0,
        }
    }

    /// Runs every activity scheduled at or before `time`, including those
    /// scheduled by other activities along the way, then moves the current
    /// time forward to `time` if it is not there yet.
    ///
    /// Returns the number of activities that were run.
    ///
    /// # Panics
    /// Panics if an activity is ever found scheduled before the current time.
    /// That can only be the result of a bug in the queue.
    pub fn execute_until(&mut self, time: Time) -> usize {
        let mut executed = 0;
        while self.has_activities_until(time) {
            let Some((at, scheduled)) = self.pop() else {
                break;
            };
            self.now = at;
            trace!(id = %scheduled.id, %at, "executing activity");

            let mut cx = ActivityContext {
                now: at,
                running: scheduled.id,
                pending: &mut self.pending,
            };
            (scheduled.activity)(&mut cx);
            executed += 1;
        }
        self.executed += executed as u64;

        if time > self.now {
            debug!(from = %self.now, to = %time, "advancing idle time");
            self.now = time;
        }
        executed
    }

    // Commits the pending chains and takes the next activity.
    fn pop(&mut self) -> Option<(Time, Scheduled<'a>)> {
        self.merge_pending();
        let (at, scheduled) = self.committed.poll()?;
        assert!(
            at >= self.now,
            "activity {} for {at} was dispatched when the current time was already {}",
            scheduled.id,
            self.now,
        );
        Some((at, scheduled))
    }

    fn merge_pending(&mut self) {
        let batch = self.pending.take();
        if batch.is_empty() {
            return;
        }
        debug!(chains = batch.len(), "committing pending activities");
        // chains arrive in ascending time order
        for (at, chain) in batch {
            trace!(%at, len = chain.len(), "committing chain");
            self.committed.push_ordered(at, chain);
        }
    }
}

impl<'a, R> EventQueue<'a, R> {
    fn has_activities_until(&self, time: Time) -> bool {
        self.committed.peek_key().is_some_and(|&at| at <= time)
            || self.pending.first_time().is_some_and(|at| at <= time)
    }

    /// Cancels an activity that has not run yet.
    ///
    /// Returns `false` if there is no such activity, either because it already
    /// ran or because it was already cancelled. Other activities that were
    /// scheduled in the same chain keep their order.
    pub fn cancel(&mut self, id: ActivityId) -> bool {
        let removed = self.pending.cancel(id)
            || self
                .committed
                .remove_where(|scheduled| scheduled.id == id)
                .is_some();
        if removed {
            trace!(%id, "cancelled activity");
        }
        removed
    }

    /// Returns the number of activities waiting to run.
    pub fn len(&self) -> usize {
        self.committed.len() + self.pending.len()
    }

    /// Returns `true` if no activities are waiting to run.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the total number of activities run so far.
    pub fn executed(&self) -> u64 {
        self.executed
    }

    /// Returns the earliest time any waiting activity is scheduled for.
    pub fn next_time(&self) -> Option<Time> {
        match (self.committed.peek_key().copied(), self.pending.first_time()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }
}

impl<'a, R: TieBreak> EventProxy<'a> for EventQueue<'a, R> {
    fn current_time(&self) -> Time {
        self.now
    }

    fn schedule_activity_in(
        &mut self,
        delay: Time,
        activity: Activity<'a>,
    ) -> Result<ActivityId, ScheduleError> {
        // calls from outside the dispatch loop are never chained together
        self.pending.schedule(None, self.now, delay, activity)
    }
}

impl<'a, R> fmt::Debug for EventQueue<'a, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventQueue")
            .field("now", &self.now)
            .field("committed", &self.committed.len())
            .field("pending", &self.pending.len())
            .field("executed", &self.executed)
            .finish()
    }
}
