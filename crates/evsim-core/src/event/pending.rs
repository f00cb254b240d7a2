//! Activities that have been scheduled but not yet committed.

use std::collections::BTreeMap;
use std::mem;

use tracing::trace;

use super::{Activity, ActivityId, Scheduled};
use crate::error::ScheduleError;
use crate::timing::Time;

// One ordered run of activities for a single time.
struct Chain<'a> {
    // the running activity that scheduled this chain, `None` for calls
    // made from outside the dispatch loop
    origin: Option<ActivityId>,
    activities: Vec<Scheduled<'a>>,
}

/// Newly scheduled activities, grouped by target time into chains.
///
/// Everything one running activity schedules for one time is appended to a
/// single chain, in call order. Each call made from outside the dispatch
/// loop starts a chain of its own. The whole buffer is handed to the
/// committed queue at the start of every dispatch cycle.
pub(crate) struct Pending<'a> {
    chains: BTreeMap<Time, Vec<Chain<'a>>>,
    len: usize,
    next_id: u64,
}

impl<'a> Pending<'a> {
    pub(crate) const fn new() -> Self {
        Self {
            chains: BTreeMap::new(),
            len: 0,
            next_id: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Returns the earliest time anything is pending at.
    pub(crate) fn first_time(&self) -> Option<Time> {
        self.chains.keys().next().copied()
    }

    /// Appends `activity` to the chain that `origin` is building for `now + delay`.
    ///
    /// Nothing is changed when an error is returned.
    pub(crate) fn schedule(
        &mut self,
        origin: Option<ActivityId>,
        now: Time,
        delay: Time,
        activity: Activity<'a>,
    ) -> Result<ActivityId, ScheduleError> {
        if delay.is_negative() {
            return Err(ScheduleError::NegativeDelay(delay));
        }
        let at = now
            .checked_add(delay)
            .ok_or(ScheduleError::TimeOverflow { now, delay })?;

        let id = ActivityId(self.next_id);
        self.next_id += 1;
        let scheduled = Scheduled { id, activity };

        let group = self.chains.entry(at).or_default();
        match group.last_mut() {
            Some(chain) if origin.is_some() && chain.origin == origin => {
                chain.activities.push(scheduled)
            }
            _ => group.push(Chain {
                origin,
                activities: vec![scheduled],
            }),
        }
        self.len += 1;
        trace!(%id, %now, %at, "scheduled activity");
        Ok(id)
    }

    /// Removes the activity with the given id, keeping the rest of its chain in order.
    pub(crate) fn cancel(&mut self, id: ActivityId) -> bool {
        let found = self.chains.iter().find_map(|(&at, group)| {
            group.iter().enumerate().find_map(|(ci, chain)| {
                chain
                    .activities
                    .iter()
                    .position(|scheduled| scheduled.id == id)
                    .map(|ai| (at, ci, ai))
            })
        });
        let Some((at, ci, ai)) = found else {
            return false;
        };
        if let Some(group) = self.chains.get_mut(&at) {
            group[ci].activities.remove(ai);
            if group[ci].activities.is_empty() {
                group.remove(ci);
            }
            if group.is_empty() {
                self.chains.remove(&at);
            }
        }
        self.len -= 1;
        true
    }

    /// Takes every pending chain, in ascending time order.
    pub(crate) fn take(&mut self) -> Vec<(Time, Vec<Scheduled<'a>>)> {
        self.len = 0;
        mem::take(&mut self.chains)
            .into_iter()
            .flat_map(|(at, group)| group.into_iter().map(move |chain| (at, chain.activities)))
            .collect()
    }
}
