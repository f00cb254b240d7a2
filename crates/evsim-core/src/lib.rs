//! A discrete event scheduler with reproducible, randomly ordered ties.
//!
//! See [`EventQueue`] for the dispatch loop and [`queue`] for the random
//! queues it is built on.

pub mod error;
pub mod event;
pub mod queue;
pub mod timing;

pub use error::{QueueError, ScheduleError};
pub use event::{Activity, ActivityContext, ActivityId, EventProxy, EventProxyExt, EventQueue};
pub use queue::{OrderedRandomQueue, RandomPriorityQueue, TieBreak};
pub use timing::Time;
