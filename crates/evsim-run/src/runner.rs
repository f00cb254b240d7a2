//! Driving configured runs to completion.

use evsim_core::{EventProxy, EventQueue, Time};
use rand::{rngs::StdRng, SeedableRng};
use tracing::{debug, info, info_span};

use crate::{
    config::{ConfigError, SimConfig},
    seed::PositionalSeed,
};

/// What happened during one run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    /// The index of the run in its batch.
    pub run: u32,
    /// The seed the run's generator was created from.
    pub seed: u64,
    /// How many activities were executed.
    pub executed: u64,
    /// The current time when the run finished.
    pub final_time: Time,
    /// How many activities were still waiting when the run finished.
    pub remaining: usize,
}

/// Runs a single simulation from `seed` until `length`.
///
/// `setup` is given the fresh event queue to schedule the initial activities.
pub fn run_simulation<F>(run: u32, seed: u64, length: Time, setup: F) -> RunSummary
where
    F: FnOnce(&mut EventQueue<'static, StdRng>),
{
    let _span = info_span!("run", run, seed).entered();

    let mut queue = EventQueue::new(StdRng::seed_from_u64(seed));
    setup(&mut queue);
    debug!(scheduled = queue.len(), "initial activities scheduled");

    queue.execute_until(length);

    let summary = RunSummary {
        run,
        seed,
        executed: queue.executed(),
        final_time: queue.current_time(),
        remaining: queue.len(),
    };
    info!(
        executed = summary.executed,
        remaining = summary.remaining,
        final_time = %summary.final_time,
        "run finished"
    );
    summary
}

/// Validates `config`, then performs every configured run in order.
///
/// Run `i` is seeded with [`PositionalSeed::seed_for(i)`](PositionalSeed::seed_for)
/// of the configured master seed, and `setup` is called with the run index and
/// the run's queue before the run starts.
///
/// # Examples
/// ```
/// # use evsim_core::{EventProxyExt, Time};
/// # use evsim_run::{run_simulations, SimConfig};
/// let config = SimConfig::new(42, Time::of(100)).with_num_sims(3);
///
/// let summaries = run_simulations(&config, |_, queue| {
///     queue.schedule_in(Time::of(10), |_| {}).unwrap();
///     queue.schedule_in(Time::of(500), |_| {}).unwrap();
/// })?;
///
/// assert_eq!(summaries.len(), 3);
/// for summary in &summaries {
///     assert_eq!(summary.executed, 1);
///     assert_eq!(summary.remaining, 1);
///     assert_eq!(summary.final_time, Time::of(100));
/// }
/// # Ok::<(), evsim_run::ConfigError>(())
/// ```
pub fn run_simulations<F>(
    config: &SimConfig,
    mut setup: F,
) -> Result<Vec<RunSummary>, ConfigError>
where
    F: FnMut(u32, &mut EventQueue<'static, StdRng>),
{
    config.validate()?;
    info!(
        seed = config.random_seed,
        runs = config.num_sims,
        length = %config.sim_length,
        "starting simulations"
    );

    let seeds = PositionalSeed::with(config.random_seed);
    let summaries = (0..config.num_sims)
        .map(|run| {
            let seed = seeds.seed_for(u64::from(run));
            run_simulation(run, seed, config.sim_length, |queue| setup(run, queue))
        })
        .collect();
    Ok(summaries)
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use evsim_core::{ActivityContext, EventProxyExt};

    use super::*;

    // Every ticket schedules its successor one tick later, in bursts of three
    // simultaneous tickets.
    fn tickets(queue: &mut EventQueue<'static, StdRng>, log: &Rc<RefCell<Vec<(Time, u32)>>>) {
        fn ticket(
            id: u32,
            log: Rc<RefCell<Vec<(Time, u32)>>>,
        ) -> impl FnOnce(&mut ActivityContext<'_, 'static>) {
            move |cx: &mut ActivityContext<'_, 'static>| {
                log.borrow_mut().push((cx.current_time(), id));
                if id < 30 {
                    cx.schedule_in(Time::of(1), ticket(id + 3, log)).unwrap();
                }
            }
        }
        for id in 0..3 {
            queue.schedule_in(Time::ZERO, ticket(id, log.clone())).unwrap();
        }
    }

    #[test]
    fn runs_are_reproducible_and_distinct() {
        let config = SimConfig::new(5, Time::of(20)).with_num_sims(4);
        let logs: Vec<_> = (0..4).map(|_| Rc::new(RefCell::new(Vec::new()))).collect();
        let again: Vec<_> = (0..4).map(|_| Rc::new(RefCell::new(Vec::new()))).collect();

        let first =
            run_simulations(&config, |run, queue| tickets(queue, &logs[run as usize])).unwrap();
        let second =
            run_simulations(&config, |run, queue| tickets(queue, &again[run as usize])).unwrap();

        assert_eq!(first, second);
        for (a, b) in logs.iter().zip(&again) {
            assert_eq!(*a.borrow(), *b.borrow());
        }

        let seeds: Vec<_> = first.iter().map(|s| s.seed).collect();
        let expected: Vec<_> = (0..4).map(|run| PositionalSeed::with(5).seed_for(run)).collect();
        assert_eq!(seeds, expected);

        for summary in &first {
            // tickets 0..=32 all fit well inside the run
            assert_eq!(summary.executed, 33);
            assert_eq!(summary.remaining, 0);
            assert_eq!(summary.final_time, Time::of(20));
        }
    }

    #[test]
    fn invalid_config_runs_nothing() {
        let config = SimConfig::new(5, Time::of(-1));
        let mut called = false;
        let result = run_simulations(&config, |_, _| called = true);
        assert!(matches!(result, Err(ConfigError::NegativeLength(_))));
        assert!(!called);
    }

    #[test]
    fn single_run_reports_leftovers() {
        let summary = run_simulation(0, 99, Time::of(10), |queue| {
            queue.schedule_in(Time::of(5), |_| {}).unwrap();
            queue.schedule_in(Time::of(50), |_| {}).unwrap();
        });
        assert_eq!(
            summary,
            RunSummary {
                run: 0,
                seed: 99,
                executed: 1,
                final_time: Time::of(10),
                remaining: 1,
            }
        );
    }
}
