//! Poll scheduler
//!
//! Drives a [`Poller`] on a fixed interval: one cycle immediately, then one
//! per tick for as long as the future is polled. Cycles are spawned onto the
//! current [`tokio::task::LocalSet`], so `run` must be awaited inside one.

use std::rc::Rc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;

use crate::chart::ChartSurface;
use crate::page::Page;
use crate::poller::{OverlapPolicy, Poller, POLL_INTERVAL_MS};
use crate::source::SensorSource;

/// Interval loop around a shared poller
pub struct Scheduler<Src, P, S>
where
    S: ChartSurface,
{
    poller: Rc<Poller<Src, P, S>>,
    interval: Duration,
    policy: OverlapPolicy,
}

impl<Src, P, S> Scheduler<Src, P, S>
where
    Src: SensorSource + 'static,
    P: Page + 'static,
    S: ChartSurface + 'static,
{
    /// Schedule `poller` every [`POLL_INTERVAL_MS`]
    pub fn new(poller: Rc<Poller<Src, P, S>>, policy: OverlapPolicy) -> Self {
        Self {
            poller,
            interval: Duration::from_millis(POLL_INTERVAL_MS as u64),
            policy,
        }
    }

    pub fn poller(&self) -> &Rc<Poller<Src, P, S>> {
        &self.poller
    }

    pub fn policy(&self) -> OverlapPolicy {
        self.policy
    }

    /// Tick forever. The first tick fires immediately.
    ///
    /// Each cycle runs as its own local task, so a slow fetch never delays
    /// the next tick. Dropping this future stops new cycles; cycles already
    /// spawned run to completion on the `LocalSet`.
    pub async fn run(&self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            source = %self.poller.source().describe(),
            interval_ms = self.interval.as_millis() as u64,
            overlap = %self.policy,
            "Polling sensor data"
        );

        loop {
            ticker.tick().await;

            if !self.poller.should_start(self.policy) {
                continue;
            }

            let poller = Rc::clone(&self.poller);
            tokio::task::spawn_local(async move {
                poller.run_cycle().await;
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::{MemorySurface, Renderer};
    use crate::error::SourceError;
    use crate::page::{MemoryPage, TEMPERATURE_ID};
    use crate::reading::{Reading, ReadingBatch};
    use async_trait::async_trait;
    use std::cell::Cell;
    use tokio::task::LocalSet;

    /// Answers after `delay` with a single reading whose temperature is the
    /// number of the request
    struct SlowSource {
        delay: Duration,
        requests: Cell<u32>,
    }

    #[async_trait(?Send)]
    impl SensorSource for SlowSource {
        async fn fetch(&self) -> Result<ReadingBatch, SourceError> {
            let n = self.requests.get() + 1;
            self.requests.set(n);
            tokio::time::sleep(self.delay).await;
            Ok(ReadingBatch::new(vec![Reading::new(
                "2024-01-02 10:00:00",
                n as f64,
                50.0,
            )]))
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    fn scheduler(delay_ms: u64, policy: OverlapPolicy) -> Scheduler<SlowSource, MemoryPage, MemorySurface> {
        let mut renderer = Renderer::new();
        renderer.initialize(MemorySurface::default()).unwrap();
        let source = SlowSource {
            delay: Duration::from_millis(delay_ms),
            requests: Cell::new(0),
        };
        Scheduler::new(
            Rc::new(Poller::new(source, MemoryPage::dashboard(), renderer)),
            policy,
        )
    }

    async fn run_for(scheduler: &Scheduler<SlowSource, MemoryPage, MemorySurface>, ms: u64) {
        let local = LocalSet::new();
        local
            .run_until(async {
                let _ = tokio::time::timeout(Duration::from_millis(ms), scheduler.run()).await;
            })
            .await;
        // Let spawned cycles finish
        local.await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_immediately_then_every_interval() {
        let scheduler = scheduler(10, OverlapPolicy::Allow);
        run_for(&scheduler, 4_500).await;

        let stats = scheduler.poller().stats();
        assert_eq!(stats.started, 3);
        assert_eq!(stats.rendered, 3);
        assert_eq!(scheduler.poller().page().text(TEMPERATURE_ID), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_allow_overlaps_slow_cycles() {
        let scheduler = scheduler(5_000, OverlapPolicy::Allow);
        run_for(&scheduler, 4_500).await;

        let stats = scheduler.poller().stats();
        assert_eq!(stats.started, 3);
        assert_eq!(stats.skipped, 0);
        assert_eq!(scheduler.poller().source().requests.get(), 3);
        // Last to resolve wins
        assert_eq!(scheduler.poller().page().text(TEMPERATURE_ID), Some("3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_drops_ticks_while_in_flight() {
        let scheduler = scheduler(5_000, OverlapPolicy::Skip);
        run_for(&scheduler, 4_500).await;

        let stats = scheduler.poller().stats();
        assert_eq!(stats.started, 1);
        assert_eq!(stats.skipped, 2);
        assert_eq!(stats.rendered, 1);
        assert_eq!(scheduler.poller().in_flight(), 0);
    }
}
