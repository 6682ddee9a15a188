//! Poller
//!
//! One cycle: fetch a batch, turn it into a [`Frame`], write the latest
//! values to the page and hand the series to the renderer. A failed cycle is
//! logged and dropped; the next tick simply tries again.
//!
//! The poller is single-threaded. Page and renderer sit in `RefCell`s that are
//! only borrowed after the fetch has resolved, so overlapping cycles on one
//! event loop never hold a borrow across an await. Whichever cycle resolves
//! last leaves its data on screen.

use std::cell::{Cell, Ref, RefCell};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chart::{ChartSurface, Renderer};
use crate::error::{CycleError, CycleResult};
use crate::page::{Page, DATE_TITLE_ID, HUMIDITY_ID, TEMPERATURE_ID};
use crate::source::SensorSource;
use crate::transform::{display_number, Frame};

/// Time between cycles
pub const POLL_INTERVAL_MS: u32 = 2000;

/// What to do when a tick fires while an earlier cycle is still in flight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlapPolicy {
    /// Start another cycle regardless; the last to resolve wins
    #[default]
    Allow,
    /// Skip the tick
    Skip,
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Allow => write!(f, "allow"),
            OverlapPolicy::Skip => write!(f, "skip"),
        }
    }
}

impl FromStr for OverlapPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" => Ok(OverlapPolicy::Allow),
            "skip" => Ok(OverlapPolicy::Skip),
            other => Err(format!("unknown overlap policy: {} (expected allow or skip)", other)),
        }
    }
}

/// Result of a successful cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The endpoint returned no readings; nothing was touched
    Empty,
    /// Page and chart were updated with this many readings
    Rendered { readings: usize },
}

/// Running totals over the poller's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleStats {
    pub started: u64,
    pub rendered: u64,
    pub empty: u64,
    pub failed: u64,
    pub skipped: u64,
}

type ErrorReporter = Box<dyn Fn(&CycleError)>;

/// Fetch-transform-render loop body
pub struct Poller<Src, P, S>
where
    S: ChartSurface,
{
    source: Src,
    page: RefCell<P>,
    renderer: RefCell<Renderer<S>>,
    in_flight: Cell<usize>,
    stats: Cell<CycleStats>,
    reporter: Option<ErrorReporter>,
}

impl<Src, P, S> Poller<Src, P, S>
where
    Src: SensorSource,
    P: Page,
    S: ChartSurface,
{
    /// Create a poller. The renderer should already be initialized; cycles
    /// against an uninitialized renderer fail and are logged.
    pub fn new(source: Src, page: P, renderer: Renderer<S>) -> Self {
        Self {
            source,
            page: RefCell::new(page),
            renderer: RefCell::new(renderer),
            in_flight: Cell::new(0),
            stats: Cell::new(CycleStats::default()),
            reporter: None,
        }
    }

    /// Also pass every cycle failure to `reporter`
    pub fn with_reporter(mut self, reporter: impl Fn(&CycleError) + 'static) -> Self {
        self.reporter = Some(Box::new(reporter));
        self
    }

    /// Run one cycle, propagating any failure
    pub async fn fetch_and_render(&self) -> CycleResult<CycleOutcome> {
        let batch = self.source.fetch().await?;

        match Frame::from_batch(batch) {
            Some(frame) => self.apply(frame),
            None => Ok(CycleOutcome::Empty),
        }
    }

    /// Write a frame to the page and the chart
    pub fn apply(&self, frame: Frame) -> CycleResult<CycleOutcome> {
        let readings = frame.len();

        {
            let mut page = self.page.borrow_mut();
            page.set_text(TEMPERATURE_ID, &display_number(frame.latest_temperature))?;
            page.set_text(HUMIDITY_ID, &display_number(frame.latest_humidity))?;
            if page.contains(DATE_TITLE_ID) {
                page.set_text(DATE_TITLE_ID, &frame.date_title)?;
            }
        }

        self.renderer
            .borrow_mut()
            .update(frame.labels, frame.temperatures, frame.humidities)?;

        Ok(CycleOutcome::Rendered { readings })
    }

    /// Run one cycle, logging and swallowing any failure
    pub async fn run_cycle(&self) -> Option<CycleOutcome> {
        let _guard = InFlight::enter(&self.in_flight);
        self.bump(|s| s.started += 1);

        match self.fetch_and_render().await {
            Ok(outcome) => {
                match outcome {
                    CycleOutcome::Empty => {
                        self.bump(|s| s.empty += 1);
                        tracing::debug!(source = %self.source.describe(), "No sensor data");
                    }
                    CycleOutcome::Rendered { readings } => {
                        self.bump(|s| s.rendered += 1);
                        tracing::debug!(readings, "Chart updated");
                    }
                }
                Some(outcome)
            }
            Err(e) => {
                self.bump(|s| s.failed += 1);
                tracing::error!(
                    source = %self.source.describe(),
                    error = %e,
                    "Error fetching sensor data"
                );
                if let Some(report) = &self.reporter {
                    report(&e);
                }
                None
            }
        }
    }

    /// Decide whether a tick should start a cycle under `policy`.
    ///
    /// A skipped tick is counted and logged.
    pub fn should_start(&self, policy: OverlapPolicy) -> bool {
        let busy = self.in_flight.get() > 0;
        if policy == OverlapPolicy::Skip && busy {
            self.bump(|s| s.skipped += 1);
            tracing::debug!(in_flight = self.in_flight.get(), "Cycle in flight, skipping tick");
            return false;
        }
        true
    }

    /// Cycles currently awaiting their fetch
    pub fn in_flight(&self) -> usize {
        self.in_flight.get()
    }

    pub fn stats(&self) -> CycleStats {
        self.stats.get()
    }

    pub fn source(&self) -> &Src {
        &self.source
    }

    pub fn page(&self) -> Ref<'_, P> {
        self.page.borrow()
    }

    pub fn renderer(&self) -> Ref<'_, Renderer<S>> {
        self.renderer.borrow()
    }

    fn bump(&self, f: impl FnOnce(&mut CycleStats)) {
        let mut stats = self.stats.get();
        f(&mut stats);
        self.stats.set(stats);
    }
}

/// Counts a cycle as in flight until dropped, even if its future is dropped
struct InFlight<'a>(&'a Cell<usize>);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a Cell<usize>) -> Self {
        counter.set(counter.get() + 1);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(self.0.get().saturating_sub(1));
    }
}
