//! # Sensorboard
//!
//! Live temperature and humidity dashboard. Polls `GET /sensor-data`, reshapes
//! the readings and redraws a two-series line chart every two seconds.
//!
//! ## Modules
//!
//! - [`reading`]: readings and batches as served by the endpoint
//! - [`transform`]: batch → [`Frame`] (latest values, date title, time labels)
//! - [`chart`]: chart model and the [`Renderer`] that owns it
//! - [`page`]: the text elements a cycle writes to
//! - [`source`]: where batches come from
//! - [`poller`]: the fetch-transform-render cycle
//! - [`scheduler`], [`terminal`], [`config`]: the native terminal watcher
//!   (feature `native`)
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::rc::Rc;
//! use sensorboard::{terminal, HttpSource, OverlapPolicy, Poller, Renderer, Scheduler};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (page, surface) = terminal::terminal(std::io::stdout());
//!
//!     let mut renderer = Renderer::new();
//!     renderer.initialize(surface)?;
//!
//!     let source = HttpSource::new("https://localhost:5001")?;
//!     let poller = Rc::new(Poller::new(source, page, renderer));
//!     let scheduler = Scheduler::new(poller, OverlapPolicy::Allow);
//!
//!     tokio::task::LocalSet::new().run_until(scheduler.run()).await;
//!     Ok(())
//! }
//! ```

pub mod chart;
pub mod error;
pub mod page;
pub mod poller;
pub mod reading;
pub mod source;
pub mod transform;

#[cfg(feature = "native")]
pub mod config;
#[cfg(feature = "native")]
pub mod scheduler;
#[cfg(feature = "native")]
pub mod terminal;

// Re-export top-level types for convenience
pub use chart::{ChartModel, ChartSurface, Dataset, MemorySurface, Renderer};
pub use error::{ChartError, CycleError, CycleResult, PageError, SourceError};
pub use page::{
    MemoryPage, Page, CHART_CANVAS_ID, DATE_TITLE_ID, HUMIDITY_ID, TEMPERATURE_ID,
};
pub use poller::{CycleOutcome, CycleStats, OverlapPolicy, Poller, POLL_INTERVAL_MS};
pub use reading::{Reading, ReadingBatch};
pub use source::{SensorSource, SENSOR_DATA_PATH};
pub use transform::{display_number, most_recent_date, times_from_timestamps, Frame};

#[cfg(feature = "native")]
pub use config::{Config, ConfigError, LoggingConfig, PollConfig, SourceConfig};
#[cfg(feature = "native")]
pub use scheduler::Scheduler;
#[cfg(feature = "native")]
pub use source::HttpSource;
