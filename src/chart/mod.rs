//! Chart
//!
//! - [`model`]: the `{labels, datasets, options}` chart model and its fixed styling
//! - [`renderer`]: the [`Renderer`] owning the chart, and the [`ChartSurface`] seam

pub mod model;
pub mod renderer;

pub use model::{
    AxisOptions, ChartModel, ChartOptions, Dataset, LegendOptions, Rgba, SeriesStyle,
    TooltipMode, TooltipOptions, HUMIDITY_SERIES, TEMPERATURE_SERIES,
};
pub use renderer::{ChartSurface, MemorySurface, Renderer};
